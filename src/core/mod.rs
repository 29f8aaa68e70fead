pub mod context;
pub mod data;
pub mod descriptor;
pub mod error;
pub mod introspect;
pub mod property;
pub mod value;
