//! Maps untyped configuration trees onto typed beans, and flattens beans back into
//! path/value leaves for export.

pub mod core;
pub mod mapping;

pub use crate::core::context::{MappingContext, MappingErrorHandler, Segment, SilentErrorHandler, StrictErrorHandler};
pub use crate::core::data::{Bean, Data, Mappable, Opaque, Record};
pub use crate::core::descriptor::{BaseKind, EnumType, NumberKind, ScalarKind, TypeDescriptor};
pub use crate::core::error::{MapperError, ResourceError};
pub use crate::core::introspect::PropertyIntrospector;
pub use crate::core::property::{Field, PropertyDescriptor, RecordType};
pub use crate::core::value::Value;
pub use crate::mapping::flatten::{LeafEntry, LeafFlattener};
pub use crate::mapping::mapper::{Mapper, MapperBuilder};
pub use crate::mapping::resource::{PropertyResource, TreeResource};
pub use crate::mapping::transform::{EnumTransformer, IdentityTransformer, NumberTransformer, Transformer, default_transformers};
