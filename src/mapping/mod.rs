pub mod flatten;
pub mod mapper;
pub mod resource;
pub mod transform;

#[cfg(test)]
mod testbeans;
