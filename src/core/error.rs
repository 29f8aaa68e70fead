//! Error types for bean mapping and export.

use thiserror::Error;

/// Hard failures of the mapper. A value that merely cannot be converted is not an
/// error: conversion reports it as absent (`Ok(None)`) so callers can fall back.
#[derive(Debug, Error)]
pub enum MapperError {
    /// The declared type uses a container or key shape the mapper does not support.
    #[error("unsupported shape '{signature}': {reason}")]
    UnsupportedShape { signature: String, reason: String },

    /// A value that needs record-style expansion has no mappable properties.
    #[error("'{type_name}' at '{path}' has no mappable properties")]
    NotABean { type_name: String, path: String },

    /// A record field had no convertible value and no usable default.
    #[error("record field '{property}' at '{path}' has no value and no default")]
    RecordFieldMissing { property: String, path: String },

    /// Export found a field that was never initialized.
    #[error("property at '{path}' is unset")]
    UnsetProperty { path: String },

    /// A converted value did not fit the field it was written to.
    #[error("value for '{property}' does not match declared type '{expected}'")]
    TypeMismatch { property: String, expected: String },
}

/// Errors raised at the property resource boundary.
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("top-level is not a map")]
    TopLevelNotMap,

    #[error("could not process text: {0}")]
    Format(String),

    #[error(transparent)]
    Mapper(#[from] MapperError),
}
