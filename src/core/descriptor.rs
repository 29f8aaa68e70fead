//! Type descriptors: the resolved, static shape of a declared field type.
//!
//! Descriptors are built from signatures (`Mappable::descriptor`), never from data, since
//! an empty list or a missing map entry carries no evidence of its element type.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::core::data::Mappable;
use crate::core::error::MapperError;
use crate::core::property::RecordType;

/// Fixed-width numeric kinds. Conversions between them are range checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberKind {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
}

impl NumberKind {
    pub fn name(self) -> &'static str {
        match self {
            NumberKind::I8 => "i8",
            NumberKind::I16 => "i16",
            NumberKind::I32 => "i32",
            NumberKind::I64 => "i64",
            NumberKind::U8 => "u8",
            NumberKind::U16 => "u16",
            NumberKind::U32 => "u32",
            NumberKind::U64 => "u64",
            NumberKind::F32 => "f32",
            NumberKind::F64 => "f64",
        }
    }
}

/// An enumeration known by its exact, case-sensitive labels.
#[derive(Debug, Clone, Copy)]
pub struct EnumType {
    pub name: &'static str,
    pub labels: &'static [&'static str],
}

impl EnumType {
    pub fn label(&self, text: &str) -> Option<&'static str> {
        self.labels.iter().copied().find(|label| *label == text)
    }
}

impl PartialEq for EnumType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for EnumType {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Bool,
    Number(NumberKind),
    Text,
    Enum(EnumType),
    /// A type only a custom transformer knows how to produce.
    Custom(&'static str),
}

impl ScalarKind {
    fn name(&self) -> &'static str {
        match self {
            ScalarKind::Bool => "bool",
            ScalarKind::Number(n) => n.name(),
            ScalarKind::Text => "String",
            ScalarKind::Enum(e) => e.name,
            ScalarKind::Custom(name) => name,
        }
    }
}

#[derive(Debug, Clone)]
pub enum BaseKind {
    Scalar(ScalarKind),
    Optional,
    OrderedSequence,
    UnorderedSequence,
    /// Any other iterable container. Declarable, but rejected at conversion time.
    Iterable,
    StringKeyedMap,
    Record(RecordType),
}

/// Immutable description of a declared type. Equality and hashing go by the normalized
/// signature only, so two descriptors of the same shape are interchangeable.
#[derive(Clone)]
pub struct TypeDescriptor {
    signature: Arc<str>,
    kind: BaseKind,
    elements: Arc<[TypeDescriptor]>,
}

impl TypeDescriptor {
    fn build(signature: String, kind: BaseKind, elements: Vec<TypeDescriptor>) -> Self {
        Self {
            signature: Arc::from(signature),
            kind,
            elements: Arc::from(elements),
        }
    }

    /// Resolves the descriptor of a declared Rust type.
    pub fn resolve<T: Mappable>() -> Result<Self, MapperError> {
        T::descriptor()
    }

    pub fn scalar(kind: ScalarKind) -> Self {
        Self::build(kind.name().to_string(), BaseKind::Scalar(kind), Vec::new())
    }

    pub fn optional(inner: TypeDescriptor) -> Self {
        Self::build(format!("Option<{}>", inner.signature), BaseKind::Optional, vec![inner])
    }

    pub fn list(element: TypeDescriptor) -> Self {
        Self::build(format!("Vec<{}>", element.signature), BaseKind::OrderedSequence, vec![element])
    }

    pub fn set(element: TypeDescriptor) -> Self {
        Self::build(
            format!("IndexSet<{}>", element.signature),
            BaseKind::UnorderedSequence,
            vec![element],
        )
    }

    pub fn iterable(container: &str, element: TypeDescriptor) -> Self {
        Self::build(format!("{container}<{}>", element.signature), BaseKind::Iterable, vec![element])
    }

    /// String-keyed map. Any other key type is rejected here, before it can be used.
    pub fn map(key: TypeDescriptor, value: TypeDescriptor) -> Result<Self, MapperError> {
        if !key.is_text() {
            return Err(MapperError::UnsupportedShape {
                signature: format!("IndexMap<{}, {}>", key.signature, value.signature),
                reason: "the key type of maps may only be String".to_string(),
            });
        }
        Ok(Self::build(
            format!("IndexMap<{}, {}>", key.signature, value.signature),
            BaseKind::StringKeyedMap,
            vec![key, value],
        ))
    }

    pub fn record(record: RecordType) -> Self {
        Self::build(record.name().to_string(), BaseKind::Record(record), Vec::new())
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn kind(&self) -> &BaseKind {
        &self.kind
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, BaseKind::Scalar(ScalarKind::Text))
    }

    /// Descriptor of the generic argument at `index`.
    pub fn element(&self, index: usize) -> Result<&TypeDescriptor, MapperError> {
        self.elements
            .get(index)
            .ok_or_else(|| MapperError::UnsupportedShape {
                signature: self.signature.to_string(),
                reason: format!("no generic element at index {index}"),
            })
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.signature == other.signature
    }
}

impl Eq for TypeDescriptor {}

impl Hash for TypeDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.signature.hash(state);
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeDescriptor({})", self.signature)
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.signature)
    }
}
