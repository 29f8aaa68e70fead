// typed side of the mapping: runtime values of declared types, records and the
// `Mappable` bridge between Rust field types and their descriptors
use std::any::{Any, type_name};
use std::collections::VecDeque;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};

use crate::core::descriptor::{NumberKind, ScalarKind, TypeDescriptor};
use crate::core::error::MapperError;
use crate::core::property::{Field, RecordType};

/// A value of some declared type.
#[derive(Debug)]
pub enum Data {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Text(String),
    Enum(&'static str),
    Optional(Option<Box<Data>>),
    List(Vec<Data>),
    /// Unordered sequence, first-seen order, no duplicates.
    Set(Vec<Data>),
    Map(IndexMap<String, Data>),
    Record(Box<dyn Record>),
    Opaque(Opaque),
}

impl Data {
    /// Text, labels, numbers and booleans.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Data::Bool(_)
                | Data::I8(_)
                | Data::I16(_)
                | Data::I32(_)
                | Data::I64(_)
                | Data::U8(_)
                | Data::U16(_)
                | Data::U32(_)
                | Data::U64(_)
                | Data::F32(_)
                | Data::F64(_)
                | Data::Text(_)
                | Data::Enum(_)
        )
    }

    pub fn as_record(&self) -> Option<&dyn Record> {
        match self {
            Data::Record(record) => Some(record.as_ref()),
            _ => None,
        }
    }

    pub fn into_bean<B: Bean>(self) -> Option<B> {
        match self {
            Data::Record(record) => record.into_any().downcast::<B>().ok().map(|bean| *bean),
            _ => None,
        }
    }
}

impl Clone for Data {
    fn clone(&self) -> Self {
        match self {
            Data::Bool(v) => Data::Bool(*v),
            Data::I8(v) => Data::I8(*v),
            Data::I16(v) => Data::I16(*v),
            Data::I32(v) => Data::I32(*v),
            Data::I64(v) => Data::I64(*v),
            Data::U8(v) => Data::U8(*v),
            Data::U16(v) => Data::U16(*v),
            Data::U32(v) => Data::U32(*v),
            Data::U64(v) => Data::U64(*v),
            Data::F32(v) => Data::F32(*v),
            Data::F64(v) => Data::F64(*v),
            Data::Text(v) => Data::Text(v.clone()),
            Data::Enum(v) => Data::Enum(*v),
            Data::Optional(v) => Data::Optional(v.clone()),
            Data::List(v) => Data::List(v.clone()),
            Data::Set(v) => Data::Set(v.clone()),
            Data::Map(v) => Data::Map(v.clone()),
            Data::Record(v) => Data::Record(v.clone_record()),
            Data::Opaque(v) => Data::Opaque(v.clone()),
        }
    }
}

impl PartialEq for Data {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Data::Bool(a), Data::Bool(b)) => a == b,
            (Data::I8(a), Data::I8(b)) => a == b,
            (Data::I16(a), Data::I16(b)) => a == b,
            (Data::I32(a), Data::I32(b)) => a == b,
            (Data::I64(a), Data::I64(b)) => a == b,
            (Data::U8(a), Data::U8(b)) => a == b,
            (Data::U16(a), Data::U16(b)) => a == b,
            (Data::U32(a), Data::U32(b)) => a == b,
            (Data::U64(a), Data::U64(b)) => a == b,
            (Data::F32(a), Data::F32(b)) => a == b,
            (Data::F64(a), Data::F64(b)) => a == b,
            (Data::Text(a), Data::Text(b)) => a == b,
            (Data::Enum(a), Data::Enum(b)) => a == b,
            (Data::Optional(a), Data::Optional(b)) => a == b,
            (Data::List(a), Data::List(b)) => a == b,
            (Data::Set(a), Data::Set(b)) => a == b,
            (Data::Map(a), Data::Map(b)) => a == b,
            (Data::Record(a), Data::Record(b)) => a.eq_record(b.as_ref()),
            (Data::Opaque(a), Data::Opaque(b)) => a == b,
            _ => false,
        }
    }
}

/// A value produced by a custom transformer for a type with no structural mapping.
#[derive(Clone)]
pub struct Opaque {
    type_name: &'static str,
    value: Arc<dyn Any + Send + Sync>,
}

impl Opaque {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            type_name: type_name::<T>(),
            value: Arc::new(value),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }
}

impl PartialEq for Opaque {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Opaque({})", self.type_name)
    }
}

/// A structured record with a property table. Zero-argument construction is `Default`.
///
/// Properties are listed in declaration order; that order is the export order.
pub trait Bean: Default + Clone + PartialEq + fmt::Debug + Send + Sync + 'static {
    fn properties() -> Vec<Field<Self>>;
}

/// Object-safe view of a [`Bean`], used wherever the concrete type is only known at runtime.
pub trait Record: Any + fmt::Debug + Send + Sync {
    fn record_type(&self) -> RecordType;
    fn clone_record(&self) -> Box<dyn Record>;
    fn eq_record(&self, other: &dyn Record) -> bool;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<B: Bean> Record for B {
    fn record_type(&self) -> RecordType {
        RecordType::of::<B>()
    }

    fn clone_record(&self) -> Box<dyn Record> {
        Box::new(self.clone())
    }

    fn eq_record(&self, other: &dyn Record) -> bool {
        other.as_any().downcast_ref::<B>() == Some(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// A Rust type the mapper can target: its static descriptor plus the conversion to and
/// from [`Data`].
pub trait Mappable: Sized + 'static {
    fn descriptor() -> Result<TypeDescriptor, MapperError>;
    fn to_data(&self) -> Data;
    fn from_data(data: Data) -> Option<Self>;
}

macro_rules! impl_number {
    ($($ty:ty => $variant:ident),+ $(,)?) => {
        $(
            impl Mappable for $ty {
                fn descriptor() -> Result<TypeDescriptor, MapperError> {
                    Ok(TypeDescriptor::scalar(ScalarKind::Number(NumberKind::$variant)))
                }

                fn to_data(&self) -> Data {
                    Data::$variant(*self)
                }

                fn from_data(data: Data) -> Option<Self> {
                    match data {
                        Data::$variant(v) => Some(v),
                        _ => None,
                    }
                }
            }
        )+
    };
}

impl_number!(
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
);

impl Mappable for bool {
    fn descriptor() -> Result<TypeDescriptor, MapperError> {
        Ok(TypeDescriptor::scalar(ScalarKind::Bool))
    }

    fn to_data(&self) -> Data {
        Data::Bool(*self)
    }

    fn from_data(data: Data) -> Option<Self> {
        match data {
            Data::Bool(v) => Some(v),
            _ => None,
        }
    }
}

impl Mappable for String {
    fn descriptor() -> Result<TypeDescriptor, MapperError> {
        Ok(TypeDescriptor::scalar(ScalarKind::Text))
    }

    fn to_data(&self) -> Data {
        Data::Text(self.clone())
    }

    fn from_data(data: Data) -> Option<Self> {
        match data {
            Data::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl<T: Mappable> Mappable for Option<T> {
    fn descriptor() -> Result<TypeDescriptor, MapperError> {
        Ok(TypeDescriptor::optional(T::descriptor()?))
    }

    fn to_data(&self) -> Data {
        Data::Optional(self.as_ref().map(|v| Box::new(v.to_data())))
    }

    fn from_data(data: Data) -> Option<Self> {
        match data {
            Data::Optional(None) => Some(None),
            Data::Optional(Some(inner)) => T::from_data(*inner).map(Some),
            _ => None,
        }
    }
}

impl<T: Mappable> Mappable for Vec<T> {
    fn descriptor() -> Result<TypeDescriptor, MapperError> {
        Ok(TypeDescriptor::list(T::descriptor()?))
    }

    fn to_data(&self) -> Data {
        Data::List(self.iter().map(Mappable::to_data).collect())
    }

    fn from_data(data: Data) -> Option<Self> {
        match data {
            Data::List(items) => items.into_iter().map(T::from_data).collect(),
            _ => None,
        }
    }
}

impl<T: Mappable + Hash + Eq> Mappable for IndexSet<T> {
    fn descriptor() -> Result<TypeDescriptor, MapperError> {
        Ok(TypeDescriptor::set(T::descriptor()?))
    }

    fn to_data(&self) -> Data {
        Data::Set(self.iter().map(Mappable::to_data).collect())
    }

    fn from_data(data: Data) -> Option<Self> {
        match data {
            Data::Set(items) => items.into_iter().map(T::from_data).collect(),
            _ => None,
        }
    }
}

// declarable so that fields can use it, but the mapper refuses to fill it
impl<T: Mappable> Mappable for VecDeque<T> {
    fn descriptor() -> Result<TypeDescriptor, MapperError> {
        Ok(TypeDescriptor::iterable("VecDeque", T::descriptor()?))
    }

    fn to_data(&self) -> Data {
        Data::List(self.iter().map(Mappable::to_data).collect())
    }

    fn from_data(data: Data) -> Option<Self> {
        match data {
            Data::List(items) => items.into_iter().map(T::from_data).collect(),
            _ => None,
        }
    }
}

impl<K, V> Mappable for IndexMap<K, V>
where
    K: Mappable + Hash + Eq,
    V: Mappable,
{
    fn descriptor() -> Result<TypeDescriptor, MapperError> {
        TypeDescriptor::map(K::descriptor()?, V::descriptor()?)
    }

    fn to_data(&self) -> Data {
        //keys are text by construction of the descriptor
        Data::Map(
            self.iter()
                .filter_map(|(k, v)| match k.to_data() {
                    Data::Text(key) => Some((key, v.to_data())),
                    _ => None,
                })
                .collect(),
        )
    }

    fn from_data(data: Data) -> Option<Self> {
        match data {
            Data::Map(entries) => entries
                .into_iter()
                .map(|(k, v)| Some((K::from_data(Data::Text(k))?, V::from_data(v)?)))
                .collect(),
            _ => None,
        }
    }
}

/// Implements [`Mappable`] for a fieldless enum whose labels are its variant names.
#[macro_export]
macro_rules! mappable_enum {
    ($ty:ident { $($variant:ident),+ $(,)? }) => {
        impl $crate::Mappable for $ty {
            fn descriptor() -> ::std::result::Result<$crate::TypeDescriptor, $crate::MapperError> {
                Ok($crate::TypeDescriptor::scalar($crate::ScalarKind::Enum($crate::EnumType {
                    name: ::std::any::type_name::<$ty>(),
                    labels: &[$(stringify!($variant)),+],
                })))
            }

            fn to_data(&self) -> $crate::Data {
                match self {
                    $($ty::$variant => $crate::Data::Enum(stringify!($variant)),)+
                }
            }

            fn from_data(data: $crate::Data) -> ::std::option::Option<Self> {
                match data {
                    $crate::Data::Enum(label) => match label {
                        $(l if l == stringify!($variant) => Some($ty::$variant),)+
                        _ => None,
                    },
                    _ => None,
                }
            }
        }
    };
}

/// Implements [`Mappable`] for one or more [`Bean`] types, making them usable as fields.
#[macro_export]
macro_rules! mappable_bean {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Mappable for $ty {
                fn descriptor() -> ::std::result::Result<$crate::TypeDescriptor, $crate::MapperError> {
                    Ok($crate::TypeDescriptor::record($crate::RecordType::of::<$ty>()))
                }

                fn to_data(&self) -> $crate::Data {
                    $crate::Data::Record(::std::boxed::Box::new(::std::clone::Clone::clone(self)))
                }

                fn from_data(data: $crate::Data) -> ::std::option::Option<Self> {
                    data.into_bean::<$ty>()
                }
            }
        )+
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Shade {
        Light,
        Dark,
    }
    mappable_enum!(Shade { Light, Dark });

    #[test]
    fn enum_labels_are_variant_names() {
        assert_eq!(Shade::Dark.to_data(), Data::Enum("Dark"));
        assert_eq!(Shade::from_data(Data::Enum("Light")), Some(Shade::Light));
        assert_eq!(Shade::from_data(Data::Enum("light")), None);
    }

    #[test]
    fn collections_round_trip_through_data() {
        let mut map = IndexMap::new();
        map.insert("b".to_string(), vec![Some(2u16), None]);
        map.insert("a".to_string(), vec![]);

        let back = IndexMap::<String, Vec<Option<u16>>>::from_data(map.to_data()).unwrap();
        assert_eq!(back, map);
        assert_eq!(back.keys().collect::<Vec<_>>(), vec!["b", "a"]);
    }

    #[test]
    fn from_data_rejects_other_kinds() {
        assert_eq!(i32::from_data(Data::I64(1)), None);
        assert_eq!(Vec::<i32>::from_data(Data::Set(vec![Data::I32(1)])), None);
        assert_eq!(String::from_data(Data::Enum("Dark")), None);
    }

    #[test]
    fn opaque_values_compare_by_identity() {
        let a = Opaque::new(std::time::Duration::from_secs(3));
        let b = Opaque::new(std::time::Duration::from_secs(3));

        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert_eq!(a.downcast_ref::<std::time::Duration>(), Some(&std::time::Duration::from_secs(3)));
    }
}
