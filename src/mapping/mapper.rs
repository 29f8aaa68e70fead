//! Recursive mapping from the untyped tree to typed values.
//!
//! Dispatch for one value, first applicable branch wins:
//!
//! 1. optional: unwrap, convert the inner type, wrap again (never fails by itself)
//! 2. ordered / unordered sequence: convert each element, drop absent ones
//! 3. string-keyed map: convert each value, drop absent entries
//! 4. transformer chain, in registration order
//! 5. record: build a default instance and fill its properties
//!
//! Anything else is absent. Only impossible type declarations are errors.
//!
//! A record field whose value cannot be converted keeps its default. If it has no default
//! (a `Field::required` slot still at `None`), the error handler is told and the whole
//! record becomes absent, which an enclosing optional or default can still mask.

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::core::context::{MappingContext, MappingErrorHandler, Segment, SilentErrorHandler};
use crate::core::data::{Data, Mappable, Record};
use crate::core::descriptor::{BaseKind, TypeDescriptor};
use crate::core::error::MapperError;
use crate::core::introspect::PropertyIntrospector;
use crate::core::property::{PropertyDescriptor, RecordType};
use crate::core::value::Value;
use crate::mapping::flatten::LeafFlattener;
use crate::mapping::resource::PropertyResource;
use crate::mapping::transform::{Transformer, default_transformers};

pub struct Mapper {
    error_handler: Box<dyn MappingErrorHandler>,
    transformers: Vec<Box<dyn Transformer>>,
    introspector: Arc<PropertyIntrospector>,
}

impl Default for Mapper {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Mapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> MapperBuilder {
        MapperBuilder::default()
    }

    pub fn introspector(&self) -> &Arc<PropertyIntrospector> {
        &self.introspector
    }

    /// A flattener sharing this mapper's property cache.
    pub fn leaf_flattener(&self) -> LeafFlattener {
        LeafFlattener::new(Arc::clone(&self.introspector))
    }

    pub fn writable_properties(&self, record: &RecordType) -> Result<Arc<[PropertyDescriptor]>, MapperError> {
        self.introspector.mappable_properties(record)
    }

    /// Reads the value at `path` of the resource and converts it to `T`.
    pub fn convert_to_bean<T: Mappable>(
        &self,
        path: &str,
        resource: &dyn PropertyResource,
    ) -> Result<Option<T>, MapperError> {
        let target = T::descriptor()?;
        let converted = self.convert(&target, resource.get_object(path), &MappingContext::at(path))?;
        converted.map(|data| typed(&target, data)).transpose()
    }

    pub fn convert_value<T: Mappable>(&self, value: &Value) -> Result<Option<T>, MapperError> {
        let target = T::descriptor()?;
        let converted = self.convert(&target, Some(value), &MappingContext::root())?;
        converted.map(|data| typed(&target, data)).transpose()
    }

    /// Converts `value` to the type described by `target`. `Ok(None)` is absent.
    pub fn convert(
        &self,
        target: &TypeDescriptor,
        value: Option<&Value>,
        context: &MappingContext<'_>,
    ) -> Result<Option<Data>, MapperError> {
        let value = value.filter(|v| !v.is_null());

        if let BaseKind::Optional = target.kind() {
            let inner = self.convert(target.element(0)?, value, context)?;
            return Ok(Some(Data::Optional(inner.map(Box::new))));
        }

        let Some(value) = value else {
            return Ok(None);
        };

        if let Some(result) = self.process_sequence(target, value, context)? {
            return Ok(Some(result));
        }
        if let Some(result) = self.process_map(target, value, context)? {
            return Ok(Some(result));
        }
        if let Some(result) = self.process_transformers(target, value) {
            return Ok(Some(result));
        }
        self.convert_to_record(target, value, context)
    }

    fn process_sequence(
        &self,
        target: &TypeDescriptor,
        value: &Value,
        context: &MappingContext<'_>,
    ) -> Result<Option<Data>, MapperError> {
        let unordered = match target.kind() {
            BaseKind::OrderedSequence => false,
            BaseKind::UnorderedSequence => true,
            BaseKind::Iterable => {
                if value.as_seq().is_none() {
                    return Ok(None);
                }
                return Err(MapperError::UnsupportedShape {
                    signature: target.signature().to_string(),
                    reason: "only Vec and IndexSet are supported as sequences".to_string(),
                });
            }
            _ => return Ok(None),
        };
        let Some(items) = value.as_seq() else {
            return Ok(None);
        };

        let element = target.element(0)?;
        let mut converted: Vec<Data> = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let child = context.child(Segment::Index(index));
            match self.convert(element, Some(item), &child)? {
                Some(data) if unordered && converted.contains(&data) => {}
                Some(data) => converted.push(data),
                None => trace!(path = %child, "dropped unconvertible element"),
            }
        }

        Ok(Some(if unordered {
            Data::Set(converted)
        } else {
            Data::List(converted)
        }))
    }

    fn process_map(
        &self,
        target: &TypeDescriptor,
        value: &Value,
        context: &MappingContext<'_>,
    ) -> Result<Option<Data>, MapperError> {
        let (BaseKind::StringKeyedMap, Some(entries)) = (target.kind(), value.as_map()) else {
            return Ok(None);
        };
        if !target.element(0)?.is_text() {
            return Err(MapperError::UnsupportedShape {
                signature: target.signature().to_string(),
                reason: "the key type of maps may only be String".to_string(),
            });
        }

        let value_type = target.element(1)?;
        let mut converted = IndexMap::with_capacity(entries.len());
        for (key, entry) in entries {
            let child = context.child(Segment::Key(key));
            match self.convert(value_type, Some(entry), &child)? {
                Some(data) => {
                    converted.insert(key.clone(), data);
                }
                None => trace!(path = %child, "dropped unconvertible map entry"),
            }
        }
        Ok(Some(Data::Map(converted)))
    }

    fn process_transformers(&self, target: &TypeDescriptor, value: &Value) -> Option<Data> {
        self.transformers
            .iter()
            .find_map(|transformer| transformer.transform(target, value))
    }

    fn convert_to_record(
        &self,
        target: &TypeDescriptor,
        value: &Value,
        context: &MappingContext<'_>,
    ) -> Result<Option<Data>, MapperError> {
        let (BaseKind::Record(record_type), Some(entries)) = (target.kind(), value.as_map()) else {
            return Ok(None);
        };
        let properties = self.introspector.mappable_properties(record_type)?;
        if properties.is_empty() {
            return Ok(None);
        }

        let mut record: Box<dyn Record> = record_type.construct();
        for property in properties.iter() {
            let child = context.child(Segment::Property(property.name()));
            match self.convert(property.type_descriptor(), entries.get(property.name()), &child)? {
                Some(data) => property.write(record.as_mut(), data)?,
                None if property.read(record.as_ref()).is_some() => {
                    debug!(path = %child, "keeping default value");
                }
                None => {
                    self.error_handler.handle(property, &child)?;
                    return Ok(None);
                }
            }
        }
        Ok(Some(Data::Record(record)))
    }

    /// Lowers a typed value back to the untyped tree, records by their properties.
    pub fn to_untyped(&self, data: &Data) -> Result<Value, MapperError> {
        Ok(match data {
            Data::Bool(b) => Value::Bool(*b),
            Data::I8(n) => Value::Int(i64::from(*n)),
            Data::I16(n) => Value::Int(i64::from(*n)),
            Data::I32(n) => Value::Int(i64::from(*n)),
            Data::I64(n) => Value::Int(*n),
            Data::U8(n) => Value::Int(i64::from(*n)),
            Data::U16(n) => Value::Int(i64::from(*n)),
            Data::U32(n) => Value::Int(i64::from(*n)),
            Data::U64(n) => Value::from(*n),
            Data::F32(f) => Value::Float(f64::from(*f)),
            Data::F64(f) => Value::Float(*f),
            Data::Text(s) => Value::Str(s.clone()),
            Data::Enum(label) => Value::Str((*label).to_string()),
            Data::Optional(None) => Value::Null,
            Data::Optional(Some(inner)) => self.to_untyped(inner)?,
            Data::List(items) | Data::Set(items) => {
                Value::Seq(items.iter().map(|item| self.to_untyped(item)).collect::<Result<_, _>>()?)
            }
            Data::Map(entries) => Value::Map(
                entries
                    .iter()
                    .map(|(k, v)| Ok((k.clone(), self.to_untyped(v)?)))
                    .collect::<Result<_, MapperError>>()?,
            ),
            Data::Record(record) => self.record_to_untyped(record.as_ref())?,
            Data::Opaque(opaque) => {
                return Err(MapperError::NotABean {
                    type_name: opaque.type_name().to_string(),
                    path: String::new(),
                });
            }
        })
    }

    fn record_to_untyped(&self, record: &dyn Record) -> Result<Value, MapperError> {
        let record_type = record.record_type();
        let properties = self.introspector.mappable_properties(&record_type)?;
        if properties.is_empty() {
            return Err(MapperError::NotABean {
                type_name: record_type.name().to_string(),
                path: String::new(),
            });
        }

        let mut entries = IndexMap::with_capacity(properties.len());
        for property in properties.iter() {
            let data = property.read(record).ok_or_else(|| MapperError::UnsetProperty {
                path: property.name().to_string(),
            })?;
            let value = self.to_untyped(&data)?;
            if !value.is_null() {
                entries.insert(property.name().to_string(), value);
            }
        }
        Ok(Value::Map(entries))
    }
}

fn typed<T: Mappable>(target: &TypeDescriptor, data: Data) -> Result<T, MapperError> {
    T::from_data(data).ok_or_else(|| MapperError::TypeMismatch {
        property: String::new(),
        expected: target.signature().to_string(),
    })
}

/// Assembles a [`Mapper`]. The transformer chain is fixed once built.
pub struct MapperBuilder {
    error_handler: Box<dyn MappingErrorHandler>,
    transformers: Vec<Box<dyn Transformer>>,
    introspector: Option<Arc<PropertyIntrospector>>,
}

impl Default for MapperBuilder {
    fn default() -> Self {
        Self {
            error_handler: Box::new(SilentErrorHandler),
            transformers: default_transformers(),
            introspector: None,
        }
    }
}

impl MapperBuilder {
    pub fn error_handler(mut self, handler: impl MappingErrorHandler + 'static) -> Self {
        self.error_handler = Box::new(handler);
        self
    }

    /// Appends a transformer after the ones already registered.
    pub fn transformer(mut self, transformer: impl Transformer + 'static) -> Self {
        self.transformers.push(Box::new(transformer));
        self
    }

    /// Replaces the whole chain, defaults included.
    pub fn transformers(mut self, transformers: Vec<Box<dyn Transformer>>) -> Self {
        self.transformers = transformers;
        self
    }

    /// Shares a property cache with other mappers.
    pub fn introspector(mut self, introspector: Arc<PropertyIntrospector>) -> Self {
        self.introspector = Some(introspector);
        self
    }

    pub fn build(self) -> Mapper {
        Mapper {
            error_handler: self.error_handler,
            transformers: self.transformers,
            introspector: self.introspector.unwrap_or_default(),
        }
    }
}
