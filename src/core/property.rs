//! Property tables of records.
//!
//! A [`Bean`] lists its fields as [`Field`]s. Each field may have a reader, a writer or
//! both; only fields with both become [`PropertyDescriptor`]s and are seen by the mapper.
//! Read-only fields let computed values live next to mapped ones.

use std::any::{TypeId, type_name};
use std::fmt;
use std::sync::Arc;

use crate::core::data::{Bean, Data, Mappable, Record};
use crate::core::descriptor::TypeDescriptor;
use crate::core::error::MapperError;

type Reader<R> = Box<dyn Fn(&R) -> Option<Data> + Send + Sync>;
type Writer<R> = Box<dyn Fn(&mut R, Data) -> Option<()> + Send + Sync>;

/// One declared field of a bean `R`.
pub struct Field<R> {
    name: &'static str,
    descriptor: fn() -> Result<TypeDescriptor, MapperError>,
    read: Option<Reader<R>>,
    write: Option<Writer<R>>,
}

impl<R: Bean> Field<R> {
    /// A field that always holds a value; its default is whatever `R::default()` puts there.
    pub fn new<T: Mappable>(name: &'static str, get: fn(&R) -> &T, get_mut: fn(&mut R) -> &mut T) -> Self {
        Self {
            name,
            descriptor: T::descriptor,
            read: Some(Box::new(move |r: &R| Some(get(r).to_data()))),
            write: Some(Box::new(move |r: &mut R, data: Data| {
                *get_mut(r) = T::from_data(data)?;
                Some(())
            })),
        }
    }

    /// A field of type `T` stored in an `Option<T>` slot. `None` means "never set": a
    /// record whose source lacks this field cannot be built unless the default sets it.
    pub fn required<T: Mappable>(
        name: &'static str,
        get: fn(&R) -> &Option<T>,
        get_mut: fn(&mut R) -> &mut Option<T>,
    ) -> Self {
        Self {
            name,
            descriptor: T::descriptor,
            read: Some(Box::new(move |r: &R| get(r).as_ref().map(Mappable::to_data))),
            write: Some(Box::new(move |r: &mut R, data: Data| {
                *get_mut(r) = Some(T::from_data(data)?);
                Some(())
            })),
        }
    }

    pub fn read_only<T: Mappable>(name: &'static str, get: fn(&R) -> T) -> Self {
        Self {
            name,
            descriptor: T::descriptor,
            read: Some(Box::new(move |r: &R| Some(get(r).to_data()))),
            write: None,
        }
    }

    pub fn write_only<T: Mappable>(name: &'static str, set: fn(&mut R, T)) -> Self {
        Self {
            name,
            descriptor: T::descriptor,
            read: None,
            write: Some(Box::new(move |r: &mut R, data: Data| {
                set(r, T::from_data(data)?);
                Some(())
            })),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_mappable(&self) -> bool {
        self.read.is_some() && self.write.is_some()
    }

    /// Erases the bean type. Fields lacking a reader or a writer yield `Ok(None)`.
    pub(crate) fn into_property(self) -> Result<Option<PropertyDescriptor>, MapperError> {
        let (Some(read), Some(write)) = (self.read, self.write) else {
            return Ok(None);
        };
        let type_descriptor = (self.descriptor)()?;
        Ok(Some(PropertyDescriptor {
            name: self.name,
            type_descriptor,
            read: Arc::new(move |record: &dyn Record| record.as_any().downcast_ref::<R>().and_then(|r| read(r))),
            write: Arc::new(move |record: &mut dyn Record, data: Data| {
                record
                    .as_any_mut()
                    .downcast_mut::<R>()
                    .and_then(|r| write(r, data))
            }),
        }))
    }
}

/// A mappable property with its resolved descriptor and bound accessors.
#[derive(Clone)]
pub struct PropertyDescriptor {
    name: &'static str,
    type_descriptor: TypeDescriptor,
    read: Arc<dyn Fn(&dyn Record) -> Option<Data> + Send + Sync>,
    write: Arc<dyn Fn(&mut dyn Record, Data) -> Option<()> + Send + Sync>,
}

impl PropertyDescriptor {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn type_descriptor(&self) -> &TypeDescriptor {
        &self.type_descriptor
    }

    /// Current value of the property, `None` if it was never set.
    pub fn read(&self, record: &dyn Record) -> Option<Data> {
        (self.read)(record)
    }

    pub fn write(&self, record: &mut dyn Record, data: Data) -> Result<(), MapperError> {
        (self.write)(record, data).ok_or_else(|| MapperError::TypeMismatch {
            property: self.name.to_string(),
            expected: self.type_descriptor.signature().to_string(),
        })
    }
}

impl PartialEq for PropertyDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.type_descriptor == other.type_descriptor
    }
}

impl fmt::Debug for PropertyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDescriptor")
            .field("name", &self.name)
            .field("type", &self.type_descriptor)
            .finish()
    }
}

/// Identity and factory of a record type.
#[derive(Clone, Copy)]
pub struct RecordType {
    id: TypeId,
    name: &'static str,
    construct: fn() -> Box<dyn Record>,
    collect: fn() -> Result<Vec<PropertyDescriptor>, MapperError>,
}

fn construct<B: Bean>() -> Box<dyn Record> {
    Box::new(B::default())
}

fn collect_mappable<B: Bean>() -> Result<Vec<PropertyDescriptor>, MapperError> {
    let mut properties = Vec::new();
    for field in B::properties() {
        if let Some(property) = field.into_property()? {
            properties.push(property);
        }
    }
    Ok(properties)
}

impl RecordType {
    pub fn of<B: Bean>() -> Self {
        Self {
            id: TypeId::of::<B>(),
            name: type_name::<B>(),
            construct: construct::<B>,
            collect: collect_mappable::<B>,
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// A fresh, default-initialized instance.
    pub fn construct(&self) -> Box<dyn Record> {
        (self.construct)()
    }

    /// Uncached introspection, in declaration order. Use `PropertyIntrospector` instead.
    pub(crate) fn collect_mappable(&self) -> Result<Vec<PropertyDescriptor>, MapperError> {
        (self.collect)()
    }
}

impl PartialEq for RecordType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for RecordType {}

impl fmt::Debug for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordType({})", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Default)]
    struct Window {
        width: u32,
        title: Option<String>,
        scale: f64,
    }

    impl Window {
        fn set_scale(&mut self, scale: f64) {
            self.scale = scale;
        }
    }

    impl Bean for Window {
        fn properties() -> Vec<Field<Self>> {
            vec![
                Field::new("width", |w| &w.width, |w| &mut w.width),
                Field::required("title", |w| &w.title, |w| &mut w.title),
                Field::read_only("area", |w| w.width * 2),
                Field::write_only("scale", Window::set_scale),
            ]
        }
    }

    #[test]
    fn only_fields_with_both_accessors_are_mappable() {
        let properties = RecordType::of::<Window>().collect_mappable().unwrap();
        let names: Vec<_> = properties.iter().map(PropertyDescriptor::name).collect();

        assert_eq!(names, vec!["width", "title"]);
    }

    #[test]
    fn required_field_reads_as_unset_until_written() {
        let properties = RecordType::of::<Window>().collect_mappable().unwrap();
        let title = &properties[1];
        let mut window = RecordType::of::<Window>().construct();

        assert_eq!(title.read(window.as_ref()), None);

        title.write(window.as_mut(), Data::Text("main".to_string())).unwrap();
        assert_eq!(title.read(window.as_ref()), Some(Data::Text("main".to_string())));
    }

    #[test]
    fn write_of_wrong_kind_is_a_type_mismatch() {
        let properties = RecordType::of::<Window>().collect_mappable().unwrap();
        let mut window = Window::default();

        let err = properties[0].write(&mut window, Data::Text("wide".to_string())).unwrap_err();
        assert!(matches!(err, MapperError::TypeMismatch { .. }));
        assert_eq!(window.width, 0);
    }
}
