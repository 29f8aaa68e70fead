// leaf entries of records for export
use std::sync::Arc;

use indexmap::IndexMap;

use crate::core::data::{Bean, Data, Record};
use crate::core::error::MapperError;
use crate::core::introspect::PropertyIntrospector;

/// A terminal `(path, value)` pair of an exported record.
///
/// The value is a scalar, a whole sequence, an empty map marking an empty mapping, or an
/// empty optional keeping a map entry that has no value.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafEntry {
    path: String,
    value: Data,
}

impl LeafEntry {
    pub fn new(path: impl Into<String>, value: Data) -> Self {
        Self {
            path: path.into(),
            value,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn value(&self) -> &Data {
        &self.value
    }

    pub fn is_empty_map_marker(&self) -> bool {
        matches!(&self.value, Data::Map(entries) if entries.is_empty())
    }
}

/// Walks records depth first, in declaration order, down to their leaves.
///
/// Only the record/map nesting is expanded; sequences are single leaves even when they
/// hold records. Export expects fully initialized instances and fails on the first unset
/// property or non-record value.
#[derive(Debug, Clone, Default)]
pub struct LeafFlattener {
    introspector: Arc<PropertyIntrospector>,
}

impl LeafFlattener {
    pub fn new(introspector: Arc<PropertyIntrospector>) -> Self {
        Self { introspector }
    }

    pub fn flatten(&self, record: &dyn Record, root_path: &str) -> Result<Vec<LeafEntry>, MapperError> {
        let mut builder = EntryBuilder {
            introspector: &self.introspector,
            entries: Vec::new(),
        };
        builder.collect_from_record(record, root_path)?;
        Ok(builder.entries)
    }

    pub fn generate<B: Bean>(&self, root_path: &str, bean: &B) -> Result<Vec<LeafEntry>, MapperError> {
        self.flatten(bean, root_path)
    }
}

struct EntryBuilder<'a> {
    introspector: &'a PropertyIntrospector,
    entries: Vec<LeafEntry>,
}

impl EntryBuilder<'_> {
    fn collect_from_record(&mut self, record: &dyn Record, path: &str) -> Result<(), MapperError> {
        let record_type = record.record_type();
        let properties = self.introspector.mappable_properties(&record_type)?;
        if properties.is_empty() {
            return Err(MapperError::NotABean {
                type_name: record_type.name().to_string(),
                path: path.to_string(),
            });
        }

        let before = self.entries.len();
        let prefix = if path.is_empty() { String::new() } else { format!("{path}.") };
        for property in properties.iter() {
            let property_path = format!("{prefix}{}", property.name());
            //unset values are a precondition failure, export does not fall back
            let value = property
                .read(record)
                .ok_or_else(|| MapperError::UnsetProperty { path: property_path.clone() })?;
            self.collect_entries(value, property_path)?;
        }
        //all properties were empty optionals: the record itself must still be present
        if self.entries.len() == before && !path.is_empty() {
            self.push_empty_map(path.to_string());
        }
        Ok(())
    }

    fn push_empty_map(&mut self, path: String) {
        self.entries.push(LeafEntry::new(path, Data::Map(IndexMap::new())));
    }

    fn collect_entries(&mut self, value: Data, path: String) -> Result<(), MapperError> {
        match value {
            scalar @ (Data::Bool(_)
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
            | Data::Enum(_)) => self.entries.push(LeafEntry::new(path, scalar)),
            sequence @ (Data::List(_) | Data::Set(_)) => self.entries.push(LeafEntry::new(path, sequence)),
            Data::Map(entries) if entries.is_empty() => self.push_empty_map(path),
            Data::Map(entries) => {
                for (key, entry) in entries {
                    let entry_path = format!("{path}.{key}");
                    match entry {
                        //keeps the key, so the entry converts back to an empty optional
                        Data::Optional(None) => self.entries.push(LeafEntry::new(entry_path, Data::Optional(None))),
                        entry => self.collect_entries(entry, entry_path)?,
                    }
                }
            }
            Data::Optional(Some(inner)) => self.collect_entries(*inner, path)?,
            Data::Optional(None) => {}
            Data::Record(record) => self.collect_from_record(record.as_ref(), &path)?,
            Data::Opaque(opaque) => {
                return Err(MapperError::NotABean {
                    type_name: opaque.type_name().to_string(),
                    path,
                });
            }
        }
        Ok(())
    }
}
