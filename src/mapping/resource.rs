// untyped resource the mapper reads from and exported leaves are written to
use tracing::debug;

use crate::core::error::ResourceError;
use crate::core::value::Value;
use crate::mapping::flatten::LeafEntry;
use crate::mapping::mapper::Mapper;

/// Dotted-path access to an untyped configuration tree.
pub trait PropertyResource {
    /// The value at `path`, `None` if any segment is missing. The empty path is the root.
    fn get_object(&self, path: &str) -> Option<&Value>;

    fn set_value(&mut self, path: &str, value: Value);
}

/// In-memory resource. The root is always a mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeResource {
    root: Value,
}

impl Default for TreeResource {
    fn default() -> Self {
        Self {
            root: Value::Map(Default::default()),
        }
    }
}

impl TreeResource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a loaded tree. An empty document is an empty mapping.
    pub fn from_value(root: Value) -> Result<Self, ResourceError> {
        match root {
            Value::Null => Ok(Self::new()),
            Value::Map(_) => Ok(Self { root }),
            _ => Err(ResourceError::TopLevelNotMap),
        }
    }

    pub fn from_toon(text: &str) -> Result<Self, ResourceError> {
        let root: Value = toon_format::decode_default(text).map_err(|e| ResourceError::Format(e.to_string()))?;
        Self::from_value(root)
    }

    pub fn to_toon(&self) -> Result<String, ResourceError> {
        toon_format::encode_default(&self.root).map_err(|e| ResourceError::Format(e.to_string()))
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Writes each leaf at its path. Composite leaves are lowered through the mapper;
    /// the empty-map marker becomes an empty mapping.
    pub fn export_entries(&mut self, mapper: &Mapper, entries: &[LeafEntry]) -> Result<(), ResourceError> {
        for entry in entries {
            let value = mapper.to_untyped(entry.value())?;
            self.set_value(entry.path(), value);
        }
        debug!(count = entries.len(), "exported leaf entries");
        Ok(())
    }
}

impl PropertyResource for TreeResource {
    fn get_object(&self, path: &str) -> Option<&Value> {
        self.root.get_path(path)
    }

    fn set_value(&mut self, path: &str, value: Value) {
        //the root stays a mapping
        if path.is_empty() && value.as_map().is_none() {
            return;
        }
        self.root.set_path(path, value);
    }
}
