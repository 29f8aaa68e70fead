// cached property tables, shared by every conversion running against one mapper
use std::any::TypeId;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::core::error::MapperError;
use crate::core::property::{PropertyDescriptor, RecordType};

/// Read-through cache of mappable properties per record type.
///
/// Hits only take a shard read lock. A miss computes the table under the entry of its own
/// key, so concurrent first lookups of one type compute it once and other types are not held up.
#[derive(Debug, Default)]
pub struct PropertyIntrospector {
    cache: DashMap<TypeId, Arc<[PropertyDescriptor]>>,
}

impl PropertyIntrospector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Properties with both a reader and a writer, in declaration order.
    pub fn mappable_properties(&self, record: &RecordType) -> Result<Arc<[PropertyDescriptor]>, MapperError> {
        if let Some(hit) = self.cache.get(&record.id()) {
            return Ok(Arc::clone(hit.value()));
        }

        let entry = self.cache.entry(record.id()).or_try_insert_with(|| {
            let properties = record.collect_mappable()?;
            debug!(record = record.name(), count = properties.len(), "introspected record type");
            Ok::<_, MapperError>(Arc::from(properties))
        })?;
        Ok(Arc::clone(entry.value()))
    }

    pub fn cached_types(&self) -> usize {
        self.cache.len()
    }

    pub fn clear(&self) {
        self.cache.clear();
    }
}
