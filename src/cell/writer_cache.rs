//! Datum writers memoized by schema identity
//!
//! Owned by one encoder and only touched under its lock. Entries are never
//! evicted; a column sees few distinct writer schemas.

use std::collections::HashMap;
use std::sync::Arc;

use crate::encoding::DatumWriter;
use crate::observability::{log_event, EncoderMetrics, Event};
use crate::schema::{Schema, SchemaIdentity};

#[derive(Debug)]
pub struct WriterCache {
    writers: HashMap<SchemaIdentity, DatumWriter>,
    metrics: Arc<EncoderMetrics>,
    log_events: bool,
}

impl WriterCache {
    pub fn new(metrics: Arc<EncoderMetrics>, log_events: bool) -> Self {
        Self {
            writers: HashMap::new(),
            metrics,
            log_events,
        }
    }

    /// Returns the writer for this exact schema handle, compiling it on first
    /// use.
    ///
    /// The writer keeps a clone of the schema, which keeps the identity key
    /// valid for the life of the cache.
    pub fn get_or_create(&mut self, schema: &Schema) -> &DatumWriter {
        let metrics = &self.metrics;
        let log_events = self.log_events;
        self.writers.entry(schema.identity()).or_insert_with(|| {
            metrics.increment_writers_constructed();
            if log_events {
                log_event(
                    Event::WriterCreated,
                    &[("schema", &schema.to_canonical_json())],
                );
            }
            DatumWriter::new(schema.clone())
        })
    }

    /// Number of writers compiled so far.
    pub fn len(&self) -> usize {
        self.writers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache() -> WriterCache {
        WriterCache::new(Arc::new(EncoderMetrics::new()), false)
    }

    #[test]
    fn test_same_handle_hits() {
        let mut cache = cache();
        let schema = Schema::int();
        cache.get_or_create(&schema);
        cache.get_or_create(&schema.clone());
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.metrics.writers_constructed(), 1);
    }

    #[test]
    fn test_distinct_handles_miss() {
        let mut cache = cache();
        cache.get_or_create(&Schema::int());
        cache.get_or_create(&Schema::int());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_writer_is_bound_to_schema() {
        let mut cache = cache();
        let schema = Schema::string();
        let writer = cache.get_or_create(&schema);
        assert!(writer.schema().ptr_eq(&schema));
    }
}
