//! Column cell encoder
//!
//! Per call, under the encoder's lock:
//! 1. Reset the scratch buffer
//! 2. Resolve the validation policy
//! 3. Resolve the writer schema of the value under that policy
//! 4. Check writer == reader on final columns
//! 5. Write the schema identifier
//! 6. Serialize the value with the cached datum writer
//! 7. Copy the buffer out
//!
//! A failed call never returns bytes, and the next call starts from an empty
//! buffer.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use crate::observability::{log_event, EncoderMetrics, Event};
use crate::schema::Schema;
use crate::schema_table::SchemaTable;
use crate::value::Value;

use super::column::CellSpec;
use super::errors::{EncodeError, EncodeResult};
use super::schema_encoder::SchemaEncoder;
use super::validation::{check_final, resolve_policy, validated_writer_schema, ValidationOverride};
use super::writer_cache::WriterCache;

/// Encodes values into cell bytes.
pub trait CellEncoder: Send + Sync {
    fn encode(&self, value: &Value) -> EncodeResult<Vec<u8>>;

    /// Encodes the value of a decoded cell. The cell's writer schema is not
    /// consulted; the writer schema is resolved from the value.
    fn encode_cell(&self, cell: &DecodedCell) -> EncodeResult<Vec<u8>> {
        self.encode(cell.data())
    }
}

/// A cell value together with the schema it was written with.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedCell {
    writer_schema: Schema,
    data: Value,
}

impl DecodedCell {
    pub fn new(writer_schema: Schema, data: Value) -> Self {
        Self {
            writer_schema,
            data,
        }
    }

    pub fn writer_schema(&self) -> &Schema {
        &self.writer_schema
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn into_data(self) -> Value {
        self.data
    }
}

/// Settings shared by the encoders of many columns.
#[derive(Debug, Clone)]
pub struct EncoderOptions {
    pub validation: ValidationOverride,
    pub metrics: Arc<EncoderMetrics>,
    pub log_events: bool,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self {
            validation: ValidationOverride::default(),
            metrics: Arc::new(EncoderMetrics::new()),
            log_events: true,
        }
    }
}

#[derive(Debug)]
struct EncoderState {
    buffer: Vec<u8>,
    writers: WriterCache,
}

/// Encoder bound to one column's [`CellSpec`].
pub struct ColumnEncoder {
    spec: CellSpec,
    schema_encoder: SchemaEncoder,
    /// `None` when the column has no registered writers
    registered_writers: Option<HashSet<Schema>>,
    table: Arc<dyn SchemaTable>,
    options: EncoderOptions,
    state: Mutex<EncoderState>,
}

impl ColumnEncoder {
    /// Builds an encoder with default options.
    pub fn new(spec: CellSpec, table: Arc<dyn SchemaTable>) -> EncodeResult<Self> {
        Self::with_options(spec, table, EncoderOptions::default())
    }

    /// Builds an encoder, resolving the column's registered writer IDs
    /// through `table`.
    ///
    /// An unknown writer ID fails construction.
    pub fn with_options(
        spec: CellSpec,
        table: Arc<dyn SchemaTable>,
        options: EncoderOptions,
    ) -> EncodeResult<Self> {
        let registered_writers = match spec.writer_uids() {
            Some(uids) => Some(
                uids.iter()
                    .map(|&uid| table.get_schema_by_id(uid))
                    .collect::<Result<HashSet<_>, _>>()
                    .map_err(|e| {
                        options.metrics.increment_registry_failures();
                        EncodeError::from(e)
                    })?,
            ),
            None => None,
        };

        if options.log_events {
            let writers = registered_writers
                .as_ref()
                .map_or_else(|| "none".to_string(), |w| w.len().to_string());
            log_event(
                Event::EncoderCreated,
                &[
                    ("policy", spec.validation_policy().as_str()),
                    ("reader", &spec.reader_schema().to_canonical_json()),
                    ("storage", spec.storage().as_str()),
                    ("writers", &writers),
                ],
            );
        }

        let writers = WriterCache::new(Arc::clone(&options.metrics), options.log_events);
        Ok(Self {
            schema_encoder: SchemaEncoder::for_storage(spec.storage()),
            spec,
            registered_writers,
            table,
            options,
            state: Mutex::new(EncoderState {
                buffer: Vec::new(),
                writers,
            }),
        })
    }

    pub fn spec(&self) -> &CellSpec {
        &self.spec
    }

    pub fn schema_encoder(&self) -> SchemaEncoder {
        self.schema_encoder
    }

    pub fn metrics(&self) -> &Arc<EncoderMetrics> {
        &self.options.metrics
    }

    /// Number of datum writers compiled by this encoder.
    pub fn cached_writers(&self) -> usize {
        self.lock_state().writers.len()
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, EncoderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn encode_into(
        &self,
        value: &Value,
        buffer: &mut Vec<u8>,
        writers: &mut WriterCache,
    ) -> EncodeResult<()> {
        let policy = resolve_policy(self.options.validation.get(), self.spec.validation_policy());
        let writer = validated_writer_schema(
            policy,
            value,
            &self.spec,
            self.registered_writers.as_ref(),
        )?;
        check_final(&self.spec, &writer)?;

        self.schema_encoder
            .encode(self.table.as_ref(), &writer, buffer)?;
        writers.get_or_create(&writer).write(value, buffer)?;
        Ok(())
    }

    fn record_failure(&self, err: &EncodeError) {
        let metrics = &self.options.metrics;
        match err {
            EncodeError::Resolution { .. } => metrics.increment_resolution_failures(),
            EncodeError::Validation { .. } => metrics.increment_validation_failures(),
            EncodeError::SchemaMismatch { .. } => metrics.increment_schema_mismatches(),
            EncodeError::UnsupportedPolicy { .. } => metrics.increment_unsupported_policy_failures(),
            EncodeError::Serialization(_) => metrics.increment_serialization_failures(),
            EncodeError::Registry(_) => metrics.increment_registry_failures(),
        }
        if self.options.log_events {
            log_event(
                Event::EncodeRejected,
                &[
                    ("code", err.code()),
                    ("error", &err.to_string()),
                    ("storage", self.spec.storage().as_str()),
                ],
            );
        }
    }
}

impl CellEncoder for ColumnEncoder {
    fn encode(&self, value: &Value) -> EncodeResult<Vec<u8>> {
        let mut state = self.lock_state();
        let EncoderState { buffer, writers } = &mut *state;
        buffer.clear();

        match self.encode_into(value, buffer, writers) {
            Ok(()) => {
                self.options.metrics.record_encoded(buffer.len());
                Ok(buffer.clone())
            }
            Err(err) => {
                buffer.clear();
                self.record_failure(&err);
                Err(err)
            }
        }
    }
}

impl std::fmt::Debug for ColumnEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColumnEncoder")
            .field("spec", &self.spec)
            .field("schema_encoder", &self.schema_encoder)
            .field("registered_writers", &self.registered_writers)
            .finish_non_exhaustive()
    }
}
