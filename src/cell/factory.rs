//! Encoder factory
//!
//! Builds the encoders of many columns around one schema table, one
//! validation override and one metrics set.

use std::sync::Arc;

use crate::config::{ConfigResult, EncoderConfig};
use crate::observability::EncoderMetrics;
use crate::schema_table::SchemaTable;

use super::column::CellSpec;
use super::encoder::{ColumnEncoder, EncoderOptions};
use super::errors::EncodeResult;
use super::validation::ValidationOverride;

#[derive(Clone)]
pub struct CellEncoderFactory {
    table: Arc<dyn SchemaTable>,
    options: EncoderOptions,
}

impl CellEncoderFactory {
    pub fn new(table: Arc<dyn SchemaTable>) -> Self {
        Self::with_options(table, EncoderOptions::default())
    }

    pub fn with_options(table: Arc<dyn SchemaTable>, options: EncoderOptions) -> Self {
        Self { table, options }
    }

    /// Builds a factory from configuration, opening the configured schema
    /// table and applying the log level.
    pub fn from_config(config: &EncoderConfig) -> ConfigResult<Self> {
        config.apply_log_level()?;
        let options = EncoderOptions {
            validation: ValidationOverride::new(config.validation()?)
                .with_log_events(config.log_events),
            metrics: Arc::new(EncoderMetrics::new()),
            log_events: config.log_events,
        };
        Ok(Self::with_options(config.open_schema_table()?, options))
    }

    /// Builds an encoder for one column.
    pub fn create(&self, spec: CellSpec) -> EncodeResult<ColumnEncoder> {
        ColumnEncoder::with_options(spec, Arc::clone(&self.table), self.options.clone())
    }

    pub fn table(&self) -> &Arc<dyn SchemaTable> {
        &self.table
    }

    /// Live override shared by every encoder of this factory.
    pub fn validation(&self) -> &ValidationOverride {
        &self.options.validation
    }

    pub fn metrics(&self) -> &Arc<EncoderMetrics> {
        &self.options.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{CellEncoder, SchemaStorage, SchemaValidation};
    use crate::schema::Schema;
    use crate::value::Value;

    fn factory(json: &str) -> CellEncoderFactory {
        CellEncoderFactory::from_config(&EncoderConfig::from_json(json).unwrap()).unwrap()
    }

    #[test]
    fn test_from_config_sets_override() {
        let factory = factory(r#"{"schema_validation": "DISABLED", "log_events": false}"#);
        assert_eq!(factory.validation().get(), SchemaValidation::Disabled);
        assert!(!factory.validation().logs_events());
    }

    #[test]
    fn test_from_config_logs_by_default() {
        let factory = factory("{}");
        assert!(factory.validation().logs_events());
    }

    #[test]
    fn test_encoders_share_table_and_metrics() {
        let factory = factory(r#"{"log_events": false}"#);
        let a = factory
            .create(CellSpec::new(Schema::int(), SchemaStorage::Uid))
            .unwrap();
        let b = factory
            .create(CellSpec::new(Schema::string(), SchemaStorage::Uid))
            .unwrap();

        assert_eq!(a.encode(&Value::Int(1)).unwrap(), vec![0x00, 0x02]);
        assert_eq!(b.encode(&Value::from("x")).unwrap(), vec![0x01, 0x02, b'x']);
        assert_eq!(factory.metrics().snapshot().cells_encoded, 2);
    }

    #[test]
    fn test_override_reaches_existing_encoders() {
        let factory = factory(r#"{"log_events": false}"#);
        let encoder = factory
            .create(
                CellSpec::new(Schema::int(), SchemaStorage::Uid)
                    .with_validation_policy(crate::cell::AvroValidationPolicy::Developer),
            )
            .unwrap();

        assert!(encoder.encode(&Value::Int(1)).is_err());
        factory.validation().set(SchemaValidation::Disabled);
        assert!(encoder.encode(&Value::Int(1)).is_ok());
    }
}
