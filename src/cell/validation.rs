//! Writer schema validation
//!
//! The effective policy is resolved on every encode call:
//! 1. The process-wide [`ValidationOverride`] is read
//! 2. `Enabled` defers to the column's configured policy
//! 3. The policy picks how the writer schema is resolved and checks it
//! 4. Final columns additionally require writer == reader
//!
//! Nothing is cached between calls, so flipping the override takes effect on
//! the next encode.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use crate::observability::{log_event, Event};
use crate::schema::Schema;
use crate::value::Value;

use super::column::{AvroValidationPolicy, CellSpec};
use super::errors::{EncodeError, EncodeResult};
use super::resolver::{legacy_writer_schema, writer_schema};

/// Process-wide validation setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SchemaValidation {
    /// Skip validation for every column
    Disabled,
    /// Force legacy primitive handling for every column
    LegacyPrimitiveOnly,
    /// Use each column's configured policy
    #[default]
    Enabled,
}

impl SchemaValidation {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaValidation::Disabled => "DISABLED",
            SchemaValidation::LegacyPrimitiveOnly => "LEGACY_PRIMITIVE_ONLY",
            SchemaValidation::Enabled => "ENABLED",
        }
    }

    fn to_u8(self) -> u8 {
        match self {
            SchemaValidation::Disabled => 0,
            SchemaValidation::LegacyPrimitiveOnly => 1,
            SchemaValidation::Enabled => 2,
        }
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => SchemaValidation::Disabled,
            1 => SchemaValidation::LegacyPrimitiveOnly,
            _ => SchemaValidation::Enabled,
        }
    }
}

impl fmt::Display for SchemaValidation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SchemaValidation {
    type Err = EncodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DISABLED" => Ok(SchemaValidation::Disabled),
            "LEGACY_PRIMITIVE_ONLY" | "SCHEMA_1_0" => Ok(SchemaValidation::LegacyPrimitiveOnly),
            "ENABLED" => Ok(SchemaValidation::Enabled),
            other => Err(EncodeError::unsupported_policy(other)),
        }
    }
}

/// Live, shared handle to the process-wide validation setting.
///
/// Clones observe and change the same value.
#[derive(Debug, Clone)]
pub struct ValidationOverride {
    value: Arc<AtomicU8>,
    log_events: bool,
}

impl ValidationOverride {
    pub fn new(initial: SchemaValidation) -> Self {
        Self {
            value: Arc::new(AtomicU8::new(initial.to_u8())),
            log_events: true,
        }
    }

    /// Enables or disables the change event logged by [`set`](Self::set).
    pub fn with_log_events(mut self, log_events: bool) -> Self {
        self.log_events = log_events;
        self
    }

    pub fn logs_events(&self) -> bool {
        self.log_events
    }

    pub fn get(&self) -> SchemaValidation {
        SchemaValidation::from_u8(self.value.load(Ordering::Acquire))
    }

    /// Stores `validation`, returning the previous setting.
    pub fn set(&self, validation: SchemaValidation) -> SchemaValidation {
        let previous =
            SchemaValidation::from_u8(self.value.swap(validation.to_u8(), Ordering::AcqRel));
        if self.log_events && previous != validation {
            log_event(
                Event::ValidationOverrideChanged,
                &[("from", previous.as_str()), ("to", validation.as_str())],
            );
        }
        previous
    }
}

impl Default for ValidationOverride {
    fn default() -> Self {
        Self::new(SchemaValidation::default())
    }
}

/// Effective policy for one encode call.
pub fn resolve_policy(
    validation: SchemaValidation,
    column_policy: AvroValidationPolicy,
) -> AvroValidationPolicy {
    match validation {
        SchemaValidation::Disabled => AvroValidationPolicy::None,
        SchemaValidation::LegacyPrimitiveOnly => AvroValidationPolicy::LegacyPrimitiveOnly,
        SchemaValidation::Enabled => column_policy,
    }
}

/// Resolves the schema to write `value` with under `policy`.
///
/// Legacy handling never consults the primitive mapping, so values without
/// one are written with the reader schema. Every other policy requires the
/// mapping. `registered` is the column's registered writer set; `None` puts
/// no constraint on strict validation.
pub(crate) fn validated_writer_schema(
    policy: AvroValidationPolicy,
    value: &Value,
    spec: &CellSpec,
    registered: Option<&HashSet<Schema>>,
) -> EncodeResult<Schema> {
    match policy {
        AvroValidationPolicy::None => writer_schema(value),
        AvroValidationPolicy::Strict => {
            let writer = writer_schema(value)?;
            if registered.map_or(true, |set| set.contains(&writer)) {
                Ok(writer)
            } else {
                Err(EncodeError::Validation {
                    schema: writer.to_json_pretty(),
                })
            }
        }
        AvroValidationPolicy::LegacyPrimitiveOnly => {
            Ok(legacy_writer_schema(value, spec.reader_schema()))
        }
        AvroValidationPolicy::Developer => Err(EncodeError::unsupported_policy(policy.as_str())),
    }
}

/// Final columns carry no schema identifier, so the writer schema must be
/// the reader schema.
pub(crate) fn check_final(spec: &CellSpec, writer: &Schema) -> EncodeResult<()> {
    if spec.is_final() && writer != spec.reader_schema() {
        return Err(EncodeError::SchemaMismatch {
            writer: writer.to_canonical_json(),
            reader: spec.reader_schema().to_canonical_json(),
        });
    }
    Ok(())
}
