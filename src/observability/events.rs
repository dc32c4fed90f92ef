//! Observable events of the cell encoding layer
//!
//! Events are explicit and typed.

use std::fmt;

use super::logger::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Encoder configuration loaded
    ConfigLoaded,
    /// Schema table opened and its entries loaded
    SchemaTableLoaded,
    /// New schema entry created in the schema table
    SchemaRegistered,
    /// Column encoder built for a cell spec
    EncoderCreated,
    /// Datum writer compiled for a new writer schema
    WriterCreated,
    /// An encode call failed
    EncodeRejected,
    /// Process-wide validation override changed
    ValidationOverrideChanged,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::SchemaTableLoaded => "SCHEMA_TABLE_LOADED",
            Event::SchemaRegistered => "SCHEMA_REGISTERED",
            Event::EncoderCreated => "CELL_ENCODER_CREATED",
            Event::WriterCreated => "DATUM_WRITER_CREATED",
            Event::EncodeRejected => "CELL_ENCODE_REJECTED",
            Event::ValidationOverrideChanged => "SCHEMA_VALIDATION_OVERRIDE_CHANGED",
        }
    }

    /// Default severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::EncodeRejected => Severity::Warn,
            Event::WriterCreated => Severity::Trace,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
