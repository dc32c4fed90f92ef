//! Observability for the cell encoding layer
//!
//! - Structured JSON logging of typed events
//! - Atomic encoder counters
//!
//! Observability is read-only: nothing here influences encoding results, and
//! logging failures are swallowed.

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{EncoderMetrics, MetricsSnapshot};

/// Logs an event at its default severity.
pub fn log_event(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::logger::capture_log;

    #[test]
    fn test_event_names_and_severity() {
        assert_eq!(Event::SchemaRegistered.as_str(), "SCHEMA_REGISTERED");
        assert_eq!(Event::EncodeRejected.severity(), Severity::Warn);
        assert_eq!(Event::WriterCreated.severity(), Severity::Trace);
    }

    #[test]
    fn test_event_line() {
        let event = Event::EncoderCreated;
        let line = capture_log(event.severity(), event.as_str(), &[("storage", "HASH")]);
        let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["event"], "CELL_ENCODER_CREATED");
        assert_eq!(parsed["storage"], "HASH");
    }

    #[test]
    fn test_log_event_does_not_panic() {
        log_event(Event::ConfigLoaded, &[]);
        log_event(Event::EncodeRejected, &[("code", "X")]);
    }
}
