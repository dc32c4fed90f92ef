//! Encoder metrics
//!
//! - Counters only, monotonic
//! - Shared by every encoder built from the same factory
//! - Relaxed atomics; readers see exact values once writers are quiescent

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

#[derive(Debug, Default)]
pub struct EncoderMetrics {
    cells_encoded: AtomicU64,
    bytes_encoded: AtomicU64,
    writers_constructed: AtomicU64,
    resolution_failures: AtomicU64,
    validation_failures: AtomicU64,
    schema_mismatches: AtomicU64,
    unsupported_policy_failures: AtomicU64,
    serialization_failures: AtomicU64,
    registry_failures: AtomicU64,
}

impl EncoderMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one successful encode producing `bytes` bytes.
    pub fn record_encoded(&self, bytes: usize) {
        self.cells_encoded.fetch_add(1, Ordering::Relaxed);
        self.bytes_encoded.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub fn increment_writers_constructed(&self) {
        self.writers_constructed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_resolution_failures(&self) {
        self.resolution_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_validation_failures(&self) {
        self.validation_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_schema_mismatches(&self) {
        self.schema_mismatches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_unsupported_policy_failures(&self) {
        self.unsupported_policy_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_serialization_failures(&self) {
        self.serialization_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_registry_failures(&self) {
        self.registry_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn writers_constructed(&self) -> u64 {
        self.writers_constructed.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            cells_encoded: self.cells_encoded.load(Ordering::Relaxed),
            bytes_encoded: self.bytes_encoded.load(Ordering::Relaxed),
            writers_constructed: self.writers_constructed.load(Ordering::Relaxed),
            resolution_failures: self.resolution_failures.load(Ordering::Relaxed),
            validation_failures: self.validation_failures.load(Ordering::Relaxed),
            schema_mismatches: self.schema_mismatches.load(Ordering::Relaxed),
            unsupported_policy_failures: self.unsupported_policy_failures.load(Ordering::Relaxed),
            serialization_failures: self.serialization_failures.load(Ordering::Relaxed),
            registry_failures: self.registry_failures.load(Ordering::Relaxed),
        }
    }

    /// Snapshot as a JSON object.
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.snapshot()).unwrap_or_else(|_| "{}".to_string())
    }
}

/// A point-in-time copy of all counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub cells_encoded: u64,
    pub bytes_encoded: u64,
    pub writers_constructed: u64,
    pub resolution_failures: u64,
    pub validation_failures: u64,
    pub schema_mismatches: u64,
    pub unsupported_policy_failures: u64,
    pub serialization_failures: u64,
    pub registry_failures: u64,
}

impl MetricsSnapshot {
    /// Sum of all failure counters.
    pub fn total_failures(&self) -> u64 {
        self.resolution_failures
            + self.validation_failures
            + self.schema_mismatches
            + self.unsupported_policy_failures
            + self.serialization_failures
            + self.registry_failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_metrics_are_zero() {
        assert_eq!(EncoderMetrics::new().snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn test_record_encoded() {
        let metrics = EncoderMetrics::new();
        metrics.record_encoded(10);
        metrics.record_encoded(5);
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.cells_encoded, 2);
        assert_eq!(snapshot.bytes_encoded, 15);
    }

    #[test]
    fn test_failure_totals() {
        let metrics = EncoderMetrics::new();
        metrics.increment_validation_failures();
        metrics.increment_schema_mismatches();
        metrics.increment_registry_failures();
        assert_eq!(metrics.snapshot().total_failures(), 3);
    }

    #[test]
    fn test_to_json() {
        let metrics = EncoderMetrics::new();
        metrics.increment_writers_constructed();
        let parsed: serde_json::Value = serde_json::from_str(&metrics.to_json()).unwrap();
        assert_eq!(parsed["writers_constructed"], 1);
        assert_eq!(parsed["cells_encoded"], 0);
    }

    #[test]
    fn test_thread_safety() {
        use std::sync::Arc;
        use std::thread;

        let metrics = Arc::new(EncoderMetrics::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let m = Arc::clone(&metrics);
                thread::spawn(move || {
                    for _ in 0..100 {
                        m.record_encoded(1);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(metrics.snapshot().cells_encoded, 800);
    }
}
