//! Metrics collection for observability
//!
//! This module provides Prometheus metrics for monitoring the ledger.
//!
//! # Metrics
//!
//! - `token_ledger_operations_total{operation, outcome}` - Operations by result
//!   (`ok` or the error kind)
//! - `token_ledger_operation_duration_seconds{operation}` - Apply latency
//! - `token_ledger_events_total` - Events delivered to sinks

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

/// Metrics collector
#[derive(Clone, Debug)]
pub struct Metrics {
    /// Operations by name and outcome
    pub operations_total: IntCounterVec,

    /// Apply duration histogram
    pub operation_duration: HistogramVec,

    /// Events emitted
    pub events_total: IntCounter,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector with its own registry
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let operations_total = IntCounterVec::new(
            Opts::new(
                "token_ledger_operations_total",
                "Ledger operations by name and outcome",
            ),
            &["operation", "outcome"],
        )?;
        registry.register(Box::new(operations_total.clone()))?;

        let operation_duration = HistogramVec::new(
            HistogramOpts::new(
                "token_ledger_operation_duration_seconds",
                "Time spent applying an operation",
            )
            .buckets(vec![0.000_01, 0.000_05, 0.000_1, 0.000_5, 0.001, 0.005, 0.01]),
            &["operation"],
        )?;
        registry.register(Box::new(operation_duration.clone()))?;

        let events_total = IntCounter::new("token_ledger_events_total", "Ledger events emitted")?;
        registry.register(Box::new(events_total.clone()))?;

        Ok(Self {
            operations_total,
            operation_duration,
            events_total,
            registry,
        })
    }

    /// Record a finished operation; `outcome` is `ok` or an error kind
    pub fn record_operation(&self, operation: &str, outcome: &str, duration_seconds: f64) {
        self.operations_total
            .with_label_values(&[operation, outcome])
            .inc();
        self.operation_duration
            .with_label_values(&[operation])
            .observe(duration_seconds);
    }

    /// Record emitted events
    pub fn record_events(&self, count: usize) {
        self.events_total.inc_by(count as u64);
    }

    /// Count for one operation/outcome pair
    pub fn operation_count(&self, operation: &str, outcome: &str) -> u64 {
        self.operations_total
            .with_label_values(&[operation, outcome])
            .get()
    }

    /// Render all metrics in the Prometheus text format
    pub fn encode(&self) -> String {
        let mut buffer = Vec::new();
        if let Err(e) = TextEncoder::new().encode(&self.registry.gather(), &mut buffer) {
            tracing::error!("Failed to encode metrics: {}", e);
        }
        String::from_utf8_lossy(&buffer).into_owned()
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}
