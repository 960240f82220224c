//! Metrics collection for observability

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec_with_registry, register_counter_with_registry,
    register_histogram_with_registry, Counter, CounterVec, Encoder, Histogram, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;

/// Global metrics registry
pub static METRICS: Lazy<Arc<Metrics>> =
    Lazy::new(|| Arc::new(Metrics::new().expect("Failed to initialize metrics")));

/// Metrics collector
pub struct Metrics {
    registry: Registry,

    // Turn metrics
    pub turns: CounterVec,
    pub generation_duration: Histogram,

    // Context metrics
    pub context_tokens: Histogram,
    pub generated_tokens: Histogram,
    pub context_truncations: Counter,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let turns = register_counter_vec_with_registry!(
            Opts::new("dialogue_turns_total", "Total turns by outcome"),
            &["outcome"],
            registry
        )?;

        let generation_duration = register_histogram_with_registry!(
            "dialogue_generation_duration_seconds",
            "Generation call duration in seconds",
            registry
        )?;

        let context_tokens = register_histogram_with_registry!(
            "dialogue_context_tokens",
            "Context length in tokens after each completed turn",
            vec![16.0, 64.0, 128.0, 256.0, 512.0, 768.0, 1024.0, 2048.0],
            registry
        )?;

        let generated_tokens = register_histogram_with_registry!(
            "dialogue_generated_tokens",
            "Tokens generated per turn",
            vec![1.0, 8.0, 32.0, 64.0, 128.0, 256.0, 512.0],
            registry
        )?;

        let context_truncations = register_counter_with_registry!(
            Opts::new(
                "dialogue_context_truncations_total",
                "Times the context was cut back to half its budget"
            ),
            registry
        )?;

        Ok(Self {
            registry,
            turns,
            generation_duration,
            context_tokens,
            generated_tokens,
            context_truncations,
        })
    }

    /// Record a turn outcome
    pub fn record_turn(&self, outcome: &str) {
        self.turns.with_label_values(&[outcome]).inc();
    }

    /// Render all metrics in the Prometheus text format
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        if let Err(e) = encoder.encode(&self.registry.gather(), &mut buffer) {
            tracing::warn!("Failed to encode metrics: {}", e);
            return String::new();
        }
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new();
        assert!(metrics.is_ok());
    }

    #[test]
    fn test_render_contains_recorded_turns() {
        let metrics = Metrics::new().unwrap();
        metrics.record_turn("replied");
        metrics.record_turn("replied");
        metrics.record_turn("failed");
        metrics.context_truncations.inc();

        let text = metrics.render();
        assert!(text.contains("dialogue_turns_total{outcome=\"replied\"} 2"));
        assert!(text.contains("dialogue_turns_total{outcome=\"failed\"} 1"));
        assert!(text.contains("dialogue_context_truncations_total 1"));
    }
}
