//! Run metrics and logging setup.
//!
//! Provides structured logging and counters for monitoring a simulation.

use crate::history::StepRecord;
use std::collections::HashMap;
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::EnvFilter;

/// Counters collected over a run.
pub struct Metrics {
    step_count: AtomicU64,
    population: AtomicU64,
    pub counters: Mutex<HashMap<String, AtomicU64>>,
    start_time: Instant,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    /// Creates a new metrics collector.
    #[must_use]
    pub fn new() -> Self {
        Self {
            step_count: AtomicU64::new(0),
            population: AtomicU64::new(0),
            counters: Mutex::new(HashMap::new()),
            start_time: Instant::now(),
        }
    }

    /// Records a completed step with its duration.
    pub fn record_step(&self, duration: Duration, record: &StepRecord) {
        self.step_count.fetch_add(1, Ordering::Relaxed);
        self.population
            .store(record.population as u64, Ordering::Relaxed);
        self.add_to_counter("divisions", record.births as u64);

        tracing::info!(
            step = record.step,
            time = record.time,
            population = record.population,
            undifferentiated = record.undifferentiated,
            transitioning = record.transitioning,
            differentiated = record.differentiated,
            births = record.births,
            duration_ms = duration.as_millis() as u64,
            "Simulation step"
        );
    }

    /// Increments a named counter.
    pub fn increment_counter(&self, name: &str) {
        self.add_to_counter(name, 1);
    }

    pub fn add_to_counter(&self, name: &str, amount: u64) {
        let mut counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        counters
            .entry(name.to_string())
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(amount, Ordering::Relaxed);
    }

    #[must_use]
    pub fn counter(&self, name: &str) -> u64 {
        let counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        counters
            .get(name)
            .map_or(0, |c| c.load(Ordering::Relaxed))
    }

    #[must_use]
    pub fn step_count(&self) -> u64 {
        self.step_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn population(&self) -> u64 {
        self.population.load(Ordering::Relaxed)
    }

    /// Gets elapsed time since metrics creation.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize tracing subscriber for logging to stdout.
pub fn init_logging() {
    tracing::subscriber::set_global_default(
        tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .finish(),
    )
    .ok();
}

/// Initialize tracing subscriber writing into `writer`, without ANSI colours.
///
/// Fails if a global subscriber is already installed; `writer` then receives nothing.
pub fn init_logging_to<W>(writer: W) -> Result<(), SetGlobalDefaultError>
where
    W: Write + Send + 'static,
{
    tracing::subscriber::set_global_default(
        tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_ansi(false)
            .with_writer(Mutex::new(writer))
            .finish(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = Metrics::new();
        assert_eq!(metrics.step_count(), 0);
        assert_eq!(metrics.counter("divisions"), 0);
    }

    #[test]
    fn test_record_step() {
        let metrics = Metrics::new();
        let record = StepRecord {
            step: 1,
            population: 12,
            births: 2,
            ..Default::default()
        };
        metrics.record_step(Duration::from_millis(3), &record);
        metrics.record_step(Duration::from_millis(3), &record);
        assert_eq!(metrics.step_count(), 2);
        assert_eq!(metrics.population(), 12);
        assert_eq!(metrics.counter("divisions"), 4);
    }

    #[test]
    fn test_second_file_logger_is_refused() {
        let _ = init_logging_to(std::io::sink());
        assert!(init_logging_to(std::io::sink()).is_err());
    }

    #[test]
    fn test_increment_counter() {
        let metrics = Metrics::new();
        metrics.increment_counter("divisions");
        metrics.increment_counter("divisions");
        assert_eq!(metrics.counter("divisions"), 2);
    }
}
