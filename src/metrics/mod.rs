//! Metric events as seen by surfacers.

pub mod errors;
mod event_metrics;

pub use event_metrics::{EventMetrics, Labeled, MetricValue};
