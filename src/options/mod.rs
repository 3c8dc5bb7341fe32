//! Surfacer options: compiles label and name filters from a surfacer's configuration and
//! answers, per event and per metric, whether it should be written.
//!
//! Ignore rules always take precedence over allow rules. When a surfacer has no options,
//! [`MetricsFilter::Unconfigured`] allows everything.

mod builder;
mod compiled;
pub mod errors;
mod filter;
mod label_filter;
mod name_filter;

pub use builder::{derive_add_failure_metric, OptionsBuilder};
pub use compiled::Options;
pub use errors::BuildError;
pub use filter::MetricsFilter;
pub use label_filter::{parse_label_filters, LabelFilter};
pub use name_filter::{compile_latency_pattern, MetricNameFilter, DEFAULT_LATENCY_METRIC_PATTERN};
