//! Error types for `options` module

/// Failures while compiling a [`crate::config::SurfacerDef`] into
/// [`crate::options::Options`]. Any of these is fatal for the surfacer.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// A label filter carries a value but no key to match it against.
    #[error("key is required to match against val ({value})")]
    InvalidFilterConfig { value: String },
    /// An allow or ignore metric name pattern does not compile.
    #[error("invalid metric name pattern: {pattern}, err: {source}")]
    InvalidMetricNamePattern {
        pattern: String,
        source: regex::Error,
    },
    /// The latency metric pattern does not compile.
    #[error("invalid latency_metric_pattern: {pattern}, err: {source}")]
    InvalidLatencyMetricPattern {
        pattern: String,
        source: regex::Error,
    },
    /// Options were built before the shared serve mux was handed over.
    #[error("serve mux is not configured, options built before HTTP initialization")]
    ServeMuxNotConfigured,
}
