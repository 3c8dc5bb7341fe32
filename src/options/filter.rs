use std::sync::Arc;

use regex::Regex;

use crate::metrics::Labeled;
use crate::options::compiled::Options;
use crate::options::errors::BuildError;
use crate::options::name_filter::{compile_latency_pattern, DEFAULT_LATENCY_METRIC_RE};

/// Decision surface handed to the write path.
///
/// Filtering is opt-in: without options every gate allows, and latency classification
/// falls back to a default pattern.
#[derive(Clone, Debug)]
pub enum MetricsFilter {
    Unconfigured { default_latency_re: Regex },
    Configured(Arc<Options>),
}

impl Default for MetricsFilter {
    fn default() -> Self {
        MetricsFilter::unconfigured()
    }
}

impl MetricsFilter {
    /// No options, with [`crate::options::DEFAULT_LATENCY_METRIC_PATTERN`] for latency.
    #[must_use]
    pub fn unconfigured() -> Self {
        MetricsFilter::Unconfigured {
            default_latency_re: DEFAULT_LATENCY_METRIC_RE.clone(),
        }
    }

    /// No options, with a caller-provided default latency pattern.
    pub fn unconfigured_with_default(latency_pattern: &str) -> Result<Self, BuildError> {
        Ok(MetricsFilter::Unconfigured {
            default_latency_re: compile_latency_pattern(latency_pattern)?,
        })
    }

    #[must_use]
    pub fn options(&self) -> Option<&Options> {
        match self {
            MetricsFilter::Unconfigured { .. } => None,
            MetricsFilter::Configured(opts) => Some(opts),
        }
    }

    #[must_use]
    pub fn allow_event_metrics<L: Labeled + ?Sized>(&self, em: &L) -> bool {
        self.options().is_none_or(|opts| opts.allow_event_metrics(em))
    }

    #[must_use]
    pub fn allow_metric(&self, metric_name: &str) -> bool {
        self.options()
            .is_none_or(|opts| opts.allow_metric(metric_name))
    }

    #[must_use]
    pub fn is_latency_metric(&self, metric_name: &str) -> bool {
        match self {
            MetricsFilter::Unconfigured { default_latency_re } => {
                default_latency_re.is_match(metric_name)
            }
            MetricsFilter::Configured(opts) => opts.is_latency_metric(metric_name),
        }
    }

    /// Derived metrics need configuration; an unconfigured filter never adds them.
    #[must_use]
    pub fn add_failure_metric(&self) -> bool {
        self.options().is_some_and(|opts| opts.add_failure_metric)
    }
}

impl From<Options> for MetricsFilter {
    fn from(opts: Options) -> Self {
        MetricsFilter::Configured(Arc::new(opts))
    }
}

impl From<Arc<Options>> for MetricsFilter {
    fn from(opts: Arc<Options>) -> Self {
        MetricsFilter::Configured(opts)
    }
}

impl From<Option<Options>> for MetricsFilter {
    fn from(opts: Option<Options>) -> Self {
        opts.map_or_else(MetricsFilter::unconfigured, MetricsFilter::from)
    }
}
