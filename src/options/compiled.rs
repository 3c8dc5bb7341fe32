use std::sync::Arc;

use regex::Regex;

use crate::config::SurfacerDef;
use crate::metrics::Labeled;
use crate::options::label_filter::LabelFilter;
use crate::options::name_filter::MetricNameFilter;
use crate::surfacer::ServeMux;

/// Surfacer options common to all surfacers, compiled from a [`SurfacerDef`].
///
/// Built once by [`crate::options::OptionsBuilder`] and read-only afterwards, so it can be
/// shared across writers without locking.
#[derive(Debug)]
pub struct Options {
    pub metrics_buffer_size: usize,
    pub config: SurfacerDef,
    pub serve_mux: Option<Arc<ServeMux>>,
    pub add_failure_metric: bool,

    pub(crate) allow_label_filters: Vec<LabelFilter>,
    pub(crate) ignore_label_filters: Vec<LabelFilter>,
    pub(crate) metric_name_filter: MetricNameFilter,
    pub(crate) latency_metric_re: Regex,
}

impl Options {
    /// Whether an event should reach the surfacer at all.
    ///
    /// Any matching ignore filter rejects the event. Otherwise the event is allowed when no
    /// allow filters are configured, or when at least one of them matches.
    #[must_use]
    pub fn allow_event_metrics<L: Labeled + ?Sized>(&self, em: &L) -> bool {
        if self.ignore_label_filters.iter().any(|f| f.matches(em)) {
            return false;
        }

        if self.allow_label_filters.is_empty() {
            return true;
        }

        self.allow_label_filters.iter().any(|f| f.matches(em))
    }

    /// Whether a single metric, by name, should be written.
    #[must_use]
    pub fn allow_metric(&self, metric_name: &str) -> bool {
        self.metric_name_filter.allows(metric_name)
    }

    #[must_use]
    pub fn is_latency_metric(&self, metric_name: &str) -> bool {
        self.latency_metric_re.is_match(metric_name)
    }

    #[must_use]
    pub fn latency_metric_pattern(&self) -> &str {
        self.latency_metric_re.as_str()
    }
}
