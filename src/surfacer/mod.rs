//! Write path shared by every surfacer: decides, per event and per metric, what reaches
//! the sink.

mod serve_mux;

pub use serve_mux::{ServeMux, ServeMuxError};

use tracing::debug;

use crate::metrics::{EventMetrics, MetricValue};
use crate::options::MetricsFilter;

pub const TOTAL_METRIC: &str = "total";
pub const SUCCESS_METRIC: &str = "success";
pub const FAILURE_METRIC: &str = "failure";

/// A named sink together with the filters it applies at write time.
#[derive(Clone, Debug)]
pub struct Surfacer {
    name: String,
    filter: MetricsFilter,
}

impl Surfacer {
    #[must_use]
    pub fn new(name: impl Into<String>, filter: impl Into<MetricsFilter>) -> Self {
        Surfacer {
            name: name.into(),
            filter: filter.into(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn filter(&self) -> &MetricsFilter {
        &self.filter
    }

    #[must_use]
    pub fn is_latency_metric(&self, metric_name: &str) -> bool {
        self.filter.is_latency_metric(metric_name)
    }

    /// Returns the event as this surfacer should write it, or `None` if nothing of it
    /// should be written.
    ///
    /// The event gate runs first. The failure metric is derived before name filtering so
    /// that `total` and `success` are still available even if they are filtered out.
    #[must_use]
    pub fn process(&self, em: &EventMetrics) -> Option<EventMetrics> {
        if !self.filter.allow_event_metrics(em) {
            debug!("SURFACER | {} | Dropping event due to label filters", self.name);
            return None;
        }

        let mut em = em.clone();
        if self.filter.add_failure_metric() {
            add_failure_metric(&mut em);
        }

        em.retain_metrics(|name| {
            let allowed = self.filter.allow_metric(name);
            if !allowed {
                debug!("SURFACER | {} | Dropping metric {name}", self.name);
            }
            allowed
        });

        if em.has_metrics() {
            Some(em)
        } else {
            debug!("SURFACER | {} | Dropping event with no allowed metrics", self.name);
            None
        }
    }
}

/// Adds `failure = total - success` when both are present, of the same kind, and no
/// failure metric exists yet. Returns whether the metric was added.
pub fn add_failure_metric(em: &mut EventMetrics) -> bool {
    if em.metric(FAILURE_METRIC).is_some() {
        return false;
    }

    let (Some(total), Some(success)) = (em.metric(TOTAL_METRIC), em.metric(SUCCESS_METRIC)) else {
        return false;
    };

    match (total, success, total.checked_sub(success)) {
        (_, _, Some(failure)) => {
            em.set_metric(FAILURE_METRIC, failure);
            true
        }
        (MetricValue::Int(total), MetricValue::Int(success), None) => {
            debug!(
                "SURFACER | Not adding failure metric, overflow computing total ({total}) - success ({success})"
            );
            false
        }
        _ => {
            debug!(
                "SURFACER | Not adding failure metric, incompatible total ({total:?}) and success ({success:?})"
            );
            false
        }
    }
}
