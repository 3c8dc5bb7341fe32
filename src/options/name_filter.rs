use lazy_static::lazy_static;
use regex::Regex;

use crate::options::errors::BuildError;

/// Latency classification used when a surfacer has no options at all.
pub const DEFAULT_LATENCY_METRIC_PATTERN: &str = "^(.*_|)latency$";

lazy_static! {
    pub(crate) static ref DEFAULT_LATENCY_METRIC_RE: Regex =
        Regex::new(DEFAULT_LATENCY_METRIC_PATTERN).expect("failed creating regex");
}

/// Allow/ignore gate on metric names. Each side is optional; an unset side places no
/// constraint.
#[derive(Clone, Debug, Default)]
pub struct MetricNameFilter {
    allow: Option<Regex>,
    ignore: Option<Regex>,
}

impl MetricNameFilter {
    /// Compiles the non-empty patterns. Empty patterns leave that side unset.
    pub fn new(allow: &str, ignore: &str) -> Result<Self, BuildError> {
        Ok(MetricNameFilter {
            allow: compile_name_pattern(allow)?,
            ignore: compile_name_pattern(ignore)?,
        })
    }

    /// The ignore pattern is consulted first, so a name matching both patterns is
    /// rejected.
    #[must_use]
    pub fn allows(&self, name: &str) -> bool {
        if self.ignore.as_ref().is_some_and(|re| re.is_match(name)) {
            return false;
        }
        self.allow.as_ref().is_none_or(|re| re.is_match(name))
    }
}

fn compile_name_pattern(pattern: &str) -> Result<Option<Regex>, BuildError> {
    if pattern.is_empty() {
        return Ok(None);
    }
    Regex::new(pattern)
        .map(Some)
        .map_err(|source| BuildError::InvalidMetricNamePattern {
            pattern: pattern.to_string(),
            source,
        })
}

/// Compiles the latency pattern. An empty pattern is valid and matches every name.
pub fn compile_latency_pattern(pattern: &str) -> Result<Regex, BuildError> {
    Regex::new(pattern).map_err(|source| BuildError::InvalidLatencyMetricPattern {
        pattern: pattern.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconstrained_allows_everything() {
        let filter = MetricNameFilter::new("", "").expect("valid patterns");
        assert!(filter.allows("anything"));
        assert!(filter.allows(""));
    }

    #[test]
    fn test_ignore_only() {
        let filter = MetricNameFilter::new("", "^debug_").expect("valid patterns");
        assert!(!filter.allows("debug_x"));
        assert!(filter.allows("latency"));
    }

    #[test]
    fn test_allow_only() {
        let filter = MetricNameFilter::new("^app_", "").expect("valid patterns");
        assert!(filter.allows("app_requests"));
        assert!(!filter.allows("sys_requests"));
    }

    #[test]
    fn test_ignore_beats_allow() {
        let filter = MetricNameFilter::new("^app_", "^app_internal_").expect("valid patterns");
        assert!(!filter.allows("app_internal_x"));
        assert!(filter.allows("app_x"));
        assert!(!filter.allows("other"));
    }

    #[test]
    fn test_unanchored_patterns_search() {
        let filter = MetricNameFilter::new("", "debug").expect("valid patterns");
        assert!(!filter.allows("app_debug_count"));
    }

    #[test]
    fn test_invalid_name_pattern() {
        let err = MetricNameFilter::new("(", "").expect_err("should reject pattern");
        assert!(
            matches!(err, BuildError::InvalidMetricNamePattern { ref pattern, .. } if pattern == "(")
        );

        let err = MetricNameFilter::new("", "[z-a]").expect_err("should reject pattern");
        assert!(matches!(err, BuildError::InvalidMetricNamePattern { .. }));
    }

    #[test]
    fn test_default_latency_pattern() {
        assert!(DEFAULT_LATENCY_METRIC_RE.is_match("latency"));
        assert!(DEFAULT_LATENCY_METRIC_RE.is_match("request_latency"));
        assert!(!DEFAULT_LATENCY_METRIC_RE.is_match("latency_count"));
        assert!(!DEFAULT_LATENCY_METRIC_RE.is_match("requestlatency"));
    }

    #[test]
    fn test_empty_latency_pattern_compiles() {
        let re = compile_latency_pattern("").expect("empty pattern is valid");
        assert!(re.is_match("anything"));
    }

    #[test]
    fn test_invalid_latency_pattern_carries_pattern() {
        let err = compile_latency_pattern("(latency").expect_err("should reject pattern");
        assert!(err.to_string().starts_with("invalid latency_metric_pattern: (latency, err:"));
    }
}
