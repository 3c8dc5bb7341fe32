use crate::config::LabelFilterConfig;
use crate::metrics::Labeled;
use crate::options::errors::BuildError;

/// Matches items carrying label `key`, or carrying `key` with exactly `value` when a
/// value is set.
///
/// A filter with an empty key never matches anything.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelFilter {
    key: String,
    value: String,
}

impl LabelFilter {
    /// Creates a filter, rejecting a value without a key.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Result<Self, BuildError> {
        let filter = LabelFilter {
            key: key.into(),
            value: value.into(),
        };
        if !filter.value.is_empty() && filter.key.is_empty() {
            return Err(BuildError::InvalidFilterConfig {
                value: filter.value,
            });
        }
        Ok(filter)
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    #[must_use]
    pub fn matches<L: Labeled + ?Sized>(&self, item: &L) -> bool {
        if self.key.is_empty() {
            return false;
        }
        match item.label(&self.key) {
            Some(value) => self.value.is_empty() || self.value == value,
            None => false,
        }
    }
}

impl TryFrom<&LabelFilterConfig> for LabelFilter {
    type Error = BuildError;

    fn try_from(config: &LabelFilterConfig) -> Result<Self, Self::Error> {
        LabelFilter::new(config.key.as_str(), config.value.as_str())
    }
}

/// Compiles label filter rules, keeping their order. The first invalid rule fails the
/// whole set.
pub fn parse_label_filters(configs: &[LabelFilterConfig]) -> Result<Vec<LabelFilter>, BuildError> {
    configs.iter().map(LabelFilter::try_from).collect()
}
