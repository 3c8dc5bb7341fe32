use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::metrics::errors::ParseError;

/// A single metric value carried by an [`EventMetrics`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Int(i64),
    Float(f64),
}

impl MetricValue {
    /// Subtracts `other` from `self` when both hold the same kind of number.
    #[must_use]
    pub fn checked_sub(self, other: MetricValue) -> Option<MetricValue> {
        match (self, other) {
            (MetricValue::Int(a), MetricValue::Int(b)) => a.checked_sub(b).map(MetricValue::Int),
            (MetricValue::Float(a), MetricValue::Float(b)) => Some(MetricValue::Float(a - b)),
            _ => None,
        }
    }
}

impl From<i64> for MetricValue {
    fn from(v: i64) -> Self {
        MetricValue::Int(v)
    }
}

impl From<i32> for MetricValue {
    fn from(v: i32) -> Self {
        MetricValue::Int(i64::from(v))
    }
}

impl From<f64> for MetricValue {
    fn from(v: f64) -> Self {
        MetricValue::Float(v)
    }
}

/// Anything label filters can be evaluated against.
pub trait Labeled {
    /// Returns the value of the first label named `key`, if any.
    fn label(&self, key: &str) -> Option<&str>;
}

/// One timestamped observation: ordered labels and ordered, named metric values.
///
/// Labels and metrics keep insertion order. Adding a label or metric that already
/// exists replaces its value in place.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(try_from = "RawEventMetrics")]
pub struct EventMetrics {
    pub timestamp: i64,
    labels: Vec<(String, String)>,
    metrics: Vec<(String, MetricValue)>,
}

impl EventMetrics {
    #[must_use]
    pub fn new(timestamp: i64) -> Self {
        EventMetrics {
            timestamp,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn add_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_label(key, value);
        self
    }

    pub fn set_label(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.labels.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.labels.push((key, value)),
        }
    }

    #[must_use]
    pub fn add_metric(mut self, name: impl Into<String>, value: impl Into<MetricValue>) -> Self {
        self.set_metric(name, value);
        self
    }

    pub fn set_metric(&mut self, name: impl Into<String>, value: impl Into<MetricValue>) {
        let name = name.into();
        let value = value.into();
        match self.metrics.iter_mut().find(|(n, _)| *n == name) {
            Some((_, v)) => *v = value,
            None => self.metrics.push((name, value)),
        }
    }

    pub fn label_keys(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(|(k, _)| k.as_str())
    }

    pub fn labels(&self) -> impl Iterator<Item = (&str, &str)> {
        self.labels.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn metrics_keys(&self) -> impl Iterator<Item = &str> {
        self.metrics.iter().map(|(n, _)| n.as_str())
    }

    pub fn metrics(&self) -> impl Iterator<Item = (&str, MetricValue)> {
        self.metrics.iter().map(|(n, v)| (n.as_str(), *v))
    }

    #[must_use]
    pub fn metric(&self, name: &str) -> Option<MetricValue> {
        self.metrics
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    /// Keeps only the metrics for which `keep` returns `true`.
    pub fn retain_metrics<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str) -> bool,
    {
        self.metrics.retain(|(n, _)| keep(n));
    }

    #[must_use]
    pub fn has_metrics(&self) -> bool {
        !self.metrics.is_empty()
    }
}

impl Labeled for EventMetrics {
    fn label(&self, key: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

struct OrderedMap<'a, V>(&'a [(String, V)]);

impl<V: Serialize> Serialize for OrderedMap<'_, V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl Serialize for EventMetrics {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("timestamp", &self.timestamp)?;
        map.serialize_entry("labels", &OrderedMap(&self.labels))?;
        map.serialize_entry("metrics", &OrderedMap(&self.metrics))?;
        map.end()
    }
}

#[derive(Deserialize)]
struct RawEventMetrics {
    #[serde(default)]
    timestamp: i64,
    #[serde(default)]
    labels: Map<String, Value>,
    #[serde(default)]
    metrics: Map<String, Value>,
}

impl TryFrom<RawEventMetrics> for EventMetrics {
    type Error = ParseError;

    fn try_from(raw: RawEventMetrics) -> Result<Self, Self::Error> {
        let mut em = EventMetrics::new(raw.timestamp);
        for (key, value) in raw.labels {
            let value = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => return Err(ParseError::Raw("label values must be scalars")),
            };
            em.set_label(key, value);
        }
        for (name, value) in raw.metrics {
            let value = match value {
                Value::Number(n) => match n.as_i64() {
                    Some(i) => MetricValue::Int(i),
                    None => n
                        .as_f64()
                        .map(MetricValue::Float)
                        .ok_or(ParseError::Raw("metric value out of range"))?,
                },
                _ => return Err(ParseError::Raw("metric values must be numbers")),
            };
            em.set_metric(name, value);
        }
        Ok(em)
    }
}
