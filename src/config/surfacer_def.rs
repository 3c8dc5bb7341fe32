use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Default size of the buffer a surfacer keeps between metric producers and its sink.
pub const DEFAULT_METRICS_BUFFER_SIZE: usize = 10_000;

/// Kind of sink a surfacer writes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum SurfacerType {
    #[default]
    None,
    Prometheus,
    Stackdriver,
    File,
    Postgres,
    Pubsub,
    Cloudwatch,
    Datadog,
    Probestatus,
    Bigquery,
    Otel,
    UserDefined,
}

impl SurfacerType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SurfacerType::None => "NONE",
            SurfacerType::Prometheus => "PROMETHEUS",
            SurfacerType::Stackdriver => "STACKDRIVER",
            SurfacerType::File => "FILE",
            SurfacerType::Postgres => "POSTGRES",
            SurfacerType::Pubsub => "PUBSUB",
            SurfacerType::Cloudwatch => "CLOUDWATCH",
            SurfacerType::Datadog => "DATADOG",
            SurfacerType::Probestatus => "PROBESTATUS",
            SurfacerType::Bigquery => "BIGQUERY",
            SurfacerType::Otel => "OTEL",
            SurfacerType::UserDefined => "USER_DEFINED",
        }
    }
}

impl fmt::Display for SurfacerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SurfacerType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "NONE" => Ok(SurfacerType::None),
            "PROMETHEUS" => Ok(SurfacerType::Prometheus),
            "STACKDRIVER" => Ok(SurfacerType::Stackdriver),
            "FILE" => Ok(SurfacerType::File),
            "POSTGRES" => Ok(SurfacerType::Postgres),
            "PUBSUB" => Ok(SurfacerType::Pubsub),
            "CLOUDWATCH" => Ok(SurfacerType::Cloudwatch),
            "DATADOG" => Ok(SurfacerType::Datadog),
            "PROBESTATUS" => Ok(SurfacerType::Probestatus),
            "BIGQUERY" => Ok(SurfacerType::Bigquery),
            "OTEL" => Ok(SurfacerType::Otel),
            "USER_DEFINED" => Ok(SurfacerType::UserDefined),
            _ => Err(format!("unknown surfacer type: '{s}'")),
        }
    }
}

impl<'de> Deserialize<'de> for SurfacerType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::String(s) => SurfacerType::from_str(&s).map_err(serde::de::Error::custom),
            other => Err(serde::de::Error::custom(format!(
                "expected a string for surfacer type, got {other:?}"
            ))),
        }
    }
}

/// A `{key, value}` rule as written in configuration. Both fields default to empty.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Default)]
#[serde(default)]
pub struct LabelFilterConfig {
    pub key: String,
    pub value: String,
}

impl LabelFilterConfig {
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        LabelFilterConfig {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Configuration of a single surfacer.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
#[allow(clippy::module_name_repetitions)]
pub struct SurfacerDef {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: SurfacerType,
    pub allow_metrics_with_label: Vec<LabelFilterConfig>,
    pub ignore_metrics_with_label: Vec<LabelFilterConfig>,
    pub allow_metrics_with_name: Option<String>,
    pub ignore_metrics_with_name: Option<String>,
    /// Regex classifying latency metrics. Unset compiles to the empty pattern, which
    /// matches every metric name; [`crate::options::DEFAULT_LATENCY_METRIC_PATTERN`] only
    /// applies when a surfacer has no options at all.
    pub latency_metric_pattern: Option<String>,
    pub metrics_buffer_size: usize,
    pub add_failure_metric: Option<bool>,
}

impl Default for SurfacerDef {
    fn default() -> Self {
        SurfacerDef {
            name: None,
            kind: SurfacerType::default(),
            allow_metrics_with_label: Vec::new(),
            ignore_metrics_with_label: Vec::new(),
            allow_metrics_with_name: None,
            ignore_metrics_with_name: None,
            latency_metric_pattern: None,
            metrics_buffer_size: DEFAULT_METRICS_BUFFER_SIZE,
            add_failure_metric: None,
        }
    }
}

impl SurfacerDef {
    #[must_use]
    pub fn of_type(kind: SurfacerType) -> Self {
        SurfacerDef {
            kind,
            ..Default::default()
        }
    }

    /// Configured name, or the lowercased surfacer type when none is set.
    #[must_use]
    pub fn name(&self) -> String {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => self.kind.as_str().to_lowercase(),
        }
    }

    #[must_use]
    pub fn allow_metrics_with_name(&self) -> &str {
        self.allow_metrics_with_name.as_deref().unwrap_or_default()
    }

    #[must_use]
    pub fn ignore_metrics_with_name(&self) -> &str {
        self.ignore_metrics_with_name.as_deref().unwrap_or_default()
    }

    /// The configured latency pattern, or `""` (match everything) when unset.
    #[must_use]
    pub fn latency_metric_pattern(&self) -> &str {
        self.latency_metric_pattern.as_deref().unwrap_or_default()
    }
}
