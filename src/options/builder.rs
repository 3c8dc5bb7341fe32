use std::sync::Arc;

use tracing::debug;

use crate::config::{SurfacerDef, SurfacerType};
use crate::options::compiled::Options;
use crate::options::errors::BuildError;
use crate::options::label_filter::parse_label_filters;
use crate::options::name_filter::{compile_latency_pattern, MetricNameFilter};
use crate::surfacer::ServeMux;

/// Surfacer types that don't get a failure metric unless asked for explicitly.
const FAILURE_METRIC_DISABLED_BY_DEFAULT: [SurfacerType; 2] =
    [SurfacerType::File, SurfacerType::Pubsub];

/// Compiles a [`SurfacerDef`] into [`Options`].
#[derive(Debug)]
pub struct OptionsBuilder {
    config: SurfacerDef,
    serve_mux: Option<Arc<ServeMux>>,
}

impl OptionsBuilder {
    #[must_use]
    pub fn new(config: SurfacerDef) -> Self {
        OptionsBuilder {
            config,
            serve_mux: None,
        }
    }

    /// Hands the shared HTTP surface to the options. Surfacers register their handlers on it.
    #[must_use]
    pub fn serve_mux(mut self, serve_mux: Arc<ServeMux>) -> Self {
        self.serve_mux = Some(serve_mux);
        self
    }

    /// Builds the options. Fails if no serve mux was provided or if the configuration is
    /// invalid; nothing partially built is ever returned.
    pub fn build(self) -> Result<Options, BuildError> {
        self.build_options(false)
    }

    /// Builds the options without requiring a serve mux.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is invalid. Meant for tests only.
    #[must_use]
    pub fn build_for_test(self) -> Options {
        self.build_options(true)
            .unwrap_or_else(|e| panic!("Error building surfacer options for tests: {e}"))
    }

    fn build_options(self, ignore_init: bool) -> Result<Options, BuildError> {
        let OptionsBuilder { config, serve_mux } = self;

        if serve_mux.is_none() && !ignore_init {
            return Err(BuildError::ServeMuxNotConfigured);
        }

        let allow_label_filters = parse_label_filters(&config.allow_metrics_with_label)?;
        let ignore_label_filters = parse_label_filters(&config.ignore_metrics_with_label)?;
        let metric_name_filter = MetricNameFilter::new(
            config.allow_metrics_with_name(),
            config.ignore_metrics_with_name(),
        )?;
        let add_failure_metric = derive_add_failure_metric(&config);
        let latency_metric_re = compile_latency_pattern(config.latency_metric_pattern())?;

        debug!(
            "SURFACER | Built options for {}: {} allow and {} ignore label filters, add_failure_metric: {}",
            config.name(),
            allow_label_filters.len(),
            ignore_label_filters.len(),
            add_failure_metric,
        );

        Ok(Options {
            metrics_buffer_size: config.metrics_buffer_size,
            config,
            serve_mux,
            add_failure_metric,
            allow_label_filters,
            ignore_label_filters,
            metric_name_filter,
            latency_metric_re,
        })
    }
}

/// An explicit `add_failure_metric` always wins. Unset, it defaults to on, except for
/// file and pubsub surfacers.
#[must_use]
pub fn derive_add_failure_metric(config: &SurfacerDef) -> bool {
    config
        .add_failure_metric
        .unwrap_or_else(|| !FAILURE_METRIC_DISABLED_BY_DEFAULT.contains(&config.kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LabelFilterConfig;

    #[test]
    fn test_build_requires_serve_mux() {
        let err = OptionsBuilder::new(SurfacerDef::default())
            .build()
            .expect_err("should require serve mux");
        assert!(matches!(err, BuildError::ServeMuxNotConfigured));
    }

    #[test]
    fn test_build_keeps_serve_mux_and_config() {
        let serve_mux = Arc::new(ServeMux::new());
        let config = SurfacerDef {
            name: Some("pg".to_string()),
            metrics_buffer_size: 123,
            ..SurfacerDef::of_type(SurfacerType::Postgres)
        };

        let opts = OptionsBuilder::new(config.clone())
            .serve_mux(Arc::clone(&serve_mux))
            .build()
            .expect("should build options");

        assert_eq!(opts.metrics_buffer_size, 123);
        assert_eq!(opts.config, config);
        assert!(
            opts.serve_mux
                .as_ref()
                .is_some_and(|mux| Arc::ptr_eq(mux, &serve_mux))
        );
    }

    #[test]
    fn test_build_fails_on_invalid_label_filter() {
        for config in [
            SurfacerDef {
                allow_metrics_with_label: vec![LabelFilterConfig::new("", "v")],
                ..Default::default()
            },
            SurfacerDef {
                ignore_metrics_with_label: vec![LabelFilterConfig::new("", "v")],
                ..Default::default()
            },
        ] {
            let err = OptionsBuilder::new(config)
                .serve_mux(Arc::new(ServeMux::new()))
                .build()
                .expect_err("should reject label filter");
            assert!(matches!(err, BuildError::InvalidFilterConfig { ref value } if value == "v"));
        }
    }

    #[test]
    fn test_build_fails_on_invalid_patterns() {
        let err = OptionsBuilder::new(SurfacerDef {
            allow_metrics_with_name: Some("(".to_string()),
            ..Default::default()
        })
        .serve_mux(Arc::new(ServeMux::new()))
        .build()
        .expect_err("should reject allow pattern");
        assert!(matches!(err, BuildError::InvalidMetricNamePattern { .. }));

        let err = OptionsBuilder::new(SurfacerDef {
            ignore_metrics_with_name: Some("[".to_string()),
            ..Default::default()
        })
        .serve_mux(Arc::new(ServeMux::new()))
        .build()
        .expect_err("should reject ignore pattern");
        assert!(matches!(err, BuildError::InvalidMetricNamePattern { .. }));

        let err = OptionsBuilder::new(SurfacerDef {
            latency_metric_pattern: Some("(latency".to_string()),
            ..Default::default()
        })
        .serve_mux(Arc::new(ServeMux::new()))
        .build()
        .expect_err("should reject latency pattern");
        assert!(
            matches!(err, BuildError::InvalidLatencyMetricPattern { ref pattern, .. } if pattern == "(latency")
        );
    }

    #[test]
    #[should_panic(expected = "Error building surfacer options for tests")]
    fn test_build_for_test_panics_on_invalid_config() {
        let _ = OptionsBuilder::new(SurfacerDef {
            allow_metrics_with_name: Some("(".to_string()),
            ..Default::default()
        })
        .build_for_test();
    }

    #[test]
    fn test_add_failure_metric_default_by_type() {
        let tests = [
            (SurfacerType::File, false),
            (SurfacerType::Pubsub, false),
            (SurfacerType::Prometheus, true),
            (SurfacerType::Postgres, true),
            (SurfacerType::Stackdriver, true),
            (SurfacerType::UserDefined, true),
            (SurfacerType::None, true),
        ];

        for (kind, want) in tests {
            let opts = OptionsBuilder::new(SurfacerDef::of_type(kind)).build_for_test();
            assert_eq!(opts.add_failure_metric, want, "surfacer type {kind}");
        }
    }

    #[test]
    fn test_add_failure_metric_explicit_wins() {
        for kind in [SurfacerType::File, SurfacerType::Pubsub, SurfacerType::Prometheus] {
            for explicit in [true, false] {
                let config = SurfacerDef {
                    add_failure_metric: Some(explicit),
                    ..SurfacerDef::of_type(kind)
                };
                assert_eq!(derive_add_failure_metric(&config), explicit, "surfacer type {kind}");
            }
        }
    }
}
