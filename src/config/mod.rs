pub mod log_level;
pub mod surfacer_def;

use std::path::Path;

use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use serde::Deserialize;
use tracing::error;

pub use log_level::LogLevel;
pub use surfacer_def::{LabelFilterConfig, SurfacerDef, SurfacerType};

pub const CONFIG_FILE_NAME: &str = "surfacers.yaml";
pub const ENV_PREFIX: &str = "SURFACER_";

#[derive(Debug, PartialEq, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub log_level: LogLevel,
    pub surfacer: Vec<SurfacerDef>,
}

#[derive(Debug, PartialEq, thiserror::Error)]
#[allow(clippy::module_name_repetitions)]
pub enum ConfigError {
    #[error("failed to parse surfacer config: {0}")]
    ParseError(String),
}

/// Loads `surfacers.yaml` from `config_directory`, overridden by `SURFACER_` environment
/// variables. A missing file yields the default configuration.
#[allow(clippy::module_name_repetitions)]
pub fn get_config(config_directory: &Path) -> Result<Config, ConfigError> {
    let path = config_directory.join(CONFIG_FILE_NAME);

    let figment = Figment::new()
        .merge(Yaml::file(&path))
        .merge(Env::prefixed(ENV_PREFIX));

    figment.extract().map_err(|err| {
        error!("Failed to parse surfacer config: {err}");
        ConfigError::ParseError(err.to_string())
    })
}

#[cfg(test)]
pub mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_default() {
        figment::Jail::expect_with(|jail| {
            jail.clear_env();
            let config = get_config(Path::new("")).expect("should parse config");
            assert_eq!(config, Config::default());
            Ok(())
        });
    }

    #[test]
    fn test_parse_surfacers_from_yaml() {
        figment::Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file(
                CONFIG_FILE_NAME,
                r#"
                log_level: debug
                surfacer:
                  - type: FILE
                    ignore_metrics_with_label:
                      - key: target
                        value: internal
                    ignore_metrics_with_name: "^debug_"
                  - name: pg
                    type: postgres
                    allow_metrics_with_label:
                      - key: dst
                    allow_metrics_with_name: "^app_"
                    latency_metric_pattern: "^(.*_|)latency$"
                    metrics_buffer_size: 500
                    add_failure_metric: false
            "#,
            )?;

            let config = get_config(Path::new("")).expect("should parse config");
            assert_eq!(config.log_level, LogLevel::Debug);
            assert_eq!(config.surfacer.len(), 2);

            let file = &config.surfacer[0];
            assert_eq!(file.kind, SurfacerType::File);
            assert_eq!(
                file.ignore_metrics_with_label,
                vec![LabelFilterConfig::new("target", "internal")]
            );
            assert_eq!(file.ignore_metrics_with_name(), "^debug_");
            assert_eq!(file.add_failure_metric, None);

            let pg = &config.surfacer[1];
            assert_eq!(pg.name(), "pg");
            assert_eq!(pg.kind, SurfacerType::Postgres);
            assert_eq!(pg.allow_metrics_with_label, vec![LabelFilterConfig::new("dst", "")]);
            assert_eq!(pg.allow_metrics_with_name(), "^app_");
            assert_eq!(pg.latency_metric_pattern(), "^(.*_|)latency$");
            assert_eq!(pg.metrics_buffer_size, 500);
            assert_eq!(pg.add_failure_metric, Some(false));
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_log_level() {
        figment::Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file(CONFIG_FILE_NAME, "log_level: warn")?;
            jail.set_env("SURFACER_LOG_LEVEL", "trace");

            let config = get_config(Path::new("")).expect("should parse config");
            assert_eq!(config.log_level, LogLevel::Trace);
            Ok(())
        });
    }

    #[test]
    fn test_unknown_surfacer_type_is_error() {
        figment::Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file(
                CONFIG_FILE_NAME,
                r"
                surfacer:
                  - type: CARRIER_PIGEON
            ",
            )?;

            let err = get_config(Path::new("")).expect_err("should reject surfacer type");
            assert!(matches!(err, ConfigError::ParseError(_)));
            Ok(())
        });
    }
}
