#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(unused_extern_crates)]
#![deny(unreachable_pub)]
#![deny(missing_debug_implementations)]

use std::{
    env,
    io::{self, BufRead, Error, ErrorKind, Result, Write},
    path::PathBuf,
    sync::Arc,
};

use surfacer_options::{
    config::{self, Config},
    logger,
    metrics::EventMetrics,
    options::{MetricsFilter, OptionsBuilder},
    surfacer::{ServeMux, Surfacer},
};
use tracing::{debug, error, info, warn};

const CONFIG_DIR_ENV: &str = "SURFACER_CONFIG_DIR";

fn config_directory() -> PathBuf {
    env::args()
        .nth(1)
        .or_else(|| env::var(CONFIG_DIR_ENV).ok())
        .map_or_else(|| PathBuf::from("."), PathBuf::from)
}

fn build_surfacers(config: &Config, serve_mux: &Arc<ServeMux>) -> Result<Vec<Surfacer>> {
    if config.surfacer.is_empty() {
        warn!("No surfacers configured, writing every event unfiltered");
        return Ok(vec![Surfacer::new("default", MetricsFilter::unconfigured())]);
    }

    config
        .surfacer
        .iter()
        .map(|def| -> Result<Surfacer> {
            let name = def.name();
            let opts = OptionsBuilder::new(def.clone())
                .serve_mux(Arc::clone(serve_mux))
                .build()
                .map_err(|e| {
                    error!("Failed to build options for surfacer {name}: {e}");
                    Error::new(ErrorKind::InvalidInput, e.to_string())
                })?;
            info!(
                "Initialized surfacer {name} of type {}, metrics_buffer_size: {}",
                def.kind, opts.metrics_buffer_size
            );
            Ok(Surfacer::new(name, opts))
        })
        .collect()
}

fn main() -> Result<()> {
    let config_directory = config_directory();
    let config = config::get_config(&config_directory)
        .map_err(|e| Error::new(ErrorKind::InvalidData, e.to_string()))?;

    logger::init(config.log_level).map_err(|e| Error::other(e.to_string()))?;
    debug!("Loaded config from {}", config_directory.display());

    let serve_mux = Arc::new(ServeMux::new());
    let surfacers = build_surfacers(&config, &serve_mux)?;

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    for (n, line) in stdin.lock().lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let em: EventMetrics = match serde_json::from_str(&line) {
            Ok(em) => em,
            Err(e) => {
                error!("Skipping malformed event on line {}: {e}", n + 1);
                continue;
            }
        };

        for surfacer in &surfacers {
            if let Some(out) = surfacer.process(&em) {
                let json = serde_json::to_string(&out)
                    .map_err(|e| Error::new(ErrorKind::InvalidData, e.to_string()))?;
                writeln!(stdout, "{}\t{json}", surfacer.name())?;
            }
        }
    }

    stdout.flush()
}
