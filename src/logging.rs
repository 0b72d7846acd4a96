// 10.1: tracing subscriber setup for the simulator and any host embedding the engine.

use std::str::FromStr;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;

/// Builds the filter spec. A bare level gets applied to this crate only,
/// directive strings containing ',' or '=' are used as given.
pub fn filter_spec(level: &str) -> String {
    let normalized = level.trim();
    if normalized.contains(',') || normalized.contains('=') {
        normalized.to_string()
    } else {
        format!("warn,vamm_core={normalized},vamm_sim={normalized}")
    }
}

/// Installs the global subscriber. `RUST_LOG` wins over the configured level.
/// Returns false if a subscriber was already installed.
pub fn init_logging(config: &LoggingConfig) -> bool {
    let spec = filter_spec(&config.level);
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::from_str(&spec))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::registry().with(filter);

    let installed = if config.json {
        let json_layer = fmt::layer().json().with_target(false).with_current_span(false);
        subscriber.with(json_layer).try_init().is_ok()
    } else {
        let fmt_layer = fmt::layer().with_target(true).compact();
        subscriber.with(fmt_layer).try_init().is_ok()
    };

    if installed {
        tracing::info!(
            filter = %spec,
            format = if config.json { "json" } else { "compact" },
            "logging initialized"
        );
    }
    installed
}
