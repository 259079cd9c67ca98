//! Tracing subscriber setup
//!
//! `RUST_LOG` wins when set; otherwise the level comes from `-v` and applies
//! to the workspace crates only, leaving dependencies at `warn`.

use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const POOL_CRATES: [&str; 8] = [
    "egg_pool",
    "pool_core",
    "pool_model",
    "pool_store",
    "pool_append",
    "pool_cache",
    "pool_catalog",
    "pool_ui",
];

/// Log output settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LogConfig {
    pub(crate) level: Level,
    pub(crate) json: bool,
}

impl LogConfig {
    /// 0 → info, 1 → debug, 2+ → trace
    pub(crate) fn from_verbosity(verbosity: u8, json: bool) -> Self {
        let level = match verbosity {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        };
        Self { level, json }
    }
}

/// Install the global subscriber, writing to stderr.
pub(crate) fn init_logging(config: LogConfig) {
    let filter = build_env_filter(config.level);
    let registry = tracing_subscriber::registry().with(filter);

    if config.json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .compact()
                    .without_time()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn build_env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(level)))
}

fn default_directives(level: Level) -> String {
    let level = level.as_str().to_lowercase();
    std::iter::once("warn".to_string())
        .chain(POOL_CRATES.iter().map(|krate| format!("{krate}={level}")))
        .collect::<Vec<_>>()
        .join(",")
}
