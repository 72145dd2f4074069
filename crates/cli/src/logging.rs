//! Logging setup for the CLI.
//!
//! Diagnostics go to stderr so stdout stays a clean JSON report.

use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Map the `-v` count to a level: none is warn, `-v` info, `-vv` and up debug.
pub fn level_from_verbosity(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    }
}

/// Install the global subscriber. Does nothing if one is already set.
pub fn init_logging(verbosity: u8) {
    let filter = build_env_filter(level_from_verbosity(verbosity));
    let layer = fmt::layer().with_writer(std::io::stderr).with_target(false).without_time();

    let _ = tracing_subscriber::registry().with(filter).with(layer).try_init();
}

fn build_env_filter(level: Level) -> EnvFilter {
    // RUST_LOG wins over -v
    let level = level.as_str().to_lowercase();
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("warn,scalemark_cli={level},scalemark_core={level}"))
    })
}
