//! Diagnostic logging to stderr.
//!
//! Priority: `RUST_LOG` > `--debug` > `[logging] level` in `konan.toml` > warn.

use tracing_subscriber::EnvFilter;

const DEFAULT_LEVEL: &str = "warn";

pub fn init(debug_flag: bool, config_level: Option<&str>) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if debug_flag {
        EnvFilter::new("debug")
    } else if let Some(level) = config_level {
        EnvFilter::new(level)
    } else {
        EnvFilter::new(DEFAULT_LEVEL)
    };

    // Stdout carries command output; logs stay on stderr.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact()
        .try_init();

    tracing::debug!(
        app = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
        "logging initialised"
    );
}
