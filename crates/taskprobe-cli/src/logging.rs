//! Logging setup.
//!
//! `RUST_LOG` wins when set; otherwise the level follows `-q`/`-v`. Logs go
//! to stderr so stdout stays clean for results.

use crate::config::{CliConfig, Verbosity};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset or invalid
#[must_use]
pub fn env_filter(verbosity: Verbosity) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity.log_filter()))
}

/// Install the global subscriber. A second call is a no-op.
pub fn init(config: &CliConfig) {
    let _ = tracing_subscriber::registry()
        .with(env_filter(config.verbosity))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(config.color.should_color())
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .try_init();
}
