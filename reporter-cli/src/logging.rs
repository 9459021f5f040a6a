//! Tracing subscriber for the binary. Logs go to stderr; stdout is the report.

use tracing_subscriber::{fmt, EnvFilter};

/// `RUST_LOG` wins when set; otherwise `-v` flags pick the level.
pub fn init_tracing(verbosity: u8) {
    let default = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
