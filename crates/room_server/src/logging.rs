//! Logging system setup.
//!
//! Structured logging via `tracing`, with the level controlled by the
//! `--debug` flag or the `RUST_LOG` environment variable, and optional
//! JSON output for log aggregation systems.

use anyhow::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::Args;

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the level implied by `--debug`.
/// Can only be called once per process; tests that race on this simply
/// tolerate the second call failing.
pub fn setup_logging(args: &Args) -> Result<()> {
    let level = if args.debug { "debug" } else { "info" };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(false))
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false))
            .try_init()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_setup() {
        let args = Args::default();

        // The global subscriber can only be installed once per process,
        // so only the first of these calls can succeed.
        let result = setup_logging(&args);
        assert!(result.is_ok() || result.is_err());

        let json_args = Args {
            log_json: true,
            ..Default::default()
        };
        let result = setup_logging(&json_args);
        assert!(result.is_ok() || result.is_err());
    }
}
