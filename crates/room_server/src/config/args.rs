//! Command-line argument parsing.

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the tic-tac-toe room server.
///
/// Arguments override the corresponding configuration file settings.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file path. A default file is created when it does
    /// not exist.
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Server listen address, e.g. "127.0.0.1:3000" or "0.0.0.0:3000".
    #[arg(short, long)]
    pub listen: Option<String>,

    /// SQLite database file for room state.
    #[arg(long)]
    pub database: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long)]
    pub debug: bool,

    /// Emit logs as JSON (for log aggregation).
    #[arg(long)]
    pub log_json: bool,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            config: PathBuf::from("config.toml"),
            listen: None,
            database: None,
            debug: false,
            log_json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_default() {
        let args = Args::default();
        assert_eq!(args.config, PathBuf::from("config.toml"));
        assert!(!args.debug);
        assert!(!args.log_json);
        assert!(args.listen.is_none());
        assert!(args.database.is_none());
    }
}
