//! blocktree CLI binary.

use blocktree::cli::{self, Cli};
use blocktree::logging::{init_logging, LoggingConfig};
use clap::Parser;
use std::process;
use tracing::error;

fn main() {
    let cli = Cli::parse();

    let logging = build_logging_config(&cli);
    if let Err(e) = init_logging(&logging) {
        eprintln!("failed to initialize logging: {e}");
        process::exit(1);
    }

    match cli::run(&cli) {
        Ok(output) => print!("{output}"),
        Err(e) => {
            error!("command failed: {e}");
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// CLI flags override the defaults; the `BLOCKTREE_LOG` environment
/// variable still wins inside `init_logging`.
fn build_logging_config(cli: &Cli) -> LoggingConfig {
    let mut config = LoggingConfig::default();
    if cli.quiet {
        config.level = "error".to_string();
    }
    if cli.verbose {
        config.level = "debug".to_string();
    }
    if let Some(level) = &cli.log_level {
        config.level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.format = format.clone();
    }
    config
}
