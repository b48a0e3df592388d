// SPDX-FileCopyrightText: 2026 Steer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Steer - adaptive model routing with health-aware fallback.
//!
//! This is the binary entry point for inspecting a Steer configuration.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod check;
mod estimate;
mod status;

use clap::{Parser, Subcommand};

/// Steer - adaptive model routing with health-aware fallback.
#[derive(Parser, Debug)]
#[command(name = "steer", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate the configuration and report routing readiness.
    Check {
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
    /// Show the model table, initial ranking, and circuit states.
    Status {
        /// Print machine-readable JSON.
        #[arg(long)]
        json: bool,
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
    /// Estimate the cost of a request.
    Estimate {
        /// Model id or alias.
        #[arg(long)]
        model: String,
        /// Number of messages in the request.
        #[arg(long, default_value_t = 1)]
        messages: usize,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match steer_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            steer_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.logging.level);
    tracing::debug!(models = config.models.len(), "configuration loaded");

    let result = match cli.command {
        Some(Commands::Check { plain }) => check::run_check(&config, plain),
        Some(Commands::Status { json, plain }) => status::run_status(&config, json, plain).await,
        Some(Commands::Estimate { model, messages }) => {
            estimate::run_estimate(&config, &model, messages)
        }
        None => {
            println!("steer: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Install the fmt subscriber. `RUST_LOG` wins over the configured level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("steer={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    #[serial_test::serial]
    fn binary_loads_config_defaults() {
        let config = steer_config::load_and_validate().expect("default config should be valid");
        assert!(!config.models.is_empty());
    }

    #[test]
    fn cli_parses_estimate() {
        let cli = Cli::parse_from(["steer", "estimate", "--model", "GLM-4.7", "--messages", "3"]);
        match cli.command {
            Some(Commands::Estimate { model, messages }) => {
                assert_eq!(model, "GLM-4.7");
                assert_eq!(messages, 3);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn cli_parses_status_json() {
        let cli = Cli::parse_from(["steer", "status", "--json"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Status { json: true, plain: false })
        ));
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
