// SPDX-FileCopyrightText: 2026 Palabra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Palabra - a minimal chat assistant with an audited conversation log.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod doctor;
mod history;
mod shell;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use palabra_config::PalabraConfig;

/// Palabra - a minimal chat assistant with an audited conversation log.
#[derive(Parser, Debug)]
#[command(name = "palabra", version, about, long_about = None)]
struct Cli {
    /// Load this config file instead of the XDG hierarchy.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start an interactive chat session (default).
    Shell {
        /// Sign in as this principal at startup.
        #[arg(long)]
        principal: Option<String>,
    },
    /// Print the conversation log.
    History {
        /// Only records of this principal.
        #[arg(long)]
        principal: Option<String>,
        /// Only the most recent N records.
        #[arg(long)]
        limit: Option<i64>,
        /// Output JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Run diagnostic checks.
    Doctor {
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
    /// Print the effective configuration.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            palabra_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.agent.log_level);

    let result = match cli.command.unwrap_or(Commands::Shell { principal: None }) {
        Commands::Shell { principal } => shell::run_shell(config, principal).await,
        Commands::History {
            principal,
            limit,
            json,
        } => history::run_history(&config, principal, limit, json).await,
        Commands::Doctor { plain } => doctor::run_doctor(&config, cli.config.as_deref(), plain).await,
        Commands::Config => print_config(&config),
    };

    if let Err(e) = result {
        eprintln!("{}: {e}", "error".red());
        std::process::exit(1);
    }
}

fn load_config(
    path: Option<&std::path::Path>,
) -> Result<PalabraConfig, Vec<palabra_config::ConfigError>> {
    match path {
        Some(path) => palabra_config::load_and_validate_path(path),
        None => palabra_config::load_and_validate(),
    }
}

/// Install the fmt subscriber on stderr so stdout stays reserved for the conversation.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("palabra={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

/// Print the effective configuration as TOML, with the API key redacted.
fn print_config(config: &PalabraConfig) -> Result<(), palabra_core::PalabraError> {
    let rendered = render_config(config)?;
    print!("{rendered}");
    Ok(())
}

fn render_config(config: &PalabraConfig) -> Result<String, palabra_core::PalabraError> {
    let mut redacted = config.clone();
    if redacted.completion.api_key.is_some() {
        redacted.completion.api_key = Some("<redacted>".to_string());
    }
    toml::to_string_pretty(&redacted)
        .map_err(|e| palabra_core::PalabraError::Internal(format!("failed to render config: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Only jemalloc supports advancing the epoch.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn cli_defaults_to_no_subcommand() {
        let cli = Cli::try_parse_from(["palabra"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn cli_parses_history_flags() {
        let cli = Cli::try_parse_from([
            "palabra",
            "history",
            "--principal",
            "uid-1",
            "--limit",
            "10",
            "--json",
            "--config",
            "/tmp/p.toml",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::History {
                principal,
                limit,
                json,
            }) => {
                assert_eq!(principal.as_deref(), Some("uid-1"));
                assert_eq!(limit, Some(10));
                assert!(json);
            }
            other => panic!("expected history, got {other:?}"),
        }
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/p.toml")));
    }

    #[test]
    fn rendered_config_redacts_api_key() {
        let mut config = PalabraConfig::default();
        config.completion.api_key = Some("gsk-secret".to_string());

        let rendered = render_config(&config).unwrap();
        assert!(!rendered.contains("gsk-secret"));
        assert!(rendered.contains("<redacted>"));
        assert!(rendered.contains("[completion]"));
    }

    #[test]
    fn default_config_is_valid() {
        let config = palabra_config::load_and_validate_str("").expect("defaults should be valid");
        assert_eq!(config.agent.name, "palabra");
    }
}
