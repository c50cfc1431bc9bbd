// SPDX-FileCopyrightText: 2026 Gemchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gemchat - per-user Gemini chat with persistent history.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod admin;
mod serve;
mod shell;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use gemchat_config::ChatConfig;

/// Gemchat - per-user Gemini chat with persistent history.
#[derive(Parser, Debug)]
#[command(name = "gemchat", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP gateway.
    Serve,
    /// Chat in the terminal.
    Shell {
        #[arg(long)]
        username: String,
        /// Prompt preset name.
        #[arg(long)]
        pname: Option<String>,
    },
    /// Print a user's stored turns.
    History {
        #[arg(long)]
        username: String,
    },
    /// Delete a user's stored turns.
    Clear {
        #[arg(long)]
        username: String,
    },
    /// Move one user's history store to another username.
    Rename { from: String, to: String },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => gemchat_config::load_and_validate_path(path),
        None => gemchat_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            gemchat_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(cli.command, config).await {
        eprintln!("{}: {e}", "error".red());
        std::process::exit(1);
    }
}

async fn run(command: Option<Commands>, config: ChatConfig) -> Result<(), gemchat_core::ChatError> {
    match command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Shell { username, pname }) => shell::run_shell(config, username, pname).await,
        Some(Commands::History { username }) => admin::print_history(&config, &username).await,
        Some(Commands::Clear { username }) => admin::clear_history(&config, &username).await,
        Some(Commands::Rename { from, to }) => admin::rename_history(&config, &from, &to).await,
        None => {
            println!("gemchat: use --help for available commands");
            Ok(())
        }
    }
}

/// Initializes the tracing subscriber with the given log level.
///
/// `RUST_LOG` takes precedence over the configured level.
pub(crate) fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("gemchat={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shell_requires_username() {
        assert!(Cli::try_parse_from(["gemchat", "shell"]).is_err());
        let cli = Cli::try_parse_from(["gemchat", "shell", "--username", "alice", "--pname", "poet"])
            .unwrap();
        match cli.command {
            Some(Commands::Shell { username, pname }) => {
                assert_eq!(username, "alice");
                assert_eq!(pname.as_deref(), Some("poet"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rename_takes_two_positionals() {
        let cli = Cli::try_parse_from(["gemchat", "rename", "alice", "alicia"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Rename { ref from, ref to }) if from == "alice" && to == "alicia"
        ));
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::try_parse_from(["gemchat", "serve", "--config", "/tmp/g.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/g.toml")));
    }

    #[test]
    fn binary_loads_config_defaults() {
        let config = gemchat_config::load_and_validate_str("").expect("default config should be valid");
        assert_eq!(config.app.name, "gemchat");
    }
}
