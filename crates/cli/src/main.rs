//! Eva CLI - client for the events API

mod commands;
mod config;
mod logging;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use commands::Commands;
use eva_core::{SessionStore, StateDir};
use eva_http::ApiClient;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{Level, debug, error};

#[derive(Parser)]
#[command(name = "eva")]
#[command(about = "Browse and manage events, categories and participants")]
#[command(version)]
struct Cli {
    /// Set logging level
    #[arg(short = 'l', long, global = true, default_value = "warn")]
    log_level: LogLevel,

    /// Directory for the stored session token, config and logs
    #[arg(short = 'd', long, global = true)]
    state_dir: Option<PathBuf>,

    /// Configuration file (TOML or YAML)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// API base URL, e.g. http://127.0.0.1:8000/api/
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Request timeout in seconds (0 = no timeout)
    #[arg(short = 't', long, global = true)]
    timeout: Option<u64>,

    /// Disable file logging (only log to stderr)
    #[arg(long, global = true)]
    no_file_log: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let state_dir = match &cli.state_dir {
        Some(dir) => StateDir::with_override(dir),
        None => StateDir::new(),
    };
    logging::init_logging(cli.log_level.clone().into(), &state_dir, "cli", cli.no_file_log)?;

    match run(cli, &state_dir).await {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Err(e) => {
            error!("Command failed: {e:#}");
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli, state_dir: &StateDir) -> Result<serde_json::Value> {
    let config = config::load_client_config(
        cli.config.as_deref(),
        state_dir,
        config::Overrides {
            base_url: cli.base_url,
            timeout_secs: cli.timeout,
        },
    )?;
    debug!(base_url = %config.base_url, "Using API endpoint");

    let session = Arc::new(SessionStore::open(Arc::new(state_dir.token_storage())));
    let client = ApiClient::from_config(&config, session)?;

    cli.command.execute(&client).await
}

#[derive(Clone, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_filtered_event_list() {
        let cli = Cli::try_parse_from([
            "eva",
            "--base-url",
            "http://localhost:8000/api/",
            "events",
            "list",
            "--category",
            "2",
            "--date",
            "2024-12-16",
        ])
        .unwrap();

        assert_eq!(cli.base_url.as_deref(), Some("http://localhost:8000/api/"));
        match cli.command {
            Commands::Events {
                command: commands::EventCommands::List { category, date, page },
            } => {
                assert_eq!(category, Some(2));
                assert_eq!(page, None);
                assert_eq!(date.map(|d| d.to_string()).as_deref(), Some("2024-12-16"));
            }
            _ => panic!("expected events list"),
        }
    }

    #[test]
    fn test_parses_collection_params_and_items() {
        let cli =
            Cli::try_parse_from(["eva", "categories", "list", "--param", "page=3"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Categories {
                command: commands::CollectionCommands::List { ref params }
            } if params == &[("page".to_string(), "3".to_string())]
        ));

        let cli = Cli::try_parse_from(["eva", "participants", "delete", "4"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Participants {
                command: commands::CollectionCommands::Item(commands::ItemCommands::Delete {
                    id: 4
                })
            }
        ));
    }
}
