mod check_config_cmd;
mod serve_cmd;
mod status_cmd;
mod terminal_output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "gamegate")]
#[command(about = "Quota-gated game content server")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the gamegate HTTP server
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
        /// Config file (defaults to ~/.gamegate/config.yaml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Query a running server's health endpoint
    Status {
        #[arg(short, long, default_value_t = 8080)]
        port: u16,
    },
    /// Print the effective (redacted) config and its validation report
    CheckConfig {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port, config } => serve_cmd::run(config, port).await,
        Commands::Status { port } => status_cmd::run(port).await,
        Commands::CheckConfig { config } => check_config_cmd::run(config).await,
    }
}

/// Explicit path, or `config.yaml` in the config directory.
pub(crate) fn resolve_config_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit.unwrap_or_else(|| gamegate_config::config_file_path(&gamegate_config::config_dir()))
}
