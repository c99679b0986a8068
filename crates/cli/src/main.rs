//! Monitor operator CLI
//!
//! A command-line tool for inspecting monitors, checking time windows,
//! and debugging the monitor operator.

mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{crd, health, monitors, window};

const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Monitor operator CLI
#[derive(Parser)]
#[command(name = "monctl")]
#[command(author, version, about = "CLI for the Monitor operator", long_about = None)]
pub struct Cli {
    /// Operator health/metrics endpoint (can also be set via MONCTL_API_URL env var)
    #[arg(long, env = "MONCTL_API_URL")]
    pub api_url: Option<String>,

    /// Path to kubeconfig file (uses default if not specified)
    #[arg(long, env = "KUBECONFIG")]
    pub kubeconfig: Option<String>,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List resources
    #[command(subcommand)]
    Get(GetCommands),

    /// Check whether an hour falls inside a monitor window
    Window {
        /// First hour of the window (UTC, inclusive)
        #[arg(long, value_parser = clap::value_parser!(u32).range(0..=23))]
        start: u32,

        /// Last hour of the window (UTC, inclusive)
        #[arg(long, value_parser = clap::value_parser!(u32).range(0..=23))]
        end: u32,

        /// Hour to evaluate (defaults to the current UTC hour)
        #[arg(long, value_parser = clap::value_parser!(u32).range(0..=23))]
        at: Option<u32>,
    },

    /// Print the Monitor CustomResourceDefinition
    Crd,

    /// Show operator health and readiness
    Health,
}

#[derive(Subcommand)]
pub enum GetCommands {
    /// List monitors
    Monitors {
        /// Filter by namespace (all namespaces if not specified)
        #[arg(long, short)]
        namespace: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = config::Config::load()?;

    match cli.command {
        Commands::Get(GetCommands::Monitors { namespace }) => {
            let namespace = namespace.or(settings.default_namespace);
            let kube = client::kube_client(cli.kubeconfig.as_deref()).await?;
            monitors::get_monitors(kube, namespace, cli.format).await?;
        }
        Commands::Window { start, end, at } => {
            window::evaluate_window(start, end, at, cli.format)?;
        }
        Commands::Crd => {
            crd::print_crd()?;
        }
        Commands::Health => {
            let api_url = cli
                .api_url
                .or(settings.api_url)
                .unwrap_or_else(|| DEFAULT_API_URL.to_string());
            let api = client::ApiClient::new(&api_url)?;
            health::show_health(&api, cli.format).await?;
        }
    }

    Ok(())
}
