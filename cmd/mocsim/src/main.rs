//! MoCSim CLI - distributed Monte Carlo simulation runner.
//!
//! Commands:
//! - `mocsim server` - Distribute jobs, collect rows, report statistics
//! - `mocsim client` - Fetch a job, run its trials, submit the rows

use anyhow::Result;
use clap::{Parser, Subcommand};
use mocsim_wire::{WireConfig, COLLECTION_PORT, DISTRIBUTION_PORT};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "mocsim")]
#[command(about = "Distributed Monte Carlo simulation runner")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Distribute jobs to clients, collect their rows, and report
    #[command(visible_alias = "s", alias = "0")]
    Server {
        /// Path to the simulation definition file
        #[arg(short, long)]
        definition: String,

        /// Write the rendered report to this file as well as stdout
        #[arg(short, long)]
        output: Option<String>,

        /// Dump every collected row to this CSV file
        #[arg(long)]
        raw_output: Option<String>,

        /// Report format (text or json)
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Port of the job-distribution service
        #[arg(long, default_value_t = DISTRIBUTION_PORT)]
        distribution_port: u16,

        /// Port of the result-collection service
        #[arg(long, default_value_t = COLLECTION_PORT)]
        collection_port: u16,
    },

    /// Fetch one job from a server, run its trials, and submit the rows
    #[command(visible_alias = "c", alias = "1")]
    Client {
        /// Path to the simulation definition file
        #[arg(short, long)]
        definition: String,

        /// Address of the server to work for
        #[arg(default_value = "127.0.0.1")]
        server: String,

        /// Port of the job-distribution service
        #[arg(long, default_value_t = DISTRIBUTION_PORT)]
        distribution_port: u16,

        /// Port of the result-collection service
        #[arg(long, default_value_t = COLLECTION_PORT)]
        collection_port: u16,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Server {
            definition,
            output,
            raw_output,
            format,
            distribution_port,
            collection_port,
        } => {
            let config =
                WireConfig::default().with_ports(distribution_port, collection_port);
            commands::server::run(
                &definition,
                output.as_deref(),
                raw_output.as_deref(),
                &format,
                &config,
            )
            .await
        }
        Commands::Client {
            definition,
            server,
            distribution_port,
            collection_port,
        } => {
            let config =
                WireConfig::default().with_ports(distribution_port, collection_port);
            commands::client::run(&definition, &server, &config).await
        }
    }
}
