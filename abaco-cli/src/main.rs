//! Abaco CLI — terminal interface for the Abaco agent runtime.
//!
//! Triggers persona agent groups and runs the data-quality pipeline.
//! Individual agent failures are reported in the result payload, not via
//! the process exit code; only argument and setup errors exit non-zero.

mod commands;

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Abaco: persona-driven financial-analytics assistant
#[derive(Parser, Debug)]
#[command(name = "abaco", version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long)]
    quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Trigger a group of persona agents
    Trigger {
        /// Trigger group: all, executive, risk, operations, growth,
        /// financial, quality, compliance
        #[arg(long, default_value = "all")]
        trigger: String,

        /// Output directory for persisted results
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Persist the run result (JSON + Markdown report)
        #[arg(long)]
        save_results: bool,
    },
    /// Run the data-quality pipeline over a JSON records file
    Pipeline {
        /// Path to a JSON array of records
        #[arg(long)]
        input: PathBuf,

        /// Output directory for the report and cleaned records
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Set up tracing: human-readable stderr + JSON file logging
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_filter(EnvFilter::new(filter));

    let log_dir = directories::ProjectDirs::from("com", "abaco", "abaco")
        .map(|d| d.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("."));
    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = tracing_appender::rolling::daily(&log_dir, "abaco.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let workdir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let config = abaco_core::config::load_config(Some(&workdir))
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;
    tracing::debug!(workdir = %workdir.display(), "Configuration loaded");

    match cli.command {
        Commands::Trigger {
            trigger,
            output_dir,
            save_results,
        } => commands::handle_trigger(&config, &trigger, output_dir, save_results).await,
        Commands::Pipeline { input, output_dir } => {
            commands::handle_pipeline(&config, &input, output_dir)
        }
    }
}
