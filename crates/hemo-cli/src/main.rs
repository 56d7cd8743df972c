use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod commands;

#[derive(Parser)]
#[command(name = "hemo")]
#[command(about = "HEMO - blood smear session aggregation and clinical interpretation", long_about = None)]
struct Cli {
    /// Configuration file (defaults to $HEMO_CONFIG, then ~/.config/hemo/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List analysis modes and magnifications as JSON
    Modes,
    /// Print the effective configuration
    Config {
        /// Print only the resolved configuration file path
        #[arg(long)]
        path: bool,
    },
    /// Run one session over a batch of images and print the report as JSON
    Run(commands::run::RunArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Modes => commands::modes::run(config_path)?,
        Commands::Config { path } => commands::config::run(config_path, path)?,
        Commands::Run(args) => commands::run::run(config_path, args).await?,
    }

    Ok(())
}
