use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "focuspet", version, about = "Focus Pet CLI")]
struct Cli {
    /// Directory holding progress.json and config.toml
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run focus/break cycles in the foreground
    Run(commands::run::RunArgs),
    /// Print the companion's current state as JSON
    Status(commands::status::StatusArgs),
    /// Progress record management
    Progress {
        #[command(subcommand)]
        action: commands::progress::ProgressAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn resolve_data_dir(flag: Option<PathBuf>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    match flag {
        Some(dir) => {
            std::fs::create_dir_all(&dir)?;
            Ok(dir)
        }
        None => Ok(focuspet_core::storage::data_dir()?),
    }
}

fn main() {
    logging::init();
    let cli = Cli::parse();

    let result = resolve_data_dir(cli.data_dir).and_then(|dir| match cli.command {
        Commands::Run(args) => commands::run::run(args, &dir),
        Commands::Status(args) => commands::status::run(args, &dir).map_err(Into::into),
        Commands::Progress { action } => commands::progress::run(action, &dir).map_err(Into::into),
        Commands::Config { action } => commands::config::run(action, &dir).map_err(Into::into),
    });

    if let Err(e) = result {
        tracing::debug!(error = %e, "command failed");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
