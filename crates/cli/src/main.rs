//! Wingman CLI — the main entry point.
//!
//! Commands:
//! - `run`       — Execute a mission task through the decision loop
//! - `doctor`    — Diagnose engine / LLM / knowledge health
//! - `knowledge` — Manage the tactical knowledge index
//! - `replay`    — Inspect saved replay logs

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use wingman_config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "wingman",
    about = "Wingman — LLM-commanded air combat mission agent",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the config file (defaults to wingman.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a mission task through the decision loop
    Run {
        /// The task instruction, in natural language
        task: String,

        /// Override the configured iteration ceiling
        #[arg(short, long)]
        max_iterations: Option<u32>,
    },

    /// Diagnose engine, LLM and knowledge configuration
    Doctor,

    /// Manage the tactical knowledge index
    Knowledge {
        #[command(subcommand)]
        command: KnowledgeCommands,
    },

    /// Inspect saved replay logs
    Replay {
        #[command(subcommand)]
        command: ReplayCommands,
    },
}

#[derive(Subcommand)]
enum KnowledgeCommands {
    /// Rebuild the vector index from the knowledge directory
    Rebuild,
}

#[derive(Subcommand)]
enum ReplayCommands {
    /// List saved replay sessions
    List,

    /// Show the call sequence of one session
    Show {
        /// Session id, as shown by `wingman replay list`
        session_id: String,
    },
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Run {
            task,
            max_iterations,
        } => {
            let config = load_config(cli.config.as_ref())?;
            commands::run::run(config, &task, max_iterations).await?;
        }
        Commands::Doctor => commands::doctor::run(cli.config.as_ref()).await?,
        Commands::Knowledge { command } => {
            let config = load_config(cli.config.as_ref())?;
            match command {
                KnowledgeCommands::Rebuild => commands::knowledge::rebuild(config).await?,
            }
        }
        Commands::Replay { command } => {
            let config = load_config(cli.config.as_ref())?;
            match command {
                ReplayCommands::List => commands::replay::list(&config)?,
                ReplayCommands::Show { session_id } => commands::replay::show(&config, &session_id)?,
            }
        }
    }

    Ok(())
}
