use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use rag_router::commands::{Program, run_program};
use rag_router::config::{Config, LoggingConfig, get_config_dir, run_interactive_config, show_config};
use rag_router::logging::init_tracing;

#[derive(Parser)]
#[command(name = "rag-router")]
#[command(about = "Retrieval-augmented chat assistants with query routing")]
#[command(version)]
struct Cli {
    /// Configuration directory (defaults to ~/.rag-router)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure the chat model, Ollama and retrieval settings
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
    /// AI document assistant that asks the model whether to retrieve first
    Gate,
    /// AI and cooking assistant that lets the model pick the document
    Route,
    /// AI document and web search assistant
    Web,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_dir = match cli.config_dir {
        Some(dir) => dir,
        None => get_config_dir()?,
    };

    let program = match cli.command {
        Commands::Config { show } => {
            init_tracing(&LoggingConfig::default())?;
            return if show {
                show_config(&config_dir)
            } else {
                run_interactive_config(&config_dir)
            };
        }
        Commands::Gate => Program::Gate,
        Commands::Route => Program::Route,
        Commands::Web => Program::Web,
    };

    let config = Config::load(&config_dir)?;
    init_tracing(&config.logging)?;
    run_program(program, &config)
}
