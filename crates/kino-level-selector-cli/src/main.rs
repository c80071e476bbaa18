//! Kino Level Selector CLI - drive the quality menu without a player
//!
//! Features:
//! - Replay scripted playback/host sessions against the controller
//! - Render a level set as menu markup
//! - Check a selector configuration file

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod output;
mod script;

/// Kino Level Selector - quality menu simulator
#[derive(Parser)]
#[command(name = "kino-level-selector")]
#[command(author = "Purple Squirrel Media")]
#[command(version)]
#[command(about = "Simulate and render the Kino quality level menu", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Output format (text, json, html)
    #[arg(short, long, default_value = "text")]
    format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a scripted session
    Simulate {
        /// JSON file with the session steps
        script: PathBuf,

        /// Selector configuration (JSON options bag)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Render the menu for a level set
    Render {
        /// JSON file with the levels
        levels: PathBuf,

        /// Level reported as in effect
        #[arg(short, long)]
        active: Option<i32>,

        /// Selector configuration (JSON options bag)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Host content height in pixels
        #[arg(long, default_value = "360")]
        height: f64,
    },

    /// Validate a selector configuration
    CheckConfig {
        /// Selector configuration (JSON options bag)
        config: PathBuf,
    },

    /// Print the menu stylesheet
    Stylesheet,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_writer(std::io::stderr)
        .init();

    kino_level_selector::init();

    match cli.command {
        Commands::Simulate { script, config } => {
            commands::simulate(&script, config.as_deref(), &cli.format)?;
        }
        Commands::Render { levels, active, config, height } => {
            commands::render(&levels, active, config.as_deref(), height, &cli.format)?;
        }
        Commands::CheckConfig { config } => {
            if !commands::check_config(&config, &cli.format)? {
                std::process::exit(1);
            }
        }
        Commands::Stylesheet => {
            commands::stylesheet();
        }
    }

    Ok(())
}
