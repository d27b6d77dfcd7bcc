use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use novascript::types::ImageResolution;

mod cmd;

#[derive(Parser)]
#[command(name = "novascript")]
#[command(version, about = "Turn a news topic into a narrated, illustrated broadcast script")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to novascript.toml. Defaults to ./novascript.toml, then the user config dir.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full workflow for a topic
    Run {
        /// Topic to scan for news
        topic: String,

        /// Image size: 1K, 2K or 4K. Overrides novascript.toml.
        #[arg(short, long)]
        resolution: Option<ImageResolution>,

        /// Export the finished script (Markdown, or JSON for *.json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Reveal the teleprompter text progressively
        #[arg(long)]
        typewriter: bool,

        /// Skip the teleprompter view
        #[arg(long, conflicts_with = "typewriter")]
        no_teleprompter: bool,
    },
    /// View or validate configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    Show,
    Validate,
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // A missing .env is fine
    let _ = dotenvy::dotenv();

    if let Err(e) = novascript::logging::init_tracing(cli.verbose) {
        eprintln!("Failed to initialise logging: {}", e);
    }

    match &cli.command {
        Commands::Run {
            topic,
            resolution,
            output,
            typewriter,
            no_teleprompter,
        } => {
            let options = cmd::RunOptions {
                resolution: *resolution,
                output: output.clone(),
                typewriter: *typewriter,
                teleprompter: !*no_teleprompter,
            };
            cmd::cmd_run(&cli, topic, options).await?;
        }
        Commands::Config { command } => cmd::cmd_config(&cli, command.clone())?,
    }

    Ok(())
}
