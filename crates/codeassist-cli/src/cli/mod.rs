//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use codeassist_core::config::Config;
use codeassist_core::logging;

mod commands;

#[derive(Parser)]
#[command(name = "codeassist")]
#[command(version)]
#[command(about = "AI code assistant in your terminal, powered by Gemini")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override the model from config
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Override the system prompt from config
    #[arg(long, global = true)]
    system_prompt: Option<String>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Sends one prompt and prints the completed reply to stdout
    Exec {
        /// The prompt to send
        #[arg(short, long)]
        prompt: String,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let Cli {
        command,
        model,
        system_prompt,
    } = cli;

    match command {
        Some(Commands::Config { command }) => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
        },
        Some(Commands::Exec { prompt }) => {
            let config = load_config(model, system_prompt.as_deref())?;
            let _log_guard = logging::init(&config).context("init logging")?;
            commands::exec::run(&prompt, &config).await
        }
        // default to chat mode
        None => {
            let config = load_config(model, system_prompt.as_deref())?;
            let _log_guard = logging::init(&config).context("init logging")?;
            commands::chat::run(&config).await
        }
    }
}

/// Loads the config file and applies command-line overrides.
fn load_config(model: Option<String>, system_prompt: Option<&str>) -> Result<Config> {
    let mut config = Config::load().context("load config")?;

    if let Some(sp) = system_prompt {
        let trimmed = sp.trim();
        config.system_prompt = (!trimmed.is_empty()).then(|| trimmed.to_string());
    }
    if let Some(model) = model {
        config.model = model;
    }

    Ok(config)
}
