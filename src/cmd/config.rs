//! Configuration view and validation commands: `novascript config`.

use anyhow::Result;
use std::path::PathBuf;

use novascript::config::{CONFIG_FILE_NAME, NovaConfig, NovaToml};

use super::super::{Cli, ConfigCommands};

pub fn cmd_config(cli: &Cli, command: Option<ConfigCommands>) -> Result<()> {
    match command {
        None | Some(ConfigCommands::Show) => {
            let config = NovaConfig::load(cli.config.as_deref(), cli.verbose)?;

            println!();
            println!("NovaScript Configuration");
            println!("========================");
            println!();
            match &config.source {
                Some(path) => println!("Config file: {}", path.display()),
                None => println!("No {} found, using defaults", CONFIG_FILE_NAME),
            }
            println!();
            print_toml(&config.toml);

            println!("Effective values (with env overrides):");
            println!("  api_base = \"{}\"", config.backend().api_base);
            println!(
                "  api_key = {}",
                if config.api_key.is_some() {
                    "set"
                } else {
                    "not set (will prompt)"
                }
            );
            println!();
        }
        Some(ConfigCommands::Validate) => {
            println!();
            println!("Validating configuration...");
            println!();

            let config = NovaConfig::load(cli.config.as_deref(), cli.verbose)?;
            if config.source.is_none() {
                println!("No {} found. Using defaults (valid).", CONFIG_FILE_NAME);
                return Ok(());
            }

            let warnings = config.toml.validate();
            if warnings.is_empty() {
                println!("Configuration is valid.");
            } else {
                println!("Configuration warnings:");
                for warning in warnings {
                    println!("  - {}", warning);
                }
            }
            println!();
        }
        Some(ConfigCommands::Init) => {
            let path = cli
                .config
                .clone()
                .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
            if path.exists() {
                println!("{} already exists at {}", CONFIG_FILE_NAME, path.display());
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }

            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
                && !parent.exists()
            {
                std::fs::create_dir_all(parent)?;
            }

            NovaToml::default().save(&path)?;

            println!("Created {} at {}", CONFIG_FILE_NAME, path.display());
            println!();
            println!("You can now customize:");
            println!("  - [backend] api_base, models, aspect_ratio, timeout_secs");
            println!("  - [defaults] resolution");
            println!("  - [teleprompter] chars_per_tick, tick_millis");
            println!();
        }
    }

    Ok(())
}

fn print_toml(toml: &NovaToml) {
    println!("[backend]");
    println!("  api_base = \"{}\"", toml.backend.api_base);
    println!("  news_model = \"{}\"", toml.backend.news_model);
    println!("  script_model = \"{}\"", toml.backend.script_model);
    println!("  image_model = \"{}\"", toml.backend.image_model);
    println!("  aspect_ratio = \"{}\"", toml.backend.aspect_ratio);
    println!("  timeout_secs = {}", toml.backend.timeout_secs);
    println!();

    println!("[defaults]");
    println!("  resolution = \"{}\"", toml.defaults.resolution);
    println!();

    println!("[teleprompter]");
    println!("  chars_per_tick = {}", toml.teleprompter.chars_per_tick);
    println!("  tick_millis = {}", toml.teleprompter.tick_millis);
    println!();
}
