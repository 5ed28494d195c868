//! Config command - inspect and bootstrap the configuration file.

use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, bail};
use clap::{Args, Subcommand};
use console::style;

use invox_core::InvoxConfig;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration as JSON
    Show,

    /// Write a fresh configuration file with default values
    Init {
        /// Where to write it (defaults to the platform config dir)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print one configuration value by dotted key, e.g. "vat.default_rate"
    Get { key: String },

    /// Print the configuration file location
    Path,
}

pub async fn run(args: ConfigArgs) -> anyhow::Result<()> {
    let path = config_file();
    match args.command {
        ConfigCommand::Show => {
            println!("{}", serde_json::to_string_pretty(&effective_config()?)?);
        }
        ConfigCommand::Init { output, force } => {
            let target = output.unwrap_or(path);
            if target.exists() && !force {
                bail!(
                    "refusing to overwrite {} (pass --force to replace it)",
                    target.display()
                );
            }
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            InvoxConfig::default().save(&target)?;
            println!("{} wrote {}", style("✓").green(), target.display());
        }
        ConfigCommand::Get { key } => {
            let tree = serde_json::to_value(effective_config()?)?;
            let mut node = &tree;
            for part in key.split('.') {
                node = node
                    .get(part)
                    .ok_or_else(|| anyhow!("no such configuration key: {key}"))?;
            }
            println!("{node}");
        }
        ConfigCommand::Path => println!("{}", path.display()),
    }
    Ok(())
}

fn config_file() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("invox")
        .join("config.json")
}

/// File contents when present, built-in defaults otherwise.
fn effective_config() -> anyhow::Result<InvoxConfig> {
    let path = config_file();
    if path.exists() {
        Ok(InvoxConfig::from_file(&path)?)
    } else {
        Ok(InvoxConfig::default())
    }
}
