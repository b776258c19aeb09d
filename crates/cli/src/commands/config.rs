//! Configuration file management

use std::path::Path;

use anyhow::Result;
use clap::{Args, Subcommand};

use qarelay_common::FrameworkConfig;

use crate::output::{print_success, OutputFormat};

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Write a default configuration file
    Init(InitArgs),

    /// Print the resolved configuration
    Show,
}

#[derive(Args)]
pub struct InitArgs {
    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

pub fn execute(cmd: ConfigCommands, config_path: &Path, format: OutputFormat) -> Result<()> {
    match cmd {
        ConfigCommands::Init(args) => {
            if config_path.exists() && !args.force {
                anyhow::bail!(
                    "{} already exists (use --force to overwrite)",
                    config_path.display()
                );
            }

            FrameworkConfig::default().save(config_path)?;
            print_success(&format!(
                "Wrote default configuration to {}",
                config_path.display()
            ));
        }
        ConfigCommands::Show => {
            let config = FrameworkConfig::load(config_path)?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&config)?),
                OutputFormat::Yaml => println!("{}", serde_yaml::to_string(&config)?),
                _ => print!("{}", toml::to_string_pretty(&config)?),
            }
        }
    }

    Ok(())
}
