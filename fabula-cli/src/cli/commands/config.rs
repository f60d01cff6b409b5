//! Config command - Configuration files

use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;

use fabula::EvalConfig;

use super::super::output::{color, write_output};
use super::super::utils::load_config;

/// Show or create configuration files
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Action to perform
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show {
        /// Configuration file to load (defaults apply without one)
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
    },

    /// Write a configuration file with default values
    Init {
        /// Where to write the file
        #[arg(value_name = "PATH", default_value = "fabula.toml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

pub fn run(args: ConfigArgs) -> Result<(), String> {
    match args.action {
        ConfigAction::Show { config } => {
            let config = load_config(config.as_deref(), None)?;
            let toml = config.to_toml_string().map_err(|e| e.to_string())?;
            write_output(&toml, None)
        }
        ConfigAction::Init { path, force } => {
            if path.exists() && !force {
                return Err(format!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                ));
            }
            let toml = EvalConfig::default()
                .to_toml_string()
                .map_err(|e| e.to_string())?;
            fs::write(&path, toml)
                .map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
            println!("{} Wrote {}", color("32", "ok:"), path.display());
            Ok(())
        }
    }
}
