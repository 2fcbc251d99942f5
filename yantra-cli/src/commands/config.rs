use crate::config::{ConfigLoader, RawPluginType};
use anyhow::Result;
use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration (merged)
    Show,
    /// Show configuration file paths
    Path,
    /// Add or replace a plugin type in the project config
    Add {
        /// Plugin type name
        name: String,
        /// Contract its plugins implement
        base_class: String,
        /// Directory to scan (relative to the config file)
        #[arg(long)]
        path: Option<PathBuf>,
        /// Write to the user config instead
        #[arg(long)]
        user: bool,
    },
}

pub fn run(args: ConfigArgs, config_path: Option<&Path>) -> Result<()> {
    match args.command {
        ConfigCommands::Show => show_config(config_path),
        ConfigCommands::Path => show_paths(config_path),
        ConfigCommands::Add {
            name,
            base_class,
            path,
            user,
        } => add_plugin_type(
            RawPluginType {
                name,
                base_class,
                path,
            },
            user,
        ),
    }
}

fn show_config(config_path: Option<&Path>) -> Result<()> {
    let config = ConfigLoader::load(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{}", toml_str);
    Ok(())
}

fn show_paths(config_path: Option<&Path>) -> Result<()> {
    println!("User config:    {:?}", ConfigLoader::user_config_path());
    println!("Project config: {:?}", ConfigLoader::project_config_path());
    if let Some(path) = config_path {
        println!("Explicit:       {:?}", path);
    }
    println!("Plugins:        {:?}", yantra_paths::plugins_dir());
    Ok(())
}

fn add_plugin_type(entry: RawPluginType, user: bool) -> Result<()> {
    let target = if user {
        ConfigLoader::user_config_path()
    } else {
        ConfigLoader::project_config_path()
    };
    let name = entry.name.clone();
    ConfigLoader::save_plugin_type(&target, entry)?;
    println!("Saved plugin type '{}' to {}", name, target.display());
    Ok(())
}
