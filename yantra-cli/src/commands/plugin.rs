//! Plugin inspection commands

use crate::config::{ConfigLoader, YantraConfig};
use anyhow::Result;
use clap::{Args, Subcommand};
use std::path::Path;
use std::sync::Arc;
use yantra_core::{
    DylibSource, ErrorMap, LoadedPlugin, ModuleSource, PluginManagerError, PluginRegistry,
    PluginType,
};

/// Plugin inspection arguments
#[derive(Args)]
pub struct PluginArgs {
    #[command(subcommand)]
    pub command: PluginCommands,
}

/// Plugin subcommands
#[derive(Subcommand)]
pub enum PluginCommands {
    /// List configured plugin types
    Types,
    /// List discovered plugins
    List {
        /// Only this plugin type (all types when omitted)
        plugin_type: Option<String>,
    },
    /// Show modules that failed to load
    Errors {
        /// Plugin types to check (all types when omitted)
        plugin_types: Vec<String>,

        /// Print the error map as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one plugin by id
    Show {
        /// Plugin type name
        plugin_type: String,
        /// Plugin id
        id: String,
    },
}

/// Run plugin command
pub fn run(args: PluginArgs, config_path: Option<&Path>) -> Result<()> {
    let config = ConfigLoader::load(config_path)?;
    let registry = build_registry(&config, Arc::new(DylibSource::new()))?;

    match args.command {
        PluginCommands::Types => list_types(&registry),
        PluginCommands::List { plugin_type } => list_plugins(&registry, plugin_type.as_deref()),
        PluginCommands::Errors { plugin_types, json } => {
            show_errors(&registry, &plugin_types, json)
        }
        PluginCommands::Show { plugin_type, id } => show_plugin(&registry, &plugin_type, &id),
    }
}

/// Register every configured plugin type against `source`
pub fn build_registry(
    config: &YantraConfig,
    source: Arc<dyn ModuleSource>,
) -> Result<PluginRegistry, PluginManagerError> {
    PluginRegistry::with_types(
        source,
        config.plugin_types.iter().map(|t| t.to_plugin_type()),
    )
}

fn resolve<'a>(registry: &'a PluginRegistry, name: &str) -> Result<&'a PluginType> {
    registry.plugin_type(name).ok_or_else(|| {
        PluginManagerError::UnknownType {
            name: name.to_string(),
        }
        .into()
    })
}

/// Selected types, or every registered type when `names` is empty
fn select<'a>(registry: &'a PluginRegistry, names: &[String]) -> Result<Vec<&'a PluginType>> {
    if names.is_empty() {
        return Ok(registry.plugin_types().collect());
    }
    names.iter().map(|name| resolve(registry, name)).collect()
}

fn list_types(registry: &PluginRegistry) -> Result<()> {
    let types: Vec<&PluginType> = registry.plugin_types().collect();

    if types.is_empty() {
        println!("No plugin types configured");
        println!();
        println!("Add one to {}:", ConfigLoader::user_config_path().display());
        println!();
        println!("  [[plugin_types]]");
        println!("  name = \"greeters\"");
        println!("  base_class = \"greeter\"");
        return Ok(());
    }

    for t in types {
        println!("{}    {}    {}", t.name(), t.base_class(), t.path().display());
    }
    Ok(())
}

fn list_plugins(registry: &PluginRegistry, plugin_type: Option<&str>) -> Result<()> {
    let types = match plugin_type {
        Some(name) => vec![resolve(registry, name)?],
        None => registry.plugin_types().collect(),
    };

    for t in types {
        let plugins = registry.get_plugins(t)?;
        println!("{} ({} plugins)", t.name(), plugins.len());
        for p in &plugins {
            println!("  {}", format_plugin_line(p));
        }
    }
    Ok(())
}

fn show_errors(registry: &PluginRegistry, names: &[String], json: bool) -> Result<()> {
    let types = select(registry, names)?;
    let errors = registry.get_errors(&types)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&errors)?);
        return Ok(());
    }

    if errors.is_empty() {
        println!("No load errors");
        return Ok(());
    }
    print!("{}", format_errors(&errors));
    Ok(())
}

fn show_plugin(registry: &PluginRegistry, plugin_type: &str, id: &str) -> Result<()> {
    let t = resolve(registry, plugin_type)?;

    match registry.get_plugin(t, id)? {
        Some(p) => {
            println!("Id:          {}", id);
            println!("Type:        {}", p.type_name());
            println!("Plugin type: {}", t.name());
            println!("Module:      {}", p.module().display());
            println!(
                "Description: {}",
                p.instance().description().unwrap_or("No description")
            );
        }
        None => {
            println!("No plugin with id '{}' in '{}'", id, plugin_type);
            println!();
            println!("Run 'yantra plugin list {}' to see discovered plugins.", plugin_type);
        }
    }
    Ok(())
}

fn format_plugin_line(plugin: &LoadedPlugin) -> String {
    format!(
        "{}    {}    {}",
        plugin.type_name(),
        plugin.id().unwrap_or("-"),
        plugin.module().display()
    )
}

fn format_errors(errors: &ErrorMap) -> String {
    errors
        .iter()
        .map(|(location, message)| format!("✗ {}\n    {}\n", location, message))
        .collect()
}
