use super::types::{PluginTypeConfig, RawPluginType, RawYantraConfig, YantraConfig};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load merged configuration (user, then project, then `explicit`)
    pub fn load(explicit: Option<&Path>) -> Result<YantraConfig> {
        let mut raw = RawYantraConfig::default();

        // Layer 1: User config
        let user_path = Self::user_config_path();
        if user_path.exists() {
            raw = Self::merge_raw(raw, Self::read_layer(&user_path)?);
        }

        // Layer 2: Project config
        let project_path = Self::project_config_path();
        if project_path.exists() {
            raw = Self::merge_raw(raw, Self::read_layer(&project_path)?);
        }

        // Layer 3: --config, which must exist
        if let Some(path) = explicit {
            raw = Self::merge_raw(raw, Self::read_layer(path)?);
        }

        Ok(Self::finalize(raw))
    }

    /// Get user config path
    pub fn user_config_path() -> PathBuf {
        yantra_paths::user_config_file()
    }

    /// Get project config path
    /// Can be overridden with YANTRA_PROJECT_CONFIG_DIR env var (useful for isolated tests)
    pub fn project_config_path() -> PathBuf {
        if let Ok(dir) = std::env::var("YANTRA_PROJECT_CONFIG_DIR") {
            PathBuf::from(dir).join(yantra_paths::CONFIG_FILE)
        } else {
            PathBuf::from(".yantra").join(yantra_paths::CONFIG_FILE)
        }
    }

    /// Read one config file, resolving relative paths against its directory
    fn read_layer(path: &Path) -> Result<RawYantraConfig> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let mut layer: RawYantraConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        layer.plugin_types = layer
            .plugin_types
            .into_iter()
            .map(|t| t.resolve_against(base))
            .collect();

        tracing::debug!(
            config = %path.display(),
            plugin_types = layer.plugin_types.len(),
            "Config layer loaded"
        );
        Ok(layer)
    }

    /// Merge two raw configs (overlay entries replace base entries with the same name)
    fn merge_raw(base: RawYantraConfig, overlay: RawYantraConfig) -> RawYantraConfig {
        let mut plugin_types = base.plugin_types;
        for entry in overlay.plugin_types {
            Self::upsert(&mut plugin_types, entry);
        }
        RawYantraConfig { plugin_types }
    }

    fn upsert(plugin_types: &mut Vec<RawPluginType>, entry: RawPluginType) {
        match plugin_types.iter_mut().find(|t| t.name == entry.name) {
            Some(existing) => *existing = entry,
            None => plugin_types.push(entry),
        }
    }

    /// Convert raw config to final config with defaults applied
    fn finalize(raw: RawYantraConfig) -> YantraConfig {
        YantraConfig {
            plugin_types: raw
                .plugin_types
                .into_iter()
                .map(|t| PluginTypeConfig {
                    path: t
                        .path
                        .unwrap_or_else(|| yantra_paths::plugins_dir().join(&t.name)),
                    name: t.name,
                    base_class: t.base_class,
                })
                .collect(),
        }
    }

    /// Add or replace a plugin type in the config file at `path`
    ///
    /// Creates the file and its parent directories if they don't exist.
    pub fn save_plugin_type(path: &Path, entry: RawPluginType) -> Result<()> {
        let mut raw = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str::<RawYantraConfig>(&contents)?
        } else {
            RawYantraConfig::default()
        };

        Self::upsert(&mut raw.plugin_types, entry);

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let toml = toml::to_string_pretty(&raw)?;
        std::fs::write(path, toml)?;
        Ok(())
    }
}
