use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use yantra_core::PluginType;

/// Configuration as stored in TOML files (paths optional and unresolved)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RawYantraConfig {
    #[serde(default)]
    pub plugin_types: Vec<RawPluginType>,
}

/// A plugin type entry as written in a config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPluginType {
    /// Unique plugin type name
    pub name: String,

    /// Contract its plugins implement
    pub base_class: String,

    /// Directory to scan; defaults to the user plugin dir for this type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl RawPluginType {
    /// Resolve a relative `path` against the directory of the declaring file
    pub fn resolve_against(mut self, base: &Path) -> Self {
        if let Some(path) = self.path.take() {
            self.path = Some(if path.is_relative() {
                base.join(path)
            } else {
                path
            });
        }
        self
    }
}

/// Final configuration with defaults applied
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct YantraConfig {
    #[serde(default)]
    pub plugin_types: Vec<PluginTypeConfig>,
}

/// A plugin type with its directory resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginTypeConfig {
    pub name: String,
    pub base_class: String,
    pub path: PathBuf,
}

impl PluginTypeConfig {
    pub fn to_plugin_type(&self) -> PluginType {
        PluginType::new(&self.name, &self.base_class, &self.path)
    }
}

impl YantraConfig {
    /// Find a configured plugin type by name
    pub fn plugin_type(&self, name: &str) -> Option<&PluginTypeConfig> {
        self.plugin_types.iter().find(|t| t.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = YantraConfig::default();
        assert!(config.plugin_types.is_empty());
        assert!(config.plugin_type("anything").is_none());
    }

    #[test]
    fn test_raw_config_parsing() {
        let toml_str = r#"
[[plugin_types]]
name = "greeters"
base_class = "greeter"
path = "plugins/greeters"

[[plugin_types]]
name = "exporters"
base_class = "exporter"
"#;
        let raw: RawYantraConfig = toml::from_str(toml_str).unwrap();

        assert_eq!(raw.plugin_types.len(), 2);
        assert_eq!(raw.plugin_types[0].name, "greeters");
        assert_eq!(
            raw.plugin_types[0].path,
            Some(PathBuf::from("plugins/greeters"))
        );
        assert!(raw.plugin_types[1].path.is_none());
    }

    #[test]
    fn test_empty_file_parses() {
        let raw: RawYantraConfig = toml::from_str("").unwrap();
        assert!(raw.plugin_types.is_empty());
    }

    #[test]
    fn test_resolve_against() {
        let relative = RawPluginType {
            name: "a".to_string(),
            base_class: "A".to_string(),
            path: Some(PathBuf::from("plugins/a")),
        };
        let absolute = RawPluginType {
            path: Some(PathBuf::from("/opt/plugins/a")),
            ..relative.clone()
        };
        let unset = RawPluginType {
            path: None,
            ..relative.clone()
        };
        let base = Path::new("/etc/yantra");

        assert_eq!(
            relative.resolve_against(base).path,
            Some(PathBuf::from("/etc/yantra/plugins/a"))
        );
        assert_eq!(
            absolute.resolve_against(base).path,
            Some(PathBuf::from("/opt/plugins/a"))
        );
        assert!(unset.resolve_against(base).path.is_none());
    }

    #[test]
    fn test_to_plugin_type() {
        let entry = PluginTypeConfig {
            name: "greeters".to_string(),
            base_class: "greeter".to_string(),
            path: PathBuf::from("/p"),
        };
        let plugin_type = entry.to_plugin_type();
        assert_eq!(plugin_type.name(), "greeters");
        assert_eq!(plugin_type.base_class(), "greeter");
        assert_eq!(plugin_type.path(), Path::new("/p"));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = YantraConfig {
            plugin_types: vec![PluginTypeConfig {
                name: "greeters".to_string(),
                base_class: "greeter".to_string(),
                path: PathBuf::from("/tmp/greeters"),
            }],
        };

        let toml_str = toml::to_string(&config).unwrap();
        let parsed: YantraConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.plugin_types, config.plugin_types);
    }
}
