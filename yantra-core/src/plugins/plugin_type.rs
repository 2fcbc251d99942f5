//! Plugin type declarations

use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

/// One category of plugins: a unique name, the contract its plugins
/// implement, and the directory they are discovered in.
///
/// Equality and hashing only look at `name`.
#[derive(Debug, Clone)]
pub struct PluginType {
    name: String,
    base_class: String,
    path: PathBuf,
}

impl PluginType {
    pub fn new(
        name: impl Into<String>,
        base_class: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            base_class: base_class.into(),
            path: path.into(),
        }
    }

    /// Unique key of this type
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Contract a declaration must implement to qualify
    pub fn base_class(&self) -> &str {
        &self.base_class
    }

    /// Directory scanned for modules
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reason this type cannot be registered, if any
    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("plugin type name must not be empty".to_string());
        }
        if self.base_class.trim().is_empty() {
            return Err(format!(
                "plugin type '{}' has an empty base class",
                self.name
            ));
        }
        Ok(())
    }
}

impl PartialEq for PluginType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for PluginType {}

impl Hash for PluginType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}
