//! Plugin registry - maps plugin type names to their containers

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::container::{ErrorMap, PluginContainer};
use super::dylib::DylibSource;
use super::error::PluginManagerError;
use super::instance::LoadedPlugin;
use super::plugin_type::PluginType;
use super::source::ModuleSource;

/// Registry of plugin types and their containers.
///
/// Construct one at startup and pass it to whatever needs plugins. Each
/// container sits behind its own lock, held for the whole check-and-reload
/// sequence, so concurrent readers of a stale type trigger one reload.
pub struct PluginRegistry {
    containers: HashMap<String, Mutex<PluginContainer>>,
    /// Registration order, for listing
    types: Vec<Arc<PluginType>>,
    source: Arc<dyn ModuleSource>,
}

impl PluginRegistry {
    /// Empty registry loading modules through `source`
    pub fn new(source: Arc<dyn ModuleSource>) -> Self {
        Self {
            containers: HashMap::new(),
            types: Vec::new(),
            source,
        }
    }

    /// Registry with an initial set of plugin types
    pub fn with_types(
        source: Arc<dyn ModuleSource>,
        plugin_types: impl IntoIterator<Item = PluginType>,
    ) -> Result<Self, PluginManagerError> {
        let mut registry = Self::new(source);
        for plugin_type in plugin_types {
            registry.register_plugin_type(plugin_type)?;
        }
        Ok(registry)
    }

    /// Register a plugin type using the registry's module source
    pub fn register_plugin_type(
        &mut self,
        plugin_type: PluginType,
    ) -> Result<(), PluginManagerError> {
        let source = self.source.clone();
        self.register_plugin_type_with_source(plugin_type, source)
    }

    /// Register a plugin type that loads modules through its own source
    pub fn register_plugin_type_with_source(
        &mut self,
        plugin_type: PluginType,
        source: Arc<dyn ModuleSource>,
    ) -> Result<(), PluginManagerError> {
        plugin_type
            .validate()
            .map_err(|reason| PluginManagerError::InvalidType { reason })?;

        if self.containers.contains_key(plugin_type.name()) {
            return Err(PluginManagerError::DuplicateType {
                name: plugin_type.name().to_string(),
            });
        }

        tracing::debug!(
            plugin_type = %plugin_type.name(),
            base_class = %plugin_type.base_class(),
            path = %plugin_type.path().display(),
            "Plugin type registered"
        );

        let plugin_type = Arc::new(plugin_type);
        self.containers.insert(
            plugin_type.name().to_string(),
            Mutex::new(PluginContainer::new(plugin_type.clone(), source)),
        );
        self.types.push(plugin_type);
        Ok(())
    }

    /// Whether a type with this name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.containers.contains_key(name)
    }

    /// Registered types, in registration order
    pub fn plugin_types(&self) -> impl Iterator<Item = &PluginType> {
        self.types.iter().map(|t| &**t)
    }

    /// Look up a registered type by name
    pub fn plugin_type(&self, name: &str) -> Option<&PluginType> {
        self.types
            .iter()
            .find(|t| t.name() == name)
            .map(|t| &**t)
    }

    /// All plugins of a type, rediscovering when the container is stale
    pub fn get_plugins(
        &self,
        plugin_type: &PluginType,
    ) -> Result<Vec<LoadedPlugin>, PluginManagerError> {
        Ok(self.container(plugin_type)?.get_plugins().to_vec())
    }

    /// Whether the type currently has any plugins
    pub fn has_plugins(&self, plugin_type: &PluginType) -> Result<bool, PluginManagerError> {
        Ok(!self.container(plugin_type)?.get_plugins().is_empty())
    }

    /// First plugin of the type whose id equals `id`.
    ///
    /// Plugins without an id never match.
    pub fn get_plugin(
        &self,
        plugin_type: &PluginType,
        id: &str,
    ) -> Result<Option<LoadedPlugin>, PluginManagerError> {
        let mut container = self.container(plugin_type)?;
        Ok(container
            .get_plugins()
            .iter()
            .find(|plugin| plugin.id() == Some(id))
            .cloned())
    }

    /// Load errors of the given types, merged.
    ///
    /// Each container rescans its directory. On key collisions later types
    /// win.
    pub fn get_errors(
        &self,
        plugin_types: &[&PluginType],
    ) -> Result<ErrorMap, PluginManagerError> {
        let mut errors = ErrorMap::new();
        for plugin_type in plugin_types {
            let mut container = self.container(plugin_type)?;
            errors.extend(
                container
                    .errors()
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone())),
            );
        }
        Ok(errors)
    }

    fn container(
        &self,
        plugin_type: &PluginType,
    ) -> Result<MutexGuard<'_, PluginContainer>, PluginManagerError> {
        let container =
            self.containers
                .get(plugin_type.name())
                .ok_or_else(|| PluginManagerError::UnknownType {
                    name: plugin_type.name().to_string(),
                })?;

        // A panic mid-reload leaves a container that the next reload fully replaces
        Ok(container.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new(Arc::new(DylibSource::new()))
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("types", &self.types)
            .finish_non_exhaustive()
    }
}
