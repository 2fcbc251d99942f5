//! PluginContainer - discovery, loading and instantiation for one plugin type

use std::collections::{BTreeMap, HashSet};
use std::panic::AssertUnwindSafe;
use std::path::Path;
use std::sync::Arc;

use yantra_plugin_api::DeclaredType;

use super::error::{InstantiationError, LoadFailure, panic_message};
use super::instance::LoadedPlugin;
use super::plugin_type::PluginType;
use super::source::{ModuleDescriptor, ModuleGuard, ModuleSource};

/// Module location -> `"<FailureKind>: <message>"`
pub type ErrorMap = BTreeMap<String, String>;

/// Whether the cached plugin list matches the directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerState {
    /// Discovered module count differs from the cached instance count
    Stale,
    /// Counts match; `get_plugins` returns the cache
    Fresh,
}

/// Holds the plugins of one [`PluginType`] and discovers them.
///
/// Staleness is decided by comparing the number of discovered modules with
/// the number of cached instances. This misses a removal paired with an
/// addition, and a module declaring several plugins keeps the container
/// stale so it reloads on every read.
///
/// Not synchronised; [`PluginRegistry`](super::PluginRegistry) wraps each
/// container in a lock.
pub struct PluginContainer {
    plugins: Vec<LoadedPlugin>,
    errors: ErrorMap,
    plugin_type: Arc<PluginType>,
    source: Arc<dyn ModuleSource>,
}

impl PluginContainer {
    pub fn new(plugin_type: Arc<PluginType>, source: Arc<dyn ModuleSource>) -> Self {
        Self {
            plugins: Vec::new(),
            errors: ErrorMap::new(),
            plugin_type,
            source,
        }
    }

    pub fn plugin_type(&self) -> &PluginType {
        &self.plugin_type
    }

    /// Find module candidates under the plugin type's path
    pub fn discover_modules(&self) -> Vec<ModuleDescriptor> {
        self.source.discover(self.plugin_type.path())
    }

    /// Compare the directory against the cache without reloading
    pub fn state(&self) -> ContainerState {
        if self.discover_modules().len() == self.plugins.len() {
            ContainerState::Fresh
        } else {
            ContainerState::Stale
        }
    }

    /// Discover and return all plugins of this type.
    ///
    /// Returns the cached list untouched when the module count equals the
    /// cached instance count; otherwise performs a full reload.
    pub fn get_plugins(&mut self) -> &[LoadedPlugin] {
        let modules = self.discover_modules();

        if modules.len() == self.plugins.len() {
            tracing::debug!(
                plugin_type = %self.plugin_type.name(),
                plugins = self.plugins.len(),
                "Module count unchanged, using cached plugins"
            );
            return &self.plugins;
        }

        self.reload(&modules);
        &self.plugins
    }

    /// Plugins from the last load, without touching the filesystem
    pub fn cached_plugins(&self) -> &[LoadedPlugin] {
        &self.plugins
    }

    /// Reload every module and return the failures of this pass.
    ///
    /// This always rescans, so it also refreshes the plugin list.
    pub fn errors(&mut self) -> &ErrorMap {
        self.errors.clear();
        let modules = self.discover_modules();
        self.reload(&modules);
        &self.errors
    }

    /// Instantiate `declared` and append it to the cached plugins.
    ///
    /// The instance is attributed to the plugin type's directory.
    pub fn register_plugin(&mut self, declared: &DeclaredType) -> Result<(), LoadFailure> {
        let plugin = instantiate(declared, self.plugin_type.path(), None)?;
        self.plugins.push(plugin);
        Ok(())
    }

    fn reload(&mut self, modules: &[ModuleDescriptor]) {
        self.plugins.clear();
        self.errors.clear();

        for module in modules {
            match self.load_module(module) {
                Ok(mut instances) => self.plugins.append(&mut instances),
                Err(message) => {
                    self.errors.insert(module.location_key(), message);
                }
            }
        }

        tracing::info!(
            plugin_type = %self.plugin_type.name(),
            modules = modules.len(),
            plugins = self.plugins.len(),
            errors = self.errors.len(),
            "Plugins reloaded"
        );
    }

    /// Load one module and build every qualifying declaration.
    ///
    /// Any failure discards the whole module. The failure is rendered to its
    /// error-map message before the module guard is released, since its
    /// payload may live in the module's code.
    fn load_module(&self, module: &ModuleDescriptor) -> Result<Vec<LoadedPlugin>, String> {
        let loaded = match self.source.load(module) {
            Ok(loaded) => loaded,
            Err(e) => return Err(self.report_failure(module, LoadFailure::from(e))),
        };
        let contract = self.plugin_type.base_class();
        let mut instances = Vec::new();

        for declared in &loaded.declarations {
            // the contract itself re-declared by a module is not a plugin
            if declared.name == contract {
                continue;
            }

            if !implements_contract(declared, &loaded.declarations, contract) {
                tracing::trace!(declaration = %declared.name, "Not an implementer, skipping");
                continue;
            }

            match instantiate(declared, &loaded.descriptor.location, loaded.guard.clone()) {
                Ok(plugin) => instances.push(plugin),
                Err(e) => return Err(self.report_failure(module, LoadFailure::from(e))),
            }
        }

        Ok(instances)
    }

    /// Log `failure` and turn it into its error-map message, consuming it
    fn report_failure(&self, module: &ModuleDescriptor, failure: LoadFailure) -> String {
        tracing::warn!(
            plugin_type = %self.plugin_type.name(),
            module = %module.location.display(),
            error = %failure,
            "Failed to load plugin module"
        );
        failure.describe()
    }
}

impl std::fmt::Debug for PluginContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginContainer")
            .field("plugin_type", &self.plugin_type)
            .field("plugins", &self.plugins)
            .field("errors", &self.errors)
            .finish_non_exhaustive()
    }
}

/// Whether `contract` is reachable from `declared` through its bases.
///
/// Bases naming other declarations of the same module are followed; cycles
/// terminate.
fn implements_contract(declared: &DeclaredType, siblings: &[DeclaredType], contract: &str) -> bool {
    let mut visited: HashSet<&str> = HashSet::from([declared.name.as_str()]);
    let mut pending: Vec<&str> = declared.bases.iter().map(String::as_str).collect();

    while let Some(base) = pending.pop() {
        if base == contract {
            return true;
        }
        if !visited.insert(base) {
            continue;
        }
        if let Some(parent) = siblings.iter().find(|d| d.name == base) {
            pending.extend(parent.bases.iter().map(String::as_str));
        }
    }

    false
}

fn instantiate(
    declared: &DeclaredType,
    module: &Path,
    guard: Option<ModuleGuard>,
) -> Result<LoadedPlugin, InstantiationError> {
    let instance = match std::panic::catch_unwind(AssertUnwindSafe(|| declared.instantiate())) {
        Ok(Ok(instance)) => instance,
        Ok(Err(source)) => {
            return Err(InstantiationError::Factory {
                type_name: declared.name.clone(),
                source,
            });
        }
        Err(payload) => {
            return Err(InstantiationError::Panicked {
                type_name: declared.name.clone(),
                message: panic_message(payload.as_ref()),
            });
        }
    };

    Ok(LoadedPlugin::new(
        instance,
        declared.name.clone(),
        module.to_path_buf(),
        guard,
    ))
}
