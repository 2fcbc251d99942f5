//! Modules linked into the host binary

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::path::Path;
use std::sync::Arc;

use yantra_plugin_api::ModuleRegistrar;

use super::error::{ModuleLoadError, panic_message};
use super::source::{LoadedModule, ModuleDescriptor, ModuleSource, discover_modules};

/// Default marker file extension for statically linked modules
pub const DEFAULT_MARKER_EXTENSION: &str = "plugin";

type SharedRegisterFn = Arc<dyn Fn(&mut ModuleRegistrar) + Send + Sync>;

/// Module source for registration functions compiled into the host.
///
/// The directory still drives discovery: a marker file `<name>.<ext>` under
/// the plugin type's path enables the registration function registered under
/// `<name>`. A marker without a matching function fails to load.
#[derive(Clone)]
pub struct StaticSource {
    extension: String,
    modules: HashMap<String, SharedRegisterFn>,
}

impl StaticSource {
    /// Source using [`DEFAULT_MARKER_EXTENSION`]
    pub fn new() -> Self {
        Self::with_extension(DEFAULT_MARKER_EXTENSION)
    }

    pub fn with_extension(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
            modules: HashMap::new(),
        }
    }

    /// Link a registration function under a module name
    pub fn register_module<F>(&mut self, name: impl Into<String>, register: F) -> &mut Self
    where
        F: Fn(&mut ModuleRegistrar) + Send + Sync + 'static,
    {
        self.modules.insert(name.into(), Arc::new(register));
        self
    }

    /// Builder-style [`register_module`](Self::register_module)
    pub fn with_module<F>(mut self, name: impl Into<String>, register: F) -> Self
    where
        F: Fn(&mut ModuleRegistrar) + Send + Sync + 'static,
    {
        self.register_module(name, register);
        self
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Whether a registration function exists for `name`
    pub fn has_module(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }
}

impl Default for StaticSource {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StaticSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.modules.keys().collect();
        names.sort();
        f.debug_struct("StaticSource")
            .field("extension", &self.extension)
            .field("modules", &names)
            .finish()
    }
}

impl ModuleSource for StaticSource {
    fn discover(&self, root: &Path) -> Vec<ModuleDescriptor> {
        discover_modules(root, &[self.extension.as_str()])
    }

    fn load(&self, module: &ModuleDescriptor) -> Result<LoadedModule, ModuleLoadError> {
        let register =
            self.modules
                .get(&module.name)
                .ok_or_else(|| ModuleLoadError::NotRegistered {
                    name: module.name.clone(),
                })?;

        let mut registrar = ModuleRegistrar::new();
        std::panic::catch_unwind(AssertUnwindSafe(|| register(&mut registrar))).map_err(
            |payload| ModuleLoadError::RegistrationPanicked {
                message: panic_message(payload.as_ref()),
            },
        )?;

        Ok(LoadedModule {
            descriptor: module.clone(),
            declarations: registrar.into_declarations(),
            guard: None,
        })
    }
}
