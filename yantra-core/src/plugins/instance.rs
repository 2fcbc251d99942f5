//! Handles to instantiated plugins

use std::any::Any;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use yantra_plugin_api::Plugin;

use super::source::ModuleGuard;

/// A plugin instance plus where it came from.
///
/// Cloning is cheap and yields the same instance. The module guard is declared
/// after the instance so the instance is always dropped first.
#[derive(Clone)]
pub struct LoadedPlugin {
    instance: Arc<dyn Plugin>,
    type_name: String,
    module: PathBuf,
    _guard: Option<ModuleGuard>,
}

impl LoadedPlugin {
    pub(crate) fn new(
        instance: Box<dyn Plugin>,
        type_name: String,
        module: PathBuf,
        guard: Option<ModuleGuard>,
    ) -> Self {
        Self {
            instance: Arc::from(instance),
            type_name,
            module,
            _guard: guard,
        }
    }

    /// Name of the declaration this instance was built from
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Location of the module that declared it
    pub fn module(&self) -> &Path {
        &self.module
    }

    /// The instance's id, if it has one
    pub fn id(&self) -> Option<&str> {
        self.instance.id()
    }

    pub fn instance(&self) -> &dyn Plugin {
        self.instance.as_ref()
    }

    /// Downcast to the concrete plugin type
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.instance.as_ref().downcast_ref::<T>()
    }

    /// Whether two handles refer to the same instance
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.instance, &other.instance)
    }
}

impl fmt::Debug for LoadedPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedPlugin")
            .field("type_name", &self.type_name)
            .field("id", &self.id())
            .field("module", &self.module)
            .finish_non_exhaustive()
    }
}
