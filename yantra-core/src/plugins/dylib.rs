//! Native dynamic library modules

use libloading::Library;
use std::panic::AssertUnwindSafe;
use std::path::Path;
use std::sync::Arc;

use yantra_plugin_api::{ModuleRegistrar, REGISTER_SYMBOL, RegisterFn};

use super::error::{ModuleLoadError, panic_message};
use super::source::{LoadedModule, ModuleDescriptor, ModuleSource, discover_modules};

/// Shared library extensions for the current platform
pub fn library_extensions() -> &'static [&'static str] {
    if cfg!(target_os = "macos") {
        &["dylib", "so"]
    } else if cfg!(target_os = "windows") {
        &["dll"]
    } else {
        &["so"]
    }
}

/// Loads modules from shared libraries exporting
/// [`export_module!`](yantra_plugin_api::export_module).
///
/// The `Library` handle is handed back as the module guard, so a library
/// stays mapped while any instance created from it is alive. Libraries are
/// never explicitly unloaded.
#[derive(Debug, Default, Clone, Copy)]
pub struct DylibSource;

impl DylibSource {
    pub fn new() -> Self {
        Self
    }
}

impl ModuleSource for DylibSource {
    fn discover(&self, root: &Path) -> Vec<ModuleDescriptor> {
        discover_modules(root, library_extensions())
            .into_iter()
            .map(|mut descriptor| {
                // libgreeter.so -> greeter
                if let Some(stripped) = descriptor.name.strip_prefix("lib")
                    && !stripped.is_empty()
                {
                    descriptor.name = stripped.to_string();
                }
                descriptor
            })
            .collect()
    }

    fn load(&self, module: &ModuleDescriptor) -> Result<LoadedModule, ModuleLoadError> {
        // SAFETY: loading runs the library's initialisers. Modules placed in a
        // plugin directory are trusted to follow the yantra module contract.
        let library = unsafe { Library::new(&module.location)? };

        // SAFETY: the symbol is generated by `export_module!` with exactly the
        // `RegisterFn` signature.
        let register: RegisterFn = unsafe {
            match library.get::<RegisterFn>(REGISTER_SYMBOL) {
                Ok(symbol) => *symbol,
                Err(e) => {
                    tracing::debug!(module = %module.name, error = %e, "Entry point lookup failed");
                    return Err(ModuleLoadError::MissingEntryPoint {
                        path: module.location.clone(),
                    });
                }
            }
        };

        let mut registrar = ModuleRegistrar::new();
        std::panic::catch_unwind(AssertUnwindSafe(|| register(&mut registrar))).map_err(
            |payload| ModuleLoadError::RegistrationPanicked {
                message: panic_message(payload.as_ref()),
            },
        )?;

        let declarations = registrar.into_declarations();
        for declared in &declarations {
            tracing::trace!(
                module = %module.name,
                declaration = %declared.name,
                bases = ?declared.bases,
                "Type declared"
            );
        }
        tracing::debug!(
            module = %module.name,
            path = %module.location.display(),
            declarations = declarations.len(),
            "Module library loaded"
        );

        Ok(LoadedModule {
            descriptor: module.clone(),
            declarations,
            guard: Some(Arc::new(library)),
        })
    }
}
