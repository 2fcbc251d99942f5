//! Plugin discovery for yantra
//!
//! This module provides the infrastructure for discovering and instantiating
//! plugins:
//!
//! - [`PluginType`]: a plugin category (name, contract, directory)
//! - [`ModuleSource`]: turns a directory into loadable modules
//!   ([`DylibSource`] for shared libraries, [`StaticSource`] for modules
//!   linked into the host)
//! - [`PluginContainer`]: discovery, loading and caching for one type
//! - [`PluginRegistry`]: the containers of every registered type
//!
//! # Module Discovery
//!
//! Every file under a type's directory, at any depth, with the source's
//! extension is a module. Loading a module runs its registration function,
//! which declares types and the contracts they implement. Declarations that
//! reach the type's contract are instantiated with their zero-argument
//! factory.
//!
//! A module that fails to load or construct contributes no plugins; the
//! failure is recorded under the module's path and can be read with
//! [`PluginRegistry::get_errors`].
//!
//! # Example
//!
//! ```ignore
//! use yantra_core::plugins::{PluginRegistry, PluginType};
//!
//! let greeters = PluginType::new("greeters", "greeter", "/usr/lib/app/greeters");
//! let mut registry = PluginRegistry::default();
//! registry.register_plugin_type(greeters.clone())?;
//!
//! for plugin in registry.get_plugins(&greeters)? {
//!     println!("{} from {}", plugin.type_name(), plugin.module().display());
//! }
//!
//! for (module, error) in registry.get_errors(&[&greeters])? {
//!     eprintln!("{module}: {error}");
//! }
//! ```

mod container;
mod dylib;
mod error;
mod instance;
mod plugin_type;
mod registry;
mod source;
mod static_source;

pub use container::{ContainerState, ErrorMap, PluginContainer};
pub use dylib::{DylibSource, library_extensions};
pub use error::{InstantiationError, LoadFailure, ModuleLoadError, PluginManagerError};
pub use instance::LoadedPlugin;
pub use plugin_type::PluginType;
pub use registry::PluginRegistry;
pub use source::{LoadedModule, ModuleDescriptor, ModuleGuard, ModuleSource, discover_modules};
pub use static_source::{DEFAULT_MARKER_EXTENSION, StaticSource};
