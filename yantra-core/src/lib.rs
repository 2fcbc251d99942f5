//! yantra-core: plugin discovery and registration
//!
//! Applications declare [`PluginType`]s (a name, a contract and a directory)
//! and ask the [`PluginRegistry`] for their plugins. Dropping a module into
//! the directory is all it takes to extend the application.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use yantra_core::{DylibSource, PluginRegistry, PluginType};
//!
//! fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let exporters = PluginType::new("exporters", "exporter", "./plugins/exporters");
//!     let registry = PluginRegistry::with_types(Arc::new(DylibSource::new()), [exporters.clone()])?;
//!
//!     if registry.has_plugins(&exporters)? {
//!         let csv = registry.get_plugin(&exporters, "csv")?;
//!         println!("csv exporter present: {}", csv.is_some());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │                PluginRegistry                 │
//! │  ┌─────────────────────────────────────────┐  │
//! │  │      Mutex<PluginContainer> per type    │  │
//! │  │  ┌──────────────┐  ┌────────────────┐   │  │
//! │  │  │ ModuleSource │  │ plugins/errors │   │  │
//! │  │  │ dylib/static │  │     cache      │   │  │
//! │  │  └──────────────┘  └────────────────┘   │  │
//! │  └─────────────────────────────────────────┘  │
//! └───────────────────────────────────────────────┘
//! ```

pub mod plugins;

pub use plugins::{
    ContainerState, DylibSource, ErrorMap, LoadedPlugin, ModuleDescriptor, ModuleLoadError,
    ModuleSource, PluginContainer, PluginManagerError, PluginRegistry, PluginType, StaticSource,
};
