//! yantra-plugin-api - what plugin modules link against
//!
//! A plugin module is a native dynamic library (or a registration function
//! linked into the host) that, when loaded, hands the host a list of
//! [`DeclaredType`]s through a [`ModuleRegistrar`]. Each declaration names the
//! contracts it implements, so the host can decide which ones belong to a
//! plugin type without any runtime reflection.
//!
//! # Example
//!
//! ```ignore
//! use yantra_plugin_api::{export_module, ModuleRegistrar, Plugin};
//!
//! #[derive(Default)]
//! pub struct Hello;
//!
//! impl Plugin for Hello {
//!     fn id(&self) -> Option<&str> {
//!         Some("hello")
//!     }
//! }
//!
//! fn register(registrar: &mut ModuleRegistrar) {
//!     registrar.declare::<Hello>("Hello", &["greeter"]);
//! }
//!
//! export_module!(register);
//! ```

pub mod error;
pub mod registrar;

pub use error::PluginError;
pub use registrar::{DeclaredType, ModuleRegistrar, PluginFactory, RegisterFn};

use std::any::Any;

/// Name of the symbol every native plugin module exports.
///
/// The symbol has the signature of [`RegisterFn`].
pub const REGISTER_SYMBOL: &[u8] = b"_yantra_module_register";

/// Upcast helper so instances can be downcast to their concrete type.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// The base trait every plugin instance implements.
///
/// Which plugin type an instance belongs to is decided by the contracts its
/// declaration names, not by this trait. Implementers registered through
/// [`ModuleRegistrar::declare`] must be `Default`.
pub trait Plugin: AsAny + Send + Sync {
    /// Optional identity used for lookups by id
    fn id(&self) -> Option<&str> {
        None
    }

    /// Optional human-readable description
    fn description(&self) -> Option<&str> {
        None
    }
}

impl dyn Plugin {
    /// Downcast to the concrete plugin type
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// Export a registration function as the module's entry point.
///
/// The host resolves [`REGISTER_SYMBOL`] after loading the library and calls
/// it with an empty registrar.
///
/// # ABI
///
/// The entry point uses the Rust ABI, not `extern "C"`: it takes a
/// `&mut ModuleRegistrar` and hands back boxed trait objects, and a panic in
/// it must unwind into the host so it can be recorded as a load failure.
/// Modules therefore have to be built by the same compiler version, against
/// the same `yantra-plugin-api`, as the host that loads them.
///
/// # Usage
///
/// ```ignore
/// fn register(registrar: &mut yantra_plugin_api::ModuleRegistrar) {
///     registrar.declare::<MyPlugin>("MyPlugin", &["my-contract"]);
/// }
///
/// yantra_plugin_api::export_module!(register);
/// ```
#[macro_export]
macro_rules! export_module {
    ($register:path) => {
        #[unsafe(no_mangle)]
        pub fn _yantra_module_register(registrar: &mut $crate::ModuleRegistrar) {
            $register(registrar);
        }
    };
}
