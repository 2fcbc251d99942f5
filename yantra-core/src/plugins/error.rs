//! Plugin discovery error types

use std::path::PathBuf;
use thiserror::Error;
use yantra_plugin_api::PluginError;

/// Errors returned by [`PluginRegistry`](super::PluginRegistry) operations.
///
/// These are programmer errors and always reach the caller.
#[derive(Error, Debug)]
pub enum PluginManagerError {
    /// A plugin type with this name is already registered
    #[error("Plugin type '{name}' already exists")]
    DuplicateType { name: String },

    /// The plugin type is malformed
    #[error("Invalid plugin type: {reason}")]
    InvalidType { reason: String },

    /// No container is registered under this name
    #[error("No plugins registered for type '{name}'")]
    UnknownType { name: String },
}

/// Failure while loading one module.
///
/// Recorded in the container's error map and never propagated further.
#[derive(Error, Debug)]
pub enum ModuleLoadError {
    /// IO error while reading the module
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to load dynamic library
    #[error("Failed to load module library: {0}")]
    Library(#[from] libloading::Error),

    /// The library does not export the registration entry point
    #[error("Module {path} does not export a registration entry point")]
    MissingEntryPoint { path: PathBuf },

    /// No registration function is linked in under this module name
    #[error("No module registered under name '{name}'")]
    NotRegistered { name: String },

    /// The registration function panicked
    #[error("Module registration panicked: {message}")]
    RegistrationPanicked { message: String },
}

/// Failure while constructing a qualifying declaration
#[derive(Error, Debug)]
pub enum InstantiationError {
    /// The factory returned an error
    #[error("Failed to construct '{type_name}': {source}")]
    Factory {
        type_name: String,
        #[source]
        source: PluginError,
    },

    /// The factory panicked
    #[error("Constructor of '{type_name}' panicked: {message}")]
    Panicked { type_name: String, message: String },
}

/// Any per-module failure a container records
#[derive(Error, Debug)]
pub enum LoadFailure {
    #[error(transparent)]
    ModuleLoad(#[from] ModuleLoadError),

    #[error(transparent)]
    Instantiation(#[from] InstantiationError),
}

impl LoadFailure {
    /// Failure kind as it appears in error maps
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ModuleLoad(_) => "ModuleLoadError",
            Self::Instantiation(_) => "InstantiationError",
        }
    }

    /// `"<FailureKind>: <message>"`
    pub fn describe(&self) -> String {
        format!("{}: {}", self.kind(), self)
    }
}

/// Extract a message from a `catch_unwind` payload
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_type_display() {
        let err = PluginManagerError::DuplicateType {
            name: "dummy".to_string(),
        };
        assert!(err.to_string().contains("dummy"));
    }

    #[test]
    fn test_unknown_type_display() {
        let err = PluginManagerError::UnknownType {
            name: "missing".to_string(),
        };
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_missing_entry_point_display() {
        let err = ModuleLoadError::MissingEntryPoint {
            path: PathBuf::from("/plugins/libfoo.so"),
        };
        assert!(err.to_string().contains("/plugins/libfoo.so"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ModuleLoadError = io_err.into();
        assert!(matches!(err, ModuleLoadError::Io(_)));
    }

    #[test]
    fn test_load_failure_describe() {
        let failure: LoadFailure = ModuleLoadError::NotRegistered {
            name: "broken".to_string(),
        }
        .into();
        assert_eq!(failure.kind(), "ModuleLoadError");
        assert_eq!(
            failure.describe(),
            "ModuleLoadError: No module registered under name 'broken'"
        );
    }

    #[test]
    fn test_instantiation_failure_kind() {
        let failure: LoadFailure = InstantiationError::Factory {
            type_name: "Flaky".to_string(),
            source: PluginError::construction("boom"),
        }
        .into();
        assert_eq!(failure.kind(), "InstantiationError");
        assert!(failure.describe().starts_with("InstantiationError: "));
        assert!(failure.describe().contains("boom"));
    }

    #[test]
    fn test_panic_message_payloads() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("static str");
        assert_eq!(panic_message(payload.as_ref()), "static str");

        let payload: Box<dyn std::any::Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(payload.as_ref()), "owned");

        let payload: Box<dyn std::any::Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic payload");
    }
}
