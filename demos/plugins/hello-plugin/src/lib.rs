//! Hello Plugin - a drop-in module for the `greeters` plugin type
//!
//! This module demonstrates:
//! - Registering types with the `export_module!` macro
//! - Re-declaring the contract alongside implementers (it is never instantiated)
//! - A transitive implementer (`LoudGreeter` extends `Greeter`)
//! - A factory that can fail with an I/O error
//!
//! ## Building
//!
//! ```bash
//! cargo build --release
//! ```
//!
//! ## Installing
//!
//! ```bash
//! mkdir -p ~/.config/yantra/plugins/greeters
//! cp target/release/libhello_plugin.so ~/.config/yantra/plugins/greeters/
//! yantra config add greeters greeter --user
//! yantra plugin list greeters
//! ```

use yantra_plugin_api::{ModuleRegistrar, Plugin, PluginError, export_module};

/// Contract name shared with the host's `greeters` plugin type
pub const GREETER: &str = "greeter";

/// Says hello.
#[derive(Default)]
pub struct Greeter;

impl Plugin for Greeter {
    fn id(&self) -> Option<&str> {
        Some("hello")
    }

    fn description(&self) -> Option<&str> {
        Some("Greets politely")
    }
}

/// Says hello, louder.
#[derive(Default)]
pub struct LoudGreeter;

impl Plugin for LoudGreeter {
    fn id(&self) -> Option<&str> {
        Some("HELLO")
    }

    fn description(&self) -> Option<&str> {
        Some("Greets in capitals")
    }
}

/// Greets with the first line of the file `HELLO_GREETING_FILE` names.
pub struct FileGreeter {
    greeting: String,
}

impl FileGreeter {
    fn from_env() -> Result<Self, PluginError> {
        let path = std::env::var_os("HELLO_GREETING_FILE")
            .ok_or_else(|| PluginError::config("HELLO_GREETING_FILE is not set"))?;
        let contents = std::fs::read_to_string(path)?;
        Ok(Self {
            greeting: contents.lines().next().unwrap_or_default().to_string(),
        })
    }
}

impl Plugin for FileGreeter {
    fn id(&self) -> Option<&str> {
        Some("hello-file")
    }

    fn description(&self) -> Option<&str> {
        Some(&self.greeting)
    }
}

#[derive(Default)]
struct Contract;

impl Plugin for Contract {}

fn register(registrar: &mut ModuleRegistrar) {
    registrar
        .declare::<Contract>(GREETER, &[])
        .declare::<Greeter>("Greeter", &[GREETER])
        .declare::<LoudGreeter>("LoudGreeter", &["Greeter"]);

    // Only declared when configured; an unreadable file discards the module
    if std::env::var_os("HELLO_GREETING_FILE").is_some() {
        registrar.declare_with("FileGreeter", &[GREETER], || {
            Ok(Box::new(FileGreeter::from_env()?) as Box<dyn Plugin>)
        });
    }
}

export_module!(register);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_declares_contract_and_implementers() {
        let mut registrar = ModuleRegistrar::new();
        register(&mut registrar);

        let names: Vec<String> = registrar
            .into_declarations()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names[..3], [GREETER, "Greeter", "LoudGreeter"]);
    }

    #[test]
    fn test_loud_greeter_extends_greeter() {
        let mut registrar = ModuleRegistrar::new();
        register(&mut registrar);
        let declarations = registrar.into_declarations();

        let loud = declarations.iter().find(|d| d.name == "LoudGreeter").unwrap();
        assert!(loud.extends("Greeter"));
        assert!(!loud.extends(GREETER));
    }
}
