//! Registration handshake between a loaded module and the host

use std::fmt;
use std::sync::Arc;

use crate::{Plugin, PluginError};

/// Zero-argument constructor for one declared type
pub type PluginFactory = Arc<dyn Fn() -> Result<Box<dyn Plugin>, PluginError> + Send + Sync>;

/// Signature of a module's registration entry point
pub type RegisterFn = fn(&mut ModuleRegistrar);

/// A type a module declares at load time
#[derive(Clone)]
pub struct DeclaredType {
    /// Declaration name (the type name plugins are reported under)
    pub name: String,
    /// Contracts or sibling declarations this type directly implements
    pub bases: Vec<String>,
    /// Builds a fresh instance
    pub factory: PluginFactory,
}

impl DeclaredType {
    /// Whether `base` is one of the direct bases
    pub fn extends(&self, base: &str) -> bool {
        self.bases.iter().any(|b| b == base)
    }

    /// Run the factory
    pub fn instantiate(&self) -> Result<Box<dyn Plugin>, PluginError> {
        (self.factory)()
    }
}

impl fmt::Debug for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeclaredType")
            .field("name", &self.name)
            .field("bases", &self.bases)
            .finish_non_exhaustive()
    }
}

/// Collects the declarations of one module.
///
/// Declaration order is preserved; it is the order instances are created in.
#[derive(Debug, Default)]
pub struct ModuleRegistrar {
    declarations: Vec<DeclaredType>,
}

impl ModuleRegistrar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a default-constructible type implementing `bases`
    pub fn declare<T>(&mut self, name: &str, bases: &[&str]) -> &mut Self
    where
        T: Plugin + Default + 'static,
    {
        self.declare_with(name, bases, || Ok(Box::new(T::default()) as Box<dyn Plugin>))
    }

    /// Declare a type with a custom (possibly failing) factory
    pub fn declare_with<F>(&mut self, name: &str, bases: &[&str], factory: F) -> &mut Self
    where
        F: Fn() -> Result<Box<dyn Plugin>, PluginError> + Send + Sync + 'static,
    {
        self.declarations.push(DeclaredType {
            name: name.to_string(),
            bases: bases.iter().map(|b| (*b).to_string()).collect(),
            factory: Arc::new(factory),
        });
        self
    }

    /// Number of declarations so far
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Consume the registrar, yielding declarations in declaration order
    pub fn into_declarations(self) -> Vec<DeclaredType> {
        self.declarations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Echo;

    impl Plugin for Echo {
        fn id(&self) -> Option<&str> {
            Some("echo")
        }
    }

    #[test]
    fn test_registrar_preserves_order() {
        let mut registrar = ModuleRegistrar::new();
        registrar
            .declare::<Echo>("First", &["base"])
            .declare::<Echo>("Second", &["First"]);

        let names: Vec<String> = registrar
            .into_declarations()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["First", "Second"]);
    }

    #[test]
    fn test_declared_type_extends() {
        let mut registrar = ModuleRegistrar::new();
        registrar.declare::<Echo>("Echo", &["base", "other"]);
        let decl = &registrar.into_declarations()[0];

        assert!(decl.extends("base"));
        assert!(decl.extends("other"));
        assert!(!decl.extends("Echo"));
    }

    #[test]
    fn test_declare_instantiates_default() {
        let mut registrar = ModuleRegistrar::new();
        registrar.declare::<Echo>("Echo", &["base"]);
        let decl = &registrar.into_declarations()[0];

        let plugin = decl.instantiate().unwrap();
        assert_eq!(plugin.id(), Some("echo"));
    }

    #[test]
    fn test_declare_with_failing_factory() {
        let mut registrar = ModuleRegistrar::new();
        registrar.declare_with("Broken", &["base"], || {
            Err(PluginError::construction("no backing device"))
        });
        assert_eq!(registrar.len(), 1);

        let decl = &registrar.into_declarations()[0];
        let err = decl.instantiate().err().unwrap();
        assert!(err.to_string().contains("no backing device"));
    }

    #[test]
    fn test_empty_registrar() {
        let registrar = ModuleRegistrar::new();
        assert!(registrar.is_empty());
        assert!(registrar.into_declarations().is_empty());
    }
}
