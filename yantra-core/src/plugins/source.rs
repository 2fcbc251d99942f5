//! Module sources - how a directory turns into loadable modules

use std::any::Any;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use yantra_plugin_api::DeclaredType;

use super::error::ModuleLoadError;

/// Keeps a module's code alive for as long as anything created from it exists
pub type ModuleGuard = Arc<dyn Any + Send + Sync>;

/// A module candidate found during discovery
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleDescriptor {
    /// Module name, derived from the file name
    pub name: String,
    /// Path of the module file
    pub location: PathBuf,
}

impl ModuleDescriptor {
    /// Build a descriptor named after the file stem
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_stem()?.to_str()?.to_string();
        if name.is_empty() {
            return None;
        }
        Some(Self {
            name,
            location: path.to_path_buf(),
        })
    }

    /// Location as used for error map keys
    pub fn location_key(&self) -> String {
        self.location.display().to_string()
    }
}

/// The result of loading one module
#[derive(Debug)]
pub struct LoadedModule {
    pub descriptor: ModuleDescriptor,
    /// Declarations in the order the module made them
    pub declarations: Vec<DeclaredType>,
    /// Handle that must outlive every instance built from `declarations`
    pub guard: Option<ModuleGuard>,
}

/// Resolves a directory into modules and loads them.
///
/// Implementations must be deterministic: `discover` returns descriptors in a
/// stable order for an unchanged directory.
pub trait ModuleSource: Send + Sync {
    /// Find every loadable module under `root`, recursively.
    ///
    /// A missing or unreadable root yields no descriptors.
    fn discover(&self, root: &Path) -> Vec<ModuleDescriptor>;

    /// Load one module and collect its declarations
    fn load(&self, module: &ModuleDescriptor) -> Result<LoadedModule, ModuleLoadError>;
}

/// Walk `root` recursively and collect files whose extension is in
/// `extensions`, sorted by path.
///
/// Directory symlinks are not followed.
pub fn discover_modules(root: &Path, extensions: &[&str]) -> Vec<ModuleDescriptor> {
    if !root.is_dir() {
        tracing::debug!(dir = %root.display(), "Plugin directory does not exist");
        return Vec::new();
    }

    let mut found = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "Skipping unreadable directory");
                continue;
            }
        };

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(dir = %dir.display(), error = %e, "Skipping unreadable entry");
                    continue;
                }
            };
            let path = entry.path();

            if entry.file_type().is_ok_and(|t| t.is_dir()) {
                pending.push(path);
                continue;
            }

            if path.is_file()
                && has_extension(&path, extensions)
                && let Some(descriptor) = ModuleDescriptor::from_path(&path)
            {
                found.push(descriptor);
            }
        }
    }

    found.sort_by(|a, b| a.location.cmp(&b.location));
    found
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|wanted| ext.eq_ignore_ascii_case(wanted)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_missing_directory_yields_nothing() {
        let modules = discover_modules(Path::new("/nonexistent/plugins"), &["plugin"]);
        assert!(modules.is_empty());
    }

    #[test]
    fn test_root_that_is_a_file_yields_nothing() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("single.plugin");
        touch(&file);

        assert!(discover_modules(&file, &["plugin"]).is_empty());
    }

    #[test]
    fn test_walks_nested_directories() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("top.plugin"));
        touch(&dir.path().join("a/one.plugin"));
        touch(&dir.path().join("a/b/c/deep.plugin"));
        touch(&dir.path().join("z/last.plugin"));

        let names: Vec<String> = discover_modules(dir.path(), &["plugin"])
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, vec!["deep", "one", "top", "last"]);
    }

    #[test]
    fn test_filters_by_extension() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("keep.plugin"));
        touch(&dir.path().join("KEEP2.PLUGIN"));
        touch(&dir.path().join("notes.txt"));
        touch(&dir.path().join("no_extension"));

        let modules = discover_modules(dir.path(), &["plugin"]);
        assert_eq!(modules.len(), 2);
        assert!(modules.iter().all(|m| m.location.starts_with(dir.path())));
    }

    #[test]
    fn test_ordering_is_deterministic() {
        let dir = TempDir::new().unwrap();
        for name in ["c", "a", "b"] {
            touch(&dir.path().join(format!("{name}.plugin")));
        }

        let first = discover_modules(dir.path(), &["plugin"]);
        let second = discover_modules(dir.path(), &["plugin"]);
        assert_eq!(first, second);
        assert_eq!(first[0].name, "a");
        assert_eq!(first[2].name, "c");
    }

    #[test]
    fn test_descriptor_from_path() {
        let descriptor = ModuleDescriptor::from_path(Path::new("/p/greeter.plugin")).unwrap();
        assert_eq!(descriptor.name, "greeter");
        assert_eq!(descriptor.location_key(), "/p/greeter.plugin");
    }
}
