//! Concurrency tests for PluginRegistry
//!
//! These tests validate that per-container locking works correctly:
//! - Concurrent readers of a stale type cause exactly one reload
//! - Readers never see a partially replaced plugin list

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use tempfile::TempDir;
use yantra_core::{PluginRegistry, PluginType, StaticSource};
use yantra_plugin_api::{ModuleRegistrar, Plugin};

const BASE: &str = "Worker";

#[derive(Default)]
struct Worker;

impl Plugin for Worker {}

/// Source whose factories count every construction
fn counting_source(modules: &[&'static str], constructed: &Arc<AtomicUsize>) -> StaticSource {
    let mut source = StaticSource::new();
    for &name in modules {
        let counter = Arc::clone(constructed);
        source.register_module(name, move |r: &mut ModuleRegistrar| {
            let counter = Arc::clone(&counter);
            r.declare_with(name, &[BASE], move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Box::new(Worker) as Box<dyn Plugin>)
            });
        });
    }
    source
}

fn create_test_registry(
    dir: &TempDir,
    modules: &[&'static str],
) -> (Arc<PluginRegistry>, PluginType, Arc<AtomicUsize>) {
    for name in modules {
        std::fs::write(dir.path().join(format!("{name}.plugin")), b"").unwrap();
    }
    let constructed = Arc::new(AtomicUsize::new(0));
    let plugin_type = PluginType::new("workers", BASE, dir.path());
    let registry = PluginRegistry::with_types(
        Arc::new(counting_source(modules, &constructed)),
        [plugin_type.clone()],
    )
    .unwrap();
    (Arc::new(registry), plugin_type, constructed)
}

#[test]
fn concurrent_readers_of_stale_type_reload_once() {
    let dir = TempDir::new().unwrap();
    let (registry, plugin_type, constructed) =
        create_test_registry(&dir, &["alpha", "beta", "gamma", "delta"]);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let registry = Arc::clone(&registry);
            let plugin_type = plugin_type.clone();
            thread::spawn(move || registry.get_plugins(&plugin_type).unwrap())
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    // One reload builds each of the four workers exactly once
    assert_eq!(constructed.load(Ordering::SeqCst), 4);

    let first = &results[0];
    for result in &results {
        assert_eq!(result.len(), 4, "Readers should never see a partial list");
        assert!(result.iter().zip(first).all(|(a, b)| a.ptr_eq(b)));
    }
}

#[test]
fn concurrent_error_reads_are_serialised() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("unknown.plugin"), b"").unwrap();
    let (registry, plugin_type, _) = create_test_registry(&dir, &["alpha", "beta"]);

    thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                let errors = registry.get_errors(&[&plugin_type]).unwrap();
                assert_eq!(errors.len(), 1);
                let plugins = registry.get_plugins(&plugin_type).unwrap();
                assert_eq!(plugins.len(), 2);
            });
        }
    });
}
