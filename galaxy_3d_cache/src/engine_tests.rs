//! Unit tests for the Engine singleton
//!
//! ENGINE_STATE and LOGGER are process-wide, so every test runs under
//! #[serial].

use crate::galaxy3d::{Engine, Error};
use crate::galaxy3d::log::{Logger, LogEntry, LogSeverity};
use crate::parameter::ParameterLayout;
use std::sync::{Arc, Mutex};
use serial_test::serial;

// ============================================================================
// TEST HELPERS
// ============================================================================

/// Test logger that captures log entries for verification
struct TestLogger {
    entries: Arc<Mutex<Vec<String>>>,
}

impl Logger for TestLogger {
    fn log(&self, entry: &LogEntry) {
        let mut entries = self.entries.lock().unwrap();
        entries.push(format!("{:?}: {}", entry.severity, entry.message));
    }
}

fn capture_logs() -> Arc<Mutex<Vec<String>>> {
    let entries = Arc::new(Mutex::new(Vec::new()));
    Engine::set_logger(TestLogger { entries: entries.clone() });
    entries
}

// ============================================================================
// INITIALIZATION AND SHUTDOWN TESTS
// ============================================================================

#[test]
#[serial]
fn test_engine_initialize_is_idempotent() {
    Engine::initialize().unwrap();
    let registry = Engine::component_registry().unwrap();

    Engine::initialize().unwrap();
    assert!(Arc::ptr_eq(&registry, &Engine::component_registry().unwrap()));
    assert!(Engine::is_initialized());
}

#[test]
#[serial]
fn test_registries_built_on_initialize() {
    Engine::initialize().unwrap();

    assert_eq!(Engine::component_registry().unwrap().len(), 6);
    assert!(Engine::component_registry().unwrap().reflector("PhysicsMaterial").is_some());
    assert_eq!(Engine::load_tasks().unwrap().len(), 4);
    assert!(ParameterLayout::global().id("SaveJob::Materials").is_some());
}

#[test]
#[serial]
fn test_shutdown_clears_state() {
    Engine::initialize().unwrap();
    let file_system = Engine::file_system().unwrap();
    Engine::shutdown();

    assert!(!Engine::is_initialized());
    assert!(matches!(Engine::component_registry(), Err(Error::InitializationFailed(_))));
    assert!(matches!(Engine::load_tasks(), Err(Error::InitializationFailed(_))));
    assert!(matches!(Engine::file_system(), Err(Error::InitializationFailed(_))));
    // Handles taken before shutdown stay usable
    assert!(file_system.search_roots().is_empty());

    Engine::initialize().unwrap();
    assert!(!Arc::ptr_eq(&file_system, &Engine::file_system().unwrap()));
}

#[test]
#[serial]
fn test_file_system_shared() {
    Engine::initialize().unwrap();
    let dir = tempfile::tempdir().unwrap();

    Engine::file_system().unwrap().add_search_root(dir.path());
    assert_eq!(Engine::file_system().unwrap().search_roots().len(), 1);

    Engine::file_system().unwrap().clear();
}

// ============================================================================
// LOGGING TESTS
// ============================================================================

#[test]
#[serial]
fn test_custom_logger_receives_entries() {
    let entries = capture_logs();

    Engine::log(LogSeverity::Info, "galaxy3d::Test", "hello".to_string());
    Engine::log_detailed(LogSeverity::Error, "galaxy3d::Test", "boom".to_string(), file!(), line!());

    let entries_snapshot = entries.lock().unwrap().clone();
    Engine::reset_logger();
    assert_eq!(entries_snapshot, vec!["Info: hello", "Error: boom"]);
}

#[test]
#[serial]
fn test_uninitialized_access_is_logged() {
    Engine::shutdown();
    let entries = capture_logs();

    let _ = Engine::component_registry();

    let entries_snapshot = entries.lock().unwrap().clone();
    Engine::reset_logger();
    assert_eq!(entries_snapshot.len(), 1);
    assert!(entries_snapshot[0].starts_with("Error: Engine not initialized"));
}

#[test]
#[serial]
fn test_logging_before_initialize() {
    Engine::shutdown();
    let entries = capture_logs();
    crate::engine_warn!("galaxy3d::Test", "{} entries", 3);
    let count = entries.lock().unwrap().len();
    Engine::reset_logger();
    assert_eq!(count, 1);
}
