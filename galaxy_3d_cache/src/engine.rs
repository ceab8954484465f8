/// Galaxy3D Engine - process-wide services of the resource cache
///
/// `Engine::initialize()` is the explicit startup routine: it builds the
/// component registry, the load task registry, reserves the save job slots
/// of the parameter layout and creates the shared file-system search
/// service. The logger lives outside that state, so logging works before
/// initialization and after shutdown.

use std::sync::{Arc, OnceLock};
use std::time::SystemTime;
use parking_lot::RwLock;
use crate::component::ComponentRegistry;
use crate::error::Result;
use crate::log::{DefaultLogger, LogEntry, LogSeverity, Logger};
use crate::parameter::ParameterLayout;
use crate::path::FileSystem;
use crate::resource::{Effect, Material, PhysicsMaterial, Texture};
use crate::serialize::{Collected, LoadTaskRegistry};
use crate::{engine_bail, engine_info};

// ===== INTERNAL STATE =====

/// Global engine state storage
static ENGINE_STATE: OnceLock<RwLock<Option<EngineState>>> = OnceLock::new();

/// Global logger (initialized with DefaultLogger)
static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

/// Services built by `initialize`
struct EngineState {
    component_registry: Arc<ComponentRegistry>,
    load_tasks: Arc<LoadTaskRegistry>,
    file_system: Arc<FileSystem>,
}

impl EngineState {
    fn build() -> Result<Self> {
        let layout = ParameterLayout::global();
        for slot in [
            PhysicsMaterial::SLOT,
            Material::SLOT,
            Texture::SLOT,
            Effect::SLOT,
        ] {
            layout.register(slot);
        }

        Ok(Self {
            component_registry: Arc::new(ComponentRegistry::with_builtin()?),
            load_tasks: Arc::new(LoadTaskRegistry::with_builtin()?),
            file_system: Arc::new(FileSystem::new()),
        })
    }
}

fn state() -> &'static RwLock<Option<EngineState>> {
    ENGINE_STATE.get_or_init(|| RwLock::new(None))
}

fn logger() -> &'static RwLock<Box<dyn Logger>> {
    LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)))
}

// ===== PUBLIC API =====

/// Main engine singleton manager
///
/// # Example
///
/// ```no_run
/// use galaxy_3d_cache::galaxy3d::Engine;
///
/// Engine::initialize()?;
/// Engine::file_system()?.add_search_root("assets");
/// let reflector = Engine::component_registry()?.reflector("Material");
///
/// Engine::shutdown();
/// # Ok::<(), galaxy_3d_cache::galaxy3d::Error>(())
/// ```
pub struct Engine;

impl Engine {
    /// Initialize the engine
    ///
    /// Calling it again while initialized is a no-op.
    ///
    /// # Errors
    ///
    /// Propagates registry construction failures (duplicate built-ins,
    /// load job prerequisites that cannot be ordered).
    pub fn initialize() -> Result<()> {
        let mut lock = state().write();
        if lock.is_some() {
            return Ok(());
        }
        let built = EngineState::build()?;
        built.load_tasks.ordered()?;
        engine_info!("galaxy3d::Engine", "Engine initialized: {} component type(s), {} load job(s)",
            built.component_registry.len(), built.load_tasks.len());
        *lock = Some(built);
        Ok(())
    }

    /// Drop the registries and the file system
    ///
    /// Handles obtained earlier stay valid until dropped. Parameter slot
    /// names are never unregistered.
    pub fn shutdown() {
        if state().write().take().is_some() {
            engine_info!("galaxy3d::Engine", "Engine shut down");
        }
    }

    pub fn is_initialized() -> bool {
        state().read().is_some()
    }

    /// Registry of the component reflectors
    ///
    /// # Errors
    ///
    /// `InitializationFailed` before `initialize()` or after `shutdown()`.
    pub fn component_registry() -> Result<Arc<ComponentRegistry>> {
        Self::with_state(|state| state.component_registry.clone())
    }

    /// Registry of the load jobs
    pub fn load_tasks() -> Result<Arc<LoadTaskRegistry>> {
        Self::with_state(|state| state.load_tasks.clone())
    }

    /// Shared file-system search service
    pub fn file_system() -> Result<Arc<FileSystem>> {
        Self::with_state(|state| state.file_system.clone())
    }

    fn with_state<R>(f: impl FnOnce(&EngineState) -> R) -> Result<R> {
        match state().read().as_ref() {
            Some(state) => Ok(f(state)),
            None => engine_bail!(InitializationFailed => "galaxy3d::Engine",
                "Engine not initialized. Call Engine::initialize() first."),
        }
    }

    // ===== LOGGING API =====

    /// Set a custom logger
    ///
    /// Replace the default logger with a custom implementation (editor
    /// console, file logger, test capture...).
    ///
    /// # Example
    ///
    /// ```no_run
    /// use galaxy_3d_cache::galaxy3d::{Engine, log::{Logger, LogEntry}};
    ///
    /// struct FileLogger;
    /// impl Logger for FileLogger {
    ///     fn log(&self, entry: &LogEntry) {
    ///         // Write to file...
    ///     }
    /// }
    ///
    /// Engine::set_logger(FileLogger);
    /// ```
    pub fn set_logger<L: Logger + 'static>(logger_impl: L) {
        *logger().write() = Box::new(logger_impl);
    }

    /// Reset logger to default (DefaultLogger)
    pub fn reset_logger() {
        *logger().write() = Box::new(DefaultLogger);
    }

    /// Internal logging method (for simple logs without file:line)
    ///
    /// Used by macros like engine_info!, engine_warn!, etc.
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        logger().read().log(&LogEntry {
            severity,
            timestamp: SystemTime::now(),
            source: source.to_string(),
            message,
            file: None,
            line: None,
        });
    }

    /// Internal logging method with file:line information (for ERROR logs)
    ///
    /// Used by engine_error! macro to include source location.
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        logger().read().log(&LogEntry {
            severity,
            timestamp: SystemTime::now(),
            source: source.to_string(),
            message,
            file: Some(file),
            line: Some(line),
        });
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
