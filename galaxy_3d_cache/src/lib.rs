/*!
# Galaxy 3D Cache

Resource caching, component reflection and XML serialization for the
Galaxy3D engine.

## Architecture

- **PathResolver / ContentProvider**: logical name to absolute path, path to
  bytes plus a revision stamp
- **ResourceCache**: per-kind store with unique name and file bindings,
  revision-checked reloads, replace and a dependency graph
- **ResourceManager**: the set of caches a subsystem needs, sharing one
  device and one change monitor
- **ComponentReflector**: one protocol over every resource kind, reached by
  type name through the ComponentRegistry
- **ParameterSet**: typed slots carrying context through reflectors and
  serialization jobs
- **Serialization**: save sessions draining singleton jobs, load sessions
  running prerequisite-ordered jobs

Call `galaxy3d::Engine::initialize()` once at startup to build the registries.
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod cache;
pub mod component;
pub mod content;
pub mod device;
pub mod parameter;
pub mod path;
pub mod resource;
pub mod serialize;
pub mod xml;

// Main galaxy3d namespace module
pub mod galaxy3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine singleton
    pub use crate::engine::Engine;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    pub mod cache {
        pub use crate::cache::*;
    }

    pub mod component {
        pub use crate::component::*;
    }

    pub mod content {
        pub use crate::content::*;
    }

    pub mod device {
        pub use crate::device::*;
    }

    pub mod parameter {
        pub use crate::parameter::*;
    }

    pub mod path {
        pub use crate::path::*;
    }

    pub mod resource {
        pub use crate::resource::*;
    }

    pub mod serialize {
        pub use crate::serialize::*;
    }

    pub use crate::xml::XmlNode;
}

// Re-export math library at crate root
pub use glam;
