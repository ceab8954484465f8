//! Error types for the Galaxy3D resource cache
//!
//! This module defines the error types used throughout the caches,
//! the component reflectors and the serialization jobs.

use std::fmt;

/// Result type for Galaxy3D cache operations
pub type Result<T> = std::result::Result<T, Error>;

/// Galaxy3D cache errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A name, file or slot lookup failed and the caller asked for a hard failure
    NotFound(String),

    /// A resource, binding or registration already exists
    AlreadyExists(String),

    /// Operation on a component with no owning cache or no reflector
    UnknownComponent(String),

    /// Required XML root, element or attribute missing or unparsable
    MalformedDocument(String),

    /// Binary payload inconsistent with its expected framing
    Deserialization(String),

    /// The underlying device refused to create a native resource
    DeviceCreation(String),

    /// A parameter slot is unregistered, unset or holds another type
    InvalidParameter(String),

    /// Engine registries used before `Engine::initialize()`
    InitializationFailed(String),

    /// File system error (reading content, writing documents)
    Io(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NotFound(msg) => write!(f, "Not found: {}", msg),
            Error::AlreadyExists(msg) => write!(f, "Already exists: {}", msg),
            Error::UnknownComponent(msg) => write!(f, "Unknown component: {}", msg),
            Error::MalformedDocument(msg) => write!(f, "Malformed document: {}", msg),
            Error::Deserialization(msg) => write!(f, "Deserialization error: {}", msg),
            Error::DeviceCreation(msg) => write!(f, "Device creation failed: {}", msg),
            Error::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::Io(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Error::NotFound(err.to_string())
        } else {
            Error::Io(err.to_string())
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
