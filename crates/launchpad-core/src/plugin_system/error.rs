//! # Launchpad Plugin System Errors
//!
//! Defines error types specific to the Launchpad plugin system.
//!
//! [`PluginSystemError`] is the primary enum for everything that can go wrong
//! while discovering resources, reading their manifests, initializing
//! language loaders and building plugin containers. Only [`NotFound`],
//! [`InvalidState`] and root-level [`Io`] failures abort a pipeline call;
//! the other variants are logged per resource or per loader and the run
//! continues with whatever is left.
//!
//! [`NotFound`]: PluginSystemError::NotFound
//! [`InvalidState`]: PluginSystemError::InvalidState
//! [`Io`]: PluginSystemError::Io
// crates/launchpad-core/src/plugin_system/error.rs
use std::any::Any;
use std::path::PathBuf;

use crate::plugin_system::loader::LoaderState;
use crate::plugin_system::version::VersionError;

#[derive(Debug, thiserror::Error)]
pub enum PluginSystemError {
    #[error("Plugin root not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("Malformed resource '{}': {message}", .path.display())]
    MalformedResource { path: PathBuf, message: String },

    #[error("Language loader '{loader}' failed to initialize: {message}")]
    LoaderInitialization { loader: String, message: String },

    #[error("Language loader '{loader}' could not create a container for '{}': {message}", .resource.display())]
    ContainerCreation {
        loader: String,
        resource: PathBuf,
        message: String,
    },

    #[error("Cannot {operation} in state {actual}; expected {expected}")]
    InvalidState {
        operation: &'static str,
        expected: LoaderState,
        actual: LoaderState,
    },

    #[error("I/O error during operation '{operation}' on path '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Version parsing error: {0}")]
    VersionParsing(#[from] VersionError),
}

// Helper for creating Io errors, ensuring path is always included.
impl PluginSystemError {
    pub fn io(source: std::io::Error, operation: impl Into<String>, path: PathBuf) -> Self {
        PluginSystemError::Io {
            source,
            operation: operation.into(),
            path,
        }
    }

    /// Whether the error only concerns a single resource or loader, i.e. the
    /// pipeline logs it and keeps going.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PluginSystemError::MalformedResource { .. }
                | PluginSystemError::LoaderInitialization { .. }
                | PluginSystemError::ContainerCreation { .. }
        )
    }
}

/// Text carried by a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
