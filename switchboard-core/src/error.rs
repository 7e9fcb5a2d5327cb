//! Error types for Switchboard.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`BrokerError`] - Top-level error type for broker operations
//! - [`CallbackError`] - Errors raised by subscribed callbacks
//! - [`ReconstructionError`] - Errors rebuilding persisted custom actions
//! - [`PayloadError`] - Errors converting payloads to persisted data

use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for broker operations.
#[derive(Error, Debug)]
pub enum BrokerError {
    /// The action a subscription points at is not registered.
    #[error("action ({owner}, {name}) not found")]
    ActionNotFound {
        /// Owner id of the missing action.
        owner: String,
        /// Name of the missing action.
        name: String,
    },

    /// The event a subscription points at is not registered and
    /// auto-registration is disabled.
    #[error("event ({owner}, {name}) not found")]
    EventNotFound {
        /// Owner id of the missing event.
        owner: String,
        /// Name of the missing event.
        name: String,
    },

    /// A custom action could not be rebuilt from its persisted form.
    #[error("reconstruction error: {0}")]
    Reconstruction(#[from] ReconstructionError),

    /// A custom error occurred.
    #[error(transparent)]
    Custom(BoxError),
}

/// Errors raised while a subscribed callback runs.
#[derive(Error, Debug)]
pub enum CallbackError {
    /// The callback returned an error.
    #[error("callback failed: {0}")]
    Failed(#[source] BoxError),

    /// The callback panicked.
    #[error("callback panicked: {0}")]
    Panic(String),
}

/// Errors rebuilding a custom action from a persisted record.
#[derive(Error, Debug)]
pub enum ReconstructionError {
    /// No factory is registered under the given name.
    #[error("no callback factory named '{0}'")]
    UnknownFactory(String),

    /// The factory rejected its arguments.
    #[error("factory '{factory}' failed")]
    Factory {
        /// Name of the factory that failed.
        factory: String,
        /// The underlying failure.
        #[source]
        source: BoxError,
    },
}

/// Errors converting a payload into persisted data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PayloadError {
    /// The payload contains a value that has no data representation.
    #[error("payload is not persistable: {0}")]
    NotPersistable(&'static str),
}

// Convenience conversions
impl From<BoxError> for BrokerError {
    fn from(err: BoxError) -> Self {
        BrokerError::Custom(err)
    }
}

impl From<BoxError> for CallbackError {
    fn from(err: BoxError) -> Self {
        CallbackError::Failed(err)
    }
}
