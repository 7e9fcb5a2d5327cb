//! Testing utilities for Switchboard.
//!
//! This module provides utilities to make testing subscriptions and
//! dispatch easier.
//!
//! # Features
//!
//! - [`RecordingAction`]: An action that records every payload it receives
//! - [`CountingAction`]: An action that counts invocations
//! - [`SequenceRecorder`]: Labelled callbacks sharing one log, for ordering
//! - [`FailingAction`]: An action that errors or panics on every call
//! - [`StaticHost`]: An in-memory plugin host

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};
use switchboard_core::{ActionHandler, BoxError, Callback, Payload, PluginHost, PluginKind};

// ============================================================================
// Recording Action
// ============================================================================

/// An action that records every payload it receives.
///
/// # Example
///
/// ```rust,ignore
/// let recorder = RecordingAction::new();
/// broker.register_action("p1", "record", recorder.callback());
///
/// broker.publish("p1", "tick", Some(&payload));
///
/// assert_eq!(recorder.count(), 1);
/// ```
#[derive(Clone, Default)]
pub struct RecordingAction {
    payloads: Arc<Mutex<Vec<Option<Payload>>>>,
}

impl RecordingAction {
    /// Create a new recording action.
    pub fn new() -> Self {
        Self::default()
    }

    /// A callback feeding this recorder.
    pub fn callback(&self) -> Callback {
        Callback::from_action(self.clone())
    }

    /// Get a clone of the recorded payloads.
    pub fn payloads(&self) -> Vec<Option<Payload>> {
        self.payloads.lock().unwrap().clone()
    }

    /// Get the number of recorded calls.
    pub fn count(&self) -> usize {
        self.payloads.lock().unwrap().len()
    }

    /// Clear all recorded payloads.
    pub fn clear(&self) {
        self.payloads.lock().unwrap().clear();
    }
}

impl ActionHandler for RecordingAction {
    fn invoke(&self, payload: Option<&Payload>) -> Result<(), BoxError> {
        self.payloads.lock().unwrap().push(payload.cloned());
        Ok(())
    }
}

// ============================================================================
// Counting Action
// ============================================================================

/// An action that counts invocations.
#[derive(Clone, Default)]
pub struct CountingAction {
    count: Arc<AtomicUsize>,
}

impl CountingAction {
    /// Create a new counting action.
    pub fn new() -> Self {
        Self::default()
    }

    /// A callback incrementing this counter.
    pub fn callback(&self) -> Callback {
        let count = self.count.clone();
        Callback::new(move |_| {
            count.fetch_add(1, Ordering::SeqCst);
        })
    }

    /// Get the current count.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Reset the counter.
    pub fn reset(&self) {
        self.count.store(0, Ordering::SeqCst);
    }
}

// ============================================================================
// Sequence Recorder
// ============================================================================

/// Hands out labelled callbacks that append their label to a shared log.
#[derive(Clone, Default)]
pub struct SequenceRecorder {
    log: Arc<Mutex<Vec<String>>>,
}

impl SequenceRecorder {
    /// Create a new recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// A callback that logs `label` when invoked.
    pub fn callback(&self, label: impl Into<String>) -> Callback {
        let log = self.log.clone();
        let label = label.into();
        Callback::new(move |_| log.lock().unwrap().push(label.clone()))
    }

    /// The labels logged so far, in call order.
    pub fn sequence(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

// ============================================================================
// Failing Action
// ============================================================================

/// An action that fails on every call.
#[derive(Clone, Debug)]
pub enum FailingAction {
    /// Return an error with this message.
    Error(String),
    /// Panic with this message.
    Panic(String),
}

impl FailingAction {
    /// A callback that returns an error.
    pub fn error(message: impl Into<String>) -> Callback {
        Callback::from_action(FailingAction::Error(message.into()))
    }

    /// A callback that panics.
    pub fn panic(message: impl Into<String>) -> Callback {
        Callback::from_action(FailingAction::Panic(message.into()))
    }
}

impl ActionHandler for FailingAction {
    fn invoke(&self, _payload: Option<&Payload>) -> Result<(), BoxError> {
        match self {
            FailingAction::Error(message) => Err(message.clone().into()),
            FailingAction::Panic(message) => panic!("{message}"),
        }
    }
}

// ============================================================================
// Static Host
// ============================================================================

/// An in-memory [`PluginHost`].
#[derive(Clone, Debug, Default)]
pub struct StaticHost {
    plugins: Vec<(String, PluginKind)>,
}

impl StaticHost {
    /// Create a host with no plugins loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a core plugin.
    pub fn with_core(self, id: impl Into<String>) -> Self {
        self.with_plugin(id, "core")
    }

    /// Add a plugin with the given declared type.
    pub fn with_plugin(mut self, id: impl Into<String>, declared_type: &str) -> Self {
        self.plugins.push((id.into(), PluginKind::parse(declared_type)));
        self
    }

    /// Unload a plugin.
    pub fn unload(&mut self, id: &str) {
        self.plugins.retain(|(loaded, _)| loaded != id);
    }
}

impl PluginHost for StaticHost {
    fn plugin_ids(&self) -> Vec<String> {
        self.plugins.iter().map(|(id, _)| id.clone()).collect()
    }

    fn plugin_kind(&self, id: &str) -> Option<PluginKind> {
        self.plugins
            .iter()
            .find(|(loaded, _)| loaded == id)
            .map(|(_, kind)| kind.clone())
    }
}
