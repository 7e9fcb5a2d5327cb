//! Capability descriptors.
//!
//! A plugin tells the broker up front which actions it exposes and which
//! events it may emit. The `#[capabilities]` attribute from
//! `switchboard-macros` derives this trait from an `impl` block.

use crate::callback::Callback;
use std::sync::Arc;

/// Explicit declaration of a plugin's actions and events.
///
/// # Example
///
/// ```rust,ignore
/// struct Clock;
///
/// impl Capabilities for Clock {
///     fn actions(self: Arc<Self>) -> Vec<(String, Callback)> {
///         vec![("reset".into(), Callback::new(move |_| self.reset()))]
///     }
///
///     fn events(&self) -> Vec<String> {
///         vec!["tick".into()]
///     }
/// }
/// ```
pub trait Capabilities: Send + Sync + 'static {
    /// The actions this instance exposes, keyed by action name.
    fn actions(self: Arc<Self>) -> Vec<(String, Callback)>;

    /// The names of the events this instance may publish.
    fn events(&self) -> Vec<String> {
        Vec::new()
    }
}
