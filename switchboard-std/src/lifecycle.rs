//! Lifecycle management.
//!
//! Plugins never unregister. When the host resets the system, the broker
//! asks it which core plugins are still loaded and drops everything that
//! belongs to anyone else.

use crate::broker::EventBroker;
use std::collections::HashSet;
use switchboard_core::PluginHost;

/// What a reset removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResetSummary {
    /// Actions dropped.
    pub actions: usize,
    /// Event variants dropped.
    pub events: usize,
    /// Subscriptions dropped.
    pub subscriptions: usize,
}

impl EventBroker {
    /// Drop every action, event and subscription not owned by a core
    /// plugin the host still has loaded.
    ///
    /// A subscription survives only if both its event and its action
    /// belong to such a plugin. Custom actions are dropped too, since their
    /// owner id is never a loaded plugin.
    pub fn reset_system(&self, host: &dyn PluginHost) -> ResetSummary {
        let core = host.core_plugins();
        tracing::debug!(core = core.len(), "resetting broker");
        self.retain_owners(&core)
    }

    /// Drop everything whose owner is not in `owners`.
    pub fn retain_owners(&self, owners: &HashSet<String>) -> ResetSummary {
        let mut state = self.state();
        let subscriptions = state.subscriptions.retain(|sub| {
            owners.contains(sub.event().owner()) && owners.contains(sub.action().owner())
        });
        let actions = state.actions.retain_owners(|owner| owners.contains(owner));
        let events = state.events.retain_owners(|owner| owners.contains(owner));

        let summary = ResetSummary {
            actions,
            events,
            subscriptions,
        };
        tracing::info!(
            actions = summary.actions,
            events = summary.events,
            subscriptions = summary.subscriptions,
            "pruned broker state"
        );
        summary
    }
}
