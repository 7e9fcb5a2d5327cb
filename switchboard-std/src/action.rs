//! Action registry.
//!
//! Actions are keyed by `(owner, name)`. Registering an existing key is a
//! no-op that hands back the action already stored.

use std::{collections::BTreeMap, fmt, sync::Arc};
use switchboard_core::{Callback, Payload};

/// Owner id grouping actions that no plugin instance owns.
pub const CUSTOM_ACTION_OWNER: &str = "customUserActions";

/// Where a custom action's callback came from.
///
/// Only actions built by a named factory can be persisted and rebuilt.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionSource {
    /// Name of the factory that built the callback.
    pub factory: String,
    /// Arguments passed to the factory.
    pub args: Option<Payload>,
}

struct ActionInner {
    owner: String,
    name: String,
    id: String,
    callback: Callback,
    source: Option<ActionSource>,
}

/// A registered action.
///
/// Cloning is cheap; clones refer to the same registration.
#[derive(Clone)]
pub struct Action(Arc<ActionInner>);

impl Action {
    pub(crate) fn new(
        owner: &str,
        name: &str,
        callback: Callback,
        source: Option<ActionSource>,
    ) -> Self {
        Self(Arc::new(ActionInner {
            owner: owner.to_string(),
            name: name.to_string(),
            id: Self::generate_id(owner, name),
            callback,
            source,
        }))
    }

    /// The derived id, `owner[name]`.
    pub fn generate_id(owner: &str, name: &str) -> String {
        format!("{owner}[{name}]")
    }

    /// Id of the plugin that owns this action.
    pub fn owner(&self) -> &str {
        &self.0.owner
    }

    /// Action name.
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Derived id, `owner[name]`.
    pub fn id(&self) -> &str {
        &self.0.id
    }

    /// The callable run when a subscribed event is published.
    pub fn callback(&self) -> &Callback {
        &self.0.callback
    }

    /// The factory source, for actions that can be persisted.
    pub fn source(&self) -> Option<&ActionSource> {
        self.0.source.as_ref()
    }

    /// Returns `true` for user-authored actions.
    pub fn is_custom(&self) -> bool {
        self.0.owner == CUSTOM_ACTION_OWNER
    }

    /// Returns `true` when both handles refer to the same registration.
    pub fn same(&self, other: &Action) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("id", &self.0.id)
            .field("source", &self.0.source)
            .finish()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.id)
    }
}

/// Actions keyed by owner id, then by name.
#[derive(Default)]
pub struct ActionRegistry {
    actions: BTreeMap<String, BTreeMap<String, Action>>,
}

impl ActionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action, or return the one already stored under the key.
    pub fn register(
        &mut self,
        owner: &str,
        name: &str,
        callback: Callback,
        source: Option<ActionSource>,
    ) -> Action {
        let owned = self.actions.entry(owner.to_string()).or_default();
        if let Some(existing) = owned.get(name) {
            tracing::debug!(action = %existing.id(), "action already exists");
            return existing.clone();
        }

        let action = Action::new(owner, name, callback, source);
        owned.insert(name.to_string(), action.clone());
        tracing::debug!(action = %action.id(), "registered action");
        action
    }

    /// Look up an action.
    pub fn find(&self, owner: &str, name: &str) -> Option<&Action> {
        self.actions.get(owner)?.get(name)
    }

    /// Remove an action, dropping the owner bucket once it is empty.
    pub fn remove(&mut self, owner: &str, name: &str) -> Option<Action> {
        let owned = self.actions.get_mut(owner)?;
        let removed = owned.remove(name);
        if owned.is_empty() {
            self.actions.remove(owner);
        }
        removed
    }

    /// Keep only the owners for which `keep` returns `true`.
    ///
    /// Returns the number of actions dropped.
    pub fn retain_owners(&mut self, mut keep: impl FnMut(&str) -> bool) -> usize {
        let mut dropped = 0;
        self.actions.retain(|owner, owned| {
            let retained = keep(owner.as_str());
            if !retained {
                dropped += owned.len();
            }
            retained
        });
        dropped
    }

    /// Iterate over every action, ordered by owner then name.
    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.actions.values().flat_map(BTreeMap::values)
    }

    /// Iterate over the actions of one owner.
    pub fn owned_by<'a>(&'a self, owner: &str) -> impl Iterator<Item = &'a Action> + use<'a> {
        self.actions.get(owner).into_iter().flat_map(BTreeMap::values)
    }

    /// Iterate over actions with the given name, across all owners.
    pub fn named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Action> + 'a {
        self.actions.values().filter_map(move |owned| owned.get(name))
    }

    /// Number of registered actions.
    pub fn len(&self) -> usize {
        self.actions.values().map(BTreeMap::len).sum()
    }

    /// Check if no action is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
