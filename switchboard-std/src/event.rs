//! Event registry.
//!
//! Events are keyed by `(owner, name)`, and each key holds a list of
//! *variants* that differ by payload. No two variants under one key have
//! structurally equal payloads.

use std::{collections::BTreeMap, fmt, sync::Arc};
use switchboard_core::{Payload, normalize, normalize_ref, payload_eq};

struct EventInner {
    owner: String,
    name: String,
    id: String,
    payload: Option<Payload>,
}

/// A declared event variant.
///
/// Cloning is cheap; clones refer to the same variant.
#[derive(Clone)]
pub struct Event(Arc<EventInner>);

impl Event {
    pub(crate) fn new(owner: &str, name: &str, payload: Option<Payload>) -> Self {
        Self(Arc::new(EventInner {
            owner: owner.to_string(),
            name: name.to_string(),
            id: Self::generate_id(owner, name),
            payload,
        }))
    }

    /// The derived id, `name[owner]`. The payload is not part of it.
    pub fn generate_id(owner: &str, name: &str) -> String {
        format!("{name}[{owner}]")
    }

    /// Id of the plugin that declared this event.
    pub fn owner(&self) -> &str {
        &self.0.owner
    }

    /// Event name.
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Derived id, `name[owner]`.
    pub fn id(&self) -> &str {
        &self.0.id
    }

    /// The payload distinguishing this variant, if any.
    pub fn payload(&self) -> Option<&Payload> {
        self.0.payload.as_ref()
    }

    /// Returns `true` when both handles refer to the same variant.
    pub fn same(&self, other: &Event) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("id", &self.0.id)
            .field("payload", &self.0.payload)
            .finish()
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.id)
    }
}

/// Event variants keyed by owner id, then by name.
#[derive(Default)]
pub struct EventRegistry {
    events: BTreeMap<String, BTreeMap<String, Vec<Event>>>,
}

impl EventRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an event variant.
    ///
    /// An empty list payload counts as no payload. If a variant with a
    /// structurally equal payload exists it is returned instead.
    pub fn register(&mut self, owner: &str, name: &str, payload: Option<Payload>) -> Event {
        let payload = normalize(payload);
        let variants = self
            .events
            .entry(owner.to_string())
            .or_default()
            .entry(name.to_string())
            .or_default();

        if let Some(existing) = variants
            .iter()
            .find(|event| payload_eq(payload.as_ref(), event.payload()))
        {
            tracing::debug!(event = %existing.id(), "event already exists");
            return existing.clone();
        }

        let event = Event::new(owner, name, payload);
        variants.push(event.clone());
        tracing::debug!(
            event = %event.id(),
            variants = variants.len(),
            "registered event"
        );
        event
    }

    /// Find the variant of `(owner, name)` whose payload equals `payload`.
    pub fn find(&self, owner: &str, name: &str, payload: Option<&Payload>) -> Option<&Event> {
        let payload = normalize_ref(payload);
        self.variants(owner, name)
            .iter()
            .find(|event| payload_eq(payload, event.payload()))
    }

    /// All variants of `(owner, name)` in registration order.
    pub fn variants(&self, owner: &str, name: &str) -> &[Event] {
        self.events
            .get(owner)
            .and_then(|named| named.get(name))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Keep only the owners for which `keep` returns `true`.
    ///
    /// Returns the number of variants dropped.
    pub fn retain_owners(&mut self, mut keep: impl FnMut(&str) -> bool) -> usize {
        let mut dropped = 0;
        self.events.retain(|owner, named| {
            let retained = keep(owner.as_str());
            if !retained {
                dropped += named.values().map(Vec::len).sum::<usize>();
            }
            retained
        });
        dropped
    }

    /// Iterate over every variant, ordered by owner then name.
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.values().flat_map(BTreeMap::values).flatten()
    }

    /// Iterate over the variants with the given name, across all owners.
    pub fn named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Event> + 'a {
        self.events
            .values()
            .filter_map(move |named| named.get(name))
            .flatten()
    }

    /// Number of registered variants.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Check if no event is registered.
    pub fn is_empty(&self) -> bool {
        self.events.values().all(|named| named.values().all(Vec::is_empty))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use switchboard_core::Callback;

    #[test]
    fn test_id_excludes_payload() {
        let event = Event::new("p1", "tick", Some(Payload::from(1)));
        assert_eq!(event.id(), "tick[p1]");
    }

    #[test]
    fn test_equal_payloads_are_deduplicated() {
        let mut registry = EventRegistry::new();
        let first = registry.register("p1", "e", Some(Payload::object([("x", 1)])));
        let second = registry.register("p1", "e", Some(Payload::object([("x", 1)])));

        assert!(first.same(&second));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_distinct_payloads_are_distinct_variants() {
        let mut registry = EventRegistry::new();
        let one = registry.register("p1", "e", Some(Payload::object([("x", 1)])));
        let two = registry.register("p1", "e", Some(Payload::object([("x", 2)])));

        assert!(!one.same(&two));
        assert_eq!(registry.variants("p1", "e").len(), 2);

        let found = registry
            .find("p1", "e", Some(&Payload::object([("x", 1)])))
            .unwrap();
        assert!(found.same(&one));
        assert!(registry.find("p1", "e", None).is_none());
    }

    #[test]
    fn test_empty_list_counts_as_no_payload() {
        let mut registry = EventRegistry::new();
        let bare = registry.register("p1", "tick", None);
        let empty = registry.register("p1", "tick", Some(Payload::List(vec![])));

        assert!(bare.same(&empty));
        assert!(empty.payload().is_none());
        assert!(registry.find("p1", "tick", Some(&Payload::List(vec![]))).is_some());
    }

    #[test]
    fn test_callable_payloads_never_deduplicate() {
        let mut registry = EventRegistry::new();
        let cb = Callback::noop();
        registry.register("p1", "e", Some(Payload::Callable(cb.clone())));
        registry.register("p1", "e", Some(Payload::Callable(cb)));

        assert_eq!(registry.variants("p1", "e").len(), 2);
    }

    #[test]
    fn test_retain_owners_drops_all_variants() {
        let mut registry = EventRegistry::new();
        registry.register("keep", "a", None);
        registry.register("drop", "a", None);
        registry.register("drop", "a", Some(Payload::from(1)));

        assert_eq!(registry.retain_owners(|owner| owner == "keep"), 2);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.named("a").count(), 1);
    }
}
