//! Subscription table.
//!
//! An ordered list of `(event variant, action, name)` links. Order is
//! insertion order and is the order callbacks run in when an event is
//! published.

use crate::{action::Action, config::PayloadMatching, event::Event};
use std::fmt;
use switchboard_core::{Payload, payload_eq};
use uuid::Uuid;

/// Opaque identifier generated when a subscription is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

/// A link from an event variant to an action.
#[derive(Debug, Clone)]
pub struct Subscription {
    id: SubscriptionId,
    event: Event,
    action: Action,
    name: String,
}

impl Subscription {
    pub(crate) fn new(event: Event, action: Action, name: Option<String>) -> Self {
        let name = name.unwrap_or_else(|| Self::default_name(&event, &action));
        Self {
            id: SubscriptionId::generate(),
            event,
            action,
            name,
        }
    }

    /// The name given to a subscription created without one.
    pub fn default_name(event: &Event, action: &Action) -> String {
        format!("{}_{}", event.id(), action.id())
    }

    /// The subscription's generated id.
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// The subscribed event variant.
    pub fn event(&self) -> &Event {
        &self.event
    }

    /// The action run on publish.
    pub fn action(&self) -> &Action {
        &self.action
    }

    /// Subscription name, caller supplied or derived.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` if this subscription links exactly these two entities.
    pub fn links(&self, event: &Event, action: &Action) -> bool {
        self.event.same(event) && self.action.same(action)
    }
}

/// Everything needed to subscribe an action to an event.
///
/// # Example
///
/// ```rust,ignore
/// let request = SubscriptionRequest::new("clock", "tick", "panel", "refresh")
///     .with_payload(Payload::object([("every", 5)]))
///     .with_name("refresh panel on tick");
/// broker.subscribe(request);
/// ```
#[derive(Debug, Clone)]
pub struct SubscriptionRequest {
    /// Owner id of the event.
    pub event_owner: String,
    /// Event name.
    pub event_name: String,
    /// Owner id of the action.
    pub action_owner: String,
    /// Action name.
    pub action_name: String,
    /// Payload identifying the event variant.
    pub payload: Option<Payload>,
    /// Subscription name. Derived from the ids when unset.
    pub name: Option<String>,
}

impl SubscriptionRequest {
    /// Create a request for the payload-less variant of an event.
    pub fn new(
        event_owner: impl Into<String>,
        event_name: impl Into<String>,
        action_owner: impl Into<String>,
        action_name: impl Into<String>,
    ) -> Self {
        Self {
            event_owner: event_owner.into(),
            event_name: event_name.into(),
            action_owner: action_owner.into(),
            action_name: action_name.into(),
            payload: None,
            name: None,
        }
    }

    /// Target the event variant with this payload.
    pub fn with_payload(mut self, payload: impl Into<Payload>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Name the subscription.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Ordered subscription storage.
#[derive(Default)]
pub struct SubscriptionTable {
    entries: Vec<Subscription>,
}

impl SubscriptionTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a subscription.
    pub fn push(&mut self, subscription: Subscription) {
        self.entries.push(subscription);
    }

    /// The subscription linking exactly this event variant and action.
    pub fn find_link(&self, event: &Event, action: &Action) -> Option<&Subscription> {
        self.entries.iter().find(|sub| sub.links(event, action))
    }

    /// Remove the subscription whose id renders as `id`.
    pub fn remove_by_id(&mut self, id: &str) -> Option<Subscription> {
        let index = self
            .entries
            .iter()
            .position(|sub| sub.id.to_string() == id)?;
        Some(self.entries.remove(index))
    }

    /// Remove the subscription linking this event variant and action.
    pub fn remove_link(&mut self, event: &Event, action: &Action) -> Option<Subscription> {
        let index = self
            .entries
            .iter()
            .position(|sub| sub.links(event, action))?;
        Some(self.entries.remove(index))
    }

    /// Keep only the subscriptions for which `keep` returns `true`.
    ///
    /// Returns the number of subscriptions dropped.
    pub fn retain(&mut self, keep: impl FnMut(&Subscription) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(keep);
        before - self.entries.len()
    }

    /// Subscriptions that should receive a publish of `event_id` with
    /// `payload`, in insertion order.
    pub fn matching<'a>(
        &'a self,
        event_id: &'a str,
        payload: Option<&'a Payload>,
        matching: PayloadMatching,
    ) -> impl Iterator<Item = &'a Subscription> + 'a {
        self.entries.iter().filter(move |sub| {
            let declared = sub.event.payload();
            sub.event.id() == event_id
                && matching.accepts(declared.is_none(), payload_eq(payload, declared))
        })
    }

    /// Iterate over every subscription in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Subscription> {
        self.entries.iter()
    }

    /// Number of subscriptions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
