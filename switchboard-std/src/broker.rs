//! The event broker.
//!
//! [`EventBroker`] owns the action registry, the event registry and the
//! subscription table, and is the only way plugins reach them. All state
//! sits behind one coarse lock. `publish` snapshots the matched
//! subscriptions, releases the lock and then runs the callbacks, so a
//! callback may call back into the broker.
//!
//! # Example
//!
//! ```rust,ignore
//! let broker = Arc::new(EventBroker::new());
//!
//! broker.register_action("panel", "refresh", Callback::new(|_| redraw()));
//! broker.register_event("clock", "tick", None);
//! broker.subscribe_to("clock", "tick", "panel", "refresh");
//!
//! broker.publish("clock", "tick", None);
//! ```

use crate::{
    action::{Action, ActionRegistry, ActionSource, CUSTOM_ACTION_OWNER},
    config::BrokerConfig,
    delivery::{PublishReport, SequentialDelivery},
    event::{Event, EventRegistry},
    factory::{CallbackFactory, FactoryRegistry},
    subscription::{Subscription, SubscriptionId, SubscriptionRequest, SubscriptionTable},
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use switchboard_core::{BrokerError, Callback, Capabilities, Payload, normalize, normalize_ref};

#[derive(Default)]
pub(crate) struct BrokerState {
    pub(crate) actions: ActionRegistry,
    pub(crate) events: EventRegistry,
    pub(crate) subscriptions: SubscriptionTable,
    pub(crate) factories: FactoryRegistry,
}

/// In-process publish/subscribe broker wiring plugin events to actions.
#[derive(Default)]
pub struct EventBroker {
    config: BrokerConfig,
    state: Mutex<BrokerState>,
}

impl EventBroker {
    /// Create a broker with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a broker with the given configuration.
    pub fn with_config(config: BrokerConfig) -> Self {
        Self {
            config,
            state: Mutex::default(),
        }
    }

    /// The broker's configuration.
    pub fn config(&self) -> &BrokerConfig {
        &self.config
    }

    // A callback panicking while the lock is held cannot happen (callbacks
    // run unlocked), so a poisoned lock still holds consistent state.
    pub(crate) fn state(&self) -> MutexGuard<'_, BrokerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ---- Actions ----

    /// Register an action. Returns the existing action if `(owner, name)`
    /// is already registered.
    pub fn register_action(&self, owner: &str, name: &str, callback: Callback) -> Action {
        self.state().actions.register(owner, name, callback, None)
    }

    /// Register a user-authored action that belongs to no plugin.
    pub fn register_custom_action(&self, name: &str, callback: Callback) -> Action {
        self.register_action(CUSTOM_ACTION_OWNER, name, callback)
    }

    /// Register a factory that persisted custom actions can be rebuilt with.
    pub fn register_factory(
        &self,
        name: impl Into<String>,
        factory: CallbackFactory,
    ) -> Option<CallbackFactory> {
        self.state().factories.register(name, factory)
    }

    /// Register an action whose callback is built by a named factory.
    ///
    /// Such actions remember their source and are included in
    /// [`export_config`](Self::export_config) when they are custom actions.
    pub fn register_action_from(
        &self,
        owner: &str,
        name: &str,
        factory: &str,
        args: Option<Payload>,
    ) -> Result<Action, BrokerError> {
        if let Some(existing) = self.find_action(owner, name) {
            tracing::debug!(action = %existing.id(), "action already exists");
            return Ok(existing);
        }

        // Factories run unlocked, like callbacks.
        let registry = self.state().factories.clone();
        let callback = registry.build(factory, args.as_ref())?;
        let source = ActionSource {
            factory: factory.to_string(),
            args,
        };
        Ok(self
            .state()
            .actions
            .register(owner, name, callback, Some(source)))
    }

    /// Register a custom action built by a named factory.
    pub fn register_custom_action_from(
        &self,
        name: &str,
        factory: &str,
        args: Option<Payload>,
    ) -> Result<Action, BrokerError> {
        self.register_action_from(CUSTOM_ACTION_OWNER, name, factory, args)
    }

    /// Remove a custom action. Returns whether anything was removed.
    ///
    /// Subscriptions pointing at the action are left in place.
    pub fn remove_custom_action(&self, name: &str) -> bool {
        match self.state().actions.remove(CUSTOM_ACTION_OWNER, name) {
            Some(_) => {
                tracing::info!(action = name, "removed custom action");
                true
            }
            None => {
                tracing::warn!(action = name, "custom action not found");
                false
            }
        }
    }

    /// Look up an action.
    pub fn find_action(&self, owner: &str, name: &str) -> Option<Action> {
        tracing::trace!(owner, name, "finding action");
        self.state().actions.find(owner, name).cloned()
    }

    // ---- Events ----

    /// Register an event variant. An empty list payload counts as none;
    /// an existing variant with an equal payload is returned as is.
    pub fn register_event(&self, owner: &str, name: &str, payload: Option<Payload>) -> Event {
        self.state().events.register(owner, name, payload)
    }

    /// Find the variant of `(owner, name)` whose payload equals `payload`.
    pub fn find_event(&self, owner: &str, name: &str, payload: Option<&Payload>) -> Option<Event> {
        tracing::trace!(owner, name, "finding event");
        self.state().events.find(owner, name, payload).cloned()
    }

    // ---- Plugins ----

    /// Register every action and event a plugin instance declares.
    pub fn register_plugin_instance<P: Capabilities>(&self, owner: &str, instance: &Arc<P>) -> bool {
        let events = instance.events();
        let actions = Arc::clone(instance).actions();
        self.register_plugin_actions(owner, actions, events)
    }

    /// Register an explicit list of actions and event names for a plugin.
    pub fn register_plugin_actions<A, E>(&self, owner: &str, actions: A, events: E) -> bool
    where
        A: IntoIterator<Item = (String, Callback)>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        let mut state = self.state();
        for (name, callback) in actions {
            state.actions.register(owner, &name, callback, None);
        }
        for name in events {
            state.events.register(owner, name.as_ref(), None);
        }
        tracing::debug!(owner, "registered plugin instance");
        true
    }

    // ---- Subscriptions ----

    /// Subscribe an action to an event variant.
    ///
    /// The action must exist. A missing event is registered on the fly
    /// unless auto-registration is disabled. Subscribing the same pair
    /// twice returns the existing subscription's id.
    pub fn try_subscribe(&self, request: SubscriptionRequest) -> Result<SubscriptionId, BrokerError> {
        let SubscriptionRequest {
            event_owner,
            event_name,
            action_owner,
            action_name,
            payload,
            name,
        } = request;
        let payload = normalize(payload);
        tracing::debug!(
            event_owner = %event_owner,
            event_name = %event_name,
            action_owner = %action_owner,
            action_name = %action_name,
            "subscribing"
        );

        let mut state = self.state();

        // Resolve the action first so a missing action never leaves a
        // freshly created event behind.
        let Some(action) = state.actions.find(&action_owner, &action_name).cloned() else {
            tracing::error!(owner = %action_owner, name = %action_name, "action not found");
            return Err(BrokerError::ActionNotFound {
                owner: action_owner,
                name: action_name,
            });
        };

        let found = state
            .events
            .find(&event_owner, &event_name, payload.as_ref())
            .cloned();
        let event = match found {
            Some(event) => event,
            None if self.config.auto_register_events => {
                tracing::warn!(
                    owner = %event_owner,
                    name = %event_name,
                    "event not found, creating a new one"
                );
                state.events.register(&event_owner, &event_name, payload)
            }
            None => {
                tracing::error!(owner = %event_owner, name = %event_name, "event not found");
                return Err(BrokerError::EventNotFound {
                    owner: event_owner,
                    name: event_name,
                });
            }
        };

        if let Some(existing) = state.subscriptions.find_link(&event, &action) {
            tracing::warn!(
                event = %event.id(),
                action = %action.id(),
                "subscription already exists"
            );
            return Ok(existing.id());
        }

        let subscription = Subscription::new(event, action, name);
        let id = subscription.id();
        tracing::debug!(subscription = %subscription.name(), %id, "subscribed");
        state.subscriptions.push(subscription);
        Ok(id)
    }

    /// Subscribe an action to an event variant. Returns `false` only when
    /// the subscription could not be created.
    pub fn subscribe(&self, request: SubscriptionRequest) -> bool {
        self.try_subscribe(request).is_ok()
    }

    /// Positional form of [`subscribe`](Self::subscribe) for the
    /// payload-less variant of an event.
    pub fn subscribe_to(
        &self,
        event_owner: &str,
        event_name: &str,
        action_owner: &str,
        action_name: &str,
    ) -> bool {
        self.subscribe(SubscriptionRequest::new(
            event_owner,
            event_name,
            action_owner,
            action_name,
        ))
    }

    /// Make sure a subscription no longer exists.
    ///
    /// `event_owner` is first compared with the ids of stored
    /// subscriptions, so a subscription id can be passed there directly.
    /// Otherwise the event variant and action are resolved by name and
    /// their link is removed. Always returns `true`.
    pub fn unsubscribe(
        &self,
        event_owner: &str,
        event_name: &str,
        action_owner: &str,
        action_name: &str,
        payload: Option<&Payload>,
    ) -> bool {
        tracing::debug!(
            event_owner,
            event_name,
            action_owner,
            action_name,
            "unsubscribing"
        );
        let mut state = self.state();

        if let Some(removed) = state.subscriptions.remove_by_id(event_owner) {
            tracing::debug!(subscription = %removed.name(), "removed subscription by id");
            return true;
        }

        let event = state.events.find(event_owner, event_name, payload).cloned();
        let action = state.actions.find(action_owner, action_name).cloned();
        if let (Some(event), Some(action)) = (event, action) {
            if let Some(removed) = state.subscriptions.remove_link(&event, &action) {
                tracing::debug!(subscription = %removed.name(), "removed subscription");
            }
        }
        true
    }

    /// Remove a subscription by id, returning it if it existed.
    pub fn remove_subscription(&self, id: SubscriptionId) -> Option<Subscription> {
        self.state().subscriptions.remove_by_id(&id.to_string())
    }

    // ---- Dispatch ----

    /// Publish an event, invoking every matched subscription's callback in
    /// subscription order. Callback failures are logged and do not stop
    /// delivery. Always returns `true`.
    pub fn publish(&self, owner: &str, name: &str, payload: Option<&Payload>) -> bool {
        self.publish_report(owner, name, payload);
        true
    }

    /// Like [`publish`](Self::publish), but reports what happened.
    pub fn publish_report(&self, owner: &str, name: &str, payload: Option<&Payload>) -> PublishReport {
        let event_id = Event::generate_id(owner, name);
        let payload = normalize_ref(payload);
        let span = tracing::debug_span!("publish", event = %event_id);
        let _enter = span.enter();

        let targets: Vec<Subscription> = self
            .state()
            .subscriptions
            .matching(&event_id, payload, self.config.payload_matching)
            .cloned()
            .collect();
        tracing::debug!(matched = targets.len(), "dispatching");

        SequentialDelivery::new(self.config.isolate_panics).deliver(payload, &targets)
    }

    // ---- Introspection ----

    /// Snapshot of every registered action.
    pub fn actions(&self) -> Vec<Action> {
        self.state().actions.iter().cloned().collect()
    }

    /// Snapshot of every action with this name, across owners.
    pub fn actions_named(&self, name: &str) -> Vec<Action> {
        self.state().actions.named(name).cloned().collect()
    }

    /// Snapshot of every registered event variant.
    pub fn events(&self) -> Vec<Event> {
        self.state().events.iter().cloned().collect()
    }

    /// Snapshot of every event variant with this name, across owners.
    pub fn events_named(&self, name: &str) -> Vec<Event> {
        self.state().events.named(name).cloned().collect()
    }

    /// Snapshot of every subscription in dispatch order.
    pub fn subscriptions(&self) -> Vec<Subscription> {
        self.state().subscriptions.iter().cloned().collect()
    }

    /// Number of registered actions.
    pub fn action_count(&self) -> usize {
        self.state().actions.len()
    }

    /// Number of registered event variants.
    pub fn event_count(&self) -> usize {
        self.state().events.len()
    }

    /// Number of subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.state().subscriptions.len()
    }
}
