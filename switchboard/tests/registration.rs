//! Action, event and subscription registration.

mod common;

use common::{broker, recorded};
use std::sync::Arc;
use switchboard::{
    BrokerConfig, BrokerError, CUSTOM_ACTION_OWNER, Callback, Capabilities, EventBroker, Payload,
    SubscriptionRequest, testing::CountingAction,
};

#[test]
fn test_register_action_is_idempotent() {
    let broker = broker();
    let first = CountingAction::new();
    let second = CountingAction::new();
    let a = broker.register_action("P1", "ping", first.callback());
    let b = broker.register_action("P1", "ping", second.callback());

    assert!(a.same(&b));
    assert_eq!(broker.action_count(), 1);

    broker.subscribe_to("P1", "tick", "P1", "ping");
    broker.publish("P1", "tick", None);
    assert_eq!(first.count(), 1);
    assert_eq!(second.count(), 0);
}

#[test]
fn test_structurally_equal_payloads_share_a_variant() {
    let broker = broker();
    let p1 = Payload::object([("x", Payload::list([1, 2])), ("y", Payload::from("a"))]);
    let p2: Payload = serde_json::json!({"y": "a", "x": [1, 2]}).into();

    let a = broker.register_event("P1", "e", Some(p1));
    let b = broker.register_event("P1", "e", Some(p2.clone()));
    assert!(a.same(&b));
    assert!(broker.find_event("P1", "e", Some(&p2)).is_some_and(|e| e.same(&a)));
    assert_eq!(broker.event_count(), 1);
}

#[test]
fn test_distinct_payloads_make_distinct_variants() {
    let broker = broker();
    let one = Payload::object([("x", 1)]);
    let two = Payload::object([("x", 2)]);
    let first = broker.register_event("P1", "e", Some(one.clone()));
    let second = broker.register_event("P1", "e", Some(two));

    assert!(!first.same(&second));
    assert_eq!(broker.events_named("e").len(), 2);
    let found = broker.find_event("P1", "e", Some(&one)).unwrap();
    assert!(found.same(&first));
    assert!(broker.find_event("P1", "e", None).is_none());
}

#[test]
fn test_absent_and_null_payloads_differ() {
    let broker = broker();
    let absent = broker.register_event("P1", "e", None);
    let null = broker.register_event("P1", "e", Some(Payload::Null));
    let empty = broker.register_event("P1", "e", Some(Payload::List(Vec::new())));

    assert!(!absent.same(&null));
    assert!(absent.same(&empty));
    assert_eq!(broker.event_count(), 2);
}

#[test]
fn test_subscribe_twice_stores_one_subscription() {
    let broker = broker();
    recorded(&broker, "P1", "ping");

    let first = broker
        .try_subscribe(SubscriptionRequest::new("P1", "tick", "P1", "ping"))
        .unwrap();
    let second = broker
        .try_subscribe(SubscriptionRequest::new("P1", "tick", "P1", "ping").with_name("renamed"))
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(broker.subscription_count(), 1);
    assert_eq!(broker.subscriptions()[0].name(), "tick[P1]_P1[ping]");
}

#[test]
fn test_subscribe_requires_an_action() {
    let broker = broker();
    let err = broker
        .try_subscribe(SubscriptionRequest::new("P1", "tick", "P2", "missing"))
        .unwrap_err();

    assert!(matches!(
        err,
        BrokerError::ActionNotFound { ref owner, ref name } if owner == "P2" && name == "missing"
    ));
    assert!(!broker.subscribe_to("P1", "tick", "P2", "missing"));
    assert_eq!(broker.event_count(), 0);
}

#[test]
fn test_subscribe_registers_missing_events() {
    let broker = broker();
    recorded(&broker, "P1", "ping");

    assert!(broker.subscribe(
        SubscriptionRequest::new("P1", "tick", "P1", "ping").with_payload(Payload::from(3))
    ));
    let event = broker.find_event("P1", "tick", Some(&Payload::from(3)));
    assert!(event.is_some());
}

#[test]
fn test_subscribe_without_auto_registration() {
    common::init_tracing();
    let broker = EventBroker::with_config(BrokerConfig::new().with_auto_register_events(false));
    broker.register_action("P1", "ping", Callback::noop());

    let err = broker
        .try_subscribe(SubscriptionRequest::new("P1", "tick", "P1", "ping"))
        .unwrap_err();
    assert!(matches!(err, BrokerError::EventNotFound { .. }));

    broker.register_event("P1", "tick", None);
    assert!(broker.subscribe_to("P1", "tick", "P1", "ping"));
}

#[test]
fn test_unsubscribe_by_id() {
    let broker = broker();
    let ping = recorded(&broker, "P1", "ping");
    let id = broker
        .try_subscribe(SubscriptionRequest::new("P1", "tick", "P1", "ping"))
        .unwrap();

    assert!(broker.unsubscribe(&id.to_string(), "", "", "", None));
    assert_eq!(broker.subscription_count(), 0);

    broker.publish("P1", "tick", None);
    assert_eq!(ping.count(), 0);
}

#[test]
fn test_unsubscribe_unknown_succeeds() {
    let broker = broker();
    assert!(broker.unsubscribe("nobody", "nothing", "nobody", "nothing", None));
}

#[test]
fn test_unsubscribe_only_removes_matching_variant() {
    let broker = broker();
    let ping = recorded(&broker, "P1", "ping");
    let x = Payload::from("x");
    let y = Payload::from("y");
    for payload in [&x, &y] {
        broker.subscribe(
            SubscriptionRequest::new("P1", "e", "P1", "ping").with_payload(payload.clone()),
        );
    }

    broker.unsubscribe("P1", "e", "P1", "ping", Some(&x));
    assert_eq!(broker.subscription_count(), 1);

    broker.publish("P1", "e", Some(&x));
    broker.publish("P1", "e", Some(&y));
    assert_eq!(ping.payloads(), vec![Some(y)]);
}

#[test]
fn test_custom_actions() {
    let broker = broker();
    let action = broker.register_custom_action("greet", Callback::noop());
    assert_eq!(action.owner(), CUSTOM_ACTION_OWNER);
    assert_eq!(action.id(), "customUserActions[greet]");
    assert!(action.is_custom());

    assert!(broker.remove_custom_action("greet"));
    assert!(!broker.remove_custom_action("greet"));
    assert!(broker.find_action(CUSTOM_ACTION_OWNER, "greet").is_none());
}

struct Panel {
    refreshed: CountingAction,
}

impl Capabilities for Panel {
    fn actions(self: Arc<Self>) -> Vec<(String, Callback)> {
        vec![("refresh".to_string(), self.refreshed.callback())]
    }

    fn events(&self) -> Vec<String> {
        vec!["closed".to_string()]
    }
}

#[test]
fn test_register_plugin_instance() {
    let broker = broker();
    let panel = Arc::new(Panel {
        refreshed: CountingAction::new(),
    });

    assert!(broker.register_plugin_instance("panel-1", &panel));
    assert!(broker.find_action("panel-1", "refresh").is_some());
    assert!(broker.find_event("panel-1", "closed", None).is_some());

    broker.subscribe_to("panel-1", "closed", "panel-1", "refresh");
    broker.publish("panel-1", "closed", None);
    assert_eq!(panel.refreshed.count(), 1);
}

#[test]
fn test_actions_named_spans_owners() {
    let broker = broker();
    for owner in ["a", "b"] {
        broker.register_action(owner, "refresh", Callback::noop());
    }
    broker.register_action("a", "other", Callback::noop());

    let mut owners: Vec<_> = broker
        .actions_named("refresh")
        .iter()
        .map(|action| action.owner().to_string())
        .collect();
    owners.sort();
    assert_eq!(owners, vec!["a", "b"]);
}
