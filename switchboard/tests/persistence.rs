//! Exporting and importing broker configuration.

mod common;

use common::{broker, noop_factory};
use std::sync::{Arc, Mutex};
use switchboard::{
    CUSTOM_ACTION_OWNER, Callback, CallbackFactory, ConfigSnapshot, EventBroker, Payload,
    SubscriptionRequest, testing::RecordingAction,
};

/// A factory whose callbacks append their `prefix` argument to a log.
fn logging_factory(log: Arc<Mutex<Vec<String>>>) -> CallbackFactory {
    CallbackFactory::new(move |args| {
        let prefix = args
            .and_then(Payload::as_str)
            .ok_or("missing prefix")?
            .to_string();
        let log = log.clone();
        Ok(Callback::new(move |_| log.lock().unwrap().push(prefix.clone())))
    })
}

#[test]
fn test_round_trip_through_json() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let source = broker();
    source.register_factory("log", logging_factory(log.clone()));
    source
        .register_custom_action_from("shout", "log", Some(Payload::from("hey")))
        .unwrap();
    source.register_event("clock", "tick", Some(Payload::object([("every", 5)])));
    source.subscribe(
        SubscriptionRequest::new("clock", "tick", CUSTOM_ACTION_OWNER, "shout")
            .with_payload(Payload::object([("every", 5)]))
            .with_name("shout on tick"),
    );

    let json = source.export_config().to_json().unwrap();
    let snapshot = ConfigSnapshot::from_json(&json).unwrap();
    assert_eq!(snapshot.actions.len(), 1);
    assert_eq!(snapshot.subscriptions.len(), 1);

    let target = broker();
    target.register_factory("log", logging_factory(log.clone()));
    assert!(target.import_config(snapshot));

    let restored = target.subscriptions();
    assert_eq!(restored.len(), 1);
    assert_eq!(restored[0].name(), "shout on tick");
    assert_eq!(restored[0].action().id(), "customUserActions[shout]");

    target.publish("clock", "tick", Some(&Payload::object([("every", 5)])));
    assert_eq!(*log.lock().unwrap(), vec!["hey".to_string()]);
}

#[test]
fn test_plugin_subscriptions_restore_once_plugins_are_back() {
    let source = broker();
    source.register_action("panel", "refresh", Callback::noop());
    source.subscribe_to("clock", "tick", "panel", "refresh");
    let snapshot = source.export_config();

    let target = broker();
    let refresh = RecordingAction::new();
    target.register_action("panel", "refresh", refresh.callback());
    target.import_config(snapshot);

    target.publish("clock", "tick", None);
    assert_eq!(refresh.count(), 1);
}

#[test]
fn test_import_skips_what_cannot_be_rebuilt() {
    let json = r#"{
        "actions": [
            {"owner": "customUserActions", "name": "ghost", "factory": "missing"},
            {"owner": "customUserActions", "name": "quiet", "factory": "noop"}
        ],
        "subscriptions": [
            {
                "event": {"owner": "clock", "name": "tick"},
                "action": {"owner": "customUserActions", "name": "ghost"},
                "subscription_name": "lost"
            },
            {
                "event": {"owner": "clock", "name": "tick"},
                "action": {"owner": "customUserActions", "name": "quiet"},
                "subscription_name": "kept"
            }
        ]
    }"#;
    let snapshot = ConfigSnapshot::from_json(json).unwrap();

    let broker = broker();
    broker.register_factory("noop", noop_factory());
    assert!(broker.import_config(snapshot));

    assert!(broker.find_action(CUSTOM_ACTION_OWNER, "ghost").is_none());
    let names: Vec<_> = broker
        .subscriptions()
        .iter()
        .map(|sub| sub.name().to_string())
        .collect();
    assert_eq!(names, vec!["kept"]);
}

#[test]
fn test_empty_snapshot() {
    let snapshot = ConfigSnapshot::from_json("{}").unwrap();
    assert!(snapshot.is_empty());

    let broker = EventBroker::new();
    assert!(broker.import_config(snapshot));
    assert!(broker.export_config().is_empty());
}

#[test]
fn test_exported_json_shape() {
    let broker = broker();
    broker.register_action("panel", "refresh", Callback::noop());
    broker.subscribe(
        SubscriptionRequest::new("clock", "tick", "panel", "refresh").with_payload(Payload::from(1)),
    );

    let value: serde_json::Value =
        serde_json::from_str(&broker.export_config().to_json().unwrap()).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "subscriptions": [{
                "event": {"owner": "clock", "name": "tick", "payload": 1},
                "action": {"owner": "panel", "name": "refresh"},
                "subscription_name": "tick[clock]_panel[refresh]"
            }],
            "actions": []
        })
    );
}

#[test]
fn test_null_payload_survives_round_trip() {
    let source = broker();
    source.register_action("panel", "refresh", Callback::noop());
    source.subscribe(
        SubscriptionRequest::new("clock", "tick", "panel", "refresh").with_payload(Payload::Null),
    );
    let json = source.export_config().to_json().unwrap();

    let target = broker();
    let refresh = RecordingAction::new();
    target.register_action("panel", "refresh", refresh.callback());
    target.import_config(ConfigSnapshot::from_json(&json).unwrap());

    assert!(target.find_event("clock", "tick", Some(&Payload::Null)).is_some());
    assert!(target.find_event("clock", "tick", None).is_none());

    target.publish("clock", "tick", None);
    assert_eq!(refresh.count(), 0);
    target.publish("clock", "tick", Some(&Payload::Null));
    assert_eq!(refresh.payloads(), vec![Some(Payload::Null)]);
}
