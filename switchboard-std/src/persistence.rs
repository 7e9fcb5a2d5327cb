//! Config export and import.
//!
//! The exported [`ConfigSnapshot`] is plain data: custom actions are stored
//! as the factory that built them, subscriptions as the owner/name pairs of
//! their endpoints plus the event payload as JSON.

use crate::{action::CUSTOM_ACTION_OWNER, broker::EventBroker, subscription::SubscriptionRequest};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use switchboard_core::Payload;

/// Reference to an event variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRef {
    /// Owner id.
    pub owner: String,
    /// Event name.
    pub name: String,
    /// Payload of the variant.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub payload: Option<Value>,
}

/// Reference to an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRef {
    /// Owner id.
    pub owner: String,
    /// Action name.
    pub name: String,
}

/// A persisted subscription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    /// The subscribed event variant.
    pub event: EventRef,
    /// The subscribed action.
    pub action: ActionRef,
    /// The subscription's name.
    pub subscription_name: String,
}

/// A persisted custom action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomActionRecord {
    /// Owner id.
    pub owner: String,
    /// Action name.
    pub name: String,
    /// Name of the factory that rebuilds the callback.
    pub factory: String,
    /// Factory arguments.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub args: Option<Value>,
}

// A `null` that is present is kept as `Some(Value::Null)`; only a missing
// key reads back as `None`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Persistable broker state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    /// Subscriptions in dispatch order.
    #[serde(default)]
    pub subscriptions: Vec<SubscriptionRecord>,
    /// Custom actions.
    #[serde(default)]
    pub actions: Vec<CustomActionRecord>,
}

impl ConfigSnapshot {
    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Parse from JSON.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Returns `true` if there is nothing to restore.
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty() && self.actions.is_empty()
    }
}

impl EventBroker {
    /// Export the custom actions and subscriptions.
    ///
    /// Custom actions without a factory source and subscriptions whose
    /// event payload has no data form are left out.
    pub fn export_config(&self) -> ConfigSnapshot {
        let state = self.state();

        let actions = state
            .actions
            .owned_by(CUSTOM_ACTION_OWNER)
            .filter_map(|action| {
                let Some(source) = action.source() else {
                    tracing::debug!(action = %action.id(), "custom action has no factory, not exported");
                    return None;
                };
                let args = match source.args.as_ref().map(Payload::to_json).transpose() {
                    Ok(args) => args,
                    Err(err) => {
                        tracing::debug!(action = %action.id(), %err, "custom action not exported");
                        return None;
                    }
                };
                Some(CustomActionRecord {
                    owner: action.owner().to_string(),
                    name: action.name().to_string(),
                    factory: source.factory.clone(),
                    args,
                })
            })
            .collect();

        let subscriptions = state
            .subscriptions
            .iter()
            .filter_map(|sub| {
                let event = sub.event();
                let payload = match event.payload().map(Payload::to_json).transpose() {
                    Ok(payload) => payload,
                    Err(err) => {
                        tracing::debug!(subscription = %sub.name(), %err, "subscription not exported");
                        return None;
                    }
                };
                Some(SubscriptionRecord {
                    event: EventRef {
                        owner: event.owner().to_string(),
                        name: event.name().to_string(),
                        payload,
                    },
                    action: ActionRef {
                        owner: sub.action().owner().to_string(),
                        name: sub.action().name().to_string(),
                    },
                    subscription_name: sub.name().to_string(),
                })
            })
            .collect();

        ConfigSnapshot {
            subscriptions,
            actions,
        }
    }

    /// Restore custom actions, then subscriptions.
    ///
    /// Actions whose factory is unknown or fails are skipped. Subscriptions
    /// whose action cannot be resolved are skipped too. Always returns
    /// `true`.
    pub fn import_config(&self, snapshot: ConfigSnapshot) -> bool {
        for record in snapshot.actions {
            let args = record.args.map(Payload::from);
            if let Err(err) =
                self.register_action_from(&record.owner, &record.name, &record.factory, args)
            {
                tracing::debug!(
                    owner = %record.owner,
                    name = %record.name,
                    %err,
                    "skipping persisted action"
                );
            }
        }

        for record in snapshot.subscriptions {
            let mut request = SubscriptionRequest::new(
                record.event.owner,
                record.event.name,
                record.action.owner,
                record.action.name,
            )
            .with_name(record.subscription_name);
            request.payload = record.event.payload.map(Payload::from);

            if let Err(err) = self.try_subscribe(request) {
                tracing::warn!(%err, "persisted subscription not restored");
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::CallbackFactory;
    use switchboard_core::Callback;

    fn broker_with_factory() -> EventBroker {
        let broker = EventBroker::new();
        broker.register_factory("noop", CallbackFactory::new(|_| Ok(Callback::noop())));
        broker
    }

    #[test]
    fn test_export_skips_actions_without_source() {
        let broker = broker_with_factory();
        broker.register_custom_action("closure", Callback::noop());
        broker
            .register_custom_action_from("scripted", "noop", Some(Payload::from("x")))
            .unwrap();
        broker.register_action_from("p1", "plugin", "noop", None).unwrap();

        let snapshot = broker.export_config();
        assert_eq!(
            snapshot.actions,
            vec![CustomActionRecord {
                owner: CUSTOM_ACTION_OWNER.to_string(),
                name: "scripted".to_string(),
                factory: "noop".to_string(),
                args: Some(Value::from("x")),
            }]
        );
    }

    #[test]
    fn test_export_skips_callable_payloads() {
        let broker = EventBroker::new();
        broker.register_action("p1", "ping", Callback::noop());
        broker.subscribe(
            SubscriptionRequest::new("p1", "e", "p1", "ping")
                .with_payload(Payload::Callable(Callback::noop())),
        );
        broker.subscribe_to("p1", "tick", "p1", "ping");

        let snapshot = broker.export_config();
        assert_eq!(snapshot.subscriptions.len(), 1);
        assert_eq!(snapshot.subscriptions[0].event.name, "tick");
        assert_eq!(snapshot.subscriptions[0].subscription_name, "tick[p1]_p1[ping]");
    }

    #[test]
    fn test_import_skips_unknown_factory() {
        let broker = broker_with_factory();
        let snapshot = ConfigSnapshot {
            subscriptions: vec![],
            actions: vec![
                CustomActionRecord {
                    owner: CUSTOM_ACTION_OWNER.into(),
                    name: "lost".into(),
                    factory: "eval".into(),
                    args: Some(Value::from("alert(1)")),
                },
                CustomActionRecord {
                    owner: CUSTOM_ACTION_OWNER.into(),
                    name: "kept".into(),
                    factory: "noop".into(),
                    args: None,
                },
            ],
        };

        assert!(broker.import_config(snapshot));
        assert!(broker.find_action(CUSTOM_ACTION_OWNER, "lost").is_none());
        assert!(broker.find_action(CUSTOM_ACTION_OWNER, "kept").is_some());
    }

    #[test]
    fn test_null_and_missing_payloads_stay_distinct() {
        let json = r#"{
            "subscriptions": [
                {
                    "event": {"owner": "p1", "name": "tick", "payload": null},
                    "action": {"owner": "p1", "name": "ping"},
                    "subscription_name": "null"
                },
                {
                    "event": {"owner": "p1", "name": "tick"},
                    "action": {"owner": "p1", "name": "ping"},
                    "subscription_name": "absent"
                }
            ]
        }"#;

        let snapshot = ConfigSnapshot::from_json(json).unwrap();
        assert_eq!(snapshot.subscriptions[0].event.payload, Some(Value::Null));
        assert_eq!(snapshot.subscriptions[1].event.payload, None);

        let again = ConfigSnapshot::from_json(&snapshot.to_json().unwrap()).unwrap();
        assert_eq!(again, snapshot);
    }

    #[test]
    fn test_json_shape() {
        let json = r#"{
            "subscriptions": [{
                "event": {"owner": "p1", "name": "tick", "payload": {"x": 1}},
                "action": {"owner": "p1", "name": "ping"},
                "subscription_name": "tick to ping"
            }]
        }"#;

        let snapshot = ConfigSnapshot::from_json(json).unwrap();
        assert!(snapshot.actions.is_empty());
        assert_eq!(snapshot.subscriptions[0].action.name, "ping");

        let again = ConfigSnapshot::from_json(&snapshot.to_json().unwrap()).unwrap();
        assert_eq!(again, snapshot);
    }
}
