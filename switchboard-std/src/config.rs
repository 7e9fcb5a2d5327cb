//! Broker configuration.

use serde::{Deserialize, Serialize};

/// How a published payload is matched against subscribed event variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadMatching {
    /// Payloads must be structurally equal. A variant declared without a
    /// payload only matches publishes without a payload.
    #[default]
    Exact,
    /// A variant declared without a payload matches every publish of its
    /// event id. Variants with a payload still require structural equality.
    Lenient,
}

impl PayloadMatching {
    /// Returns `true` if a variant with `declared` payload should receive a
    /// publish whose payload compared as `equal`.
    pub(crate) fn accepts(self, declared_is_absent: bool, equal: bool) -> bool {
        match self {
            PayloadMatching::Exact => equal,
            PayloadMatching::Lenient => declared_is_absent || equal,
        }
    }
}

/// Configuration for an [`EventBroker`](crate::EventBroker).
///
/// # Example
///
/// ```rust,ignore
/// let config = BrokerConfig::new()
///     .with_payload_matching(PayloadMatching::Lenient)
///     .with_isolate_panics(false);
/// let broker = EventBroker::with_config(config);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    /// Payload matching rule used by `publish`.
    pub payload_matching: PayloadMatching,
    /// Catch panics raised by callbacks and report them like errors.
    pub isolate_panics: bool,
    /// Create a missing event when a subscription names it.
    pub auto_register_events: bool,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl BrokerConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self {
            payload_matching: PayloadMatching::Exact,
            isolate_panics: true,
            auto_register_events: true,
        }
    }

    /// Set the payload matching rule.
    pub fn with_payload_matching(mut self, matching: PayloadMatching) -> Self {
        self.payload_matching = matching;
        self
    }

    /// Set whether callback panics are caught.
    pub fn with_isolate_panics(mut self, isolate: bool) -> Self {
        self.isolate_panics = isolate;
        self
    }

    /// Set whether subscribing to an unknown event registers it.
    pub fn with_auto_register_events(mut self, auto_register: bool) -> Self {
        self.auto_register_events = auto_register;
        self
    }
}
