//! # switchboard - In-process Event Broker
//!
//! `switchboard` connects the events plugins publish to the actions other
//! plugins (or the user) registered. Plugins never talk to each other
//! directly: they declare what they can do, and the user wires events to
//! actions through subscriptions that can be exported and restored.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use switchboard::{Callback, EventBroker, Payload};
//!
//! let broker = EventBroker::new();
//! broker.register_action("panel", "refresh", Callback::new(|_| redraw()));
//! broker.subscribe_to("clock", "tick", "panel", "refresh");
//!
//! broker.publish("clock", "tick", None);
//! ```
//!
//! ## Declaring Plugins
//!
//! With the `macros` feature, an inherent `impl` block becomes a capability
//! descriptor:
//!
//! ```rust,ignore
//! #[switchboard::capabilities(events = ["tick"])]
//! impl Clock {
//!     fn reset(&self, payload: Option<&Payload>) { ... }
//! }
//!
//! broker.register_plugin_instance("clock", &Arc::new(Clock::default()));
//! ```
//!
//! ## Persistence
//!
//! [`EventBroker::export_config`] produces a [`ConfigSnapshot`] of custom
//! actions and subscriptions. Custom actions are rebuilt on import through
//! named factories registered with [`EventBroker::register_factory`].

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub use switchboard_core::{
    // Callbacks
    ActionHandler,
    // Error types
    BoxError,
    BrokerError,
    Callback,
    CallbackError,
    // Declaration
    Capabilities,
    IntoOutcome,
    // Values
    Payload,
    PayloadError,
    // Host
    PluginHost,
    PluginKind,
    ReconstructionError,
    normalize,
    payload_eq,
    structural_eq,
};

pub use switchboard_std::{
    // Registries
    Action,
    ActionSource,
    // Persistence
    ActionRef,
    // Configuration
    BrokerConfig,
    CUSTOM_ACTION_OWNER,
    CallbackFactory,
    ConfigSnapshot,
    CustomActionRecord,
    // Dispatch
    DeliveryFailure,
    Event,
    // Broker
    EventBroker,
    EventRef,
    FactoryRegistry,
    PayloadMatching,
    PublishReport,
    ResetSummary,
    // Subscriptions
    Subscription,
    SubscriptionId,
    SubscriptionRecord,
    SubscriptionRequest,
};

/// Registry and table types backing the broker.
pub mod registry {
    pub use switchboard_std::{ActionRegistry, EventRegistry, SubscriptionTable};
}

/// Delivery strategies for published events.
pub mod delivery {
    pub use switchboard_std::{DeliveryFailure, PublishReport, SequentialDelivery};
}

/// Testing utilities.
pub mod testing {
    #![allow(clippy::wildcard_imports)]
    pub use switchboard_std::testing::*;
}

/// Prelude module - common imports for Switchboard.
///
/// # Usage
///
/// ```rust,ignore
/// use switchboard::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Callbacks
        ActionHandler,
        // Errors
        BoxError,
        BrokerError,
        Callback,
        // Declaration
        Capabilities,
        // Broker
        EventBroker,
        // Values
        Payload,
        SubscriptionRequest,
    };
}

#[cfg(feature = "macros")]
pub use switchboard_macros::capabilities;

#[cfg(feature = "inventory")]
pub use switchboard_std::submit_factory;

#[cfg(feature = "inventory")]
pub use inventory;
