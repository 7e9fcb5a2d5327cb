//! # switchboard-std
//!
//! Standard implementations for the Switchboard event broker.
//!
//! This crate provides:
//! - **Registries**: [`ActionRegistry`], [`EventRegistry`]
//! - **Subscriptions**: [`SubscriptionTable`], [`SubscriptionRequest`]
//! - **Dispatch**: [`EventBroker`] and its [`SequentialDelivery`] loop
//! - **Lifecycle**: [`EventBroker::reset_system`]
//! - **Persistence**: [`ConfigSnapshot`] and [`FactoryRegistry`]
//! - **Testing utilities**: [`testing`]

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core types
pub use switchboard_core;

// Modules
pub mod action;
pub mod broker;
pub mod config;
pub mod delivery;
pub mod event;
pub mod factory;
pub mod lifecycle;
pub mod persistence;
pub mod subscription;
pub mod testing;

pub use action::{Action, ActionRegistry, ActionSource, CUSTOM_ACTION_OWNER};
pub use broker::EventBroker;
pub use config::{BrokerConfig, PayloadMatching};
pub use delivery::{DeliveryFailure, PublishReport, SequentialDelivery};
pub use event::{Event, EventRegistry};
pub use factory::{CallbackFactory, FactoryRegistry};
pub use lifecycle::ResetSummary;
pub use persistence::{ActionRef, ConfigSnapshot, CustomActionRecord, EventRef, SubscriptionRecord};
pub use subscription::{Subscription, SubscriptionId, SubscriptionRequest, SubscriptionTable};

#[cfg(feature = "inventory")]
pub use inventory;
