//! # switchboard-core
//!
//! Core types for the Switchboard in-process event broker.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! plugins that only need to declare what they can do, without pulling in
//! the broker itself.
//!
//! # Building Blocks
//!
//! ## Values ([`Payload`])
//!
//! Events carry an optional structured payload. Two payloads are "the same"
//! when they are structurally equal ([`structural_eq`]); that comparison is
//! what deduplicates event variants and what matches a published payload
//! against subscribed ones.
//!
//! ## Behaviour ([`Callback`])
//!
//! Actions are plain callables taking the published payload. A [`Callback`]
//! is a cheap, clonable handle around one.
//!
//! ## Declaration ([`Capabilities`])
//!
//! Plugins describe the actions and events they expose through an explicit
//! capability descriptor instead of being reflected over at runtime.
//!
//! ## Host ([`PluginHost`])
//!
//! The platform that loads plugins. The broker only asks it which plugins
//! exist and which of them are core components.
//!
//! # Error Types
//!
//! - [`BrokerError`] - Top-level error type
//! - [`CallbackError`] - A subscribed callback failed during dispatch
//! - [`ReconstructionError`] - A persisted custom action could not be rebuilt
//! - [`PayloadError`] - A payload cannot be converted to persisted data

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod callback;
mod capability;
mod error;
mod host;
mod payload;

// Re-exports
pub use callback::{ActionHandler, Callback, IntoOutcome};
pub use capability::Capabilities;
pub use error::{BoxError, BrokerError, CallbackError, PayloadError, ReconstructionError};
pub use host::{PluginHost, PluginKind};
pub use payload::{Payload, normalize, normalize_ref, payload_eq, structural_eq};
