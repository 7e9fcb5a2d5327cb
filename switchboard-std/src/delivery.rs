//! Sequential delivery of a published payload to matched subscriptions.

use crate::subscription::{Subscription, SubscriptionId};
use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
};
use switchboard_core::{Callback, CallbackError, Payload};

/// A subscription whose callback failed during a publish.
#[derive(Debug)]
pub struct DeliveryFailure {
    /// The failed subscription.
    pub subscription: SubscriptionId,
    /// Id of the published event.
    pub event_id: String,
    /// Id of the action whose callback failed.
    pub action_id: String,
    /// What went wrong.
    pub error: CallbackError,
}

/// Outcome of a single publish.
#[derive(Debug, Default)]
pub struct PublishReport {
    /// Number of subscriptions the payload was delivered to.
    pub matched: usize,
    /// Callbacks that returned an error or panicked.
    pub failures: Vec<DeliveryFailure>,
}

impl PublishReport {
    /// Number of callbacks that completed without error.
    pub fn succeeded(&self) -> usize {
        self.matched - self.failures.len()
    }

    /// Returns `true` if no callback failed.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// A sequential delivery strategy.
///
/// Invokes callbacks one by one in the order given. A failing callback is
/// recorded and logged, then delivery moves on to the next one.
#[derive(Debug, Clone, Copy)]
pub struct SequentialDelivery {
    isolate_panics: bool,
}

impl Default for SequentialDelivery {
    fn default() -> Self {
        Self::new(true)
    }
}

impl SequentialDelivery {
    /// Create a delivery loop. With `isolate_panics` set, a panicking
    /// callback is reported like one that returned an error.
    pub fn new(isolate_panics: bool) -> Self {
        Self { isolate_panics }
    }

    /// Deliver `payload` to every target.
    pub fn deliver(&self, payload: Option<&Payload>, targets: &[Subscription]) -> PublishReport {
        let mut report = PublishReport {
            matched: targets.len(),
            failures: Vec::new(),
        };

        for sub in targets {
            if let Err(error) = self.invoke(sub.action().callback(), payload) {
                tracing::error!(
                    event = %sub.event().id(),
                    action = %sub.action().id(),
                    %error,
                    "subscription callback failed"
                );
                report.failures.push(DeliveryFailure {
                    subscription: sub.id(),
                    event_id: sub.event().id().to_string(),
                    action_id: sub.action().id().to_string(),
                    error,
                });
            }
        }
        report
    }

    fn invoke(&self, callback: &Callback, payload: Option<&Payload>) -> Result<(), CallbackError> {
        if !self.isolate_panics {
            return callback.call(payload).map_err(CallbackError::Failed);
        }
        match panic::catch_unwind(AssertUnwindSafe(|| callback.call(payload))) {
            Ok(result) => result.map_err(CallbackError::Failed),
            Err(panic) => Err(CallbackError::Panic(panic_message(panic.as_ref()))),
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
