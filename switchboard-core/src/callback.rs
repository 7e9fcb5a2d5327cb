//! # Callbacks
//!
//! The behaviour half of an action. A [`Callback`] receives the payload an
//! event was published with (or `None`) and either succeeds or reports an
//! error. The broker isolates each invocation, so a failing callback never
//! affects its siblings.
//!
//! # Usage Patterns
//!
//! 1. **Closure**: `Callback::new(|payload| { ... })`
//! 2. **Struct implementation**: `impl ActionHandler for MyAction`, then
//!    `Callback::from_action(MyAction)`
//! 3. **Nothing**: `Callback::noop()` for actions that only exist to be
//!    subscribed to

use crate::{error::BoxError, payload::Payload};
use std::{fmt, sync::Arc};

/// Conversion of a callable's return value into a dispatch outcome.
///
/// Implemented for `()` (always succeeds) and for `Result<(), E>` where the
/// error converts into a [`BoxError`].
pub trait IntoOutcome {
    /// Converts the value into the outcome reported to the dispatcher.
    fn into_outcome(self) -> Result<(), BoxError>;
}

impl IntoOutcome for () {
    fn into_outcome(self) -> Result<(), BoxError> {
        Ok(())
    }
}

impl<E> IntoOutcome for Result<(), E>
where
    E: Into<BoxError>,
{
    fn into_outcome(self) -> Result<(), BoxError> {
        self.map_err(Into::into)
    }
}

/// A type that can be invoked as an action.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not an `ActionHandler`",
    label = "missing `ActionHandler` implementation",
    note = "Implement `invoke`, or wrap a closure with `Callback::new`."
)]
pub trait ActionHandler: Send + Sync + 'static {
    /// Runs the action with the published payload.
    fn invoke(&self, payload: Option<&Payload>) -> Result<(), BoxError>;
}

type CallbackFn = dyn Fn(Option<&Payload>) -> Result<(), BoxError> + Send + Sync;

/// A cheaply clonable handle to an action's behaviour.
#[derive(Clone)]
pub struct Callback(Arc<CallbackFn>);

impl Callback {
    /// Wraps a closure.
    pub fn new<F, R>(f: F) -> Self
    where
        F: Fn(Option<&Payload>) -> R + Send + Sync + 'static,
        R: IntoOutcome,
    {
        let inner: Arc<CallbackFn> =
            Arc::new(move |payload: Option<&Payload>| f(payload).into_outcome());
        Self(inner)
    }

    /// Wraps an [`ActionHandler`] implementation.
    pub fn from_action<A: ActionHandler>(action: A) -> Self {
        let inner: Arc<CallbackFn> =
            Arc::new(move |payload: Option<&Payload>| action.invoke(payload));
        Self(inner)
    }

    /// A callback that does nothing.
    pub fn noop() -> Self {
        Self::new(|_| ())
    }

    /// Invokes the callback.
    pub fn call(&self, payload: Option<&Payload>) -> Result<(), BoxError> {
        (self.0)(payload)
    }

    /// Returns `true` when both handles point at the same callable.
    pub fn ptr_eq(&self, other: &Callback) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback(..)")
    }
}
