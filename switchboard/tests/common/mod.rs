#![allow(dead_code)]

use std::sync::Once;
use switchboard::{Callback, EventBroker, testing::RecordingAction};
use tracing_subscriber::EnvFilter;

// ============================================================================
// Tracing
// ============================================================================

static TRACING: Once = Once::new();

/// Route broker logs to the test output. Honours `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .with_test_writer()
            .try_init();
    });
}

// ============================================================================
// Fixtures
// ============================================================================

/// A broker with tracing wired up.
pub fn broker() -> EventBroker {
    init_tracing();
    EventBroker::new()
}

/// Register a recording action under `(owner, name)` and return the recorder.
pub fn recorded(broker: &EventBroker, owner: &str, name: &str) -> RecordingAction {
    let recorder = RecordingAction::new();
    broker.register_action(owner, name, recorder.callback());
    recorder
}

/// A callback factory producing no-op callbacks, whatever the arguments.
pub fn noop_factory() -> switchboard::CallbackFactory {
    switchboard::CallbackFactory::new(|_| Ok(Callback::noop()))
}
