//! Shared console state behind one mutex.
//!
//! Time window, subscription router, poll cache, event bus, and the
//! current persona live together here; poll tasks and CLI commands
//! share it through [`SharedState`]. Fetches never run while the lock
//! is held.

use std::sync::Arc;

use tokio::sync::Mutex;

use opsdeck_core::bus::EventBus;
use opsdeck_core::subscription::SubscriptionRouter;
use opsdeck_core::time_window::TimeWindowContext;
use opsdeck_core::types::Persona;

use crate::poll_cache::AlertPollCache;

pub struct ConsoleState {
    pub window: TimeWindowContext,
    pub router: SubscriptionRouter,
    pub cache: AlertPollCache,
    pub bus: EventBus,
    pub current_persona: Option<Persona>,
}

impl ConsoleState {
    pub fn new() -> Self {
        Self {
            window: TimeWindowContext::new(),
            router: SubscriptionRouter::new(),
            cache: AlertPollCache::new(),
            bus: EventBus::new(),
            current_persona: None,
        }
    }
}

impl Default for ConsoleState {
    fn default() -> Self {
        Self::new()
    }
}

pub type SharedState = Arc<Mutex<ConsoleState>>;

pub fn new_shared() -> SharedState {
    Arc::new(Mutex::new(ConsoleState::new()))
}

/// Wall clock in epoch milliseconds. The only place the runtime
/// samples time; the core takes it as a parameter.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
