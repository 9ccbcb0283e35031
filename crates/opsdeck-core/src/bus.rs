//! Typed in-process event bus.
//!
//! Replaces scope-tree broadcasts with an explicit channel: payloads
//! are declared per event variant and delivery is synchronous, in
//! subscription order, completing before `publish` returns. Listener
//! registration is paired with a handle so teardown is enforced rather
//! than leaked.

use crate::types::Persona;

// ─── Events ──────────────────────────────────────────────────────

/// Console-wide notifications. Delivered synchronously to every
/// current listener; a `SwitchedPersona` listener must treat the event
/// as "discard identity-scoped state and reload".
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleEvent {
    SwitchedPersona(Persona),
    CurrentPersonaLoaded(Persona),
    OrganizationCreated,
    OrganizationRemoved,
}

// ─── Bus ─────────────────────────────────────────────────────────

/// Opaque handle pairing a subscription with its removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerHandle(u64);

type Listener = Box<dyn FnMut(&ConsoleEvent) + Send>;

/// Synchronous publish/subscribe channel for [`ConsoleEvent`].
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<(u64, Listener)>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a listener; keep the handle to unsubscribe later.
    pub fn subscribe(&mut self, listener: Listener) -> ListenerHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.listeners.push((id, listener));
        ListenerHandle(id)
    }

    /// Remove a listener. Returns `false` if the handle was already
    /// unsubscribed.
    pub fn unsubscribe(&mut self, handle: ListenerHandle) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(id, _)| *id != handle.0);
        self.listeners.len() < before
    }

    /// Deliver `event` to every listener, in subscription order. All
    /// listeners have run by the time this returns.
    pub fn publish(&mut self, event: &ConsoleEvent) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

// ─── Tests ───────────────────────────────────────────────────────
