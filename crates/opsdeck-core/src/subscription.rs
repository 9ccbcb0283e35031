//! Alert subscription router: fans one shared poll result out to many
//! independently-registered consumers.
//!
//! Each consumer is keyed by `(resource_id, alert_kind)` and receives
//! its own deep copy of the result, so mutation by one consumer can
//! never leak into another's view or into the cache's stored original.
//! At most one callback lives at a key; re-registration replaces the
//! prior entry and hands it back so callers can detect collisions.

use std::collections::HashMap;

use crate::types::AlertQueryResult;

// ─── Callback & Errors ───────────────────────────────────────────

/// Failure raised inside a subscriber's callback. Isolated per
/// subscriber — one failing callback never blocks delivery to the rest.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("subscriber failed: {0}")]
pub struct SubscriberError(pub String);

/// A registered consumer. Receives an owned, independent copy of every
/// dispatched result for its resource.
pub type SubscriberCallback =
    Box<dyn FnMut(AlertQueryResult) -> Result<(), SubscriberError> + Send>;

/// Outcome of one dispatch cycle for a resource.
#[derive(Debug, Default)]
pub struct DispatchOutcome {
    /// Number of callbacks that received the result without error.
    pub delivered: usize,
    /// Per-kind failures, in invocation order. The caller decides how
    /// to log them; dispatch itself never stops early.
    pub failures: Vec<(String, SubscriberError)>,
}

// ─── Router ──────────────────────────────────────────────────────

/// Registry of alert subscribers, process-wide for the session.
///
/// Dispatch order per resource is registration order; replacing a
/// callback keeps its original slot.
#[derive(Default)]
pub struct SubscriptionRouter {
    subscriptions: HashMap<String, Vec<(String, SubscriberCallback)>>,
}

impl SubscriptionRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` for `(resource_id, kind)`.
    ///
    /// Returns the previously registered callback at that key, if any
    /// (last-writer-wins, made observable). A replaced callback keeps
    /// the slot position of the entry it replaced.
    pub fn register(
        &mut self,
        resource_id: &str,
        kind: &str,
        callback: SubscriberCallback,
    ) -> Option<SubscriberCallback> {
        let entries = self.subscriptions.entry(resource_id.to_owned()).or_default();
        if let Some(slot) = entries.iter_mut().find(|(k, _)| k == kind) {
            return Some(std::mem::replace(&mut slot.1, callback));
        }
        entries.push((kind.to_owned(), callback));
        None
    }

    /// Remove the callback at `(resource_id, kind)`, returning it if
    /// one was registered.
    pub fn unregister(&mut self, resource_id: &str, kind: &str) -> Option<SubscriberCallback> {
        let entries = self.subscriptions.get_mut(resource_id)?;
        let idx = entries.iter().position(|(k, _)| k == kind)?;
        let (_, callback) = entries.remove(idx);
        if entries.is_empty() {
            self.subscriptions.remove(resource_id);
        }
        Some(callback)
    }

    /// Deliver `result` to every subscriber registered for
    /// `resource_id`, each receiving an independent clone. Callback
    /// failures are collected, not propagated.
    pub fn dispatch(&mut self, resource_id: &str, result: &AlertQueryResult) -> DispatchOutcome {
        let mut outcome = DispatchOutcome::default();
        let Some(entries) = self.subscriptions.get_mut(resource_id) else {
            return outcome;
        };
        for (kind, callback) in entries.iter_mut() {
            match callback(result.clone()) {
                Ok(()) => outcome.delivered += 1,
                Err(e) => outcome.failures.push((kind.clone(), e)),
            }
        }
        outcome
    }

    /// Kinds currently registered for a resource, in dispatch order.
    pub fn kinds_for_resource(&self, resource_id: &str) -> Vec<&str> {
        self.subscriptions
            .get(resource_id)
            .map(|entries| entries.iter().map(|(k, _)| k.as_str()).collect())
            .unwrap_or_default()
    }

    /// Total number of live subscriptions across all resources.
    pub fn subscriber_count(&self) -> usize {
        self.subscriptions.values().map(Vec::len).sum()
    }
}

// ─── Tests ───────────────────────────────────────────────────────
