//! Alert poll cache and refresh loops.
//!
//! Owns the latest known result per query key. `refresh_now` fetches
//! immediately; `start_auto_refresh` runs a cancellable interval loop
//! that re-reads the shared time window each tick, fetches outside the
//! state lock, and fans the result out through the subscription
//! router. A failed fetch keeps the previously cached value and never
//! stops the loop.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::{Duration, MissedTickBehavior, interval};

use opsdeck_backend::api::ConsoleBackend;
use opsdeck_backend::error::FetchError;
use opsdeck_core::types::{AlertQuery, AlertQueryResult};

use crate::state::{SharedState, now_ms};

// ─── Cache ───────────────────────────────────────────────────────

/// Latest full fetch result per query identity. Only successful
/// fetches write here (stale-but-available on error).
#[derive(Default)]
pub struct AlertPollCache {
    results: HashMap<AlertQuery, AlertQueryResult>,
}

impl AlertPollCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&mut self, query: AlertQuery, result: AlertQueryResult) {
        self.results.insert(query, result);
    }

    pub fn cached(&self, query: &AlertQuery) -> Option<&AlertQueryResult> {
        self.results.get(query)
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

// ─── On-demand refresh ───────────────────────────────────────────

/// Fetch `query` immediately, caching the result on success. On error
/// the cache keeps whatever it had for that key.
pub async fn refresh_now(
    backend: &dyn ConsoleBackend,
    state: &SharedState,
    query: &AlertQuery,
) -> Result<AlertQueryResult, FetchError> {
    match backend.fetch_alerts(query).await {
        Ok(result) => {
            let mut st = state.lock().await;
            st.cache.store(query.clone(), result.clone());
            Ok(result)
        }
        Err(e) => {
            tracing::warn!(resource = %query.resource_id, "alert refresh failed: {e}");
            Err(e)
        }
    }
}

/// Build the open-alerts query for a resource, refresh, and dispatch
/// the result to every subscriber registered for that resource.
/// Returns the number of callbacks delivered.
pub async fn get_alerts_for_resource(
    backend: &dyn ConsoleBackend,
    state: &SharedState,
    resource_id: &str,
    start_ms: i64,
    end_ms: i64,
) -> Result<usize, FetchError> {
    let query = AlertQuery::open_alerts(resource_id, start_ms, end_ms);
    let result = refresh_now(backend, state, &query).await?;
    let outcome = state.lock().await.router.dispatch(resource_id, &result);
    for (kind, err) in &outcome.failures {
        tracing::warn!(resource = resource_id, kind = %kind, "subscriber failed: {err}");
    }
    Ok(outcome.delivered)
}

// ─── Auto refresh ────────────────────────────────────────────────

/// Cancellation handle for one auto-refresh loop. `cancel` is
/// idempotent and waits for the loop to exit, so once it returns no
/// further subscriber callback can run, even for a fetch that was
/// already in flight or a dispatch that was mid-tick.
pub struct RefreshHandle {
    cancel_tx: watch::Sender<bool>,
    task: Option<tokio::task::JoinHandle<()>>,
}

impl RefreshHandle {
    pub async fn cancel(&mut self) {
        let _ = self.cancel_tx.send(true);
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel_tx.borrow()
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        let _ = self.cancel_tx.send(true);
        if let Some(task) = &self.task {
            task.abort();
        }
    }
}

/// Spawn the periodic refresh loop for one resource. One loop per
/// view; callers must cancel the previous handle before starting
/// another for the same view.
pub fn start_auto_refresh(
    backend: Arc<dyn ConsoleBackend>,
    state: SharedState,
    resource_id: String,
    period: Duration,
) -> RefreshHandle {
    let (cancel_tx, mut cancel_rx) = watch::channel(false);
    let task = tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // Consume the immediate first tick; the view adapter already
        // fetched once on activation.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = cancel_rx.changed() => break,
                _ = ticker.tick() => {}
            }

            // Window snapshot under the lock, fetch outside it.
            let query = {
                let st = state.lock().await;
                let snap = st.window.current_window(now_ms());
                AlertQuery::open_alerts(&resource_id, snap.start_ms, snap.end_ms)
            };

            let fetched = tokio::select! {
                _ = cancel_rx.changed() => break,
                fetched = backend.fetch_alerts(&query) => fetched,
            };
            if *cancel_rx.borrow() {
                // Cancelled while the fetch was in flight: discard the
                // result rather than dispatching it.
                break;
            }

            match fetched {
                Ok(result) => {
                    let mut st = state.lock().await;
                    st.cache.store(query, result.clone());
                    let outcome = st.router.dispatch(&resource_id, &result);
                    for (kind, err) in &outcome.failures {
                        tracing::warn!(
                            resource = %resource_id,
                            kind = %kind,
                            "subscriber failed: {err}"
                        );
                    }
                }
                Err(e) => {
                    // Reported and retried at the next tick.
                    tracing::warn!(resource = %resource_id, "alert poll failed: {e}");
                }
            }
        }
    });
    RefreshHandle {
        cancel_tx,
        task: Some(task),
    }
}

// ─── Tests ───────────────────────────────────────────────────────
