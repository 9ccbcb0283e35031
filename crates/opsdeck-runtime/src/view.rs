//! Per-view lifecycle adapter.
//!
//! Binds a view's visible lifetime to its subscriptions: activation
//! registers one filtering subscriber per alert kind, fetches once
//! immediately, and starts the auto-refresh loop; deactivation cancels
//! the loop and unregisters everything. A persona switch discards the
//! view's local alerts and flags a full reload.

use std::collections::HashMap;
use std::sync::Mutex as StdMutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::time::Duration;

use opsdeck_backend::api::ConsoleBackend;
use opsdeck_backend::error::FetchError;
use opsdeck_core::bus::{ConsoleEvent, ListenerHandle};
use opsdeck_core::kinds::retain_alerts_of_kind;
use opsdeck_core::subscription::SubscriberError;
use opsdeck_core::types::Alert;

use crate::poll_cache::{self, RefreshHandle};
use crate::state::{SharedState, now_ms};

type AlertSlot = Arc<StdMutex<Vec<Alert>>>;

pub struct ViewBinding {
    resource_id: String,
    kinds: Vec<String>,
    state: SharedState,
    backend: Arc<dyn ConsoleBackend>,
    refresh: Option<RefreshHandle>,
    slots: HashMap<String, AlertSlot>,
    reload_pending: Arc<AtomicBool>,
    bus_handle: Option<ListenerHandle>,
}

impl ViewBinding {
    /// Activate a view over `resource_id` for the given alert kinds.
    ///
    /// The initial fetch failure is logged, not fatal — the view comes
    /// up empty and the auto-refresh loop retries.
    pub async fn activate(
        backend: Arc<dyn ConsoleBackend>,
        state: SharedState,
        resource_id: &str,
        kinds: &[&str],
        period: Duration,
    ) -> Self {
        let mut slots: HashMap<String, AlertSlot> = HashMap::new();
        let reload_pending = Arc::new(AtomicBool::new(false));

        let bus_handle = {
            let mut st = state.lock().await;
            for kind in kinds {
                let slot: AlertSlot = Arc::new(StdMutex::new(Vec::new()));
                slots.insert((*kind).to_owned(), Arc::clone(&slot));
                let kind_tag = (*kind).to_owned();
                let prev = st.router.register(
                    resource_id,
                    kind,
                    Box::new(move |mut result| {
                        retain_alerts_of_kind(&mut result, &kind_tag);
                        match slot.lock() {
                            Ok(mut alerts) => {
                                *alerts = result.alerts;
                                Ok(())
                            }
                            Err(_) => Err(SubscriberError("alert slot poisoned".to_owned())),
                        }
                    }),
                );
                if prev.is_some() {
                    tracing::warn!(
                        resource = resource_id,
                        kind,
                        "replaced an existing alert subscriber"
                    );
                }
            }

            // On a persona switch: drop everything scoped to the old
            // identity and let the owner drive a full reload.
            let reload = Arc::clone(&reload_pending);
            let bus_slots: Vec<AlertSlot> = slots.values().cloned().collect();
            st.bus.subscribe(Box::new(move |event| {
                if matches!(event, ConsoleEvent::SwitchedPersona(_)) {
                    for slot in &bus_slots {
                        if let Ok(mut alerts) = slot.lock() {
                            alerts.clear();
                        }
                    }
                    reload.store(true, Ordering::SeqCst);
                }
            }))
        };

        let mut binding = Self {
            resource_id: resource_id.to_owned(),
            kinds: kinds.iter().map(|k| (*k).to_owned()).collect(),
            state: Arc::clone(&state),
            backend: Arc::clone(&backend),
            refresh: None,
            slots,
            reload_pending,
            bus_handle: Some(bus_handle),
        };

        if let Err(e) = binding.fetch_once().await {
            tracing::warn!(resource = resource_id, "initial alert fetch failed: {e}");
        }

        binding.refresh = Some(poll_cache::start_auto_refresh(
            backend,
            state,
            resource_id.to_owned(),
            period,
        ));
        binding
    }

    async fn fetch_once(&self) -> Result<usize, FetchError> {
        let snap = {
            let st = self.state.lock().await;
            st.window.current_window(now_ms())
        };
        poll_cache::get_alerts_for_resource(
            self.backend.as_ref(),
            &self.state,
            &self.resource_id,
            snap.start_ms,
            snap.end_ms,
        )
        .await
    }

    /// The view's current alerts for one kind (already filtered).
    pub fn alerts(&self, kind: &str) -> Vec<Alert> {
        self.slots
            .get(kind)
            .and_then(|slot| slot.lock().ok().map(|alerts| alerts.clone()))
            .unwrap_or_default()
    }

    pub fn kinds(&self) -> &[String] {
        &self.kinds
    }

    /// True after a persona switch until [`reload`] runs.
    pub fn reload_pending(&self) -> bool {
        self.reload_pending.load(Ordering::SeqCst)
    }

    /// Full reload for the new identity: clears the pending flag and
    /// re-fetches immediately.
    pub async fn reload(&self) -> Result<usize, FetchError> {
        self.reload_pending.store(false, Ordering::SeqCst);
        self.fetch_once().await
    }

    /// Tear the view down: stop the refresh loop (waiting for it to
    /// exit) and unregister every subscription and bus listener.
    /// Mandatory on view deactivation.
    pub async fn deactivate(&mut self) {
        if let Some(mut handle) = self.refresh.take() {
            handle.cancel().await;
        }
        let mut st = self.state.lock().await;
        for kind in &self.kinds {
            st.router.unregister(&self.resource_id, kind);
        }
        if let Some(handle) = self.bus_handle.take() {
            st.bus.unsubscribe(handle);
        }
    }
}

impl Drop for ViewBinding {
    fn drop(&mut self) {
        // The refresh handle's own Drop cancels the loop; router and
        // bus entries need the async deactivate path.
        if self.refresh.is_some() || self.bus_handle.is_some() {
            tracing::debug!(
                resource = %self.resource_id,
                "view dropped without deactivate; refresh cancelled"
            );
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::PersonaSession;
    use crate::state::new_shared;
    use crate::testutil::{FakeBackend, alert, persona};
    use opsdeck_backend::settings::SettingsStore;
    use tokio::time::sleep;

    fn temp_store(tag: &str) -> SettingsStore {
        let dir = std::env::temp_dir().join(format!("opsdeck-view-{}-{tag}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        SettingsStore::new(dir.join("settings.json"))
    }

    #[tokio::test]
    async fn activation_fetches_and_filters_immediately() {
        let backend: Arc<FakeBackend> = Arc::new(
            FakeBackend::new()
                .with_alert("r1", alert("a1", "PINGAVAIL"))
                .with_alert("r1", alert("a2", "UNKNOWN")),
        );
        let state = new_shared();

        let mut view = ViewBinding::activate(
            backend.clone(),
            Arc::clone(&state),
            "r1",
            &["url"],
            Duration::from_secs(60),
        )
        .await;

        let urls = view.alerts("url");
        assert_eq!(urls.len(), 1, "only the PINGAVAIL alert survives filtering");
        assert_eq!(urls[0].id, "a1");
        assert_eq!(state.lock().await.router.subscriber_count(), 1);
        view.deactivate().await;
    }

    #[tokio::test]
    async fn kinds_are_isolated_per_slot() {
        let backend: Arc<FakeBackend> = Arc::new(
            FakeBackend::new()
                .with_alert("r1", alert("a1", "PHEAP"))
                .with_alert("r1", alert("a2", "ACTIVE_SESSIONS")),
        );
        let state = new_shared();

        let mut view = ViewBinding::activate(
            backend.clone(),
            Arc::clone(&state),
            "r1",
            &["jvm", "web"],
            Duration::from_secs(60),
        )
        .await;

        assert_eq!(view.alerts("jvm").len(), 1);
        assert_eq!(view.alerts("jvm")[0].id, "a1");
        assert_eq!(view.alerts("web").len(), 1);
        assert_eq!(view.alerts("web")[0].id, "a2");
        view.deactivate().await;
    }

    #[tokio::test]
    async fn deactivate_cancels_and_unregisters() {
        let backend: Arc<FakeBackend> =
            Arc::new(FakeBackend::new().with_alert("r1", alert("a1", "PHEAP")));
        let state = new_shared();

        let mut view = ViewBinding::activate(
            backend.clone(),
            Arc::clone(&state),
            "r1",
            &["jvm"],
            Duration::from_millis(10),
        )
        .await;
        assert_eq!(view.alerts("jvm").len(), 1);

        view.deactivate().await;
        assert_eq!(state.lock().await.router.subscriber_count(), 0);
        assert_eq!(state.lock().await.bus.listener_count(), 0);

        // New backend data must never reach the deactivated view.
        backend.set_alerts("r1", vec![alert("a9", "PHEAP"), alert("a10", "GARBA")]);
        let fetches_at_deactivate = backend.alert_fetch_count();
        sleep(Duration::from_millis(60)).await;
        assert_eq!(
            backend.alert_fetch_count(),
            fetches_at_deactivate,
            "no polling after deactivation"
        );
        assert_eq!(view.alerts("jvm").len(), 1, "view state frozen");
    }

    #[tokio::test]
    async fn persona_switch_discards_then_reload_refetches() {
        let backend: Arc<FakeBackend> = Arc::new(
            FakeBackend::new()
                .with_alert("r1", alert("a1", "PINGAVAIL"))
                .with_alert("r1", alert("a2", "UNKNOWN"))
                .with_current_persona(persona("p1")),
        );
        let state = new_shared();
        let session = PersonaSession::new(backend.clone(), temp_store("switch"), backend.scope());
        session.load_current_persona(&state).await.expect("resolve p1");

        let mut view = ViewBinding::activate(
            backend.clone(),
            Arc::clone(&state),
            "r1",
            &["url"],
            Duration::from_secs(60),
        )
        .await;
        assert_eq!(view.alerts("url").len(), 1);
        assert!(!view.reload_pending());

        // The new identity sees a different alert set.
        backend.set_alerts("r1", vec![alert("b1", "PINGRESP")]);
        session.switch_persona(&state, persona("p2")).await;

        // Old-identity state was discarded synchronously with the switch.
        assert!(view.reload_pending());
        assert!(view.alerts("url").is_empty());

        let delivered = view.reload().await.expect("reload");
        assert_eq!(delivered, 1);
        assert!(!view.reload_pending());
        let urls = view.alerts("url");
        assert_eq!(urls.len(), 1);
        assert_eq!(urls[0].id, "b1");
        view.deactivate().await;
    }

    #[tokio::test]
    async fn refetch_after_switch_carries_new_identity() {
        let backend: Arc<FakeBackend> = Arc::new(
            FakeBackend::new()
                .with_alert("r1", alert("a1", "PINGAVAIL"))
                .with_current_persona(persona("p1")),
        );
        let state = new_shared();
        let session =
            PersonaSession::new(backend.clone(), temp_store("identity"), backend.scope());
        session.load_current_persona(&state).await.expect("resolve p1");

        let mut view = ViewBinding::activate(
            backend.clone(),
            Arc::clone(&state),
            "r1",
            &["url"],
            Duration::from_secs(60),
        )
        .await;
        assert_eq!(backend.last_alert_scope().as_deref(), Some("p1"));

        session.switch_persona(&state, persona("p2")).await;
        view.reload().await.expect("reload");
        assert_eq!(
            backend.last_alert_scope().as_deref(),
            Some("p2"),
            "post-switch fetch goes out under the new identity"
        );
        view.deactivate().await;
    }

    #[tokio::test]
    async fn initial_fetch_failure_is_not_fatal() {
        let backend: Arc<FakeBackend> =
            Arc::new(FakeBackend::new().with_alert("r1", alert("a1", "PHEAP")));
        backend.set_fail_alerts(true);
        let state = new_shared();

        let mut view = ViewBinding::activate(
            backend.clone(),
            Arc::clone(&state),
            "r1",
            &["jvm"],
            Duration::from_millis(10),
        )
        .await;
        assert!(view.alerts("jvm").is_empty());

        // Backend recovers; the refresh loop fills the view in.
        backend.set_fail_alerts(false);
        sleep(Duration::from_millis(100)).await;
        assert_eq!(view.alerts("jvm").len(), 1);
        view.deactivate().await;
    }
}
