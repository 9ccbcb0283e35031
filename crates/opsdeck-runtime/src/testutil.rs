//! Fake backend for integration tests: canned alerts and personas,
//! injectable failures, call counters, and an optional gate that holds
//! alert fetches in flight until the test releases them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use opsdeck_backend::api::{ConsoleBackend, PersonaScope};
use opsdeck_backend::error::FetchError;
use opsdeck_core::types::{
    Alert, AlertQuery, AlertQueryResult, AlertStatus, CONTEXT_ALERT_TYPE, Persona,
};

/// Build an open alert carrying an `alertType` context tag.
pub fn alert(id: &str, alert_type: &str) -> Alert {
    let mut context = HashMap::new();
    context.insert(CONTEXT_ALERT_TYPE.to_string(), alert_type.to_string());
    Alert {
        id: id.to_string(),
        status: AlertStatus::Open,
        context,
        data_id: None,
        start_ms: 0,
        end_ms: None,
        ack_by: None,
        ack_notes: None,
        resolved_by: None,
        resolved_notes: None,
    }
}

pub fn persona(id: &str) -> Persona {
    Persona {
        id: id.to_string(),
        name: format!("org-{id}"),
        created_at_ms: 0,
        updated_at_ms: 0,
    }
}

#[derive(Default)]
pub struct FakeBackend {
    alerts_by_resource: Mutex<HashMap<String, Vec<Alert>>>,
    personas: Mutex<HashMap<String, Persona>>,
    current_persona: Mutex<Option<Persona>>,
    fail_alerts: AtomicBool,
    fail_current_persona: AtomicBool,
    alert_fetches: AtomicUsize,
    persona_fetches: AtomicUsize,
    current_fetches: AtomicUsize,
    scope: PersonaScope,
    /// Scope value observed by the most recent alert fetch, the way a
    /// real request would have been stamped.
    last_alert_scope: Mutex<Option<String>>,
    /// When set, `fetch_alerts` blocks on this gate after entering.
    gate: Option<Arc<Notify>>,
    /// Notified every time an alert fetch enters (before the gate).
    pub fetch_entered: Arc<Notify>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_alert(self, resource_id: &str, alert: Alert) -> Self {
        self.alerts_by_resource
            .lock()
            .expect("lock")
            .entry(resource_id.to_string())
            .or_default()
            .push(alert);
        self
    }

    pub fn with_persona(self, p: Persona) -> Self {
        self.personas
            .lock()
            .expect("lock")
            .insert(p.id.clone(), p);
        self
    }

    pub fn with_current_persona(self, p: Persona) -> Self {
        *self.current_persona.lock().expect("lock") = Some(p);
        self
    }

    /// Install a gate; alert fetches will park until `notify_one`.
    pub fn with_gate(mut self) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.gate = Some(Arc::clone(&gate));
        (self, gate)
    }

    pub fn set_alerts(&self, resource_id: &str, alerts: Vec<Alert>) {
        self.alerts_by_resource
            .lock()
            .expect("lock")
            .insert(resource_id.to_string(), alerts);
    }

    pub fn set_fail_alerts(&self, fail: bool) {
        self.fail_alerts.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_current_persona(&self, fail: bool) {
        self.fail_current_persona.store(fail, Ordering::SeqCst);
    }

    pub fn alert_fetch_count(&self) -> usize {
        self.alert_fetches.load(Ordering::SeqCst)
    }

    pub fn persona_fetch_count(&self) -> usize {
        self.persona_fetches.load(Ordering::SeqCst)
    }

    pub fn current_fetch_count(&self) -> usize {
        self.current_fetches.load(Ordering::SeqCst)
    }

    /// The scope handle requests are stamped from; hand this to the
    /// session so switches retarget it.
    pub fn scope(&self) -> PersonaScope {
        self.scope.clone()
    }

    pub fn last_alert_scope(&self) -> Option<String> {
        self.last_alert_scope.lock().expect("lock").clone()
    }

    fn unavailable(url: &str) -> FetchError {
        FetchError::Status {
            status: 503,
            url: url.to_string(),
        }
    }
}

#[async_trait]
impl ConsoleBackend for FakeBackend {
    async fn fetch_alerts(&self, query: &AlertQuery) -> Result<AlertQueryResult, FetchError> {
        self.alert_fetches.fetch_add(1, Ordering::SeqCst);
        *self.last_alert_scope.lock().expect("lock") = self.scope.get();
        self.fetch_entered.notify_one();
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.fail_alerts.load(Ordering::SeqCst) {
            return Err(Self::unavailable("fake:/alerts"));
        }
        let alerts = self
            .alerts_by_resource
            .lock()
            .expect("lock")
            .get(&query.resource_id)
            .cloned()
            .unwrap_or_default();
        Ok(AlertQueryResult { alerts })
    }

    async fn fetch_persona(&self, id: &str) -> Result<Option<Persona>, FetchError> {
        self.persona_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.personas.lock().expect("lock").get(id).cloned())
    }

    async fn fetch_current_persona(&self) -> Result<Option<Persona>, FetchError> {
        self.current_fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_current_persona.load(Ordering::SeqCst) {
            return Err(Self::unavailable("fake:/personas/current"));
        }
        Ok(self.current_persona.lock().expect("lock").clone())
    }

    async fn ack_alert(&self, _alert_id: &str, _by: &str, _notes: &str) -> Result<(), FetchError> {
        Ok(())
    }

    async fn resolve_alert(
        &self,
        _alert_id: &str,
        _by: &str,
        _notes: &str,
    ) -> Result<(), FetchError> {
        Ok(())
    }
}
