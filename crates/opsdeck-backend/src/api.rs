//! Backend contract consumed by the console core.
//!
//! The REST services are external collaborators; this trait is the
//! seam the runtime polls through, and the one tests fake.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use serde::Deserialize;

use opsdeck_core::types::{Alert, AlertQuery, AlertQueryResult, Persona};

use crate::error::FetchError;

/// Request header carrying the active persona's organization id.
pub const PERSONA_HEADER: &str = "Opsdeck-Persona";

/// Shared handle to the active persona id.
///
/// The session layer writes it when a persona is resolved or switched;
/// the HTTP client reads it per request, so every fetch issued after a
/// switch carries the new identity without replumbing query types.
#[derive(Clone, Default)]
pub struct PersonaScope {
    current: Arc<Mutex<Option<String>>>,
}

impl PersonaScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, id: Option<String>) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = id;
    }

    pub fn get(&self) -> Option<String> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Envelope shape of `GET /alerts`.
#[derive(Debug, Deserialize)]
pub struct AlertListEnvelope {
    #[serde(rename = "alertList", default)]
    pub alert_list: Vec<Alert>,
}

/// The monitoring backend, abstracted for polling and for tests.
///
/// Persona fetches distinguish "not found" (`Ok(None)`, the backend's
/// empty-object response) from transport failure (`Err`); the caller's
/// fallback logic depends on that distinction.
#[async_trait]
pub trait ConsoleBackend: Send + Sync {
    /// Fetch alerts matching `query`. The full unfiltered result; the
    /// subscription router narrows per consumer.
    async fn fetch_alerts(&self, query: &AlertQuery) -> Result<AlertQueryResult, FetchError>;

    /// Fetch a persona by id. `Ok(None)` means the backend reported an
    /// empty record for that id.
    async fn fetch_persona(&self, id: &str) -> Result<Option<Persona>, FetchError>;

    /// Fetch the literal current-user persona (the fallback identity).
    async fn fetch_current_persona(&self) -> Result<Option<Persona>, FetchError>;

    /// Annotate an alert as acknowledged.
    async fn ack_alert(&self, alert_id: &str, by: &str, notes: &str) -> Result<(), FetchError>;

    /// Annotate an alert as resolved.
    async fn resolve_alert(&self, alert_id: &str, by: &str, notes: &str)
    -> Result<(), FetchError>;
}
