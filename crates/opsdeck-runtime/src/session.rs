//! Persona session: resolution at startup and explicit switching.
//!
//! Resolution order: persisted last-used persona id, then the literal
//! current-user identity — exactly one fallback, never a loop. A
//! switch persists the new id and notifies every bus listener
//! synchronously before returning, so no dependent can fetch on a
//! stale identity.

use std::sync::Arc;

use opsdeck_backend::api::{ConsoleBackend, PersonaScope};
use opsdeck_backend::error::{FetchError, SettingsError};
use opsdeck_backend::settings::SettingsStore;
use opsdeck_core::bus::ConsoleEvent;
use opsdeck_core::types::Persona;

use crate::state::SharedState;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("persona fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("no persona available: current-user lookup returned an empty record")]
    NoPersona,
}

pub struct PersonaSession {
    backend: Arc<dyn ConsoleBackend>,
    store: SettingsStore,
    scope: PersonaScope,
}

impl PersonaSession {
    pub fn new(backend: Arc<dyn ConsoleBackend>, store: SettingsStore, scope: PersonaScope) -> Self {
        Self {
            backend,
            store,
            scope,
        }
    }

    /// Resolve the current persona for this session.
    ///
    /// Tries the persisted `lastPersona` id first; an empty record or a
    /// fetch failure for that id falls back — once — to the current-user
    /// identity. Only a failure of the fallback itself surfaces; it
    /// leaves no current persona set.
    pub async fn load_current_persona(&self, state: &SharedState) -> Result<Persona, SessionError> {
        let last = self.store.load()?.last_persona;
        if let Some(id) = last {
            match self.backend.fetch_persona(&id).await {
                Ok(Some(p)) => return Ok(self.adopt(state, p).await),
                Ok(None) => {
                    tracing::info!("persisted persona {id} not found, falling back to current user");
                }
                Err(e) => {
                    tracing::warn!("persisted persona {id} fetch failed, falling back: {e}");
                }
            }
        }
        match self.backend.fetch_current_persona().await {
            Ok(Some(p)) => Ok(self.adopt(state, p).await),
            Ok(None) => Err(SessionError::NoPersona),
            Err(e) => Err(SessionError::Fetch(e)),
        }
    }

    async fn adopt(&self, state: &SharedState, persona: Persona) -> Persona {
        self.scope.set(Some(persona.id.clone()));
        let mut st = state.lock().await;
        st.current_persona = Some(persona.clone());
        st.bus
            .publish(&ConsoleEvent::CurrentPersonaLoaded(persona.clone()));
        persona
    }

    /// Switch to `persona`: set it current, persist its id, retarget
    /// the request scope, and deliver `SwitchedPersona` to every
    /// listener before returning. Listeners discard identity-scoped
    /// state; their reload fetches can only start after this completes
    /// and therefore go out under the new identity.
    pub async fn switch_persona(&self, state: &SharedState, persona: Persona) {
        if let Err(e) = self.store.set_last_persona(&persona.id) {
            // The switch itself still proceeds; only next-session
            // resolution is affected.
            tracing::warn!("failed to persist persona id {}: {e}", persona.id);
        }
        self.scope.set(Some(persona.id.clone()));
        let mut st = state.lock().await;
        st.current_persona = Some(persona.clone());
        st.bus.publish(&ConsoleEvent::SwitchedPersona(persona));
    }
}

// ─── Tests ───────────────────────────────────────────────────────
