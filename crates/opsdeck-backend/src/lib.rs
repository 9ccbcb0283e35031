//! opsdeck-backend: IO boundary to the monitoring REST backends and
//! client-local persisted settings. No business logic — the console
//! core never sees HTTP or the filesystem directly.

pub mod api;
pub mod error;
pub mod http;
pub mod settings;

pub use api::{AlertListEnvelope, ConsoleBackend, PERSONA_HEADER, PersonaScope};
pub use error::{FetchError, SettingsError};
pub use http::HttpBackend;
pub use settings::{ClientSettings, SettingsStore};
