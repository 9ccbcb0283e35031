//! opsdeck: operator console runtime binary.
//! Wires the HTTP backend, persisted settings, and shared console
//! state into the watch/alerts/annotate/persona subcommands.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::time::Duration;

use opsdeck_backend::api::{ConsoleBackend, PersonaScope};
use opsdeck_backend::http::HttpBackend;
use opsdeck_backend::settings::SettingsStore;
use opsdeck_core::time_window::preset_offset;

mod cli;
mod cmd_alerts;
mod cmd_watch;
mod poll_cache;
mod session;
mod state;
#[cfg(test)]
mod testutil;
mod view;

use session::PersonaSession;
use state::SharedState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    let filter = std::env::var("OPSDECK_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let scope = PersonaScope::new();
    let backend: Arc<dyn ConsoleBackend> =
        Arc::new(HttpBackend::new(&args.base_url, scope.clone()));
    let store = match &args.state_dir {
        Some(dir) => SettingsStore::new(PathBuf::from(dir).join("settings.json")),
        None => SettingsStore::at_default_location(),
    };
    let session = PersonaSession::new(Arc::clone(&backend), store, scope);
    let state = state::new_shared();

    match args.command {
        cli::Command::Watch(opts) => {
            require_persona(&session, &state).await?;
            apply_window_preset(&state, opts.window.as_deref()).await?;
            let kinds: Vec<&str> = opts.kinds.iter().map(String::as_str).collect();
            cmd_watch::cmd_watch(
                backend,
                state,
                &opts.resource,
                &kinds,
                Duration::from_secs(opts.interval),
            )
            .await?;
        }
        cli::Command::Alerts(opts) => {
            require_persona(&session, &state).await?;
            apply_window_preset(&state, opts.window.as_deref()).await?;
            cmd_alerts::cmd_alerts(backend.as_ref(), &state, &opts.resource).await?;
        }
        cli::Command::Ack(opts) => {
            cmd_alerts::cmd_ack(backend.as_ref(), &opts.alert_id, &opts.by, &opts.notes).await?;
        }
        cli::Command::Resolve(opts) => {
            cmd_alerts::cmd_resolve(backend.as_ref(), &opts.alert_id, &opts.by, &opts.notes)
                .await?;
        }
        cli::Command::Persona(opts) => {
            if let Some(id) = opts.switch {
                let persona = backend
                    .fetch_persona(&id)
                    .await?
                    .ok_or_else(|| anyhow::anyhow!("persona {id} not found"))?;
                session.switch_persona(&state, persona.clone()).await;
                println!("switched to {} ({})", persona.name, persona.id);
            } else {
                let persona = require_persona(&session, &state).await?;
                println!("current persona: {} ({})", persona.name, persona.id);
            }
        }
    }
    Ok(())
}

/// Views never operate without a resolved persona.
async fn require_persona(
    session: &PersonaSession,
    state: &SharedState,
) -> anyhow::Result<opsdeck_core::types::Persona> {
    let persona = session.load_current_persona(state).await?;
    tracing::info!("persona {} ({})", persona.name, persona.id);
    Ok(persona)
}

async fn apply_window_preset(state: &SharedState, label: Option<&str>) -> anyhow::Result<()> {
    let Some(label) = label else {
        return Ok(());
    };
    let offset = preset_offset(label)
        .ok_or_else(|| anyhow::anyhow!("unknown window preset: {label}"))?;
    state.lock().await.window.set_window(offset, None)?;
    Ok(())
}
