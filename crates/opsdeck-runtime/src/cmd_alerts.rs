//! One-shot alert commands: list, acknowledge, resolve.

use opsdeck_backend::api::ConsoleBackend;
use opsdeck_core::types::{Alert, AlertQuery};

use crate::poll_cache;
use crate::state::{SharedState, now_ms};

pub async fn cmd_alerts(
    backend: &dyn ConsoleBackend,
    state: &SharedState,
    resource: &str,
) -> anyhow::Result<()> {
    let snap = {
        let st = state.lock().await;
        st.window.current_window(now_ms())
    };
    let query = AlertQuery::open_alerts(resource, snap.start_ms, snap.end_ms);
    let result = poll_cache::refresh_now(backend, state, &query).await?;

    if result.alerts.is_empty() {
        println!("no open alerts for {resource}");
        return Ok(());
    }
    for alert in &result.alerts {
        println!("{}", format_alert_line(alert));
    }
    Ok(())
}

pub async fn cmd_ack(
    backend: &dyn ConsoleBackend,
    alert_id: &str,
    by: &str,
    notes: &str,
) -> anyhow::Result<()> {
    backend.ack_alert(alert_id, by, notes).await?;
    println!("acknowledged {alert_id}");
    Ok(())
}

pub async fn cmd_resolve(
    backend: &dyn ConsoleBackend,
    alert_id: &str,
    by: &str,
    notes: &str,
) -> anyhow::Result<()> {
    backend.resolve_alert(alert_id, by, notes).await?;
    println!("resolved {alert_id}");
    Ok(())
}

pub(crate) fn format_alert_line(alert: &Alert) -> String {
    format!(
        "{}  {}  {}  start={}",
        alert.id,
        alert.status,
        alert.alert_type().unwrap_or("?"),
        alert.start_ms
    )
}

// ─── Tests ───────────────────────────────────────────────────────
