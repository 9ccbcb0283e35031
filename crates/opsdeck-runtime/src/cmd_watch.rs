//! `opsdeck watch` — bind a view to a resource and print its filtered
//! open alerts every interval until ctrl-c.

use std::sync::Arc;

use tokio::time::{Duration, interval};

use opsdeck_backend::api::ConsoleBackend;
use opsdeck_core::types::Alert;

use crate::state::SharedState;
use crate::view::ViewBinding;

pub async fn cmd_watch(
    backend: Arc<dyn ConsoleBackend>,
    state: SharedState,
    resource: &str,
    kinds: &[&str],
    period: Duration,
) -> anyhow::Result<()> {
    let mut view = ViewBinding::activate(backend, state, resource, kinds, period).await;
    println!("watching {resource} ({}) — ctrl-c to stop", kinds.join(","));

    let mut ticker = interval(period);
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = ticker.tick() => {
                if view.reload_pending() {
                    if let Err(e) = view.reload().await {
                        tracing::warn!("reload after persona switch failed: {e}");
                    }
                }
                for kind in view.kinds().to_vec() {
                    println!("{}", format_kind_line(&kind, &view.alerts(&kind)));
                }
            }
        }
    }

    view.deactivate().await;
    Ok(())
}

/// One status line per kind, e.g. `jvm: 2 open (PHEAP a-1, GARBA a-3)`.
pub(crate) fn format_kind_line(kind: &str, alerts: &[Alert]) -> String {
    if alerts.is_empty() {
        return format!("{kind}: none");
    }
    let items: Vec<String> = alerts
        .iter()
        .map(|a| format!("{} {}", a.alert_type().unwrap_or("?"), a.id))
        .collect();
    format!("{kind}: {} open ({})", alerts.len(), items.join(", "))
}

// ─── Tests ───────────────────────────────────────────────────────
