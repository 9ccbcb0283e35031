//! Alert-kind tag tables and the per-consumer filtering convention.
//!
//! Each view subscribes under a free-form kind tag ("jvm", "web",
//! "url") and narrows its own copy of a poll result to the alertType
//! sub-types known for that kind. Records with an unknown or missing
//! alertType are dropped, never an error.

use crate::types::AlertQueryResult;

/// Known `alertType` tags per subscription kind. Unknown kinds map to
/// an empty set, so their subscribers see no alerts rather than all.
pub fn known_types_for_kind(kind: &str) -> &'static [&'static str] {
    match kind {
        "jvm" => &["PHEAP", "NHEAP", "GARBA"],
        "web" => &["ACTIVE_SESSIONS", "EXPIRED_SESSIONS", "REJECTED_SESSIONS"],
        "url" => &["PINGRESP", "PINGAVAIL"],
        _ => &[],
    }
}

/// Narrow `result` in place to the alerts relevant for `kind`.
/// Consumers apply this to their own dispatched copy.
pub fn retain_alerts_of_kind(result: &mut AlertQueryResult, kind: &str) {
    let known = known_types_for_kind(kind);
    result
        .alerts
        .retain(|a| a.alert_type().is_some_and(|t| known.contains(&t)));
}

// ─── Tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Alert, AlertStatus, CONTEXT_ALERT_TYPE};
    use std::collections::HashMap;

    fn alert(id: &str, alert_type: Option<&str>) -> Alert {
        let mut context = HashMap::new();
        if let Some(t) = alert_type {
            context.insert(CONTEXT_ALERT_TYPE.to_string(), t.to_string());
        }
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

    #[test]
    fn url_kind_keeps_ping_types_only() {
        let mut result = AlertQueryResult {
            alerts: vec![
                alert("a1", Some("PINGAVAIL")),
                alert("a2", Some("UNKNOWN")),
                alert("a3", Some("PINGRESP")),
            ],
        };
        retain_alerts_of_kind(&mut result, "url");
        let ids: Vec<&str> = result.alerts.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "a3"]);
    }

    #[test]
    fn missing_alert_type_is_dropped() {
        let mut result = AlertQueryResult {
            alerts: vec![alert("a1", None), alert("a2", Some("PHEAP"))],
        };
        retain_alerts_of_kind(&mut result, "jvm");
        assert_eq!(result.alerts.len(), 1);
        assert_eq!(result.alerts[0].id, "a2");
    }

    #[test]
    fn unknown_kind_drops_everything() {
        let mut result = AlertQueryResult {
            alerts: vec![alert("a1", Some("PHEAP"))],
        };
        retain_alerts_of_kind(&mut result, "datasource");
        assert!(result.alerts.is_empty());
    }

    #[test]
    fn kind_tables_are_disjoint() {
        for t in known_types_for_kind("jvm") {
            assert!(!known_types_for_kind("web").contains(t));
            assert!(!known_types_for_kind("url").contains(t));
        }
    }
}
