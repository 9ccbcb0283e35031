//! reqwest implementation of [`ConsoleBackend`] over the documented
//! REST contract.

use async_trait::async_trait;

use opsdeck_core::types::{AlertQuery, AlertQueryResult, Persona};

use crate::api::{AlertListEnvelope, ConsoleBackend, PERSONA_HEADER, PersonaScope};
use crate::error::FetchError;

/// HTTP client for one backend base URL. Every request is stamped with
/// the active persona id from `scope`, read at send time, so requests
/// issued after a persona switch carry the new identity.
pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
    scope: PersonaScope,
}

impl HttpBackend {
    pub fn new(base_url: &str, scope: PersonaScope) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            client: reqwest::Client::new(),
            scope,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn scoped(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.scope.get() {
            Some(id) => request.header(PERSONA_HEADER, id),
            None => request,
        }
    }

    async fn check(&self, response: reqwest::Response) -> Result<reqwest::Response, FetchError> {
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: response.url().to_string(),
            });
        }
        Ok(response)
    }
}

/// Query-string pairs for `GET /alerts`. The `tags` parameter carries
/// the `resourceId|<id>` filter the alerting backend expects.
pub(crate) fn alert_query_params(query: &AlertQuery) -> Vec<(String, String)> {
    let statuses = query
        .statuses
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(",");
    vec![
        ("statuses".to_owned(), statuses),
        ("tags".to_owned(), format!("resourceId|{}", query.resource_id)),
        ("startTime".to_owned(), query.start_ms.to_string()),
        ("endTime".to_owned(), query.end_ms.to_string()),
    ]
}

/// Decode a persona response body. The backend signals "not found"
/// with a literal empty object rather than a 404.
pub(crate) fn decode_persona_body(body: &str) -> Result<Option<Persona>, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    match &value {
        serde_json::Value::Object(map) if map.is_empty() => Ok(None),
        _ => serde_json::from_value(value).map(Some),
    }
}

#[async_trait]
impl ConsoleBackend for HttpBackend {
    async fn fetch_alerts(&self, query: &AlertQuery) -> Result<AlertQueryResult, FetchError> {
        let response = self
            .scoped(self.client.get(self.url("/alerts")))
            .query(&alert_query_params(query))
            .send()
            .await?;
        let body = self.check(response).await?.text().await?;
        let envelope: AlertListEnvelope = serde_json::from_str(&body)?;
        tracing::debug!(
            resource = %query.resource_id,
            count = envelope.alert_list.len(),
            "fetched alerts"
        );
        Ok(AlertQueryResult {
            alerts: envelope.alert_list,
        })
    }

    async fn fetch_persona(&self, id: &str) -> Result<Option<Persona>, FetchError> {
        let response = self
            .scoped(self.client.get(self.url(&format!("/personas/{id}"))))
            .send()
            .await?;
        let body = self.check(response).await?.text().await?;
        Ok(decode_persona_body(&body)?)
    }

    async fn fetch_current_persona(&self) -> Result<Option<Persona>, FetchError> {
        let response = self
            .scoped(self.client.get(self.url("/personas/current")))
            .send()
            .await?;
        let body = self.check(response).await?.text().await?;
        Ok(decode_persona_body(&body)?)
    }

    async fn ack_alert(&self, alert_id: &str, by: &str, notes: &str) -> Result<(), FetchError> {
        let response = self
            .scoped(self.client.put(self.url("/alerts/ack")))
            .query(&[("alertIds", alert_id), ("ackBy", by), ("ackNotes", notes)])
            .send()
            .await?;
        self.check(response).await?;
        Ok(())
    }

    async fn resolve_alert(
        &self,
        alert_id: &str,
        by: &str,
        notes: &str,
    ) -> Result<(), FetchError> {
        let response = self
            .scoped(self.client.put(self.url("/alerts/resolve")))
            .query(&[
                ("alertIds", alert_id),
                ("resolvedBy", by),
                ("resolvedNotes", notes),
            ])
            .send()
            .await?;
        self.check(response).await?;
        Ok(())
    }
}

// ─── Tests ───────────────────────────────────────────────────────
