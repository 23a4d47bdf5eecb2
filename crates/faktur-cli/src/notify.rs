//! Delivery of processing events to a PostgREST-style append-only log.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde_json::{Value, json};
use tracing::{debug, warn};

use faktur_core::batch::{EventStatus, ProcessingEvent};
use faktur_core::models::config::EventLogConfig;

/// Client for the remote processing log.
pub struct RestEventLog {
    client: reqwest::Client,
    endpoint: String,
}

impl RestEventLog {
    /// Build a client, or `None` when no URL/key is configured or the client
    /// cannot be built. A broken log never stops a batch.
    pub fn from_config(config: &EventLogConfig) -> Option<Self> {
        let (Some(url), Some(key)) = (&config.url, &config.api_key) else {
            debug!("Event log not configured; skipping");
            return None;
        };

        match Self::build_client(key, config.timeout_secs) {
            Ok(client) => Some(Self {
                client,
                endpoint: endpoint(url, &config.table),
            }),
            Err(e) => {
                warn!("Event logging disabled: {}", e);
                None
            }
        }
    }

    fn build_client(key: &str, timeout_secs: u64) -> anyhow::Result<reqwest::Client> {
        let mut headers = HeaderMap::new();
        headers.insert("apikey", HeaderValue::from_str(key)?);
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", key))?);
        headers.insert("prefer", HeaderValue::from_static("return=representation"));

        let client = reqwest::Client::builder()
            .user_agent(concat!("faktur-cli/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(timeout_secs))
            .default_headers(headers)
            .build()?;
        Ok(client)
    }

    /// Append the event; returns the id of the stored entry if the server
    /// sent one back.
    pub async fn record(&self, event: &ProcessingEvent) -> anyhow::Result<Option<String>> {
        let response = self.client.post(&self.endpoint).json(event).send().await?;

        if !response.status().is_success() {
            anyhow::bail!("HTTP {}", response.status());
        }

        let body: Value = response.json().await?;
        Ok(inserted_id(&body))
    }

    /// Mark a stored entry as downloaded.
    pub async fn mark_downloaded(&self, id: &str) -> anyhow::Result<()> {
        let response = self
            .client
            .patch(&self.endpoint)
            .query(&[("id", format!("eq.{}", id))])
            .json(&json!({ "status": EventStatus::Downloaded }))
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("HTTP {}", response.status());
        }
        Ok(())
    }
}

/// Record the event, logging instead of failing.
pub async fn record_event(log: Option<&RestEventLog>, event: &ProcessingEvent) -> Option<String> {
    let log = log?;
    match log.record(event).await {
        Ok(id) => {
            debug!("Logged processing event {:?}", id);
            id
        }
        Err(e) => {
            warn!("Event logging failed: {}", e);
            None
        }
    }
}

/// Mark the entry as downloaded, logging instead of failing.
pub async fn mark_downloaded(log: Option<&RestEventLog>, id: Option<&str>) {
    let (Some(log), Some(id)) = (log, id) else {
        return;
    };
    if let Err(e) = log.mark_downloaded(id).await {
        warn!("Failed to update event {}: {}", id, e);
    }
}

fn endpoint(base_url: &str, table: &str) -> String {
    format!("{}/rest/v1/{}", base_url.trim_end_matches('/'), table)
}

/// Id of the first inserted row of a `return=representation` response.
fn inserted_id(body: &Value) -> Option<String> {
    let row = match body {
        Value::Array(rows) => rows.first()?,
        other => other,
    };

    match row.get("id")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint() {
        assert_eq!(
            endpoint("https://db.example.test/", "extraction_logs"),
            "https://db.example.test/rest/v1/extraction_logs"
        );
    }

    #[test]
    fn test_inserted_id() {
        assert_eq!(inserted_id(&json!([{"id": 42, "status": "Processed"}])), Some("42".into()));
        assert_eq!(inserted_id(&json!({"id": "a-b"})), Some("a-b".into()));
        assert_eq!(inserted_id(&json!([])), None);
        assert_eq!(inserted_id(&json!([{"status": "Processed"}])), None);
    }

    #[test]
    fn test_unconfigured_log_is_skipped() {
        assert!(RestEventLog::from_config(&EventLogConfig::default()).is_none());
    }

    #[test]
    fn test_invalid_key_disables_log() {
        let config = EventLogConfig {
            url: Some("http://127.0.0.1:9".to_string()),
            api_key: Some("bad\u{7f}key".to_string()),
            ..EventLogConfig::default()
        };
        assert!(RestEventLog::from_config(&config).is_none());
    }

    #[test]
    fn test_valid_key_builds_client() {
        let config = EventLogConfig {
            url: Some("http://127.0.0.1:9/".to_string()),
            api_key: Some("anon-key".to_string()),
            ..EventLogConfig::default()
        };
        let log = RestEventLog::from_config(&config).unwrap();
        assert_eq!(log.endpoint, "http://127.0.0.1:9/rest/v1/extraction_logs");
    }

    #[test]
    fn test_downloaded_payload() {
        assert_eq!(
            json!({ "status": EventStatus::Downloaded }),
            json!({ "status": "Downloaded" })
        );
    }
}
