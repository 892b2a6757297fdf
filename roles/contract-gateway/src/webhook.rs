//! Outbound calls to the automation webhook.

use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use serde_json::{json, Map, Value};
use tracing::{debug, error};
use url::Url;

use crate::error::{GatewayError, GatewayResult};

pub const SUBMIT_FAILURE_MESSAGE: &str = "Failed to submit to n8n";

#[derive(Debug, Clone)]
pub struct WebhookConfig {
    pub url: Url,
    pub fetch_timeout: Duration,
    pub submit_timeout: Duration,
    pub user_agent: String,
    pub pool_idle_timeout: Duration,
}

/// Status, content type and body of a webhook answer, relayed as-is.
#[derive(Debug, Clone)]
pub struct UpstreamReply {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Bytes,
}

pub struct WebhookClient {
    http: reqwest::Client,
    config: WebhookConfig,
}

impl WebhookClient {
    pub fn new(config: WebhookConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .pool_idle_timeout(config.pool_idle_timeout)
            .build()?;
        Ok(Self { http, config })
    }

    /// Looks up the contract record for `id` and returns the raw payload.
    ///
    /// The identifier goes out as the `id` query parameter and under every
    /// body key the automation has been seen to match on.
    pub async fn fetch_contract(&self, id: &str) -> GatewayResult<Value> {
        let response = self
            .http
            .post(self.config.url.clone())
            .query(&[("id", id)])
            .header(USER_AGENT, self.config.user_agent.as_str())
            .json(&lookup_body(id))
            .timeout(self.config.fetch_timeout)
            .send()
            .await
            .map_err(|e| {
                error!("Webhook fetch for {} failed: {}", id, e);
                GatewayError::upstream(e.status().map(|s| s.as_u16()), e.to_string())
            })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            error!("Failed to read webhook response for {}: {}", id, e);
            GatewayError::upstream(None, e.to_string())
        })?;

        if !status.is_success() {
            let message = upstream_message(&body).unwrap_or_else(|| {
                format!("Request failed with status code {}", status.as_u16())
            });
            error!("Webhook answered {} for {}: {}", status, id, message);
            return Err(GatewayError::upstream(Some(status.as_u16()), message));
        }

        Ok(parse_payload(&body))
    }

    /// Forwards a submission as an HTML-form style POST.
    pub async fn submit_form(&self, fields: &[(String, String)]) -> GatewayResult<UpstreamReply> {
        let response = self
            .http
            .post(self.config.url.clone())
            .form(fields)
            .timeout(self.config.submit_timeout)
            .send()
            .await
            .map_err(|e| {
                error!("Webhook submission failed: {}", e);
                GatewayError::upstream(e.status().map(|s| s.as_u16()), SUBMIT_FAILURE_MESSAGE)
            })?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await.map_err(|e| {
            error!("Failed to read webhook submission response: {}", e);
            GatewayError::upstream(Some(status.as_u16()), SUBMIT_FAILURE_MESSAGE)
        })?;

        if !status.is_success() {
            error!(
                "Webhook rejected submission with {}: {}",
                status,
                String::from_utf8_lossy(&body)
            );
            return Err(GatewayError::upstream(Some(status.as_u16()), SUBMIT_FAILURE_MESSAGE));
        }

        debug!("Webhook accepted submission with {}", status);
        Ok(UpstreamReply {
            status: status.as_u16(),
            content_type,
            body,
        })
    }
}

/// JSON body of a contract lookup.
pub fn lookup_body(id: &str) -> Value {
    json!({
        "id": id,
        "Property ID": id,
        "recordId": id,
        "airtable_record_id": id
    })
}

/// Success bodies that are not JSON are kept as a string; an empty body is null.
fn parse_payload(body: &[u8]) -> Value {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
}

fn upstream_message(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<Value>(body)
        .ok()?
        .get("message")?
        .as_str()
        .map(str::to_string)
}

/// Flattens a submission object into form pairs, stringifying values the way
/// an HTML form would.
pub fn form_pairs(fields: &Map<String, Value>) -> Vec<(String, String)> {
    fields
        .iter()
        .map(|(key, value)| (key.clone(), form_value(value)))
        .collect()
}

fn form_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(form_value).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}
