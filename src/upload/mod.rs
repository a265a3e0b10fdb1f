//! Webhook upload client.
//!
//! Sends a finished audio payload to the configured workflow webhook as one
//! multipart POST and normalizes the heterogeneous response into plain text.
//! The webhook's response schema is undocumented, so JSON bodies are resolved
//! through an ordered field fallback chain rather than a fixed shape.

use anyhow::{anyhow, Result};
use serde_json::Value;

use crate::config::WebhookConfig;

/// Ordered list of JSON fields that may carry the transcription.
const TEXT_FIELDS: [&str; 4] = ["text", "transcription", "output", "message"];

/// Client for the transcription webhook.
///
/// Exactly one attempt per call; no retries, no auth header. The only
/// cancellation path for an in-flight upload is the configured timeout.
#[derive(Clone)]
pub struct WebhookClient {
    client: reqwest::Client,
    url: String,
    file_field: String,
    file_name: String,
}

impl WebhookClient {
    /// Builds a client from webhook configuration.
    ///
    /// # Errors
    /// - If the HTTP client cannot be constructed
    pub fn new(config: &WebhookConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| anyhow!("Failed to build HTTP client: {e}"))?;

        Ok(Self {
            client,
            url: config.url.clone(),
            file_field: config.file_field.clone(),
            file_name: config.file_name.clone(),
        })
    }

    /// Uploads the audio payload and returns the transcription text.
    ///
    /// # Errors
    /// - If the request cannot be sent (connection, timeout)
    /// - If the webhook returns a non-success HTTP status
    pub async fn send(&self, payload: Vec<u8>) -> Result<String> {
        let payload_len = payload.len();

        let file_part = reqwest::multipart::Part::bytes(payload)
            .file_name(self.file_name.clone())
            .mime_str("audio/wav")
            .map_err(|e| anyhow!("Failed to create file part for upload: {e}"))?;

        let form = reqwest::multipart::Form::new().part(self.file_field.clone(), file_part);

        tracing::debug!(
            "Uploading {} bytes to {} (field '{}', filename '{}')",
            payload_len,
            self.url,
            self.file_field,
            self.file_name
        );

        let response = match self.client.post(&self.url).multipart(form).send().await {
            Ok(resp) => resp,
            Err(e) => {
                let error_msg = if e.is_connect() {
                    "Failed to connect to the webhook server. Check your internet connection."
                        .to_string()
                } else if e.is_timeout() {
                    "Upload timed out. The webhook server is not responding.".to_string()
                } else {
                    format!("Webhook network error: {e}")
                };
                return Err(anyhow!(error_msg));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("Unknown");
            tracing::error!("Webhook upload failed: {} {}", status.as_u16(), reason);
            return Err(anyhow!(
                "Webhook returned {} {}",
                status.as_u16(),
                reason
            ));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response
            .text()
            .await
            .map_err(|e| anyhow!("Failed to read webhook response body: {e}"))?;

        let text = resolve_response(content_type.as_deref(), &body);
        tracing::debug!("Webhook response resolved to {} characters", text.len());
        Ok(text)
    }
}

/// Normalizes a webhook response body into transcription text.
///
/// JSON bodies go through the field fallback chain; anything else is taken
/// verbatim. A JSON content type with an unparseable body degrades to the
/// raw body rather than failing.
pub fn resolve_response(content_type: Option<&str>, body: &str) -> String {
    let is_json = content_type
        .map(|ct| ct.contains("application/json"))
        .unwrap_or(false);

    if !is_json {
        return body.to_string();
    }

    match serde_json::from_str::<Value>(body) {
        Ok(value) => extract_text(&value),
        Err(e) => {
            tracing::warn!("Webhook sent JSON content type with unparseable body: {e}");
            body.to_string()
        }
    }
}

/// Resolves the transcription text from a structured response.
///
/// Checks `text`, `transcription`, `output`, and `message` in order; when
/// none is present, the whole value is serialized as the result.
pub fn extract_text(value: &Value) -> String {
    for field in TEXT_FIELDS {
        if let Some(text) = value.get(field).and_then(Value::as_str) {
            return text.to_string();
        }
    }

    tracing::debug!("No known text field in webhook response, serializing whole body");
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_text_prefers_text_field() {
        let value = json!({ "text": "hello", "transcription": "ignored" });
        assert_eq!(extract_text(&value), "hello");
    }

    #[test]
    fn test_extract_text_fallback_chain() {
        assert_eq!(extract_text(&json!({ "transcription": "hi" })), "hi");
        assert_eq!(extract_text(&json!({ "output": "out" })), "out");
        assert_eq!(extract_text(&json!({ "message": "msg" })), "msg");
    }

    #[test]
    fn test_extract_text_serializes_unknown_shape() {
        let value = json!({ "foo": "bar" });
        assert_eq!(extract_text(&value), r#"{"foo":"bar"}"#);
    }

    #[test]
    fn test_extract_text_ignores_non_string_fields() {
        // A numeric "text" field is not a usable transcription
        let value = json!({ "text": 42, "message": "fallback" });
        assert_eq!(extract_text(&value), "fallback");
    }

    #[test]
    fn test_resolve_response_plain_text() {
        assert_eq!(
            resolve_response(Some("text/plain"), "plain result"),
            "plain result"
        );
        assert_eq!(resolve_response(None, "no header"), "no header");
    }

    #[test]
    fn test_resolve_response_json() {
        assert_eq!(
            resolve_response(Some("application/json"), r#"{"text":"hello"}"#),
            "hello"
        );
    }

    #[test]
    fn test_resolve_response_malformed_json_degrades() {
        assert_eq!(
            resolve_response(Some("application/json"), "{not json"),
            "{not json"
        );
    }
}
