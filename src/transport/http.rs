use crate::{Error, ErrorContext, Result};
use keyring::Entry;
use reqwest::Proxy;
use serde_json::Value;
use std::env;
use std::time::Duration;

/// How a provider expects its API key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStyle {
    /// `Authorization: Bearer <key>` (OpenAI).
    Bearer,
    /// `?key=<key>` query parameter (Gemini).
    QueryKey,
}

/// JSON-over-HTTP client bound to one provider's base URL and key.
pub struct HttpTransport {
    client: reqwest::Client,
    provider_id: String,
    base_url: String,
    api_key: String,
    auth: AuthStyle,
}

impl HttpTransport {
    pub fn new(
        provider_id: &str,
        base_url: &str,
        api_key: String,
        auth: AuthStyle,
        timeout: Duration,
    ) -> Result<Self> {
        let client = build_client(timeout)?;
        Ok(Self {
            client,
            provider_id: provider_id.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            auth,
        })
    }

    pub fn provider_id(&self) -> &str {
        &self.provider_id
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST `body` to `path` and return the parsed JSON response.
    ///
    /// Non-2xx statuses become [`Error::Remote`] carrying the provider's
    /// `error.message` when it sent one.
    pub async fn post_json(&self, path: &str, body: &Value) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.post(&url).json(body);
        request = match self.auth {
            AuthStyle::Bearer => request.bearer_auth(&self.api_key),
            AuthStyle::QueryKey => request.query(&[("key", self.api_key.as_str())]),
        };

        let response = request.send().await.map_err(TransportError::Http)?;
        let status = response.status();
        let text = response.text().await.map_err(TransportError::Http)?;

        if !status.is_success() {
            return Err(remote_error(&self.provider_id, path, status, &text));
        }

        Ok(serde_json::from_str(&text)?)
    }
}

/// Map a non-2xx provider reply to [`Error::Remote`], preferring its `error.message`.
pub(crate) fn remote_error(
    provider_id: &str,
    path: &str,
    status: reqwest::StatusCode,
    body: &str,
) -> Error {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(|m| m.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| truncate_body(body));
    tracing::warn!(
        provider = provider_id,
        status = status.as_u16(),
        path,
        error = %message,
        "provider request failed"
    );
    Error::Remote {
        provider: provider_id.to_string(),
        status: status.as_u16(),
        message,
    }
}

/// Shared reqwest client construction: request timeout plus optional proxy.
pub(crate) fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .timeout(timeout)
        .pool_idle_timeout(Some(Duration::from_secs(90)));

    if let Ok(proxy_url) = env::var("RELAY_PROXY_URL") {
        if let Ok(proxy) = Proxy::all(&proxy_url) {
            builder = builder.proxy(proxy);
        }
    }

    builder
        .build()
        .map_err(|e| Error::Transport(TransportError::Other(e.to_string())))
}

/// Resolve a provider key: explicit value, then OS keyring, then `<PROVIDER>_API_KEY`.
pub fn resolve_api_key(provider_id: &str, explicit: Option<&str>) -> Result<String> {
    if let Some(key) = explicit.map(str::trim).filter(|k| !k.is_empty()) {
        return Ok(key.to_string());
    }

    if let Ok(entry) = Entry::new("avatar-voice-relay", provider_id) {
        if let Ok(key) = entry.get_password() {
            return Ok(key);
        }
    }

    let env_var = format!("{}_API_KEY", provider_id.to_uppercase());
    env::var(&env_var)
        .ok()
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| {
            Error::configuration_with_context(
                format!("No API key for provider '{}'", provider_id),
                ErrorContext::new()
                    .with_field_path(env_var)
                    .with_source("transport"),
            )
        })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport error: {0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_key_wins() {
        assert_eq!(resolve_api_key("openai", Some(" sk-test ")).unwrap(), "sk-test");
    }

    #[test]
    fn remote_error_prefers_provider_message() {
        let body = r#"{"error":{"message":"Invalid API key","type":"auth"}}"#;
        match remote_error("openai", "/v1/chat/completions", reqwest::StatusCode::UNAUTHORIZED, body) {
            Error::Remote { provider, status, message } => {
                assert_eq!(provider, "openai");
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid API key");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn long_error_bodies_are_shortened() {
        let body = "x".repeat(500);
        let short = truncate_body(&body);
        assert_eq!(short.len(), 203);
        assert!(short.ends_with("..."));
    }
}
