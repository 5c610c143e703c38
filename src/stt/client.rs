use bytes::Bytes;
use std::time::Duration;

use super::types::{SttOptions, Transcription};
use crate::transport::{build_client, remote_error, resolve_api_key, TransportError};
use crate::{Error, ErrorContext, Result};

const TRANSCRIPTIONS_PATH: &str = "/v1/audio/transcriptions";

/// Client for OpenAI-compatible speech-to-text.
pub struct SttClient {
    http_client: reqwest::Client,
    model: String,
    base_url: String,
    endpoint_path: String,
    api_key: String,
}

impl SttClient {
    pub fn builder() -> SttClientBuilder {
        SttClientBuilder::new()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn transcribe(&self, audio: Bytes, options: &SttOptions) -> Result<Transcription> {
        if audio.is_empty() {
            return Err(Error::validation_with_context(
                "No audio provided",
                ErrorContext::new().with_field_path("audio").with_source("stt"),
            ));
        }

        let endpoint = format!("{}{}", self.base_url, self.endpoint_path);
        let file_name = options.file_name.clone().unwrap_or_else(|| "audio.webm".to_string());
        let mime = options.mime_type.as_deref().unwrap_or("audio/webm");
        let part = reqwest::multipart::Part::bytes(audio.to_vec())
            .file_name(file_name)
            .mime_str(mime)
            .map_err(|e| {
                Error::validation_with_context(
                    format!("Invalid audio mime type: {}", e),
                    ErrorContext::new().with_details(mime.to_string()),
                )
            })?;

        let mut form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", self.model.clone());
        if let Some(lang) = &options.language {
            form = form.text("language", lang.clone());
        }

        let response = self
            .http_client
            .post(&endpoint)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(TransportError::Http)?;
        let status = response.status();
        let body = response.text().await.map_err(TransportError::Http)?;
        if !status.is_success() {
            return Err(remote_error("openai", &self.endpoint_path, status, &body));
        }

        let json: serde_json::Value = serde_json::from_str(&body)?;
        let text = json
            .get("text")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .trim()
            .to_string();
        tracing::debug!(chars = text.len(), "transcription complete");
        Ok(Transcription {
            text,
            language: json.get("language").and_then(|v| v.as_str()).map(String::from),
        })
    }

    /// Best-effort transcription bounded by `deadline`; `None` on timeout or any error.
    pub async fn quick_transcribe(&self, audio: Bytes, deadline: Duration) -> Option<String> {
        let options = SttOptions::default().with_language("en");
        match tokio::time::timeout(deadline, self.transcribe(audio, &options)).await {
            Ok(Ok(t)) => Some(t.text),
            Ok(Err(e)) => {
                tracing::debug!(error = %e, "quick transcription failed");
                None
            }
            Err(_) => {
                tracing::debug!(deadline_ms = deadline.as_millis() as u64, "quick transcription timed out");
                None
            }
        }
    }
}

pub struct SttClientBuilder {
    model: Option<String>,
    api_key: Option<String>,
    base_url: Option<String>,
    endpoint_path: Option<String>,
    timeout: Duration,
}

impl SttClientBuilder {
    pub fn new() -> Self {
        Self {
            model: None,
            api_key: None,
            base_url: None,
            endpoint_path: None,
            timeout: Duration::from_secs(60),
        }
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn endpoint_path(mut self, path: impl Into<String>) -> Self {
        self.endpoint_path = Some(path.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<SttClient> {
        let model = self.model.unwrap_or_else(|| "whisper-1".to_string());
        let api_key = resolve_api_key("openai", self.api_key.as_deref())?;
        let base_url = self
            .base_url
            .unwrap_or_else(|| "https://api.openai.com".to_string())
            .trim_end_matches('/')
            .to_string();
        let endpoint_path = self
            .endpoint_path
            .unwrap_or_else(|| TRANSCRIPTIONS_PATH.to_string());
        let endpoint_path = if endpoint_path.starts_with('/') {
            endpoint_path
        } else {
            format!("/{}", endpoint_path)
        };
        Ok(SttClient {
            http_client: build_client(self.timeout)?,
            model,
            base_url,
            endpoint_path,
            api_key,
        })
    }
}

impl Default for SttClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
