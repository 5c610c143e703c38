//! Relay configuration: optional YAML file, then environment overrides.
//!
//! Every section has working defaults so the relay starts with nothing but an
//! API key in the environment.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;
use std::time::Duration;

use crate::{Error, ErrorContext, Result};

/// Which backend answers classification and generation calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    Gemini,
}

impl ProviderKind {
    pub fn id(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Gemini => "gemini",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Some(ProviderKind::OpenAi),
            "gemini" | "google" => Some(ProviderKind::Gemini),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelayConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub models: ModelConfig,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub voice: VoiceConfig,
    #[serde(default)]
    pub conversation: ConversationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_provider")]
    pub kind: ProviderKind,
    /// Explicit key; when absent the keyring and `<PROVIDER>_API_KEY` are consulted.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,
    #[serde(default = "default_gemini_base_url")]
    pub gemini_base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_classifier_model")]
    pub classifier: String,
    #[serde(default = "default_main_model")]
    pub main: String,
    #[serde(default = "default_search_model")]
    pub search: String,
    /// Chat model with built-in search, used when the search tool call fails.
    #[serde(default = "default_search_fallback_model")]
    pub search_fallback: String,
    #[serde(default = "default_stt_model")]
    pub stt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_direct_ttl")]
    pub direct_ttl_secs: u64,
    #[serde(default = "default_search_ttl")]
    pub search_ttl_secs: u64,
    #[serde(default = "default_sweep_threshold")]
    pub sweep_threshold: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceConfig {
    #[serde(default = "default_max_sentences")]
    pub max_sentences: usize,
    #[serde(default = "default_avatar_name")]
    pub avatar_name: String,
    /// Deadline for the best-effort interrupt-keyword transcription.
    #[serde(default = "default_interrupt_deadline_ms")]
    pub interrupt_deadline_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationConfig {
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive (e.g. "info", "avatar_voice_relay=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
}
fn default_port() -> u16 {
    3001
}
fn default_provider() -> ProviderKind {
    ProviderKind::OpenAi
}
fn default_openai_base_url() -> String {
    "https://api.openai.com".to_string()
}
fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_classifier_model() -> String {
    "gpt-4.1-nano".to_string()
}
fn default_main_model() -> String {
    "gpt-4.1-mini".to_string()
}
fn default_search_model() -> String {
    "gpt-4.1".to_string()
}
fn default_search_fallback_model() -> String {
    "gpt-4o-search-preview".to_string()
}
fn default_stt_model() -> String {
    "whisper-1".to_string()
}
fn default_direct_ttl() -> u64 {
    5 * 60
}
fn default_search_ttl() -> u64 {
    30
}
fn default_sweep_threshold() -> usize {
    100
}
fn default_max_sentences() -> usize {
    3
}
fn default_avatar_name() -> String {
    "Marianne".to_string()
}
fn default_interrupt_deadline_ms() -> u64 {
    3000
}
fn default_max_sessions() -> usize {
    500
}
fn default_max_turns() -> usize {
    20
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: default_provider(),
            api_key: None,
            openai_base_url: default_openai_base_url(),
            gemini_base_url: default_gemini_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            classifier: default_classifier_model(),
            main: default_main_model(),
            search: default_search_model(),
            search_fallback: default_search_fallback_model(),
            stt: default_stt_model(),
        }
    }
}

impl ModelConfig {
    /// Swap any model still at its OpenAI default for the Gemini equivalent.
    pub fn align_with(&mut self, kind: ProviderKind) {
        if kind != ProviderKind::Gemini {
            return;
        }
        let swap = |current: &mut String, openai_default: String, gemini: &str| {
            if *current == openai_default {
                *current = gemini.to_string();
            }
        };
        swap(&mut self.classifier, default_classifier_model(), "gemini-2.0-flash-lite");
        swap(&mut self.main, default_main_model(), "gemini-2.0-flash");
        swap(&mut self.search, default_search_model(), "gemini-2.0-flash");
        swap(&mut self.search_fallback, default_search_fallback_model(), "gemini-1.5-flash");
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            direct_ttl_secs: default_direct_ttl(),
            search_ttl_secs: default_search_ttl(),
            sweep_threshold: default_sweep_threshold(),
        }
    }
}

impl CacheSettings {
    pub fn direct_ttl(&self) -> Duration {
        Duration::from_secs(self.direct_ttl_secs)
    }

    pub fn search_ttl(&self) -> Duration {
        Duration::from_secs(self.search_ttl_secs)
    }
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            max_sentences: default_max_sentences(),
            avatar_name: default_avatar_name(),
            interrupt_deadline_ms: default_interrupt_deadline_ms(),
        }
    }
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            max_sessions: default_max_sessions(),
            max_turns: default_max_turns(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl RelayConfig {
    /// Load from an optional YAML file, apply environment overrides, validate.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) if p.exists() => Self::from_yaml_file(p)?,
            Some(p) => {
                tracing::warn!(path = %p.display(), "config file not found, using defaults");
                Self::default()
            }
            None => Self::default(),
        };
        config.apply_env_with(|key| std::env::var(key).ok())?;
        config.models.align_with(config.provider.kind);
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content).map_err(|e| match e {
            Error::Configuration { message, context } => Error::Configuration {
                message,
                context: context.with_details(path.display().to_string()),
            },
            other => other,
        })
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| {
            Error::configuration_with_context(
                format!("Invalid relay config: {}", e),
                ErrorContext::new().with_source("config"),
            )
        })
    }

    /// Apply `RELAY_*` and provider key overrides using the given lookup.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(host) = get("RELAY_HOST") {
            self.server.host = host.parse().map_err(|_| invalid("RELAY_HOST", &host))?;
        }
        if let Some(port) = get("RELAY_PORT").or_else(|| get("PORT")) {
            self.server.port = port.parse().map_err(|_| invalid("RELAY_PORT", &port))?;
        }
        if let Some(kind) = get("RELAY_PROVIDER") {
            self.provider.kind =
                ProviderKind::parse(&kind).ok_or_else(|| invalid("RELAY_PROVIDER", &kind))?;
        }
        if let Some(secs) = get("RELAY_HTTP_TIMEOUT_SECS") {
            self.provider.timeout_secs = secs
                .parse()
                .map_err(|_| invalid("RELAY_HTTP_TIMEOUT_SECS", &secs))?;
        }
        if let Some(url) = get("RELAY_OPENAI_BASE_URL") {
            self.provider.openai_base_url = url;
        }
        if let Some(url) = get("RELAY_GEMINI_BASE_URL") {
            self.provider.gemini_base_url = url;
        }
        if self.provider.api_key.is_none() {
            self.provider.api_key = match self.provider.kind {
                ProviderKind::OpenAi => get("OPENAI_API_KEY").or_else(|| get("VITE_OPENAI_API_KEY")),
                ProviderKind::Gemini => get("GEMINI_API_KEY").or_else(|| get("GOOGLE_API_KEY")),
            };
        }
        if let Some(m) = get("RELAY_CLASSIFIER_MODEL") {
            self.models.classifier = m;
        }
        if let Some(m) = get("RELAY_MAIN_MODEL") {
            self.models.main = m;
        }
        if let Some(m) = get("RELAY_SEARCH_MODEL") {
            self.models.search = m;
        }
        if let Some(level) = get("RELAY_LOG") {
            self.logging.level = level;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("provider.openai_base_url", &self.provider.openai_base_url),
            ("provider.gemini_base_url", &self.provider.gemini_base_url),
        ] {
            url::Url::parse(value).map_err(|e| {
                Error::configuration_with_context(
                    format!("Invalid base URL: {}", e),
                    ErrorContext::new().with_field_path(field).with_details(value.clone()),
                )
            })?;
        }
        if self.cache.search_ttl_secs == 0 || self.cache.direct_ttl_secs == 0 {
            return Err(Error::configuration_with_context(
                "Cache TTLs must be greater than zero",
                ErrorContext::new().with_field_path("cache"),
            ));
        }
        if self.voice.max_sentences == 0 {
            return Err(Error::configuration_with_context(
                "max_sentences must be at least 1",
                ErrorContext::new().with_field_path("voice.max_sentences"),
            ));
        }
        if self.conversation.max_sessions == 0 {
            return Err(Error::configuration_with_context(
                "max_sessions must be at least 1",
                ErrorContext::new().with_field_path("conversation.max_sessions"),
            ));
        }
        Ok(())
    }
}

fn invalid(key: &str, value: &str) -> Error {
    Error::configuration_with_context(
        format!("Invalid value for {}", key),
        ErrorContext::new()
            .with_field_path(key)
            .with_details(value.to_string())
            .with_source("env"),
    )
}
