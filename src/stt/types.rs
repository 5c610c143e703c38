use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcription {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// Per-request transcription options.
#[derive(Debug, Clone, Default)]
pub struct SttOptions {
    pub language: Option<String>,
    /// Upload file name; its extension tells the provider the container format.
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
}

impl SttOptions {
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_file(mut self, file_name: impl Into<String>, mime_type: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self.mime_type = Some(mime_type.into());
        self
    }
}
