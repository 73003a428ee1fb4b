//! Provider-agnostic request types.

use crate::ModelConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Role of a conversation participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A prior turn of the conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Turn {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            timestamp: None,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text)
    }
}

/// A file attached to the current turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub mime_type: String,
    /// `data:<mime>;base64,<payload>` URL. A bare base64 payload or an
    /// `http(s)` URL is also accepted.
    pub data: String,
    /// Text extracted from the file ahead of time.
    #[serde(default)]
    pub content: String,
}

/// Where an image attachment's bytes come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource<'a> {
    Inline { mime_type: &'a str, data: &'a str },
    Remote(&'a str),
}

impl ImageSource<'_> {
    /// Identity of the underlying image, used to skip duplicates.
    pub fn key(&self) -> &str {
        match self {
            Self::Inline { data, .. } => data,
            Self::Remote(url) => url,
        }
    }
}

impl Attachment {
    pub fn new(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        data: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            data: data.into(),
            content: String::new(),
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }

    /// The image payload, for image attachments.
    pub fn image(&self) -> Option<ImageSource<'_>> {
        if !self.is_image() || self.data.is_empty() {
            return None;
        }
        if self.data.starts_with("http://") || self.data.starts_with("https://") {
            return Some(ImageSource::Remote(&self.data));
        }
        match self.data.strip_prefix("data:") {
            Some(rest) => {
                let (header, payload) = rest.split_once(',')?;
                let mime_type = header
                    .strip_suffix(";base64")
                    .filter(|m| !m.is_empty())
                    .unwrap_or(&self.mime_type);
                Some(ImageSource::Inline {
                    mime_type,
                    data: payload,
                })
            }
            None => Some(ImageSource::Inline {
                mime_type: &self.mime_type,
                data: &self.data,
            }),
        }
    }
}

/// One logical call to an LLM.
#[derive(Debug, Clone)]
pub struct InvocationRequest {
    pub config: ModelConfig,
    pub prompt: String,
    pub system_prompt: Option<String>,
    pub history: Vec<Turn>,
    pub attachments: Vec<Attachment>,
    /// Opaque tool output spliced into the prompt as JSON text.
    pub tool_results: Option<Value>,
}

impl InvocationRequest {
    pub fn new(config: ModelConfig, prompt: impl Into<String>) -> Self {
        Self {
            config,
            prompt: prompt.into(),
            system_prompt: None,
            history: Vec::new(),
            attachments: Vec::new(),
            tool_results: None,
        }
    }

    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system_prompt = Some(system.into());
        self
    }

    pub fn history(mut self, history: Vec<Turn>) -> Self {
        self.history = history;
        self
    }

    pub fn attach(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    pub fn tool_results(mut self, results: Value) -> Self {
        self.tool_results = Some(results);
        self
    }
}
