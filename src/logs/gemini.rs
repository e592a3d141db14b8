//! Gemini chat session format (whole file rewritten every turn)
//!
//! ```json
//! {"messages": [{"type": "user", "content": "hi"}, {"type": "gemini", "content": "hello"}]}
//! ```

use crate::error::{BridgeError, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
pub struct ChatSession {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatMessage {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub content: serde_json::Value,
}

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
    Other,
}

impl ChatMessage {
    pub fn role(&self) -> Role {
        match self.kind.as_str() {
            "user" => Role::User,
            "gemini" | "model" => Role::Assistant,
            _ => Role::Other,
        }
    }

    /// Message text. Structured content degrades to its compact JSON form.
    pub fn text(&self) -> String {
        match &self.content {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

impl ChatSession {
    pub fn from_slice(bytes: &[u8], path: &Path) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|source| BridgeError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn read(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_slice(&bytes, path)
    }
}
