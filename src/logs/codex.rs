//! Codex rollout log format (append-only JSON lines)
//!
//! Each line is an independent `{type, payload}` record. Only
//! `response_item` records carry assistant output:
//!
//! ```json
//! {"type":"response_item","payload":{"type":"message","content":[{"type":"output_text","text":"hi"}]}}
//! {"type":"response_item","payload":{"type":"message","message":"hi"}}
//! ```
//!
//! The second form is the legacy flat layout; both extract to `"hi"`.

use serde::Deserialize;

pub const RESPONSE_ITEM: &str = "response_item";
pub const OUTPUT_TEXT: &str = "output_text";

#[derive(Debug, Deserialize)]
pub struct LogEntry {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResponsePayload {
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Legacy flat reply text
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub content: Option<Vec<ContentSegment>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ContentSegment {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub text: String,
}

impl ResponsePayload {
    /// Concatenated `output_text` segments, falling back to the legacy message
    pub fn reply_text(&self) -> Option<String> {
        let joined: String = self
            .content
            .iter()
            .flatten()
            .filter(|c| c.kind == OUTPUT_TEXT)
            .map(|c| c.text.as_str())
            .collect();

        if !joined.is_empty() {
            return Some(joined);
        }

        self.message.clone().filter(|m| !m.is_empty())
    }
}

/// Why a log line produced no reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MalformedLine,
    NotResponseItem,
    MalformedPayload,
    NoText,
}

/// Result of interpreting one log line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    Reply(String),
    /// Expected for most lines: logs interleave many unrelated record kinds
    Skip(SkipReason),
}

/// Interpret one log line. Never fails; anything unusable is a `Skip`.
pub fn parse_line(line: &[u8]) -> LineOutcome {
    let entry: LogEntry = match serde_json::from_slice(line) {
        Ok(e) => e,
        Err(_) => return LineOutcome::Skip(SkipReason::MalformedLine),
    };

    if entry.kind != RESPONSE_ITEM {
        return LineOutcome::Skip(SkipReason::NotResponseItem);
    }

    let payload: ResponsePayload = match serde_json::from_value(entry.payload) {
        Ok(p) => p,
        Err(_) => return LineOutcome::Skip(SkipReason::MalformedPayload),
    };

    match payload.reply_text() {
        Some(text) => LineOutcome::Reply(text),
        None => LineOutcome::Skip(SkipReason::NoText),
    }
}
