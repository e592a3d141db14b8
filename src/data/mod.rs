use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// An AI assistant identity, bound to at most one live pane at a time
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Claude,
    Codex,
    Gemini,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::Claude, Provider::Codex, Provider::Gemini];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Claude => "claude",
            Self::Codex => "codex",
            Self::Gemini => "gemini",
        }
    }

    /// How this provider's assistant writes its conversation log (None for Claude)
    pub fn log_family(&self) -> Option<LogFamily> {
        match self {
            Self::Claude => None,
            Self::Codex => Some(LogFamily::AppendOnly),
            Self::Gemini => Some(LogFamily::FullRewrite),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "claude" => Ok(Self::Claude),
            "codex" => Ok(Self::Codex),
            "gemini" => Ok(Self::Gemini),
            other => Err(format!("unknown provider: {}", other)),
        }
    }
}

/// Write semantics of an assistant's log file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFamily {
    /// New JSON lines appended to a stable file (Codex)
    AppendOnly,
    /// Whole JSON document rewritten on every turn (Gemini)
    FullRewrite,
}

/// Persisted binding of a provider to the pane running it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: String,
    pub pane_id: String,
    pub active: bool,
    pub work_dir: PathBuf,
    pub started_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Fresh active record for a pane that was just spawned
    pub fn started(provider: Provider, pane_id: impl Into<String>, work_dir: PathBuf) -> Self {
        let now = Utc::now();
        Self {
            session_id: format!("{}-{}", provider, now.timestamp()),
            pane_id: pane_id.into(),
            active: true,
            work_dir,
            started_at: now,
        }
    }
}

/// Where a new pane is placed relative to the pane it splits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SplitDirection {
    Left,
    Right,
    Top,
    #[default]
    Bottom,
}

/// One reconstructed conversation turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryItem {
    pub question: Option<String>,
    pub answer: String,
}

impl HistoryItem {
    pub fn answer(answer: impl Into<String>) -> Self {
        Self {
            question: None,
            answer: answer.into(),
        }
    }

    pub fn pair(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: Some(question.into()),
            answer: answer.into(),
        }
    }
}

impl fmt::Display for HistoryItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.question {
            Some(q) => write!(f, "Q: {}\nA: {}", q, self.answer),
            None => write!(f, "A: {}", self.answer),
        }
    }
}
