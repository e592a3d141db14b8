//! Assistant log discovery and log formats
//!
//! Assistants nest their logs under hashed or dated subfolders of a
//! directory in the user's home:
//!
//! ```text
//! ~/.codex/sessions/2025/01/31/rollout-<uuid>.jsonl   <- append-only
//! ~/.gemini/tmp/<project-hash>/chats/session-<id>.json <- full-rewrite
//! ~/.gemini/chats/<id>.json                            <- older fallback
//! ```
//!
//! Only the most recently modified file matters: it belongs to the session
//! the assistant is currently writing.

pub mod codex;
pub mod gemini;

use crate::data::{LogFamily, Provider};
use crate::error::{BridgeError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// File name predicate for log candidates
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchRule {
    Suffix(String),
    Contains(String),
}

impl MatchRule {
    pub fn matches(&self, file_name: &str) -> bool {
        match self {
            Self::Suffix(s) => file_name.ends_with(s.as_str()),
            Self::Contains(s) => file_name.contains(s.as_str()),
        }
    }
}

/// Finds the latest log file below a home directory
#[derive(Debug, Clone)]
pub struct LogLocator {
    home: PathBuf,
}

impl LogLocator {
    /// Locator rooted at an explicit home directory (used for testing)
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    /// Locator rooted at the current user's home directory
    pub fn from_home() -> Result<Self> {
        dirs::home_dir()
            .map(Self::new)
            .ok_or_else(|| BridgeError::LogNotFound("could not determine home directory".into()))
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Most recently modified file under `~/<base_dir>` whose name satisfies `rule`
    pub fn locate(&self, base_dir: &Path, rule: &MatchRule) -> Result<PathBuf> {
        let dir = self.home.join(base_dir);
        if !dir.is_dir() {
            return Err(BridgeError::LogNotFound(format!(
                "directory not found: {}",
                dir.display()
            )));
        }

        let mut latest: Option<(PathBuf, SystemTime)> = None;
        collect_latest(&dir, rule, &mut latest);

        match latest {
            Some((path, _)) => {
                tracing::debug!("Latest log in {}: {}", dir.display(), path.display());
                Ok(path)
            }
            None => Err(BridgeError::LogNotFound(format!(
                "no logs found in {}",
                dir.display()
            ))),
        }
    }
}

/// Recursive walk keeping only the newest match. Unreadable entries are skipped.
fn collect_latest(dir: &Path, rule: &MatchRule, latest: &mut Option<(PathBuf, SystemTime)>) {
    let entries = match fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            tracing::debug!("Skipping unreadable directory {}: {}", dir.display(), e);
            return;
        }
    };

    for entry in entries.flatten() {
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        let path = entry.path();

        if file_type.is_dir() {
            collect_latest(&path, rule, latest);
            continue;
        }

        let name = entry.file_name();
        if !rule.matches(&name.to_string_lossy()) {
            continue;
        }

        let Ok(modified) = entry.metadata().and_then(|m| m.modified()) else {
            continue;
        };

        // Ties keep the first candidate seen
        if latest.as_ref().map(|(_, t)| modified > *t).unwrap_or(true) {
            *latest = Some((path, modified));
        }
    }
}

/// Ordered list of candidate directories sharing one match rule
#[derive(Debug, Clone)]
pub struct LogLayout {
    pub base_dirs: Vec<PathBuf>,
    pub rule: MatchRule,
}

impl LogLayout {
    pub fn for_family(family: LogFamily) -> Self {
        match family {
            LogFamily::AppendOnly => Self {
                base_dirs: vec![PathBuf::from(".codex/sessions")],
                rule: MatchRule::Suffix(".jsonl".into()),
            },
            LogFamily::FullRewrite => Self {
                base_dirs: vec![PathBuf::from(".gemini/tmp"), PathBuf::from(".gemini/chats")],
                rule: MatchRule::Suffix(".json".into()),
            },
        }
    }

    pub fn for_provider(provider: Provider) -> Result<Self> {
        provider
            .log_family()
            .map(Self::for_family)
            .ok_or(BridgeError::Unsupported {
                provider,
                operation: "log discovery",
            })
    }

    /// Try each base directory in order; first hit wins, last failure is returned
    pub fn resolve(&self, locator: &LogLocator) -> Result<PathBuf> {
        let mut last_err =
            BridgeError::LogNotFound("log layout has no candidate directories".into());

        for dir in &self.base_dirs {
            match locator.locate(dir, &self.rule) {
                Ok(path) => return Ok(path),
                Err(e) => {
                    tracing::debug!("Log lookup in {} failed: {}", dir.display(), e);
                    last_err = e;
                }
            }
        }

        Err(last_err)
    }
}
