//! Diff strategy for full-rewrite logs (Gemini)
//!
//! The assistant replaces the whole session file on every update, so there
//! is no stable offset to tail. Each tick re-parses the file and compares its
//! message count with the last one seen.

use super::ReplySource;
use crate::error::{BridgeError, Result};
use crate::logs::gemini::{ChatSession, Role};
use crate::logs::{LogLayout, LogLocator};
use std::path::PathBuf;
use std::time::Duration;

pub struct RewriteDiff {
    layout: LogLayout,
    locator: LogLocator,
    interval: Duration,
    path: Option<PathBuf>,
    /// Message count already accounted for
    seen: usize,
}

impl RewriteDiff {
    pub fn new(layout: LogLayout, locator: LogLocator, interval: Duration) -> Self {
        Self {
            layout,
            locator,
            interval,
            path: None,
            seen: 0,
        }
    }

    /// Newest assistant reply among messages past the baseline, advancing the baseline
    fn scan(&mut self, session: &ChatSession) -> Option<String> {
        let count = session.messages.len();

        if count < self.seen {
            tracing::debug!("Session shrank from {} to {} messages", self.seen, count);
            self.seen = count;
            return None;
        }
        if count == self.seen {
            return None;
        }

        let reply = session.messages[self.seen..]
            .iter()
            .rev()
            .find(|m| m.role() == Role::Assistant)
            .map(|m| m.text());

        if reply.is_none() {
            // Only user turns were added; keep waiting for the answer
            self.seen = count;
        }
        reply
    }
}

impl ReplySource for RewriteDiff {
    fn begin(&mut self) -> Result<()> {
        let path = self.layout.resolve(&self.locator)?;

        self.seen = match ChatSession::read(&path) {
            Ok(session) => session.messages.len(),
            Err(e) => {
                tracing::debug!("Unreadable baseline {}, counting from 0: {}", path.display(), e);
                0
            }
        };
        tracing::debug!("Watching {} from {} messages", path.display(), self.seen);

        self.path = Some(path);
        Ok(())
    }

    fn poll(&mut self) -> Result<Option<String>> {
        let path = self.path.clone().ok_or_else(|| {
            BridgeError::Io(std::io::Error::other("rewrite diff polled before begin"))
        })?;

        // The assistant may be mid-rewrite; a failed read is retried next tick
        let session = match ChatSession::read(&path) {
            Ok(s) => s,
            Err(e) => {
                tracing::trace!("Skipping tick: {}", e);
                return Ok(None);
            }
        };

        Ok(self.scan(&session))
    }

    fn interval(&self) -> Duration {
        self.interval
    }
}
