//! Conversation history reconstruction from assistant logs
//!
//! One-shot and non-blocking: reads the latest log once and returns the last
//! N turns in chronological order.

use crate::data::{HistoryItem, LogFamily, Provider};
use crate::error::{BridgeError, Result};
use crate::logs::codex::{self, LineOutcome};
use crate::logs::gemini::{ChatSession, Role};
use crate::logs::{LogLayout, LogLocator};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Last `n` history items of `provider`'s latest log
pub fn recent(provider: Provider, locator: &LogLocator, n: usize) -> Result<Vec<HistoryItem>> {
    let family = provider.log_family().ok_or(BridgeError::Unsupported {
        provider,
        operation: "history",
    })?;
    let path = LogLayout::for_family(family).resolve(locator)?;
    tracing::debug!("Reading {} history from {}", provider, path.display());

    let items = match family {
        LogFamily::AppendOnly => append_log_history(&path)?,
        LogFamily::FullRewrite => rewrite_log_history(&path)?,
    };
    Ok(tail(items, n))
}

/// Every assistant reply in an append-only log, answer-only.
///
/// Prompts and replies sit on separate, unlinked lines, so no pairing is attempted.
pub fn append_log_history(path: &Path) -> Result<Vec<HistoryItem>> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut items = Vec::new();
    let mut line = Vec::new();

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }

        match codex::parse_line(&line) {
            LineOutcome::Reply(text) => {
                let text = text.trim();
                if !text.is_empty() {
                    items.push(HistoryItem::answer(text));
                }
            }
            LineOutcome::Skip(_) => continue,
        }
    }

    Ok(items)
}

/// Question/answer turns of a full-rewrite log
pub fn rewrite_log_history(path: &Path) -> Result<Vec<HistoryItem>> {
    let session = ChatSession::read(path)?;
    Ok(pair_messages(&session))
}

/// Pair each assistant message with the latest unanswered user message.
///
/// A newer user message replaces an unanswered one; an assistant message
/// with nothing pending becomes an answer-only item.
pub fn pair_messages(session: &ChatSession) -> Vec<HistoryItem> {
    let mut items = Vec::new();
    let mut pending: Option<String> = None;

    for message in &session.messages {
        match message.role() {
            Role::User => {
                let text = message.text().trim().to_string();
                pending = (!text.is_empty()).then_some(text);
            }
            Role::Assistant => {
                let answer = message.text().trim().to_string();
                items.push(match pending.take() {
                    Some(question) => HistoryItem::pair(question, answer),
                    None => HistoryItem::answer(answer),
                });
            }
            Role::Other => {}
        }
    }

    items
}

/// The last `n` items, order preserved
pub fn tail<T>(mut items: Vec<T>, n: usize) -> Vec<T> {
    let keep = n.min(items.len());
    items.split_off(items.len() - keep)
}
