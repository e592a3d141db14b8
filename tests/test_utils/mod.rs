#![allow(dead_code)]
//! Test utilities and fixtures for panebridge tests

use panebridge::error::{BridgeError, Result};
use panebridge::terminal::CommandRunner;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

/// A temporary home directory holding assistant logs
pub struct TestHome {
    pub temp_dir: TempDir,
}

impl TestHome {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write `content` to `~/<rel>`, creating parent directories
    pub fn write(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create log dir");
        }
        fs::write(&path, content).expect("Failed to write log");
        path
    }

    /// Write a file and backdate its modification time by `age`
    pub fn write_aged(&self, rel: &str, content: &str, age: Duration) -> PathBuf {
        let path = self.write(rel, content);
        set_mtime(&path, SystemTime::now() - age);
        path
    }
}

pub fn set_mtime(path: &Path, time: SystemTime) {
    fs::File::options()
        .write(true)
        .open(path)
        .expect("Failed to open for mtime")
        .set_modified(time)
        .expect("Failed to set mtime");
}

/// Append raw text to a file
pub fn append(path: &Path, text: &str) {
    use std::io::Write;
    let mut file = fs::OpenOptions::new()
        .append(true)
        .open(path)
        .expect("Failed to open log for append");
    file.write_all(text.as_bytes()).expect("Failed to append");
    file.flush().expect("Failed to flush");
}

/// One Codex log line carrying `text` as an output_text segment
pub fn codex_reply_line(text: &str) -> String {
    let line = json!({
        "type": "response_item",
        "payload": {
            "type": "message",
            "content": [{"type": "output_text", "text": text}]
        }
    });
    format!("{}\n", line)
}

/// One Codex log line using the legacy flat message field
pub fn codex_legacy_line(text: &str) -> String {
    let line = json!({
        "type": "response_item",
        "payload": {"type": "message", "message": text}
    });
    format!("{}\n", line)
}

/// A Codex line that never carries a reply
pub fn codex_noise_line() -> String {
    let line = json!({"type": "event_msg", "payload": {"type": "token_count"}});
    format!("{}\n", line)
}

/// Gemini session JSON from (type, content) pairs
pub fn gemini_session(messages: &[(&str, Value)]) -> String {
    let messages: Vec<Value> = messages
        .iter()
        .map(|(kind, content)| json!({"type": kind, "content": content}))
        .collect();
    json!({ "sessionId": "s-1", "messages": messages }).to_string()
}

/// Command runner that records invocations instead of spawning processes
#[derive(Default)]
pub struct RecordingRunner {
    calls: Mutex<Vec<Vec<String>>>,
    stdout: String,
    fail_on: Option<String>,
}

impl RecordingRunner {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Runner whose every successful call prints `stdout`
    pub fn with_stdout(stdout: &str) -> Arc<Self> {
        Arc::new(Self {
            stdout: stdout.to_string(),
            ..Self::default()
        })
    }

    /// Runner that fails any call with an argument equal to `arg`
    pub fn failing_on(arg: &str) -> Arc<Self> {
        Arc::new(Self {
            fail_on: Some(arg.to_string()),
            ..Self::default()
        })
    }

    /// Every call as `[program, args...]`
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<String> {
        let mut call = vec![program.to_string()];
        call.extend(args.iter().cloned());
        self.calls.lock().unwrap().push(call);

        if let Some(fail) = &self.fail_on {
            if args.iter().any(|a| a == fail) {
                return Err(BridgeError::Subprocess {
                    program: program.to_string(),
                    args: args.join(" "),
                    message: "exit status: 1".to_string(),
                });
            }
        }
        Ok(self.stdout.clone())
    }
}

/// Owned argv from string slices, for comparing against recorded calls
pub fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}
