//! tmux backend: one detached session per assistant
//!
//! tmux has no cheap way to address a pane split from the caller's own
//! window across invocations, so each assistant gets its own session and the
//! session name is the pane handle.

use super::{args, CommandRunner, TerminalBackend};
use crate::data::{Provider, SplitDirection};
use crate::error::Result;
use crate::session::SessionStore;
use std::path::Path;
use std::sync::Arc;

const TMUX: &str = "tmux";

pub struct TmuxBackend {
    store: SessionStore,
    runner: Arc<dyn CommandRunner>,
    inside_tmux: bool,
}

impl TmuxBackend {
    pub fn new(store: SessionStore, runner: Arc<dyn CommandRunner>) -> Self {
        let inside_tmux = std::env::var_os("TMUX").is_some();
        Self::with_client(store, runner, inside_tmux)
    }

    /// Backend with an explicit answer to "is the caller attached to tmux" (used for testing)
    pub fn with_client(
        store: SessionStore,
        runner: Arc<dyn CommandRunner>,
        inside_tmux: bool,
    ) -> Self {
        Self {
            store,
            runner,
            inside_tmux,
        }
    }

    fn tmux(&self, parts: &[&str]) -> Result<String> {
        self.runner.run(TMUX, &args(parts))
    }
}

/// Unique session name for a new assistant pane
fn session_name() -> String {
    let now = chrono::Utc::now();
    let nanos = now
        .timestamp_nanos_opt()
        .unwrap_or_else(|| now.timestamp_micros() * 1000);
    format!("ai-{}", nanos)
}

impl TerminalBackend for TmuxBackend {
    fn name(&self) -> &'static str {
        "tmux"
    }

    fn send_text(&self, pane: &str, text: &str) -> Result<()> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }
        // -l sends the text literally; Enter must be a separate key event.
        // `--` keeps text starting with '-' from being read as a flag.
        self.tmux(&["send-keys", "-t", pane, "-l", "--", text])?;
        self.tmux(&["send-keys", "-t", pane, "Enter"])?;
        Ok(())
    }

    fn is_alive(&self, pane: &str) -> bool {
        self.tmux(&["has-session", "-t", pane]).is_ok()
    }

    fn create_pane(&self, command: &str, cwd: &Path, _direction: SplitDirection) -> Result<String> {
        let name = session_name();
        let cwd = cwd.to_string_lossy();
        self.tmux(&["new-session", "-d", "-s", &name, "-c", &cwd, command])?;
        tracing::info!("Started tmux session {} running {:?}", name, command);
        Ok(name)
    }

    fn create_pane_at(
        &self,
        _target: &str,
        command: &str,
        cwd: &Path,
        direction: SplitDirection,
    ) -> Result<String> {
        self.create_pane(command, cwd, direction)
    }

    fn kill_pane(&self, pane: &str) -> Result<()> {
        self.tmux(&["kill-session", "-t", pane])?;
        Ok(())
    }

    fn focus_panel(&self, provider: Provider) -> Result<()> {
        let record = self.store.load(provider)?;
        if !self.inside_tmux {
            tracing::debug!(
                "Not attached to tmux; attach with `tmux attach -t {}`",
                record.pane_id
            );
            return Ok(());
        }
        self.tmux(&["switch-client", "-t", &record.pane_id])?;
        Ok(())
    }
}
