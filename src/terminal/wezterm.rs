//! WezTerm backend: assistants live in panes split from the caller's tab
//!
//! Pane handles are the ids `wezterm cli split-pane` prints. The caller's
//! own pane is exposed by WezTerm as `$WEZTERM_PANE`.

use super::{args, subprocess_error, CommandRunner, TerminalBackend};
use crate::data::{Provider, SplitDirection};
use crate::error::Result;
use crate::session::SessionStore;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

const WEZTERM: &str = "wezterm";

/// One row of `wezterm cli list --format json`; other fields are ignored
#[derive(Debug, Deserialize)]
struct ListedPane {
    pane_id: u64,
}

pub struct WezTermBackend {
    store: SessionStore,
    runner: Arc<dyn CommandRunner>,
}

impl WezTermBackend {
    pub fn new(store: SessionStore, runner: Arc<dyn CommandRunner>) -> Self {
        Self { store, runner }
    }

    fn wezterm(&self, argv: Vec<String>) -> Result<String> {
        self.runner.run(WEZTERM, &argv)
    }

    fn split(&self, target: Option<&str>, command: &str, cwd: &Path, flag: &str) -> Result<String> {
        let cwd = cwd.to_string_lossy();
        let mut argv = args(&["cli", "split-pane"]);
        if let Some(target) = target {
            argv.extend(args(&["--pane-id", target]));
        }
        argv.extend(args(&["--cwd", &cwd, flag, "--percent", "50", "--"]));
        argv.extend(shell_command(command));

        let out = self.wezterm(argv.clone())?;
        let pane = out.trim();
        if pane.is_empty() {
            return Err(subprocess_error(
                WEZTERM,
                &argv,
                "split-pane printed no pane id".into(),
            ));
        }
        tracing::info!("Split WezTerm pane {} running {:?}", pane, command);
        Ok(pane.to_string())
    }
}

/// Host shell invocation for a command line
fn shell_command(command: &str) -> Vec<String> {
    if cfg!(windows) {
        args(&["cmd", "/c", command])
    } else {
        args(&["bash", "-c", command])
    }
}

fn direction_flag(direction: SplitDirection) -> &'static str {
    match direction {
        SplitDirection::Left => "--left",
        SplitDirection::Right => "--right",
        SplitDirection::Top => "--top",
        SplitDirection::Bottom => "--bottom",
    }
}

/// Whether `pane` appears in `wezterm cli list --format json` output
fn list_contains(list_json: &str, pane: &str) -> bool {
    let panes: Vec<ListedPane> = match serde_json::from_str(list_json) {
        Ok(p) => p,
        Err(e) => {
            tracing::debug!("Unusable wezterm pane list: {}", e);
            return false;
        }
    };
    let pane = pane.trim();
    panes.iter().any(|p| p.pane_id.to_string() == pane)
}

impl TerminalBackend for WezTermBackend {
    fn name(&self) -> &'static str {
        "wezterm"
    }

    fn send_text(&self, pane: &str, text: &str) -> Result<()> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }
        // --no-paste keeps bracketed paste from swallowing the submit
        self.wezterm(args(&[
            "cli", "send-text", "--pane-id", pane, "--no-paste", "--", text,
        ]))?;
        self.wezterm(args(&["cli", "send-text", "--pane-id", pane, "--no-paste", "\r"]))?;
        Ok(())
    }

    fn is_alive(&self, pane: &str) -> bool {
        match self.wezterm(args(&["cli", "list", "--format", "json"])) {
            Ok(out) => list_contains(&out, pane),
            Err(_) => false,
        }
    }

    fn create_pane(&self, command: &str, cwd: &Path, direction: SplitDirection) -> Result<String> {
        // Only bottom and right make sense relative to the caller's own pane
        let flag = match direction {
            SplitDirection::Right => "--right",
            _ => "--bottom",
        };
        self.split(None, command, cwd, flag)
    }

    fn create_pane_at(
        &self,
        target: &str,
        command: &str,
        cwd: &Path,
        direction: SplitDirection,
    ) -> Result<String> {
        self.split(Some(target), command, cwd, direction_flag(direction))
    }

    fn kill_pane(&self, pane: &str) -> Result<()> {
        self.wezterm(args(&["cli", "kill-pane", "--pane-id", pane]))?;
        Ok(())
    }

    fn focus_panel(&self, provider: Provider) -> Result<()> {
        let record = self.store.load(provider)?;
        self.wezterm(args(&["cli", "activate-pane", "--pane-id", &record.pane_id]))?;
        Ok(())
    }

    fn caller_pane(&self) -> Option<String> {
        std::env::var("WEZTERM_PANE")
            .ok()
            .filter(|p| !p.trim().is_empty())
    }
}
