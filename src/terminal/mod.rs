//! Terminal multiplexer backends
//!
//! Every pane operation goes through [`TerminalBackend`]. The two
//! implementations differ in what a pane handle is:
//!
//! - tmux: a generated session name, one session per assistant
//! - WezTerm: the numeric pane id printed by `wezterm cli split-pane`
//!
//! Multiplexer binaries are driven through a [`CommandRunner`] so tests can
//! record invocations instead of spawning processes.

pub mod tmux;
pub mod wezterm;

use crate::data::{Provider, SplitDirection};
use crate::error::{BridgeError, Result};
use crate::session::SessionStore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::process::Command;
use std::str::FromStr;
use std::sync::Arc;

pub use tmux::TmuxBackend;
pub use wezterm::WezTermBackend;

/// Pane operations shared by all multiplexers
pub trait TerminalBackend {
    fn name(&self) -> &'static str;

    /// Type `text` into the pane and submit it. Blank text is a successful no-op.
    fn send_text(&self, pane: &str, text: &str) -> Result<()>;

    /// Whether the pane still exists. Any failure to find out counts as dead.
    fn is_alive(&self, pane: &str) -> bool;

    /// Start `command` in a new pane, returning its handle
    fn create_pane(&self, command: &str, cwd: &Path, direction: SplitDirection) -> Result<String>;

    /// Start `command` in a new pane placed relative to `target`
    fn create_pane_at(
        &self,
        target: &str,
        command: &str,
        cwd: &Path,
        direction: SplitDirection,
    ) -> Result<String>;

    fn kill_pane(&self, pane: &str) -> Result<()>;

    /// Move input focus to the pane recorded for `provider`
    fn focus_panel(&self, provider: Provider) -> Result<()>;

    /// Handle of the pane this process runs in, if the multiplexer exposes one
    fn caller_pane(&self) -> Option<String> {
        None
    }
}

/// Which multiplexer to drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Tmux,
    Wezterm,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tmux => f.write_str("tmux"),
            Self::Wezterm => f.write_str("wezterm"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tmux" => Ok(Self::Tmux),
            "wezterm" => Ok(Self::Wezterm),
            other => Err(format!("unknown backend: {}", other)),
        }
    }
}

/// Build the backend selected by configuration
pub fn backend_for(
    kind: BackendKind,
    store: SessionStore,
    runner: Arc<dyn CommandRunner>,
) -> Box<dyn TerminalBackend> {
    match kind {
        BackendKind::Tmux => Box::new(TmuxBackend::new(store, runner)),
        BackendKind::Wezterm => Box::new(WezTermBackend::new(store, runner)),
    }
}

/// Runs an external program to completion
pub trait CommandRunner {
    /// Run `program` with `args`, returning stdout. Non-zero exit is `Subprocess`.
    fn run(&self, program: &str, args: &[String]) -> Result<String>;
}

/// Runner that spawns real processes
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<String> {
        tracing::debug!("Running {} {}", program, args.join(" "));

        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|e| subprocess_error(program, args, e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = match stderr.trim() {
                "" => format!("exited with {}", output.status),
                s => s.to_string(),
            };
            return Err(subprocess_error(program, args, message));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

pub(crate) fn subprocess_error(program: &str, args: &[String], message: String) -> BridgeError {
    BridgeError::Subprocess {
        program: program.to_string(),
        args: args.join(" "),
        message,
    }
}

/// Owned argument list from string slices
pub(crate) fn args(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}
