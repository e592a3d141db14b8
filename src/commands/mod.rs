//! Operator commands
//!
//! [`Bridge`] bundles everything a command needs: configuration, the session
//! store, the terminal backend and the log locator. Each method is one
//! command; printing is left to the binary.

use crate::config::Config;
use crate::data::{HistoryItem, Provider, SessionRecord, SplitDirection};
use crate::error::Result;
use crate::history;
use crate::logs::LogLocator;
use crate::session::SessionStore;
use crate::terminal::{backend_for, SystemRunner, TerminalBackend};
use crate::watch;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Pause before closing the launcher pane so the new panes finish drawing
const LAUNCHER_CLOSE_DELAY: Duration = Duration::from_millis(300);

pub struct Bridge {
    config: Config,
    store: SessionStore,
    backend: Box<dyn TerminalBackend>,
    locator: LogLocator,
}

/// Liveness of a provider's pane
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaneStatus {
    Running(String),
    /// Record says active but the multiplexer no longer knows the pane
    Dead,
    Stopped,
}

impl fmt::Display for PaneStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running(pane) => write!(f, "Running (pane: {})", pane),
            Self::Dead => f.write_str("Dead (process missing)"),
            Self::Stopped => f.write_str("Stopped"),
        }
    }
}

/// What happened to one provider during `kill`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KillOutcome {
    NotRunning,
    Killed,
    /// Record terminated, but closing the pane failed
    KillFailed(String),
    /// Session record could not be marked inactive
    RecordNotSaved(String),
}

/// Result of starting one provider during `up`
#[derive(Debug)]
pub struct Launch {
    pub provider: Provider,
    pub pane: Result<String>,
}

impl Bridge {
    pub fn new(
        config: Config,
        store: SessionStore,
        backend: Box<dyn TerminalBackend>,
        locator: LogLocator,
    ) -> Self {
        Self {
            config,
            store,
            backend,
            locator,
        }
    }

    /// Bridge over real multiplexer processes and the user's home directory
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let store = SessionStore::new(config.state_root()?);
        let backend = backend_for(config.backend, store.clone(), Arc::new(SystemRunner));
        let locator = LogLocator::from_home()?;
        tracing::debug!(
            "Using {} backend, sessions in {}",
            backend.name(),
            store.root().display()
        );
        Ok(Self::new(config, store, backend, locator))
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Start panes for `providers` (Claude is always started).
    ///
    /// Layout: Codex below the caller, Gemini right of Codex, Claude below
    /// the caller spanning the full width.
    pub fn up(&self, providers: &[Provider], cwd: &Path) -> Vec<Launch> {
        let wanted = |p: Provider| p == Provider::Claude || providers.contains(&p);
        let mut launches = Vec::new();

        let mut codex_pane = None;
        if wanted(Provider::Codex) {
            let pane = self.launch(Provider::Codex, None, SplitDirection::Bottom, cwd);
            codex_pane = pane.as_ref().ok().cloned();
            launches.push(Launch {
                provider: Provider::Codex,
                pane,
            });
        }

        if wanted(Provider::Gemini) {
            let pane = self.launch(
                Provider::Gemini,
                codex_pane.as_deref(),
                SplitDirection::Right,
                cwd,
            );
            launches.push(Launch {
                provider: Provider::Gemini,
                pane,
            });
        }

        let claude = self.launch(Provider::Claude, None, SplitDirection::Bottom, cwd);
        let claude_started = claude.is_ok();
        launches.push(Launch {
            provider: Provider::Claude,
            pane: claude,
        });

        if claude_started {
            if let Err(e) = self.backend.focus_panel(Provider::Claude) {
                tracing::warn!("Failed to focus claude pane: {}", e);
            }
        }

        if launches.iter().any(|l| l.pane.is_ok()) {
            self.close_launcher_pane();
        }

        launches
    }

    fn launch(
        &self,
        provider: Provider,
        anchor: Option<&str>,
        direction: SplitDirection,
        cwd: &Path,
    ) -> Result<String> {
        let command = self.config.providers.command_for(provider);
        let pane = match anchor {
            Some(target) => self.backend.create_pane_at(target, command, cwd, direction)?,
            None => self.backend.create_pane(command, cwd, direction)?,
        };

        std::thread::sleep(Duration::from_millis(self.config.launch.settle_ms));

        let record = SessionRecord::started(provider, pane.clone(), cwd.to_path_buf());
        self.store.save(provider, &record)?;
        tracing::info!("{} started in pane {}", provider, pane);
        Ok(pane)
    }

    fn close_launcher_pane(&self) {
        if !self.config.launch.close_launcher_pane {
            return;
        }
        let Some(pane) = self.backend.caller_pane() else {
            return;
        };

        std::thread::sleep(LAUNCHER_CLOSE_DELAY);
        if let Err(e) = self.backend.kill_pane(&pane) {
            tracing::warn!("Failed to close launcher pane {}: {}", pane, e);
        }
    }

    /// Close each provider's pane and mark its session inactive.
    ///
    /// Failures are reported per provider; one provider never stops the rest.
    pub fn kill(&self, providers: &[Provider]) -> Vec<(Provider, KillOutcome)> {
        let mut outcomes = Vec::new();

        for &provider in providers {
            let mut record = match self.store.load(provider) {
                Ok(r) => r,
                Err(_) => {
                    outcomes.push((provider, KillOutcome::NotRunning));
                    continue;
                }
            };

            let mut outcome = match self.backend.kill_pane(&record.pane_id) {
                Ok(()) => KillOutcome::Killed,
                Err(e) => {
                    tracing::warn!("Failed to kill {} pane {}: {}", provider, record.pane_id, e);
                    KillOutcome::KillFailed(e.to_string())
                }
            };

            record.active = false;
            if let Err(e) = self.store.save(provider, &record) {
                tracing::warn!("Failed to mark {} session inactive: {}", provider, e);
                outcome = KillOutcome::RecordNotSaved(e.to_string());
            }

            outcomes.push((provider, outcome));
        }

        outcomes
    }

    pub fn status(&self) -> Vec<(Provider, PaneStatus)> {
        Provider::ALL
            .iter()
            .map(|&p| (p, self.pane_status(p)))
            .collect()
    }

    fn pane_status(&self, provider: Provider) -> PaneStatus {
        match self.store.load(provider) {
            Ok(record) if self.backend.is_alive(&record.pane_id) => {
                PaneStatus::Running(record.pane_id)
            }
            Ok(_) => PaneStatus::Dead,
            Err(_) => PaneStatus::Stopped,
        }
    }

    /// Liveness check for one provider; no session is an error
    pub fn ping(&self, provider: Provider) -> Result<PaneStatus> {
        let record = self.store.load(provider)?;
        if self.backend.is_alive(&record.pane_id) {
            Ok(PaneStatus::Running(record.pane_id))
        } else {
            Ok(PaneStatus::Dead)
        }
    }

    /// Fire-and-forget: type `message` into the provider's pane
    pub fn send(&self, provider: Provider, message: &str) -> Result<()> {
        let record = self.store.load(provider)?;
        self.backend.send_text(&record.pane_id, message)
    }

    /// Send `message` and block until the provider replies or `timeout` elapses
    pub fn ask(&self, provider: Provider, message: &str, timeout: Duration) -> Result<String> {
        let record = self.store.load(provider)?;

        // Baseline the log before sending so a fast reply cannot be missed
        let mut source = watch::source_for(provider, &self.locator, &self.config.polling)?;
        source.begin()?;

        self.backend.send_text(&record.pane_id, message)?;
        watch::wait_with(source.as_mut(), provider, timeout)
    }

    /// Last `n` turns from the provider's log
    pub fn pend(&self, provider: Provider, n: usize) -> Result<Vec<HistoryItem>> {
        history::recent(provider, &self.locator, n)
    }
}
