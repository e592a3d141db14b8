use crate::data::Provider;
use crate::terminal::BackendKind;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendKind,
    /// Session store root; defaults to the platform data directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_dir: Option<PathBuf>,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub wait: WaitConfig,
    #[serde(default)]
    pub launch: LaunchConfig,
    #[serde(default)]
    pub providers: ProviderCommands,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_append_interval")]
    pub append_interval_ms: u64,
    #[serde(default = "default_rewrite_interval")]
    pub rewrite_interval_ms: u64,
}

fn default_append_interval() -> u64 {
    100
}

// Full-rewrite logs are re-parsed whole on every tick, so they poll half as often
fn default_rewrite_interval() -> u64 {
    200
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            append_interval_ms: default_append_interval(),
            rewrite_interval_ms: default_rewrite_interval(),
        }
    }
}

impl PollingConfig {
    pub fn append_interval(&self) -> Duration {
        Duration::from_millis(self.append_interval_ms)
    }

    pub fn rewrite_interval(&self) -> Duration {
        Duration::from_millis(self.rewrite_interval_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitConfig {
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_timeout() -> u64 {
    60
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchConfig {
    /// Pause after spawning a pane before recording it
    #[serde(default = "default_settle")]
    pub settle_ms: u64,
    /// Close the pane `up` was run from once the assistants are started
    #[serde(default = "default_true")]
    pub close_launcher_pane: bool,
}

fn default_settle() -> u64 {
    500
}

fn default_true() -> bool {
    true
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            settle_ms: default_settle(),
            close_launcher_pane: true,
        }
    }
}

/// Command line that starts each assistant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderCommands {
    #[serde(default = "default_claude_command")]
    pub claude: String,
    #[serde(default = "default_codex_command")]
    pub codex: String,
    #[serde(default = "default_gemini_command")]
    pub gemini: String,
}

fn default_claude_command() -> String {
    "claude".to_string()
}

// Paste-burst detection eats keystrokes sent in quick succession
fn default_codex_command() -> String {
    "codex -c disable_paste_burst=true".to_string()
}

fn default_gemini_command() -> String {
    "gemini".to_string()
}

impl Default for ProviderCommands {
    fn default() -> Self {
        Self {
            claude: default_claude_command(),
            codex: default_codex_command(),
            gemini: default_gemini_command(),
        }
    }
}

impl ProviderCommands {
    pub fn command_for(&self, provider: Provider) -> &str {
        match provider {
            Provider::Claude => &self.claude,
            Provider::Codex => &self.codex,
            Provider::Gemini => &self.gemini,
        }
    }
}

impl Config {
    /// Apply $PANEBRIDGE_BACKEND and $PANEBRIDGE_STATE_DIR on top of the file
    pub fn apply_env(mut self) -> Result<Self> {
        if let Ok(backend) = std::env::var("PANEBRIDGE_BACKEND") {
            self.backend = backend
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))
                .context("Invalid PANEBRIDGE_BACKEND")?;
        }
        if let Ok(dir) = std::env::var("PANEBRIDGE_STATE_DIR") {
            self.state_dir = Some(PathBuf::from(dir));
        }
        Ok(self)
    }

    /// Session store root: configured directory, else the platform data directory
    pub fn state_root(&self) -> Result<PathBuf> {
        match &self.state_dir {
            Some(dir) => Ok(dir.clone()),
            None => crate::session::default_root().context("Could not determine data directory"),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.wait.timeout_secs)
    }
}

pub fn config_dir() -> Result<PathBuf> {
    let dir = directories::ProjectDirs::from("", "", "panebridge")
        .context("Could not determine config directory")?
        .config_dir()
        .to_path_buf();
    Ok(dir)
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Load configuration. A missing file at the default location means all defaults.
pub fn load(path: Option<&Path>) -> Result<Config> {
    let (path, explicit) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => (default_config_path()?, false),
    };

    if !path.exists() {
        if explicit {
            anyhow::bail!("Config file not found at {}", path.display());
        }
        tracing::debug!("No config at {}, using defaults", path.display());
        return Config::default().apply_env();
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config from {}", path.display()))?;

    config.apply_env()
}

/// Write the default configuration file, returning where it went
pub fn write_default(force: bool) -> Result<PathBuf> {
    let config_path = default_config_path()?;
    if config_path.exists() && !force {
        anyhow::bail!(
            "Config already exists at {}. Pass --force to overwrite.",
            config_path.display()
        );
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let content = toml::to_string_pretty(&Config::default())?;
    std::fs::write(&config_path, content)
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

    Ok(config_path)
}
