//! Error taxonomy shared by the library modules
//!
//! The binary maps these onto process exit codes, so every failure a command
//! can surface has exactly one variant here.

use crate::data::Provider;
use std::path::PathBuf;
use std::time::Duration;

pub type Result<T, E = BridgeError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// Log directory missing, or no file in it matches the layout
    #[error("no logs found: {0}")]
    LogNotFound(String),

    /// Session record absent, unreadable, or marked inactive
    #[error("{0} session not active (run `panebridge up {0}` first)")]
    NoSession(Provider),

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("timed out after {}s waiting for {provider} reply", .waited.as_secs_f32())]
    Timeout { provider: Provider, waited: Duration },

    #[error("{program} {args} failed: {message}")]
    Subprocess {
        program: String,
        args: String,
        message: String,
    },

    #[error("{provider} does not support {operation}")]
    Unsupported {
        provider: Provider,
        operation: &'static str,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BridgeError {
    /// Process exit code for this failure: 2 for timeouts and missing logs, 1 otherwise
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Timeout { .. } | Self::LogNotFound(_) => 2,
            _ => 1,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
