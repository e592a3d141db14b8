//! Per-provider session records
//!
//! One JSON file per provider under the store root:
//! `<root>/<provider>-session.json`. Records are overwritten on each start
//! and flagged inactive on termination; files are never deleted, so the last
//! known pane of every provider stays on disk.

use crate::data::{Provider, SessionRecord};
use crate::error::{BridgeError, Result};
use fs2::FileExt;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Default store root: `<data dir>/panebridge` (respects $PANEBRIDGE_STATE_DIR)
pub fn default_root() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("PANEBRIDGE_STATE_DIR") {
        return Some(PathBuf::from(dir));
    }
    directories::ProjectDirs::from("", "", "panebridge").map(|d| d.data_dir().to_path_buf())
}

/// File-backed session store parameterized by its root directory
#[derive(Debug, Clone)]
pub struct SessionStore {
    root: PathBuf,
}

impl SessionStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn record_path(&self, provider: Provider) -> PathBuf {
        self.root.join(format!("{}-session.json", provider))
    }

    /// Raw record regardless of its active flag. `Ok(None)` if the file is absent.
    pub fn read(&self, provider: Provider) -> Result<Option<SessionRecord>> {
        let path = self.record_path(provider);
        if !path.exists() {
            return Ok(None);
        }

        let file = File::open(&path)?;
        file.lock_shared()?;

        let mut content = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut content);
        file.unlock()?;
        read?;

        let record = serde_json::from_str(&content).map_err(|source| BridgeError::Parse {
            path: path.clone(),
            source,
        })?;
        Ok(Some(record))
    }

    /// The provider's live record. Absent, corrupt and inactive all fail as `NoSession`.
    pub fn load(&self, provider: Provider) -> Result<SessionRecord> {
        match self.read(provider) {
            Ok(Some(record)) if record.active => Ok(record),
            Ok(Some(_)) => {
                tracing::debug!("{} session record is inactive", provider);
                Err(BridgeError::NoSession(provider))
            }
            Ok(None) => {
                tracing::debug!("{} session record not found", provider);
                Err(BridgeError::NoSession(provider))
            }
            Err(e) => {
                tracing::debug!("{} session record unreadable: {}", provider, e);
                Err(BridgeError::NoSession(provider))
            }
        }
    }

    /// Overwrite the provider's record, creating the store root if needed
    pub fn save(&self, provider: Provider, record: &SessionRecord) -> Result<()> {
        fs::create_dir_all(&self.root)?;

        let content = serde_json::to_string_pretty(record)?;

        let path = self.record_path(provider);
        let file = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;
        file.lock_exclusive()?;

        // Truncate only once the lock is held so readers never see an empty file
        let written = file.set_len(0).and_then(|_| {
            let mut writer = std::io::BufWriter::new(&file);
            writer.write_all(content.as_bytes())?;
            writer.flush()
        });
        file.unlock()?;
        written?;

        tracing::debug!("Saved {} session to {}", provider, path.display());
        Ok(())
    }

    /// Mark the provider's record inactive. A missing or inactive record is a no-op.
    pub fn terminate(&self, provider: Provider) -> Result<()> {
        let mut record = match self.load(provider) {
            Ok(r) => r,
            Err(_) => return Ok(()),
        };
        record.active = false;
        self.save(provider, &record)
    }
}
