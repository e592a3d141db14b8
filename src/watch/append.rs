//! Tail strategy for append-only logs (Codex)

use super::ReplySource;
use crate::error::{BridgeError, Result};
use crate::logs::codex::{self, LineOutcome};
use crate::logs::{LogLayout, LogLocator};
use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::time::Duration;

/// Follows the latest log from its end-of-file at `begin`, like `tail -f`
pub struct AppendTail {
    layout: LogLayout,
    locator: LogLocator,
    interval: Duration,
    reader: Option<BufReader<File>>,
    /// Bytes of a line whose newline has not been written yet
    pending: Vec<u8>,
}

impl AppendTail {
    pub fn new(layout: LogLayout, locator: LogLocator, interval: Duration) -> Self {
        Self {
            layout,
            locator,
            interval,
            reader: None,
            pending: Vec::new(),
        }
    }
}

impl ReplySource for AppendTail {
    fn begin(&mut self) -> Result<()> {
        let path = self.layout.resolve(&self.locator)?;
        let mut file = File::open(&path)?;
        let offset = file.seek(SeekFrom::End(0))?;
        tracing::debug!("Tailing {} from byte {}", path.display(), offset);

        self.reader = Some(BufReader::new(file));
        self.pending.clear();
        Ok(())
    }

    fn poll(&mut self) -> Result<Option<String>> {
        let reader = self.reader.as_mut().ok_or_else(|| {
            BridgeError::Io(std::io::Error::other("append tail polled before begin"))
        })?;

        loop {
            // Read errors other than EOF are fatal
            let read = reader.read_until(b'\n', &mut self.pending)?;
            if read == 0 || !self.pending.ends_with(b"\n") {
                return Ok(None);
            }

            let line = std::mem::take(&mut self.pending);
            match codex::parse_line(&line) {
                LineOutcome::Reply(text) => return Ok(Some(text)),
                LineOutcome::Skip(reason) => {
                    tracing::trace!("Skipping log line ({:?})", reason);
                }
            }
        }
    }

    fn interval(&self) -> Duration {
        self.interval
    }
}
