//! Reply watching: block until an assistant's next reply lands in its log
//!
//! ```text
//!            begin()
//!   ┌──────────────────────┐
//!   │       WAITING        │◄──── poll() == None, sleep(interval)
//!   └──────────┬───────────┘
//!    poll() == Some(text)  │  deadline passed
//!              ▼           ▼
//!           FOUND       TIMEOUT
//! ```
//!
//! The loop skeleton is shared; what a single poll does is not. Append-only
//! logs are tailed from their end, full-rewrite logs are re-parsed whole and
//! diffed by message count.

pub mod append;
pub mod rewrite;

use crate::config::PollingConfig;
use crate::data::{LogFamily, Provider};
use crate::error::{BridgeError, Result};
use crate::logs::{LogLayout, LogLocator};
use std::time::{Duration, Instant};

pub use append::AppendTail;
pub use rewrite::RewriteDiff;

/// One way of noticing a new reply in a log file
pub trait ReplySource {
    /// Capture the starting point. Content present before this call is never reported.
    fn begin(&mut self) -> Result<()>;

    /// Check once for a reply. `Ok(None)` means nothing yet.
    fn poll(&mut self) -> Result<Option<String>>;

    /// Pause between polls that found nothing
    fn interval(&self) -> Duration;
}

/// Drive an already-begun `source` until it yields a reply or `timeout` elapses
pub fn wait_with(
    source: &mut dyn ReplySource,
    provider: Provider,
    timeout: Duration,
) -> Result<String> {
    let started = Instant::now();
    let deadline = started + timeout;

    loop {
        if Instant::now() >= deadline {
            return Err(BridgeError::Timeout {
                provider,
                waited: started.elapsed(),
            });
        }

        if let Some(reply) = source.poll()? {
            tracing::debug!(
                "{} replied after {:.1}s",
                provider,
                started.elapsed().as_secs_f32()
            );
            return Ok(reply);
        }

        let remaining = deadline.saturating_duration_since(Instant::now());
        std::thread::sleep(source.interval().min(remaining));
    }
}

/// The reply strategy `provider`'s log family needs, not yet begun
pub fn source_for(
    provider: Provider,
    locator: &LogLocator,
    polling: &PollingConfig,
) -> Result<Box<dyn ReplySource>> {
    let family = provider.log_family().ok_or(BridgeError::Unsupported {
        provider,
        operation: "waiting for replies",
    })?;
    let layout = LogLayout::for_family(family);

    let source: Box<dyn ReplySource> = match family {
        LogFamily::AppendOnly => Box::new(AppendTail::new(
            layout,
            locator.clone(),
            polling.append_interval(),
        )),
        LogFamily::FullRewrite => Box::new(RewriteDiff::new(
            layout,
            locator.clone(),
            polling.rewrite_interval(),
        )),
    };
    Ok(source)
}

/// Wait for `provider`'s next reply, counting only log content written from now on
pub fn wait_for_reply(
    provider: Provider,
    locator: &LogLocator,
    polling: &PollingConfig,
    timeout: Duration,
) -> Result<String> {
    let mut source = source_for(provider, locator, polling)?;
    source.begin()?;
    wait_with(source.as_mut(), provider, timeout)
}
