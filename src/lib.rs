//! panebridge - drive AI coding assistants running in terminal panes
//!
//! This library crate exposes internal modules for integration testing.

pub mod commands;
pub mod config;
pub mod data;
pub mod error;
pub mod history;
pub mod logs;
pub mod session;
pub mod terminal;
pub mod watch;

pub use error::{BridgeError, Result};
