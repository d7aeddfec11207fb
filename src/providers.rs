//! Shared provider traits for dependency injection.
//!
//! The clock and the system clipboard are reached through these traits so
//! that session naming, timestamps and copy actions can be exercised in
//! tests without a real terminal or display server.

use crate::error::{Result, ShellError};
use chrono::{DateTime, Local};

/// Trait for providing timestamps.
///
/// # Example
///
/// ```
/// use ai_shell::providers::{SystemTimeProvider, TimeProvider};
///
/// let provider = SystemTimeProvider;
/// let now = provider.now();
/// assert!(now.timestamp() > 0);
/// ```
pub trait TimeProvider: Send + Sync {
    /// Returns the current local time.
    fn now(&self) -> DateTime<Local>;
}

/// Default time provider using the system clock.
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Trait for placing text on the system clipboard.
pub trait Clipboard: Send + Sync {
    fn copy(&self, text: &str) -> Result<()>;
}

/// Clipboard backed by `arboard`.
///
/// A fresh handle is opened per copy; headless sessions simply report the
/// clipboard as unavailable.
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn copy(&self, text: &str) -> Result<()> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| ShellError::Clipboard(e.to_string()))?;
        clipboard
            .set_text(text.to_string())
            .map_err(|e| ShellError::Clipboard(e.to_string()))
    }
}

/// ISO-8601 rendering used for every persisted timestamp.
pub fn iso_timestamp(time: &DateTime<Local>) -> String {
    time.to_rfc3339()
}
