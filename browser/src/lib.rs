//! Browser session adapter.
//!
//! The audit engine drives pages through the [`BrowserSession`] trait and
//! obtains sessions from a [`SessionFactory`]. Each session owns one browser
//! process and is used by exactly one worker; sessions are never shared.
//!
//! [`ChromiumLauncher`] is the production factory: it launches a headless (or
//! headful) Chromium per session and talks to it over the DevTools protocol.
//! Every call may block on the browser and every call may fail; callers get a
//! [`SessionError`] and decide what it means for the task at hand.

mod chromium;

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use cookiescope_types::{CookieRecord, ErrorKind, WorkerId};
use thiserror::Error;

pub use chromium::{ChromiumLauncher, ChromiumSession, LaunchOptions, cookie_from_devtools};

pub type SessionFut<'a, T> = Pin<Box<dyn Future<Output = Result<T, SessionError>> + Send + 'a>>;

/// One isolated browser context.
pub trait BrowserSession: Send {
    /// Remove every cookie the browser currently holds.
    fn clear_cookies(&mut self) -> SessionFut<'_, ()>;

    /// Load `url` and wait for the load to finish or the navigation timeout.
    fn navigate<'a>(&'a mut self, url: &'a str) -> SessionFut<'a, ()>;

    /// All cookies the browser holds, in the order the browser reports them.
    fn read_cookies(&mut self) -> SessionFut<'_, Vec<CookieRecord>>;

    /// Serialized HTML of the current page.
    fn page_body(&mut self) -> SessionFut<'_, String>;

    /// Shut the browser down. Never fails; problems are logged.
    fn close(self: Box<Self>) -> Pin<Box<dyn Future<Output = ()> + Send>>;
}

/// Opens sessions for workers.
pub trait SessionFactory: Send + Sync {
    fn open(&self, worker: WorkerId) -> SessionFut<'_, Box<dyn BrowserSession>>;
}

#[derive(Debug, Clone, Error)]
pub enum SessionError {
    #[error("failed to launch browser: {0}")]
    Launch(String),
    #[error("navigation to {url} timed out after {}s", timeout.as_secs())]
    Timeout { url: String, timeout: Duration },
    #[error("navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },
    #[error("failed to read cookies: {0}")]
    CookieRead(String),
    #[error("failed to read page body: {0}")]
    PageBody(String),
    #[error("failed to clear cookies: {0}")]
    ClearCookies(String),
    #[error("browser connection lost: {0}")]
    Disconnected(String),
}

impl SessionError {
    /// Report-level error kind for this failure.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::Launch(_) => ErrorKind::Launch,
            SessionError::Timeout { .. } => ErrorKind::Timeout,
            SessionError::Navigation { .. } => ErrorKind::Navigation,
            SessionError::CookieRead(_) => ErrorKind::CookieRead,
            SessionError::PageBody(_) | SessionError::ClearCookies(_) => ErrorKind::Internal,
            SessionError::Disconnected(_) => ErrorKind::SessionLost,
        }
    }

    /// Whether the session that produced this error can still be used.
    #[must_use]
    pub fn is_session_fatal(&self) -> bool {
        self.kind().is_session_fatal()
    }
}
