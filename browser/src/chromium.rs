//! Chromium sessions over the DevTools protocol.
//!
//! - One browser process per session, launched with an isolated, throwaway
//!   user-data-dir
//! - Cookies are cleared and read through `Network` domain commands so that
//!   cookies set by third-party frames are included
//! - Navigation is bounded by the configured timeout
use std::env;
use std::fs;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::process;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chromiumoxide::Page;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::{network, storage};
use chromiumoxide::error::CdpError;
use cookiescope_types::{CookieRecord, WorkerId};
use futures_util::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use crate::{BrowserSession, SessionError, SessionFactory, SessionFut};

const LAUNCH_TIMEOUT: Duration = Duration::from_secs(30);
const CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

/// How sessions are launched.
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub executable: PathBuf,
    pub headless: bool,
    pub navigation_timeout: Duration,
}

/// [`SessionFactory`] that starts a fresh Chromium per session.
#[derive(Debug, Clone)]
pub struct ChromiumLauncher {
    options: LaunchOptions,
}

impl ChromiumLauncher {
    #[must_use]
    pub fn new(options: LaunchOptions) -> Self {
        Self { options }
    }
}

impl SessionFactory for ChromiumLauncher {
    fn open(&self, worker: WorkerId) -> SessionFut<'_, Box<dyn BrowserSession>> {
        Box::pin(async move {
            let session = ChromiumSession::launch(&self.options, worker).await?;
            Ok(Box::new(session) as Box<dyn BrowserSession>)
        })
    }
}

pub struct ChromiumSession {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
    navigation_timeout: Duration,
    worker: WorkerId,
    // Dropped last so the browser is gone before its profile is removed.
    _profile: TempProfileDir,
}

impl ChromiumSession {
    pub async fn launch(options: &LaunchOptions, worker: WorkerId) -> Result<Self, SessionError> {
        if !options.executable.exists() {
            return Err(SessionError::Launch(format!(
                "browser executable not found: {}",
                options.executable.display()
            )));
        }

        let profile = TempProfileDir::new(worker)?;

        let mut builder = BrowserConfig::builder()
            .chrome_executable(&options.executable)
            .user_data_dir(&profile.path)
            .no_sandbox()
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .request_timeout(options.navigation_timeout);
        if !options.headless {
            builder = builder.with_head();
        }
        let config = builder
            .build()
            .map_err(|e| SessionError::Launch(format!("failed to configure chromium: {e}")))?;

        let (browser, mut handler) = timeout(LAUNCH_TIMEOUT, Browser::launch(config))
            .await
            .map_err(|_| {
                SessionError::Launch(format!(
                    "chromium launch timed out after {}s",
                    LAUNCH_TIMEOUT.as_secs()
                ))
            })?
            .map_err(|e| SessionError::Launch(format!("failed to launch chromium: {e}")))?;

        let handler_task =
            tokio::spawn(async move { while let Some(_event) = handler.next().await {} });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler_task.abort();
                return Err(SessionError::Launch(format!("failed to create page: {e}")));
            }
        };

        tracing::debug!(%worker, profile = %profile.path.display(), "Browser session opened");

        Ok(Self {
            browser,
            page,
            handler_task,
            navigation_timeout: options.navigation_timeout,
            worker,
            _profile: profile,
        })
    }

    /// Map a protocol error, preferring "connection lost" once the event
    /// handler has stopped.
    fn protocol_error(
        &self,
        err: &CdpError,
        step: impl FnOnce(String) -> SessionError,
    ) -> SessionError {
        if self.handler_task.is_finished() {
            SessionError::Disconnected(err.to_string())
        } else {
            step(err.to_string())
        }
    }
}

impl BrowserSession for ChromiumSession {
    fn clear_cookies(&mut self) -> SessionFut<'_, ()> {
        Box::pin(async move {
            self.page
                .execute(network::ClearBrowserCookiesParams::default())
                .await
                .map_err(|e| self.protocol_error(&e, SessionError::ClearCookies))?;
            Ok(())
        })
    }

    fn navigate<'a>(&'a mut self, url: &'a str) -> SessionFut<'a, ()> {
        Box::pin(async move {
            match timeout(self.navigation_timeout, self.page.goto(url)).await {
                Ok(Ok(_)) => Ok(()),
                Ok(Err(CdpError::Timeout)) | Err(_) => Err(SessionError::Timeout {
                    url: url.to_string(),
                    timeout: self.navigation_timeout,
                }),
                Ok(Err(e)) => Err(self.protocol_error(&e, |message| SessionError::Navigation {
                    url: url.to_string(),
                    message,
                })),
            }
        })
    }

    fn read_cookies(&mut self) -> SessionFut<'_, Vec<CookieRecord>> {
        Box::pin(async move {
            let response = self
                .page
                .execute(all_cookies_command())
                .await
                .map_err(|e| self.protocol_error(&e, SessionError::CookieRead))?;
            cookies_from_devtools(&response.result.cookies)
        })
    }

    fn page_body(&mut self) -> SessionFut<'_, String> {
        Box::pin(async move {
            self.page
                .content()
                .await
                .map_err(|e| self.protocol_error(&e, SessionError::PageBody))
        })
    }

    fn close(self: Box<Self>) -> Pin<Box<dyn Future<Output = ()> + Send>> {
        Box::pin(async move {
            let mut session = *self;
            let worker = session.worker;
            match timeout(CLOSE_TIMEOUT, session.browser.close()).await {
                Ok(Ok(_)) => tracing::debug!(%worker, "Browser closed"),
                Ok(Err(e)) => tracing::warn!(%worker, "Failed to close browser: {e}"),
                Err(_) => tracing::warn!(%worker, "Browser close timed out"),
            }
            session.handler_task.abort();
        })
    }
}

/// `Storage.getCookies` for the default browser context: every cookie the
/// browser holds, whichever frame set it.
fn all_cookies_command() -> storage::GetCookiesParams {
    storage::GetCookiesParams::default()
}

fn cookies_from_devtools(cookies: &[network::Cookie]) -> Result<Vec<CookieRecord>, SessionError> {
    cookies
        .iter()
        .map(|cookie| {
            serde_json::to_value(cookie)
                .and_then(cookie_from_devtools)
                .map_err(|e| SessionError::CookieRead(format!("malformed cookie: {e}")))
        })
        .collect()
}

/// Convert one DevTools `Network.Cookie` JSON object into a [`CookieRecord`].
pub fn cookie_from_devtools(value: serde_json::Value) -> Result<CookieRecord, serde_json::Error> {
    serde_json::from_value::<CookieRecord>(value).map(CookieRecord::normalized)
}

struct TempProfileDir {
    path: PathBuf,
}

impl TempProfileDir {
    fn new(worker: WorkerId) -> Result<Self, SessionError> {
        let base = env::temp_dir();
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let pid = process::id();

        for attempt in 0..10 {
            let mut path = base.clone();
            path.push(format!(
                "cookiescope-{pid}-{}-{timestamp}-{attempt}",
                worker.value()
            ));
            if fs::create_dir_all(&path).is_ok() {
                return Ok(Self { path });
            }
        }

        Err(SessionError::Launch(
            "failed to create temporary browser profile directory".to_string(),
        ))
    }
}

impl Drop for TempProfileDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}
