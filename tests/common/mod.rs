//! Shared test utilities and fixtures
//!
//! An in-memory browser that serves canned cookie jars per URL, plus helpers
//! for site-list files and report parsing.

#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cookiescope_browser::{BrowserSession, SessionError, SessionFactory, SessionFut};
use cookiescope_core::REPORT_HEADER;
use cookiescope_types::{CookieRecord, WorkerId};
use tokio::time::sleep;

pub const VERIFICATION_URL: &str = "https://apps.lib.umn.edu/cookiecutter/";
pub const VERIFICATION_MARKER: &str = "No cookies were found that are eligible for deletion.";

#[derive(Debug, Clone)]
enum Page {
    Cookies(Vec<CookieRecord>),
    Html(String),
    Unreachable,
}

/// Fake browser shared by every session it opens.
#[derive(Debug, Default)]
pub struct FakeBrowser {
    pages: HashMap<String, Page>,
    latency: Duration,
    sessions_opened: AtomicUsize,
    sessions_closed: Arc<AtomicUsize>,
    visits: Arc<Mutex<Vec<(WorkerId, String)>>>,
}

impl FakeBrowser {
    pub fn new() -> Self {
        Self::default()
            .with_html(VERIFICATION_URL, format!("<p>{VERIFICATION_MARKER}</p>"))
    }

    pub fn with_site(mut self, url: &str, cookies: Vec<CookieRecord>) -> Self {
        self.pages.insert(url.to_string(), Page::Cookies(cookies));
        self
    }

    pub fn with_html(mut self, url: &str, body: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), Page::Html(body.into()));
        self
    }

    pub fn with_unreachable(mut self, url: &str) -> Self {
        self.pages.insert(url.to_string(), Page::Unreachable);
        self
    }

    /// Delay every navigation so workers overlap.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn sessions_opened(&self) -> usize {
        self.sessions_opened.load(Ordering::SeqCst)
    }

    pub fn sessions_closed(&self) -> usize {
        self.sessions_closed.load(Ordering::SeqCst)
    }

    pub fn visits(&self) -> Vec<(WorkerId, String)> {
        self.visits.lock().unwrap().clone()
    }
}

impl SessionFactory for FakeBrowser {
    fn open(&self, worker: WorkerId) -> SessionFut<'_, Box<dyn BrowserSession>> {
        Box::pin(async move {
            self.sessions_opened.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(FakeSession {
                worker,
                pages: self.pages.clone(),
                latency: self.latency,
                jar: Vec::new(),
                body: String::new(),
                closed: Arc::clone(&self.sessions_closed),
                visits: Arc::clone(&self.visits),
            }) as Box<dyn BrowserSession>)
        })
    }
}

struct FakeSession {
    worker: WorkerId,
    pages: HashMap<String, Page>,
    latency: Duration,
    jar: Vec<CookieRecord>,
    body: String,
    closed: Arc<AtomicUsize>,
    visits: Arc<Mutex<Vec<(WorkerId, String)>>>,
}

impl BrowserSession for FakeSession {
    fn clear_cookies(&mut self) -> SessionFut<'_, ()> {
        Box::pin(async move {
            self.jar.clear();
            Ok(())
        })
    }

    fn navigate<'a>(&'a mut self, url: &'a str) -> SessionFut<'a, ()> {
        Box::pin(async move {
            self.visits
                .lock()
                .unwrap()
                .push((self.worker, url.to_string()));
            if !self.latency.is_zero() {
                sleep(self.latency).await;
            }
            match self.pages.get(url) {
                Some(Page::Cookies(cookies)) => {
                    self.jar.extend(cookies.iter().cloned());
                    Ok(())
                }
                Some(Page::Html(body)) => {
                    self.body.clone_from(body);
                    Ok(())
                }
                Some(Page::Unreachable) | None => Err(SessionError::Navigation {
                    url: url.to_string(),
                    message: "net::ERR_CONNECTION_REFUSED".to_string(),
                }),
            }
        })
    }

    fn read_cookies(&mut self) -> SessionFut<'_, Vec<CookieRecord>> {
        Box::pin(async move { Ok(self.jar.clone()) })
    }

    fn page_body(&mut self) -> SessionFut<'_, String> {
        Box::pin(async move { Ok(self.body.clone()) })
    }

    fn close(self: Box<Self>) -> Pin<Box<dyn Future<Output = ()> + Send>> {
        Box::pin(async move {
            self.closed.fetch_add(1, Ordering::SeqCst);
        })
    }
}

pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

/// Parse a report, checking the header and that every row is full width.
pub fn parse_report(bytes: &[u8]) -> Vec<csv::StringRecord> {
    let mut reader = csv::Reader::from_reader(bytes);
    let header: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(header, REPORT_HEADER);
    let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    for row in &rows {
        assert_eq!(row.len(), REPORT_HEADER.len(), "{row:?}");
    }
    rows
}

pub fn row_for<'a>(rows: &'a [csv::StringRecord], site: &str) -> &'a csv::StringRecord {
    rows.iter()
        .find(|row| &row[0] == site)
        .unwrap_or_else(|| panic!("no row for {site}"))
}
