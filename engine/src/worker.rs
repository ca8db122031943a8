//! Worker loop: drain the queue through one reusable browser session.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use cookiescope_browser::{BrowserSession, SessionFactory};
use cookiescope_core::normalize_url;
use cookiescope_types::{AuditError, AuditResult, ErrorKind, SiteFindings, WorkerId};
use futures_util::FutureExt;
use tokio::sync::mpsc;

use crate::pipeline::{AuditContext, audit_site, session_failure};
use crate::queue::JobQueue;

pub(crate) struct Worker {
    id: WorkerId,
    queue: Arc<JobQueue>,
    factory: Arc<dyn SessionFactory>,
    ctx: Arc<AuditContext>,
    results: mpsc::Sender<AuditResult>,
    session: Option<Box<dyn BrowserSession>>,
}

struct TaskRun {
    outcome: Result<SiteFindings, AuditError>,
    discard_session: bool,
}

impl Worker {
    pub(crate) fn new(
        id: WorkerId,
        queue: Arc<JobQueue>,
        factory: Arc<dyn SessionFactory>,
        ctx: Arc<AuditContext>,
        results: mpsc::Sender<AuditResult>,
    ) -> Self {
        Self {
            id,
            queue,
            factory,
            ctx,
            results,
            session: None,
        }
    }

    /// Run until the queue is drained or the report sink goes away.
    /// Returns the number of results handed to the sink.
    pub(crate) async fn run(mut self) -> usize {
        let mut submitted = 0;

        while let Some(task) = self.queue.pop() {
            let url = normalize_url(task.raw_input());
            tracing::debug!(
                worker = %self.id,
                "Starting: [{}/{}] {url}",
                task.sequence_index() + 1,
                self.queue.total()
            );

            let run = self.audit(&url).await;
            if run.discard_session {
                self.close_session().await;
            }

            let result = match run.outcome {
                Ok(findings) => AuditResult::completed(url, task.sequence_index(), findings),
                Err(error) => AuditResult::failed(url, task.sequence_index(), error),
            };
            if self.results.send(result).await.is_err() {
                tracing::debug!(worker = %self.id, "Report sink closed; stopping");
                break;
            }
            submitted += 1;
        }

        self.close_session().await;
        tracing::debug!(worker = %self.id, submitted, "Worker finished");
        submitted
    }

    async fn audit(&mut self, url: &str) -> TaskRun {
        if self.session.is_none() {
            match self.factory.open(self.id).await {
                Ok(session) => {
                    tracing::debug!(worker = %self.id, "Browser session opened");
                    self.session = Some(session);
                }
                Err(e) => {
                    tracing::warn!(worker = %self.id, "Could not open browser session: {e}");
                    return TaskRun {
                        outcome: Err(session_failure(&e)),
                        discard_session: false,
                    };
                }
            }
        }

        let Some(session) = self.session.as_mut() else {
            return TaskRun {
                outcome: Err(AuditError::new(ErrorKind::Internal, "no browser session")),
                discard_session: false,
            };
        };

        match AssertUnwindSafe(audit_site(&mut **session, url, &self.ctx))
            .catch_unwind()
            .await
        {
            Ok(outcome) => {
                let discard_session = outcome
                    .as_ref()
                    .is_err_and(|err| err.kind.is_session_fatal());
                TaskRun {
                    outcome,
                    discard_session,
                }
            }
            Err(payload) => {
                let message = format!("audit panicked: {}", panic_payload_to_string(&payload));
                tracing::warn!(worker = %self.id, "{message}");
                TaskRun {
                    outcome: Err(AuditError::new(ErrorKind::Internal, message)),
                    discard_session: true,
                }
            }
        }
    }

    async fn close_session(&mut self) {
        if let Some(session) = self.session.take() {
            session.close().await;
            tracing::debug!(worker = %self.id, "Browser session closed");
        }
    }
}

fn panic_payload_to_string(payload: &Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
