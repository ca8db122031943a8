//! Concurrent audit engine.
//!
//! [`run_audit`] spreads a batch of [`SiteTask`]s over a fixed pool of
//! workers. Each worker owns one browser session and pulls tasks from a shared
//! [`JobQueue`] until it is empty. Finished results go over a channel to a
//! single report task that writes CSV rows and logs progress.
//!
//! Per-site failures never escape a worker: they become error rows. Only a
//! report write failure (or a worker dying outside its task boundary) fails
//! the run.

mod pipeline;
mod progress;
mod queue;
mod sink;
mod worker;

use std::io::Write;
use std::sync::Arc;

use cookiescope_browser::SessionFactory;
use cookiescope_types::{DEFAULT_WORKERS, Separator, SiteTask, WorkerId};
use thiserror::Error;

pub use pipeline::{AuditContext, VerificationCheck};
pub use progress::{ProgressReporter, RunSummary, status_line};
pub use queue::JobQueue;
pub use sink::{ReportError, ReportSink};

use crate::sink::spawn_sink;
use crate::worker::Worker;

/// Pool and output settings for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditSettings {
    /// Requested pool size; values below 1 are treated as 1.
    pub workers: usize,
    pub separator: Separator,
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            separator: Separator::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error("worker {worker} stopped unexpectedly: {message}")]
    Worker { worker: WorkerId, message: String },
    #[error("report task failed: {0}")]
    ReportTask(String),
    #[error("report is incomplete: {written} of {total} rows written")]
    Incomplete { written: usize, total: usize },
}

/// Audit every task and write one report row per task to `writer`.
///
/// Returns the writer (flushed) and the run totals.
pub async fn run_audit<W>(
    tasks: Vec<SiteTask>,
    factory: Arc<dyn SessionFactory>,
    ctx: AuditContext,
    settings: AuditSettings,
    writer: W,
) -> Result<(W, RunSummary), EngineError>
where
    W: Write + Send + 'static,
{
    let total = tasks.len();
    // Never more workers than sites; each worker launches a browser.
    let pool_size = settings.workers.max(1).min(total);

    tracing::info!("Starting cookie audit for {total} site(s) with {pool_size} worker(s)");

    let sink = ReportSink::new(writer, settings.separator, total)?;
    let (results, sink_task) = spawn_sink(sink, pool_size);

    let queue = Arc::new(JobQueue::new(tasks));
    let ctx = Arc::new(ctx);

    let handles: Vec<_> = (1..=pool_size)
        .map(|n| {
            let id = WorkerId::new(n);
            let worker = Worker::new(
                id,
                Arc::clone(&queue),
                Arc::clone(&factory),
                Arc::clone(&ctx),
                results.clone(),
            );
            (id, tokio::spawn(worker.run()))
        })
        .collect();
    drop(results);

    let mut worker_failure = None;
    for (id, handle) in handles {
        if let Err(e) = handle.await {
            tracing::error!(worker = %id, "Worker task failed: {e}");
            worker_failure.get_or_insert(EngineError::Worker {
                worker: id,
                message: e.to_string(),
            });
        }
    }

    let (writer, summary) = sink_task
        .await
        .map_err(|e| EngineError::ReportTask(e.to_string()))??;

    if let Some(err) = worker_failure {
        return Err(err);
    }
    if summary.completed() != total {
        return Err(EngineError::Incomplete {
            written: summary.completed(),
            total,
        });
    }
    Ok((writer, summary))
}
