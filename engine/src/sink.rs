//! Result aggregator.
//!
//! One task owns the CSV writer and the progress counter; workers hand it
//! finished results over a channel. Each row is written and flushed before the
//! next result is taken, so rows are never interleaved and each is visible as
//! soon as its status line is logged.

use std::io::{self, Write};

use cookiescope_core::{REPORT_HEADER, render_row};
use cookiescope_types::{AuditResult, Separator};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::progress::{ProgressReporter, RunSummary};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write report header: {0}")]
    Header(#[source] csv::Error),
    #[error("failed to encode cookies for {site}: {source}")]
    Encode {
        site: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write report row for {site}: {source}")]
    Write {
        site: String,
        #[source]
        source: csv::Error,
    },
    #[error("failed to flush report: {0}")]
    Flush(#[source] io::Error),
}

/// Append-only report: header first, then one row per submitted result.
pub struct ReportSink<W: Write> {
    writer: csv::Writer<W>,
    separator: Separator,
    progress: ProgressReporter,
}

impl<W: Write> ReportSink<W> {
    /// Write the header and get ready for `total` rows.
    pub fn new(writer: W, separator: Separator, total: usize) -> Result<Self, ReportError> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(REPORT_HEADER).map_err(ReportError::Header)?;
        writer.flush().map_err(ReportError::Flush)?;
        Ok(Self {
            writer,
            separator,
            progress: ProgressReporter::new(total),
        })
    }

    pub fn submit(&mut self, result: &AuditResult) -> Result<(), ReportError> {
        let row = render_row(result, self.separator).map_err(|source| ReportError::Encode {
            site: result.site.clone(),
            source,
        })?;
        self.writer
            .write_record(&row)
            .map_err(|source| ReportError::Write {
                site: result.site.clone(),
                source,
            })?;
        self.writer.flush().map_err(ReportError::Flush)?;
        self.progress.record(result);
        Ok(())
    }

    /// Flush and hand back the underlying writer.
    pub fn finish(self) -> Result<(W, RunSummary), ReportError> {
        let summary = self.progress.summary();
        let writer = self
            .writer
            .into_inner()
            .map_err(|e| ReportError::Flush(e.into_error()))?;
        Ok((writer, summary))
    }
}

pub(crate) type SinkTask<W> = JoinHandle<Result<(W, RunSummary), ReportError>>;

/// Move `sink` into its own task. The task ends when every sender is dropped,
/// or at the first write failure, which also closes the channel.
pub(crate) fn spawn_sink<W>(
    mut sink: ReportSink<W>,
    capacity: usize,
) -> (mpsc::Sender<AuditResult>, SinkTask<W>)
where
    W: Write + Send + 'static,
{
    let (tx, mut rx) = mpsc::channel::<AuditResult>(capacity.max(1));
    let task = tokio::spawn(async move {
        while let Some(result) = rx.recv().await {
            if let Err(e) = sink.submit(&result) {
                rx.close();
                return Err(e);
            }
        }
        sink.finish()
    });
    (tx, task)
}
