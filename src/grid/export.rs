//! Export of the filtered rows (or an explicit subset).
//!
//! Projection happens on the interaction thread; serialization runs inline
//! or, for large exports, on the offload port. Completion is handled by an
//! [`ExportSink`] that owns clones of the ports it needs, so it can finish a
//! job after the grid itself has moved on.

use super::DataGrid;
use crate::error::{ExportError, GridResult};
use crate::events::{EventBus, GridEvent};
use crate::export::{ExportJob, export_filename, mime_for};
use crate::notifications::ToastVariant;
use crate::perf::measure;
use crate::services::{DeliveredFile, FileDelivery, Notifier};
use crate::types::{ExportFormat, RowIndex};
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

/// Result of [`DataGrid::export_data`]
#[derive(Clone, Debug, PartialEq)]
pub enum ExportOutcome {
    /// Serialized inline; delivery and `ExportCompleted` already happened
    Completed {
        job: Uuid,
        filename: String,
        content: String,
    },
    /// Handed to the offload port; `ExportCompleted` follows on completion
    Pending { job: Uuid, filename: String },
}

impl ExportOutcome {
    pub fn job(&self) -> Uuid {
        match self {
            ExportOutcome::Completed { job, .. } | ExportOutcome::Pending { job, .. } => *job,
        }
    }

    pub fn filename(&self) -> &str {
        match self {
            ExportOutcome::Completed { filename, .. } | ExportOutcome::Pending { filename, .. } => {
                filename
            }
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, ExportOutcome::Pending { .. })
    }
}

/// Finishes an export job: delivery, notification and the completion event.
#[derive(Clone)]
struct ExportSink {
    delivery: Arc<dyn FileDelivery>,
    notifier: Arc<dyn Notifier>,
    events: EventBus,
    detached: Arc<AtomicBool>,
}

impl ExportSink {
    fn finish(
        &self,
        job: Uuid,
        format: ExportFormat,
        filename: String,
        rows: usize,
        result: Result<String, String>,
    ) {
        if self.detached.load(Ordering::SeqCst) {
            tracing::debug!(%job, "Export finished after grid was destroyed, discarding");
            return;
        }

        let content = match result {
            Ok(content) => content,
            Err(e) => {
                tracing::error!(%job, "Export failed: {}", e);
                self.notifier.notify("Export failed", ToastVariant::Error);
                return;
            }
        };

        let file = DeliveredFile {
            filename,
            content,
            mime: mime_for(format),
            format,
        };
        if let Err(e) = self.delivery.deliver(&file) {
            tracing::error!(%job, filename = %file.filename, "Export delivery failed: {}", e);
            self.notifier
                .notify(&format!("Could not save {}", file.filename), ToastVariant::Error);
            return;
        }

        tracing::info!(%job, filename = %file.filename, rows, "Export completed");
        let noun = if rows == 1 { "row" } else { "rows" };
        self.notifier.notify(
            &format!("Exported {} {} to {}", rows, noun, file.filename),
            ToastVariant::Success,
        );
        self.events.emit(GridEvent::ExportCompleted {
            job,
            format,
            content: file.content,
            filename: file.filename,
        });
    }
}

impl DataGrid {
    /// Export visible columns of the filtered rows, or of `scope` when given.
    ///
    /// With a scope, rows are emitted in view order followed by any scoped
    /// rows the current filter hides, in dataset order. Unknown indices are
    /// skipped. PDF is unsupported: the user is warned and nothing else
    /// happens.
    pub fn export_data(
        &mut self,
        format: ExportFormat,
        scope: Option<&[RowIndex]>,
    ) -> GridResult<ExportOutcome> {
        if format == ExportFormat::Pdf {
            self.notifier()
                .notify("PDF export is not supported", ToastVariant::Warning);
            return Err(ExportError::Unsupported { format }.into());
        }

        let positions = self.export_positions(scope);
        let columns: Vec<_> = self.visible_columns().collect();
        let headers: Vec<String> = columns.iter().map(|c| c.title.clone()).collect();
        let rows: Vec<Vec<String>> = positions
            .iter()
            .map(|&pos| {
                let row = &self.rows[pos];
                columns.iter().map(|c| row.text(&c.key).to_string()).collect()
            })
            .collect();

        let filename = export_filename(
            &self.identifier,
            format,
            chrono::Local::now().naive_local(),
        );
        let job = ExportJob::new(
            format,
            filename.clone(),
            headers,
            rows,
            self.config.csv_separator,
        );
        let job_id = job.id;
        let row_count = job.row_count();
        let sink = ExportSink {
            delivery: Arc::clone(&self.services.delivery),
            notifier: Arc::clone(&self.services.notifier),
            events: self.events.clone(),
            detached: Arc::clone(&self.detached),
        };

        if row_count > self.config.export_offload_threshold {
            if let Some(offload) = &self.services.offload {
                tracing::debug!(grid = %self.identifier, job = %job_id, rows = row_count, "Offloading export");
                let done_name = filename.clone();
                offload.submit(
                    job,
                    Box::new(move |result| {
                        sink.finish(job_id, format, done_name, row_count, result)
                    }),
                );
                return Ok(ExportOutcome::Pending {
                    job: job_id,
                    filename,
                });
            }
        }

        let (content, elapsed_ms) = measure(|| job.run());
        self.metrics.record("export", elapsed_ms);
        sink.finish(job_id, format, filename.clone(), row_count, Ok(content.clone()));
        Ok(ExportOutcome::Completed {
            job: job_id,
            filename,
            content,
        })
    }

    fn export_positions(&self, scope: Option<&[RowIndex]>) -> Vec<usize> {
        let Some(scope) = scope else {
            return self.filtered.clone();
        };

        let wanted: HashSet<usize> = scope.iter().filter_map(|&i| self.position_of(i)).collect();
        let mut positions: Vec<usize> = self
            .filtered
            .iter()
            .copied()
            .filter(|pos| wanted.contains(pos))
            .collect();
        let in_view: HashSet<usize> = positions.iter().copied().collect();

        let mut hidden: Vec<usize> = wanted.difference(&in_view).copied().collect();
        hidden.sort_unstable();
        positions.extend(hidden);
        positions
    }
}
