//! Single import set export
//!
//! Fetches the header and lines of one import set, renders them through the
//! layouts, writes the file pair and flags the header exported. Every failure
//! is returned as an [`ImportSetError`] tagged with the stage it happened in;
//! nothing here aborts the surrounding cycle.

use crate::adapters::database::ImportSetRepository;
use crate::core::export::writer::{ExportFileWriter, ExportFiles};
use crate::core::layout::{Layout, LayoutSet};
use crate::domain::{ExportStage, ImportSetError, ImportSetId, OrderExportError, Record};
use serde::Serialize;
use std::sync::Arc;

/// Why an import set was left untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Lines are staged but no header
    MissingHeader,
    /// Header is staged but no lines
    NoLines,
    /// Header was flagged exported after the pending listing was taken
    AlreadyExported,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            SkipReason::MissingHeader => "missing header",
            SkipReason::NoLines => "no lines",
            SkipReason::AlreadyExported => "already exported",
        };
        f.write_str(text)
    }
}

/// Result of processing one import set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportSetOutcome {
    /// Files written and header flagged
    Exported {
        /// Written file pair
        files: ExportFiles,
        /// Number of records in the line file
        line_count: usize,
    },
    /// Rendered only; nothing written or flagged
    DryRun {
        /// Number of rendered lines
        line_count: usize,
    },
    /// Not exportable yet; no state changed
    Skipped(SkipReason),
}

/// Exports import sets one at a time
pub struct ExportProcessor {
    repository: Arc<dyn ImportSetRepository>,
    layouts: LayoutSet,
    writer: ExportFileWriter,
    dry_run: bool,
}

impl ExportProcessor {
    /// Create a processor
    pub fn new(
        repository: Arc<dyn ImportSetRepository>,
        layouts: LayoutSet,
        writer: ExportFileWriter,
        dry_run: bool,
    ) -> Self {
        Self {
            repository,
            layouts,
            writer,
            dry_run,
        }
    }

    /// Staging repository
    pub fn repository(&self) -> &Arc<dyn ImportSetRepository> {
        &self.repository
    }

    /// File writer
    pub fn writer(&self) -> &ExportFileWriter {
        &self.writer
    }

    /// Whether files and flags are left untouched
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Export one import set
    ///
    /// The header and lines are read concurrently. The header is flagged only
    /// after both files are in place.
    ///
    /// # Errors
    ///
    /// Returns an [`ImportSetError`] naming the failed stage. A
    /// [`ExportStage::MarkExported`] failure means the files were written.
    pub async fn process(&self, id: &ImportSetId) -> Result<ImportSetOutcome, ImportSetError> {
        let fail = |stage: ExportStage| {
            move |e: OrderExportError| ImportSetError::new(id.as_str(), stage, e)
        };

        let (header, lines) = futures::join!(
            self.repository.fetch_header(id),
            self.repository.fetch_lines(id)
        );
        let header = header.map_err(fail(ExportStage::Fetch))?;
        let lines = lines.map_err(fail(ExportStage::Fetch))?;

        let Some(header) = header else {
            tracing::warn!(
                import_set = %id,
                line_count = lines.len(),
                "Skipping import set: no header staged"
            );
            return Ok(ImportSetOutcome::Skipped(SkipReason::MissingHeader));
        };

        if !header.flag.is_pending() {
            tracing::info!(import_set = %id, "Skipping import set: header already exported");
            return Ok(ImportSetOutcome::Skipped(SkipReason::AlreadyExported));
        }

        if lines.is_empty() {
            tracing::warn!(import_set = %id, "Skipping import set: no lines staged");
            return Ok(ImportSetOutcome::Skipped(SkipReason::NoLines));
        }

        let header_record = render_checked(&self.layouts.header, &header.record)
            .map_err(fail(ExportStage::Render))?;
        let header_records = vec![header_record];
        let line_records = lines
            .iter()
            .map(|line| render_checked(&self.layouts.line, &line.record))
            .collect::<Result<Vec<_>, _>>()
            .map_err(fail(ExportStage::Render))?;

        if self.dry_run {
            tracing::info!(
                import_set = %id,
                line_count = line_records.len(),
                header = %header_records[0],
                "DRY RUN: Would write export files and flag import set"
            );
            return Ok(ImportSetOutcome::DryRun {
                line_count: line_records.len(),
            });
        }

        let files = self
            .writer
            .write_pair(id, &header_records, &line_records)
            .await
            .map_err(fail(ExportStage::Write))?;

        self.repository
            .mark_exported(id)
            .await
            .map_err(fail(ExportStage::MarkExported))?;

        tracing::info!(
            import_set = %id,
            line_count = line_records.len(),
            header_file = %files.header_path.display(),
            line_file = %files.line_path.display(),
            "Import set exported"
        );

        Ok(ImportSetOutcome::Exported {
            files,
            line_count: line_records.len(),
        })
    }
}

/// Renders a record, rejecting values that would break the record structure
///
/// A tab or line break inside a value would shift columns or split the
/// record for the downstream reader.
fn render_checked(layout: &Layout, record: &Record) -> Result<String, OrderExportError> {
    let rendered = layout.render(record);
    let separators = rendered.matches(Layout::SEPARATOR).count();
    let expected = layout.fields().len().saturating_sub(1);

    if separators != expected || rendered.contains(['\n', '\r']) {
        return Err(OrderExportError::Layout(format!(
            "Record for layout '{}' contains tab or line-break characters",
            layout.name()
        )));
    }
    Ok(rendered)
}
