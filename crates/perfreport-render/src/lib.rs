//! perfreport-render — paginated PDF rendering of performance snapshots.
//!
//! Rendering is two passes over a [`cursor::RenderCursor`]: content layout,
//! then footer stamping once the page count is known. The laid-out document
//! is encoded by the hand-written PDF writer in [`pdf`].

pub mod cursor;
pub mod filename;
pub mod layout;
pub mod pdf;
pub mod text;

use std::path::Path;

use anyhow::{Context, Result};
use perfreport_core::snapshot::PerformanceSnapshot;
use perfreport_core::traits::DocumentRenderer;
use perfreport_core::ReportError;

pub use cursor::LayoutConfig;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Renders snapshots as PDF documents.
#[derive(Debug, Clone, Default)]
pub struct PdfRenderer {
    config: LayoutConfig,
}

impl PdfRenderer {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    /// Lay out without encoding.
    pub fn lay_out(&self, snapshot: &PerformanceSnapshot) -> cursor::Document {
        layout::lay_out(snapshot, self.config)
    }
}

impl DocumentRenderer for PdfRenderer {
    fn render(&self, snapshot: &PerformanceSnapshot) -> Result<Vec<u8>, ReportError> {
        let document = self.lay_out(snapshot);
        tracing::debug!(
            pages = document.pages.len(),
            lines = document.content_lines,
            "report laid out"
        );
        pdf::encode(&document, snapshot.generated_at)
    }

    fn file_name(&self, snapshot: &PerformanceSnapshot) -> String {
        filename::report_file_name(snapshot)
    }

    fn content_type(&self) -> &'static str {
        PDF_CONTENT_TYPE
    }
}

/// Write rendered document bytes to a file, creating parent directories.
pub fn write_report(document: &[u8], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, document).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
