//! The `perfreport render` command.

use std::path::PathBuf;

use anyhow::Result;

use perfreport_core::pipeline::SnapshotOrigin;
use perfreport_render::{write_report, PdfRenderer};

use crate::ReportArgs;

pub async fn execute(args: ReportArgs, output: Option<PathBuf>) -> Result<()> {
    let (config, pipeline, request) = super::pipeline_for(&args)?;
    let renderer = PdfRenderer::default();

    let cancel = async {
        let _ = tokio::signal::ctrl_c().await;
        tracing::warn!("interrupted, rendering fallback snapshot");
    };
    let report = pipeline.generate_until(&request, &renderer, cancel).await?;

    let dir = output.unwrap_or(config.output_dir);
    let path = dir.join(&report.metadata.filename);
    write_report(&report.document, &path)?;

    let origin = match report.origin {
        SnapshotOrigin::Aggregated => "aggregated",
        SnapshotOrigin::Fallback => "fallback",
    };
    println!(
        "Rendered {} ({} bytes, {origin} snapshot)",
        path.display(),
        report.document.len()
    );
    for (name, value) in report.metadata.headers() {
        println!("  {name}: {value}");
    }
    Ok(())
}
