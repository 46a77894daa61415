//! The `perfreport snapshot` command.

use anyhow::Result;

use crate::ReportArgs;

pub async fn execute(args: ReportArgs, compact: bool) -> Result<()> {
    let (_config, pipeline, request) = super::pipeline_for(&args)?;

    let cancel = async {
        let _ = tokio::signal::ctrl_c().await;
        tracing::warn!("interrupted, finishing with fallback snapshot");
    };
    let outcome = pipeline.snapshot_until(&request, cancel).await?;
    tracing::info!(origin = ?outcome.origin, "snapshot ready");

    let json = if compact {
        serde_json::to_string(&outcome.snapshot)?
    } else {
        serde_json::to_string_pretty(&outcome.snapshot)?
    };
    println!("{json}");
    Ok(())
}
