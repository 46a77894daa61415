pub mod init;
pub mod render;
pub mod snapshot;
pub mod validate;

use anyhow::{Context, Result};
use chrono::Utc;

use perfreport_core::model::{ReportPeriod, ReportRequest};
use perfreport_core::pipeline::ReportPipeline;
use perfreport_sources::{create_sources, load_config_from, PerfreportConfig, SourceConfig};

use crate::ReportArgs;

/// Load config, apply command-line overrides and build the request.
fn prepare(args: &ReportArgs) -> Result<(PerfreportConfig, ReportRequest)> {
    let mut config = load_config_from(args.config.as_deref())?;
    if let Some(path) = &args.data {
        config.source = SourceConfig::Dataset { path: path.clone() };
    }

    let period = ReportPeriod::resolve(
        args.from,
        args.to,
        Utc::now().date_naive(),
        config.default_period_days,
    )?;
    let request = ReportRequest::parse(&args.student, &args.viewer, period)?;
    Ok((config, request))
}

/// Build the pipeline and request for a report command.
pub fn pipeline_for(args: &ReportArgs) -> Result<(PerfreportConfig, ReportPipeline, ReportRequest)> {
    let (config, request) = prepare(args)?;
    tracing::debug!(source = ?config.source, "using source");
    let sources = create_sources(&config).context("failed to initialize data source")?;
    let pipeline = ReportPipeline::new(sources, config.pipeline_config());
    Ok((config, pipeline, request))
}
