//! Report pipeline orchestrator.
//!
//! Composes aggregation, fallback and rendering strictly one way:
//! authorize → aggregate (bounded retries) → on data collection failure,
//! synthesize → render. Validation and not-found errors are never masked, and
//! a report is never produced for a viewer whose access was not confirmed.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use serde::{Deserialize, Serialize};

use crate::aggregator::Aggregator;
use crate::error::ReportError;
use crate::fallback::{unconfirmed_identity, FallbackSynthesizer};
use crate::model::ReportRequest;
use crate::retry::RetryPolicy;
use crate::snapshot::{PerformanceSnapshot, ReportMetadata};
use crate::traits::{Clock, DocumentRenderer, Sources, SystemClock};

/// Configuration for the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Retry policy applied to every individual read.
    pub retry: RetryPolicy,
    /// Upper bound on the whole aggregation; `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            timeout: Some(Duration::from_secs(30)),
        }
    }
}

/// Which component produced a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotOrigin {
    Aggregated,
    Fallback,
}

#[derive(Debug, Clone)]
pub struct SnapshotOutcome {
    pub snapshot: PerformanceSnapshot,
    pub origin: SnapshotOrigin,
}

/// A rendered document with its response metadata.
#[derive(Debug, Clone)]
pub struct RenderedReport {
    pub snapshot: PerformanceSnapshot,
    pub origin: SnapshotOrigin,
    pub document: Vec<u8>,
    pub metadata: ReportMetadata,
}

/// The report pipeline. Cheap to construct; holds no per-request state.
pub struct ReportPipeline {
    sources: Sources,
    config: PipelineConfig,
    clock: Arc<dyn Clock>,
}

impl ReportPipeline {
    pub fn new(sources: Sources, config: PipelineConfig) -> Self {
        Self {
            sources,
            config,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Produce a snapshot, falling back to a synthesized one when data
    /// collection fails or times out.
    pub async fn snapshot(&self, request: &ReportRequest) -> Result<SnapshotOutcome, ReportError> {
        self.snapshot_until(request, std::future::pending()).await
    }

    /// Like [`snapshot`](Self::snapshot), but aggregation is abandoned as soon
    /// as `cancel` completes. In-flight reads are dropped and the fallback
    /// path runs.
    ///
    /// Identity and access are confirmed first. Failing to confirm them,
    /// including by timeout or cancellation, is `NotFound`; only the coursework
    /// phase falls back. The fallback itself performs no reads.
    pub async fn snapshot_until<C>(
        &self,
        request: &ReportRequest,
        cancel: C,
    ) -> Result<SnapshotOutcome, ReportError>
    where
        C: Future<Output = ()>,
    {
        let start = Instant::now();
        let deadline = self.config.timeout.map(|limit| (start + limit, limit));
        tokio::pin!(cancel);

        let aggregator = Aggregator::new(
            self.sources.clone(),
            self.config.retry,
            Arc::clone(&self.clock),
        );

        let authorized = bounded(aggregator.authorize(request), deadline, cancel.as_mut())
            .await
            .map_err(|e| unconfirmed_identity(request, e))?;

        let result = bounded(
            aggregator.collect(request, &authorized),
            deadline,
            cancel.as_mut(),
        )
        .await;

        match result {
            Ok(snapshot) => {
                tracing::info!(
                    student = %request.student_id,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "snapshot aggregated"
                );
                Ok(SnapshotOutcome {
                    snapshot,
                    origin: SnapshotOrigin::Aggregated,
                })
            }
            Err(e) if e.is_data_collection() => {
                tracing::warn!(
                    student = %request.student_id,
                    "aggregation failed, using fallback snapshot: {e}"
                );
                let snapshot = FallbackSynthesizer::new(
                    self.sources.clone(),
                    self.config.retry,
                    Arc::clone(&self.clock),
                )
                .for_student(&authorized, request)?;
                Ok(SnapshotOutcome {
                    snapshot,
                    origin: SnapshotOrigin::Fallback,
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Snapshot then render. Render failures are fatal and not retried.
    pub async fn generate(
        &self,
        request: &ReportRequest,
        renderer: &dyn DocumentRenderer,
    ) -> Result<RenderedReport, ReportError> {
        self.generate_until(request, renderer, std::future::pending())
            .await
    }

    pub async fn generate_until<C>(
        &self,
        request: &ReportRequest,
        renderer: &dyn DocumentRenderer,
        cancel: C,
    ) -> Result<RenderedReport, ReportError>
    where
        C: Future<Output = ()>,
    {
        let outcome = self.snapshot_until(request, cancel).await?;
        let document = renderer.render(&outcome.snapshot).inspect_err(|e| {
            tracing::error!(student = %request.student_id, "render failed: {e}");
        })?;

        let metadata = ReportMetadata {
            generated_at: outcome.snapshot.generated_at,
            student_id: request.student_id.to_string(),
            requested_by: request.viewer_id.to_string(),
            filename: renderer.file_name(&outcome.snapshot),
            content_type: renderer.content_type().to_string(),
        };
        tracing::info!(
            student = %request.student_id,
            origin = ?outcome.origin,
            bytes = document.len(),
            "report rendered"
        );

        Ok(RenderedReport {
            snapshot: outcome.snapshot,
            origin: outcome.origin,
            document,
            metadata,
        })
    }
}

/// Run one phase under the shared deadline and cancel signal. Either one
/// firing is a data collection error for the whole pipeline.
async fn bounded<T, W, C>(
    work: W,
    deadline: Option<(Instant, Duration)>,
    cancel: Pin<&mut C>,
) -> Result<T, ReportError>
where
    W: Future<Output = Result<T, ReportError>>,
    C: Future<Output = ()>,
{
    let attempt = async {
        match deadline {
            Some((at, limit)) => tokio::time::timeout_at(at, work).await.unwrap_or_else(|_| {
                Err(ReportError::interrupted(format!(
                    "timed out after {}ms",
                    limit.as_millis()
                )))
            }),
            None => work.await,
        }
    };

    tokio::select! {
        biased;
        result = attempt => result,
        _ = cancel => Err(ReportError::interrupted("cancelled by caller")),
    }
}
