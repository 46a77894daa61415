//! Fallback synthesizer: a complete, data-empty snapshot for when
//! aggregation cannot finish.
//!
//! The output has exactly the shape of an aggregated snapshot (same keys,
//! six monthly entries, one "Genel" subject) so nothing downstream can tell
//! the difference structurally. It is only ever built for a student the
//! viewer has been confirmed to see; if identity or access cannot be
//! confirmed the request fails with `NotFound` instead.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::aggregator::{Aggregator, AuthorizedStudent};
use crate::error::ReportError;
use crate::model::{ReportRequest, StudentRecord};
use crate::retry::RetryPolicy;
use crate::snapshot::{
    Insights, Performance, PerformanceSnapshot, Statistics, StudentIdentity, SubjectStat,
    TeacherIdentity,
};
use crate::statistics::{empty_monthly_progress, teacher_identity};
use crate::traits::{Clock, Sources};

pub struct FallbackSynthesizer {
    sources: Sources,
    retry: RetryPolicy,
    clock: Arc<dyn Clock>,
}

impl FallbackSynthesizer {
    pub fn new(sources: Sources, retry: RetryPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            sources,
            retry,
            clock,
        }
    }

    /// Resolve identity and access, then build the fallback snapshot.
    ///
    /// Fails with `NotFound` when the student or viewer is unknown, access is
    /// denied, or any of those reads keeps failing. `Validation` errors
    /// propagate unchanged.
    pub async fn synthesize(&self, request: &ReportRequest) -> Result<PerformanceSnapshot, ReportError> {
        let authorized = Aggregator::new(self.sources.clone(), self.retry, Arc::clone(&self.clock))
            .authorize(request)
            .await
            .map_err(|e| unconfirmed_identity(request, e))?;
        self.for_student(&authorized, request)
    }

    /// Build the fallback snapshot for an already authorized student. Performs
    /// no reads.
    pub fn for_student(
        &self,
        authorized: &AuthorizedStudent,
        request: &ReportRequest,
    ) -> Result<PerformanceSnapshot, ReportError> {
        if !has_minimal_identity(&authorized.student) {
            return Err(ReportError::not_found("student", request.student_id.as_str()));
        }
        synthesized_snapshot(
            &authorized.student,
            teacher_identity(&authorized.viewer),
            request,
            self.clock.now(),
        )
    }
}

/// Identity or access that could not be confirmed is reported as the student
/// not being found. Other errors pass through.
pub(crate) fn unconfirmed_identity(request: &ReportRequest, err: ReportError) -> ReportError {
    if err.is_data_collection() {
        tracing::error!(
            student = %request.student_id,
            viewer = %request.viewer_id,
            "identity or access unconfirmed, no report possible: {err}"
        );
        ReportError::not_found("student", request.student_id.as_str())
    } else {
        err
    }
}

fn has_minimal_identity(student: &StudentRecord) -> bool {
    !(student.first_name.trim().is_empty()
        && student.last_name.trim().is_empty()
        && student.email.trim().is_empty())
}

/// The zeroed snapshot for a known student.
pub fn synthesized_snapshot(
    student: &StudentRecord,
    teacher: TeacherIdentity,
    request: &ReportRequest,
    now: DateTime<Utc>,
) -> Result<PerformanceSnapshot, ReportError> {
    Ok(PerformanceSnapshot {
        student: StudentIdentity {
            id: student.id.clone(),
            first_name: student.first_name.clone(),
            last_name: student.last_name.clone(),
            email: student.email.clone(),
            class_name: None,
        },
        teacher,
        period: request.period,
        performance: Performance::default(),
        statistics: Statistics::default(),
        subjects: vec![SubjectStat::general()],
        monthly_progress: empty_monthly_progress(now)?,
        recent_assignments: Vec::new(),
        goals: Vec::new(),
        insights: generic_insights(),
        generated_at: now,
    })
}

/// Guidance that does not depend on any collected data.
pub fn generic_insights() -> Insights {
    Insights {
        strengths: vec![
            "Detailed strengths will be listed once coursework for this period is available."
                .to_string(),
        ],
        areas_for_improvement: vec![
            "Performance data for this period could not be collected yet.".to_string(),
        ],
        recommendations: vec![
            "Keep submitting assignments on time and record progress on personal goals."
                .to_string(),
            "Request the report again later for a detailed breakdown.".to_string(),
        ],
    }
}
