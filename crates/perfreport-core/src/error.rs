//! Report pipeline error types.
//!
//! Defined in `perfreport-core` so the pipeline can classify failures
//! (fallback-eligible or not) without string matching.

use std::fmt;

use thiserror::Error;

/// The individual read that was being performed when collection failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadStep {
    Student,
    Viewer,
    Access,
    Classes,
    Assignments,
    Submissions,
    Goals,
    /// The aggregation as a whole (cancellation or deadline).
    Pipeline,
}

impl fmt::Display for ReadStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReadStep::Student => "student lookup",
            ReadStep::Viewer => "viewer lookup",
            ReadStep::Access => "access check",
            ReadStep::Classes => "class lookup",
            ReadStep::Assignments => "assignment read",
            ReadStep::Submissions => "submission read",
            ReadStep::Goals => "goal read",
            ReadStep::Pipeline => "aggregation",
        };
        f.write_str(name)
    }
}

/// Errors surfaced by the aggregation, fallback and rendering stages.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Malformed identifier or inverted date range. Never retried.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The student (or viewer) could not be resolved, or the viewer has no
    /// relationship with the student.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A downstream read exhausted its retry budget.
    #[error("data collection failed during {step} after {attempts} attempt(s): {cause:#}")]
    DataCollection {
        step: ReadStep,
        attempts: u32,
        cause: anyhow::Error,
    },

    /// The document encoder rejected the laid-out report.
    #[error("render failed: {0}")]
    Render(String),
}

impl ReportError {
    pub fn validation(message: impl Into<String>) -> Self {
        ReportError::Validation(message.into())
    }

    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        ReportError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Aggregation aborted by cancellation or timeout.
    pub fn interrupted(reason: impl fmt::Display) -> Self {
        ReportError::DataCollection {
            step: ReadStep::Pipeline,
            attempts: 0,
            cause: anyhow::anyhow!("{reason}"),
        }
    }

    /// Returns `true` if the pipeline should answer this error with a
    /// synthesized snapshot instead of surfacing it.
    pub fn is_data_collection(&self) -> bool {
        matches!(self, ReportError::DataCollection { .. })
    }

    /// The read step that failed, for data collection errors.
    pub fn step(&self) -> Option<ReadStep> {
        match self {
            ReportError::DataCollection { step, .. } => Some(*step),
            _ => None,
        }
    }
}
