//! Collaborator trait definitions.
//!
//! The aggregation core never talks to a database or service directly. Record
//! stores, the access policy and the clock are supplied by the caller; the
//! `perfreport-sources` crate provides dataset-file and HTTP implementations,
//! and `perfreport-render` implements [`DocumentRenderer`].

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ReportError;
use crate::model::{
    AssignmentRecord, ClassRecord, GoalRecord, ReportPeriod, StudentRecord, SubmissionRecord,
    UserRecord,
};
use crate::snapshot::PerformanceSnapshot;

// ---------------------------------------------------------------------------
// Record stores
// ---------------------------------------------------------------------------

/// Identity and class membership lookups.
#[async_trait]
pub trait StudentDirectory: Send + Sync {
    /// Look up a student. `Ok(None)` means the student does not exist.
    async fn student(&self, id: &str) -> anyhow::Result<Option<StudentRecord>>;

    /// Look up a teacher, parent or administrator.
    async fn user(&self, id: &str) -> anyhow::Result<Option<UserRecord>>;

    /// Resolve class records; unknown ids are omitted.
    async fn classes(&self, ids: &[String]) -> anyhow::Result<Vec<ClassRecord>>;
}

/// Query for assignments reaching a student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentQuery {
    pub student_id: String,
    /// Classes the student belongs to.
    pub class_ids: Vec<String>,
    /// Assignments created or due inside this window.
    pub period: ReportPeriod,
}

/// Assignment and submission storage.
#[async_trait]
pub trait CourseworkStore: Send + Sync {
    /// Assignments assigned to the student directly or via a class.
    async fn assignments(&self, query: &AssignmentQuery) -> anyhow::Result<Vec<AssignmentRecord>>;

    /// The student's submissions for the given assignments.
    async fn submissions(
        &self,
        student_id: &str,
        assignment_ids: &[String],
    ) -> anyhow::Result<Vec<SubmissionRecord>>;
}

#[async_trait]
pub trait GoalStore: Send + Sync {
    async fn goals(&self, student_id: &str) -> anyhow::Result<Vec<GoalRecord>>;
}

/// Decides whether a viewer has a permitted relationship with a student.
#[async_trait]
pub trait AccessPolicy: Send + Sync {
    async fn can_view(&self, viewer: &UserRecord, student: &StudentRecord) -> anyhow::Result<bool>;
}

/// The full set of collaborators a pipeline reads from.
#[derive(Clone)]
pub struct Sources {
    pub directory: Arc<dyn StudentDirectory>,
    pub coursework: Arc<dyn CourseworkStore>,
    pub goals: Arc<dyn GoalStore>,
    pub access: Arc<dyn AccessPolicy>,
}

impl Sources {
    /// Use one backend for every collaborator role.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: StudentDirectory + CourseworkStore + GoalStore + AccessPolicy + 'static,
    {
        Self {
            directory: store.clone(),
            coursework: store.clone(),
            goals: store.clone(),
            access: store,
        }
    }
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Source of "now". Snapshots read time only through this trait.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

// ---------------------------------------------------------------------------
// Document renderer
// ---------------------------------------------------------------------------

/// Turns a snapshot into a downloadable document.
///
/// Implementations are synchronous and never retry; an error here is fatal.
pub trait DocumentRenderer: Send + Sync {
    fn render(&self, snapshot: &PerformanceSnapshot) -> Result<Vec<u8>, ReportError>;

    /// Deterministic download name for the rendered document.
    fn file_name(&self, snapshot: &PerformanceSnapshot) -> String;

    fn content_type(&self) -> &'static str;
}
