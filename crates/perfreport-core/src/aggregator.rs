//! Aggregator: reads a student's records and computes the snapshot.
//!
//! Identity and access are resolved first ([`Aggregator::authorize`]). Independent reads (classes,
//! assignments, goals) then fan out concurrently; submissions depend on the
//! assignment set and run last. Each read is retried on its own, so a flaky
//! expensive read never causes a cheap one to be repeated.

use std::sync::Arc;

use tracing::instrument;

use crate::error::{ReadStep, ReportError};
use crate::model::{ReportRequest, StudentRecord, UserRecord};
use crate::retry::RetryPolicy;
use crate::snapshot::PerformanceSnapshot;
use crate::statistics::{build_snapshot, CollectedRecords};
use crate::traits::{AssignmentQuery, Clock, Sources};

/// A student together with a viewer confirmed to have access.
#[derive(Debug, Clone)]
pub struct AuthorizedStudent {
    pub student: StudentRecord,
    pub viewer: UserRecord,
}

/// Per-request aggregator. Holds no state across calls.
pub struct Aggregator {
    sources: Sources,
    retry: RetryPolicy,
    clock: Arc<dyn Clock>,
}

impl Aggregator {
    pub fn new(sources: Sources, retry: RetryPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            sources,
            retry,
            clock,
        }
    }

    /// Aggregate the snapshot for one request.
    ///
    /// Fails with `Validation` for an inverted period, `NotFound` when the
    /// student or viewer is unknown or the viewer may not see the student, and
    /// `DataCollection` when any read exhausts its retries. Never returns a
    /// partial snapshot.
    #[instrument(skip(self, request), fields(student = %request.student_id, viewer = %request.viewer_id))]
    pub async fn aggregate(&self, request: &ReportRequest) -> Result<PerformanceSnapshot, ReportError> {
        let authorized = self.authorize(request).await?;
        self.collect(request, &authorized).await
    }

    /// Validate the request, resolve both identities and confirm the viewer
    /// may see the student. No coursework is read.
    pub async fn authorize(&self, request: &ReportRequest) -> Result<AuthorizedStudent, ReportError> {
        request.validate()?;

        let student = self.resolve_student(request.student_id.as_str()).await?;
        let viewer = self.resolve_viewer(request.viewer_id.as_str(), &student).await?;
        Ok(AuthorizedStudent { student, viewer })
    }

    /// Read the coursework of an authorized student and build the snapshot.
    pub async fn collect(
        &self,
        request: &ReportRequest,
        authorized: &AuthorizedStudent,
    ) -> Result<PerformanceSnapshot, ReportError> {
        let student = &authorized.student;
        let query = AssignmentQuery {
            student_id: student.id.clone(),
            class_ids: student.class_ids.clone(),
            period: request.period,
        };
        let directory = self.sources.directory.as_ref();
        let coursework = self.sources.coursework.as_ref();
        let goal_store = self.sources.goals.as_ref();
        let student_id = student.id.as_str();
        let class_ids = student.class_ids.as_slice();
        let query = &query;

        let (classes, assignments, goals) = futures::try_join!(
            self.retry
                .run(ReadStep::Classes, move || directory.classes(class_ids)),
            self.retry
                .run(ReadStep::Assignments, move || coursework.assignments(query)),
            self.retry
                .run(ReadStep::Goals, move || goal_store.goals(student_id)),
        )?;

        let assignment_ids: Vec<String> = assignments.iter().map(|a| a.id.clone()).collect();
        let ids = assignment_ids.as_slice();
        let submissions = self
            .retry
            .run(ReadStep::Submissions, move || {
                coursework.submissions(student_id, ids)
            })
            .await?;

        tracing::debug!(
            classes = classes.len(),
            assignments = assignments.len(),
            submissions = submissions.len(),
            goals = goals.len(),
            "records collected"
        );

        let records = CollectedRecords {
            student: authorized.student.clone(),
            viewer: authorized.viewer.clone(),
            classes,
            assignments,
            submissions,
            goals,
        };
        build_snapshot(&records, &request.period, self.clock.now())
    }

    async fn resolve_student(&self, id: &str) -> Result<StudentRecord, ReportError> {
        let directory = self.sources.directory.as_ref();
        self.retry
            .run(ReadStep::Student, move || directory.student(id))
            .await?
            .ok_or_else(|| ReportError::not_found("student", id))
    }

    /// Resolve the viewer and check their relationship with the student.
    /// A denial is reported as the student not being found.
    async fn resolve_viewer(
        &self,
        viewer_id: &str,
        student: &StudentRecord,
    ) -> Result<UserRecord, ReportError> {
        let directory = self.sources.directory.as_ref();
        let access = self.sources.access.as_ref();

        let viewer = self
            .retry
            .run(ReadStep::Viewer, move || directory.user(viewer_id))
            .await?
            .ok_or_else(|| ReportError::not_found("user", viewer_id))?;

        let viewer_ref = &viewer;
        let allowed = self
            .retry
            .run(ReadStep::Access, move || access.can_view(viewer_ref, student))
            .await?;
        if !allowed {
            tracing::warn!(viewer = %viewer.id, role = %viewer.role, "viewer has no relationship with student");
            return Err(ReportError::not_found("student", student.id.clone()));
        }
        Ok(viewer)
    }
}
