//! In-crate test doubles for the collaborator traits.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

use crate::error::ReadStep;
use crate::model::{
    AssignmentRecord, ClassRecord, GoalRecord, ReportPeriod, ReportRequest, StudentRecord,
    SubmissionRecord, UserRecord, UserRole,
};
use crate::traits::{
    AccessPolicy, AssignmentQuery, CourseworkStore, FixedClock, GoalStore, StudentDirectory,
};

pub const FAKE_STUDENT: &str = "64b7f0c2a1e4d3b2c1a00001";
pub const FAKE_TEACHER: &str = "64b7f0c2a1e4d3b2c1a00002";
pub const UNKNOWN_ID: &str = "64b7f0c2a1e4d3b2c1a0ffff";

pub fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
}

pub fn fixture_clock() -> FixedClock {
    FixedClock(Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap())
}

pub fn reference_request() -> ReportRequest {
    let period = ReportPeriod::new(
        NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(),
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
    )
    .unwrap();
    ReportRequest::parse(FAKE_STUDENT, FAKE_TEACHER, period).unwrap()
}

/// A store serving one student, with per-read failure injection.
pub struct FakeStore {
    pub student: StudentRecord,
    pub viewer: UserRecord,
    pub classes: Vec<ClassRecord>,
    pub assignments: Vec<AssignmentRecord>,
    pub submissions: Vec<SubmissionRecord>,
    pub goals: Vec<GoalRecord>,
    failures: Mutex<HashMap<ReadStep, u32>>,
    calls: Mutex<HashMap<ReadStep, u32>>,
    stalled: Mutex<HashSet<ReadStep>>,
    denied: AtomicBool,
}

impl FakeStore {
    /// 10 assignments, 8 submissions, 5 graded with grades summing to 400.
    pub fn reference() -> Self {
        let assignments = (0..10u32)
            .map(|i| AssignmentRecord {
                id: format!("a{i}"),
                title: format!("Worksheet {i}"),
                class_id: Some("math".into()),
                assigned_to: vec![],
                created_at: at(2026, 9, 1 + i),
                due_date: at(2026, 9, 1 + i) + Duration::days(7),
                max_grade: Some(100.0),
            })
            .collect();
        let grades = [70.0, 90.0, 80.0, 75.0, 85.0];
        let submissions = (0..8u32)
            .map(|i| SubmissionRecord {
                id: format!("s{i}"),
                assignment_id: format!("a{i}"),
                student_id: FAKE_STUDENT.into(),
                submitted_at: at(2026, 9, 10 + i),
                grade: grades.get(i as usize).copied(),
            })
            .collect();

        Self {
            student: StudentRecord {
                id: FAKE_STUDENT.into(),
                first_name: "Elif".into(),
                last_name: "Kaya".into(),
                email: "elif@example.com".into(),
                class_ids: vec!["math".into()],
                teacher_ids: vec![FAKE_TEACHER.into()],
                parent_ids: vec![],
            },
            viewer: UserRecord {
                id: FAKE_TEACHER.into(),
                first_name: "Ahmet".into(),
                last_name: "Demir".into(),
                email: "ahmet@example.com".into(),
                role: UserRole::Teacher,
            },
            classes: vec![ClassRecord {
                id: "math".into(),
                name: "Mathematics".into(),
            }],
            assignments,
            submissions,
            goals: vec![],
            failures: Mutex::new(HashMap::new()),
            calls: Mutex::new(HashMap::new()),
            stalled: Mutex::new(HashSet::new()),
            denied: AtomicBool::new(false),
        }
    }

    /// Make the next `times` reads of `step` fail.
    pub fn fail(&self, step: ReadStep, times: u32) {
        self.failures.lock().unwrap().insert(step, times);
    }

    /// Make every read of `step` hang forever.
    pub fn stall(&self, step: ReadStep) {
        self.stalled.lock().unwrap().insert(step);
    }

    pub fn deny_access(&self) {
        self.denied.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self, step: ReadStep) -> u32 {
        self.calls.lock().unwrap().get(&step).copied().unwrap_or(0)
    }

    async fn read(&self, step: ReadStep) -> anyhow::Result<()> {
        let stalled = self.stalled.lock().unwrap().contains(&step);
        if stalled {
            std::future::pending::<()>().await;
        }
        self.record(step)
    }

    fn record(&self, step: ReadStep) -> anyhow::Result<()> {
        *self.calls.lock().unwrap().entry(step).or_default() += 1;
        let mut failures = self.failures.lock().unwrap();
        if let Some(remaining) = failures.get_mut(&step) {
            if *remaining > 0 {
                *remaining -= 1;
                anyhow::bail!("injected {step} failure");
            }
        }
        Ok(())
    }
}

#[async_trait]
impl StudentDirectory for FakeStore {
    async fn student(&self, id: &str) -> anyhow::Result<Option<StudentRecord>> {
        self.read(ReadStep::Student).await?;
        Ok((id == self.student.id).then(|| self.student.clone()))
    }

    async fn user(&self, id: &str) -> anyhow::Result<Option<UserRecord>> {
        self.read(ReadStep::Viewer).await?;
        Ok((id == self.viewer.id).then(|| self.viewer.clone()))
    }

    async fn classes(&self, ids: &[String]) -> anyhow::Result<Vec<ClassRecord>> {
        self.read(ReadStep::Classes).await?;
        Ok(self
            .classes
            .iter()
            .filter(|c| ids.contains(&c.id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CourseworkStore for FakeStore {
    async fn assignments(&self, _query: &AssignmentQuery) -> anyhow::Result<Vec<AssignmentRecord>> {
        self.read(ReadStep::Assignments).await?;
        Ok(self.assignments.clone())
    }

    async fn submissions(
        &self,
        _student_id: &str,
        assignment_ids: &[String],
    ) -> anyhow::Result<Vec<SubmissionRecord>> {
        self.read(ReadStep::Submissions).await?;
        Ok(self
            .submissions
            .iter()
            .filter(|s| assignment_ids.contains(&s.assignment_id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl GoalStore for FakeStore {
    async fn goals(&self, _student_id: &str) -> anyhow::Result<Vec<GoalRecord>> {
        self.read(ReadStep::Goals).await?;
        Ok(self.goals.clone())
    }
}

#[async_trait]
impl AccessPolicy for FakeStore {
    async fn can_view(&self, _viewer: &UserRecord, _student: &StudentRecord) -> anyhow::Result<bool> {
        self.read(ReadStep::Access).await?;
        Ok(!self.denied.load(Ordering::SeqCst))
    }
}
