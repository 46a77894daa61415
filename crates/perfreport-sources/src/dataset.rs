//! JSON dataset source.
//!
//! A dataset file holds every record the pipeline reads. [`DatasetStore`]
//! serves it through all collaborator traits, with per-read failure
//! injection and call counting for exercising the retry and fallback paths.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use perfreport_core::error::ReadStep;
use perfreport_core::model::{
    AssignmentRecord, ClassRecord, EntityId, GoalRecord, GoalStatus, StudentRecord,
    SubmissionRecord, UserRecord, UserRole,
};
use perfreport_core::traits::{
    AccessPolicy, AssignmentQuery, CourseworkStore, GoalStore, StudentDirectory,
};

use crate::error::SourceError;

/// Every record a report can draw on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(default)]
    pub students: Vec<StudentRecord>,
    #[serde(default)]
    pub users: Vec<UserRecord>,
    #[serde(default)]
    pub classes: Vec<ClassRecord>,
    #[serde(default)]
    pub assignments: Vec<AssignmentRecord>,
    #[serde(default)]
    pub submissions: Vec<SubmissionRecord>,
    #[serde(default)]
    pub goals: Vec<GoalRecord>,
}

/// A consistency problem found in a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetIssue {
    /// Collection the offending record lives in, e.g. `"submissions"`.
    pub collection: &'static str,
    pub id: String,
    pub message: String,
}

impl Dataset {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read dataset: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse dataset: {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write dataset: {}", path.display()))
    }

    /// Check identifiers and cross references. An empty result means the
    /// dataset is consistent.
    pub fn check(&self) -> Vec<DatasetIssue> {
        let mut issues = Vec::new();
        let mut issue = |collection: &'static str, id: &str, message: String| {
            issues.push(DatasetIssue {
                collection,
                id: id.to_string(),
                message,
            })
        };

        let mut check_unique = |collection: &'static str, ids: Vec<&str>| {
            let mut seen = HashSet::new();
            for id in ids {
                if !seen.insert(id) {
                    issue(collection, id, "duplicate id".into());
                }
            }
        };
        check_unique("students", self.students.iter().map(|s| s.id.as_str()).collect());
        check_unique("users", self.users.iter().map(|u| u.id.as_str()).collect());
        check_unique("classes", self.classes.iter().map(|c| c.id.as_str()).collect());
        check_unique("assignments", self.assignments.iter().map(|a| a.id.as_str()).collect());
        check_unique("submissions", self.submissions.iter().map(|s| s.id.as_str()).collect());
        check_unique("goals", self.goals.iter().map(|g| g.id.as_str()).collect());

        let students: HashSet<&str> = self.students.iter().map(|s| s.id.as_str()).collect();
        let users: HashMap<&str, UserRole> =
            self.users.iter().map(|u| (u.id.as_str(), u.role)).collect();
        let classes: HashSet<&str> = self.classes.iter().map(|c| c.id.as_str()).collect();
        let assignments: HashMap<&str, &AssignmentRecord> =
            self.assignments.iter().map(|a| (a.id.as_str(), a)).collect();

        for student in &self.students {
            if let Err(e) = EntityId::parse(&student.id) {
                issue("students", &student.id, e.to_string());
            }
            for class_id in &student.class_ids {
                if !classes.contains(class_id.as_str()) {
                    issue("students", &student.id, format!("unknown class '{class_id}'"));
                }
            }
            for (ids, role) in [
                (&student.teacher_ids, UserRole::Teacher),
                (&student.parent_ids, UserRole::Parent),
            ] {
                for id in ids {
                    match users.get(id.as_str()) {
                        None => issue("students", &student.id, format!("unknown {role} '{id}'")),
                        Some(actual) if *actual != role => issue(
                            "students",
                            &student.id,
                            format!("user '{id}' is a {actual}, not a {role}"),
                        ),
                        Some(_) => {}
                    }
                }
            }
        }

        for user in &self.users {
            if let Err(e) = EntityId::parse(&user.id) {
                issue("users", &user.id, e.to_string());
            }
        }

        for assignment in &self.assignments {
            if let Some(class_id) = &assignment.class_id {
                if !classes.contains(class_id.as_str()) {
                    issue("assignments", &assignment.id, format!("unknown class '{class_id}'"));
                }
            }
            for student_id in &assignment.assigned_to {
                if !students.contains(student_id.as_str()) {
                    issue("assignments", &assignment.id, format!("unknown student '{student_id}'"));
                }
            }
            if assignment.due_date < assignment.created_at {
                issue("assignments", &assignment.id, "due before it was created".into());
            }
        }

        for submission in &self.submissions {
            if !students.contains(submission.student_id.as_str()) {
                issue(
                    "submissions",
                    &submission.id,
                    format!("unknown student '{}'", submission.student_id),
                );
            }
            match assignments.get(submission.assignment_id.as_str()) {
                None => issue(
                    "submissions",
                    &submission.id,
                    format!("unknown assignment '{}'", submission.assignment_id),
                ),
                Some(assignment) => {
                    if let (Some(grade), Some(max)) = (submission.grade, assignment.max_grade) {
                        if grade < 0.0 || grade > max {
                            issue(
                                "submissions",
                                &submission.id,
                                format!("grade {grade} outside 0..={max}"),
                            );
                        }
                    }
                }
            }
        }

        for goal in &self.goals {
            if !students.contains(goal.student_id.as_str()) {
                issue("goals", &goal.id, format!("unknown student '{}'", goal.student_id));
            }
            if goal.status == GoalStatus::Completed && goal.completed_at.is_none() {
                issue("goals", &goal.id, "completed without completedAt".into());
            }
        }

        issues
    }

    /// A small, self-consistent dataset whose records fall inside the default
    /// report window ending at `now`.
    pub fn sample(now: DateTime<Utc>) -> Self {
        let student = "64b7f0c2a1e4d3b2c1a00001";
        let teacher = "64b7f0c2a1e4d3b2c1a00002";
        let parent = "64b7f0c2a1e4d3b2c1a00003";
        let day = |offset: i64| now - Duration::days(offset);

        let classes = vec![
            ClassRecord {
                id: "class-math".into(),
                name: "Matematik".into(),
            },
            ClassRecord {
                id: "class-physics".into(),
                name: "Physics".into(),
            },
        ];
        let assignment = |i: i64, class_id: &str, title: &str| AssignmentRecord {
            id: format!("assignment-{i}"),
            title: title.to_string(),
            class_id: Some(class_id.to_string()),
            assigned_to: vec![],
            created_at: day(70 - i * 10),
            due_date: day(63 - i * 10),
            max_grade: Some(100.0),
        };
        let assignments = vec![
            assignment(0, "class-math", "Linear equations"),
            assignment(1, "class-physics", "Kinematics worksheet"),
            assignment(2, "class-math", "Quadratic functions"),
            assignment(3, "class-physics", "Newton's laws lab report"),
            assignment(4, "class-math", "Probability quiz"),
            assignment(5, "class-physics", "Energy and work"),
        ];
        let submission = |i: i64, grade: Option<f64>| SubmissionRecord {
            id: format!("submission-{i}"),
            assignment_id: format!("assignment-{i}"),
            student_id: student.into(),
            submitted_at: day(64 - i * 10),
            grade,
        };

        Self {
            students: vec![StudentRecord {
                id: student.into(),
                first_name: "Elif".into(),
                last_name: "Kaya".into(),
                email: "elif.kaya@example.com".into(),
                class_ids: classes.iter().map(|c| c.id.clone()).collect(),
                teacher_ids: vec![teacher.into()],
                parent_ids: vec![parent.into()],
            }],
            users: vec![
                UserRecord {
                    id: teacher.into(),
                    first_name: "Ahmet".into(),
                    last_name: "Demir".into(),
                    email: "ahmet.demir@example.com".into(),
                    role: UserRole::Teacher,
                },
                UserRecord {
                    id: parent.into(),
                    first_name: "Zeynep".into(),
                    last_name: "Kaya".into(),
                    email: "zeynep.kaya@example.com".into(),
                    role: UserRole::Parent,
                },
            ],
            classes,
            assignments,
            submissions: vec![
                submission(0, Some(88.0)),
                submission(1, Some(74.0)),
                submission(2, Some(91.0)),
                submission(3, None),
                submission(4, Some(67.0)),
            ],
            goals: vec![
                GoalRecord {
                    id: "goal-0".into(),
                    student_id: student.into(),
                    title: "Finish the algebra workbook".into(),
                    status: GoalStatus::Completed,
                    created_at: day(80),
                    target_date: Some(day(30).date_naive()),
                    completed_at: Some(day(35)),
                },
                GoalRecord {
                    id: "goal-1".into(),
                    student_id: student.into(),
                    title: "Read one science article a week".into(),
                    status: GoalStatus::Active,
                    created_at: day(40),
                    target_date: Some(day(-30).date_naive()),
                    completed_at: None,
                },
            ],
        }
    }
}

/// Serves a [`Dataset`] through every collaborator trait.
pub struct DatasetStore {
    dataset: Dataset,
    failures: Mutex<HashMap<ReadStep, u32>>,
    calls: Mutex<HashMap<ReadStep, u32>>,
}

impl DatasetStore {
    pub fn new(dataset: Dataset) -> Self {
        Self {
            dataset,
            failures: Mutex::new(HashMap::new()),
            calls: Mutex::new(HashMap::new()),
        }
    }

    pub fn open(path: &Path) -> Result<Self> {
        let dataset = Dataset::load(path)?;
        tracing::debug!(
            path = %path.display(),
            students = dataset.students.len(),
            assignments = dataset.assignments.len(),
            "dataset loaded"
        );
        Ok(Self::new(dataset))
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Make the next `times` reads of `step` fail.
    pub fn fail_reads(&self, step: ReadStep, times: u32) {
        self.failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(step, times);
    }

    /// Number of reads of `step` so far, failed ones included.
    pub fn calls(&self, step: ReadStep) -> u32 {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&step)
            .copied()
            .unwrap_or(0)
    }

    fn record(&self, step: ReadStep) -> Result<(), SourceError> {
        *self
            .calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(step)
            .or_default() += 1;
        let mut failures = self.failures.lock().unwrap_or_else(|e| e.into_inner());
        match failures.get_mut(&step) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                Err(SourceError::Injected(step.to_string()))
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl StudentDirectory for DatasetStore {
    async fn student(&self, id: &str) -> anyhow::Result<Option<StudentRecord>> {
        self.record(ReadStep::Student)?;
        Ok(self.dataset.students.iter().find(|s| s.id == id).cloned())
    }

    async fn user(&self, id: &str) -> anyhow::Result<Option<UserRecord>> {
        self.record(ReadStep::Viewer)?;
        Ok(self.dataset.users.iter().find(|u| u.id == id).cloned())
    }

    async fn classes(&self, ids: &[String]) -> anyhow::Result<Vec<ClassRecord>> {
        self.record(ReadStep::Classes)?;
        Ok(self
            .dataset
            .classes
            .iter()
            .filter(|c| ids.contains(&c.id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CourseworkStore for DatasetStore {
    async fn assignments(&self, query: &AssignmentQuery) -> anyhow::Result<Vec<AssignmentRecord>> {
        self.record(ReadStep::Assignments)?;
        Ok(self
            .dataset
            .assignments
            .iter()
            .filter(|a| {
                let direct = a.assigned_to.contains(&query.student_id);
                let via_class = a
                    .class_id
                    .as_ref()
                    .is_some_and(|id| query.class_ids.contains(id));
                (direct || via_class) && a.falls_within(&query.period)
            })
            .cloned()
            .collect())
    }

    async fn submissions(
        &self,
        student_id: &str,
        assignment_ids: &[String],
    ) -> anyhow::Result<Vec<SubmissionRecord>> {
        self.record(ReadStep::Submissions)?;
        Ok(self
            .dataset
            .submissions
            .iter()
            .filter(|s| s.student_id == student_id && assignment_ids.contains(&s.assignment_id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl GoalStore for DatasetStore {
    async fn goals(&self, student_id: &str) -> anyhow::Result<Vec<GoalRecord>> {
        self.record(ReadStep::Goals)?;
        Ok(self
            .dataset
            .goals
            .iter()
            .filter(|g| g.student_id == student_id)
            .cloned()
            .collect())
    }
}

/// Admins see everyone; teachers and parents see students that list them.
#[async_trait]
impl AccessPolicy for DatasetStore {
    async fn can_view(&self, viewer: &UserRecord, student: &StudentRecord) -> anyhow::Result<bool> {
        self.record(ReadStep::Access)?;
        Ok(match viewer.role {
            UserRole::Admin => true,
            UserRole::Teacher => student.teacher_ids.contains(&viewer.id),
            UserRole::Parent => student.parent_ids.contains(&viewer.id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use perfreport_core::model::ReportPeriod;

    const STUDENT: &str = "64b7f0c2a1e4d3b2c1a00001";
    const TEACHER: &str = "64b7f0c2a1e4d3b2c1a00002";
    const PARENT: &str = "64b7f0c2a1e4d3b2c1a00003";

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap()
    }

    fn store() -> DatasetStore {
        DatasetStore::new(Dataset::sample(now()))
    }

    fn query(store: &DatasetStore) -> AssignmentQuery {
        let student = &store.dataset().students[0];
        AssignmentQuery {
            student_id: student.id.clone(),
            class_ids: student.class_ids.clone(),
            period: ReportPeriod::last_days(now().date_naive(), 90).unwrap(),
        }
    }

    #[test]
    fn sample_dataset_is_consistent() {
        let issues = Dataset::sample(now()).check();
        assert!(issues.is_empty(), "{issues:?}");
    }

    #[test]
    fn check_reports_dangling_references() {
        let mut dataset = Dataset::sample(now());
        dataset.submissions[0].assignment_id = "missing".into();
        dataset.goals[0].student_id = "64b7f0c2a1e4d3b2c1a0ffff".into();
        dataset.students[0].teacher_ids.push(PARENT.into());
        dataset.users.push(dataset.users[0].clone());

        let issues = dataset.check();
        let collections: Vec<&str> = issues.iter().map(|i| i.collection).collect();
        assert!(collections.contains(&"submissions"));
        assert!(collections.contains(&"goals"));
        assert!(issues
            .iter()
            .any(|i| i.collection == "students" && i.message.contains("not a teacher")));
        assert!(issues
            .iter()
            .any(|i| i.collection == "users" && i.message == "duplicate id"));
    }

    #[test]
    fn check_rejects_malformed_ids() {
        let mut dataset = Dataset::sample(now());
        dataset.users[0].id = "teacher-1".into();
        let issues = dataset.check();
        assert!(issues.iter().any(|i| i.id == "teacher-1" && i.collection == "users"));
    }

    #[test]
    fn dataset_round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        let dataset = Dataset::sample(now());
        dataset.save(&path).unwrap();

        let loaded = Dataset::load(&path).unwrap();
        assert_eq!(loaded, dataset);
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"firstName\""));
        assert!(raw.contains("\"classIds\""));
    }

    #[test]
    fn load_reports_path_on_parse_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = Dataset::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("broken.json"));
    }

    #[tokio::test]
    async fn serves_records_for_student() {
        let store = store();
        assert!(store.student(STUDENT).await.unwrap().is_some());
        assert!(store.student(TEACHER).await.unwrap().is_none());

        let assignments = store.assignments(&query(&store)).await.unwrap();
        assert_eq!(assignments.len(), 6);
        let ids: Vec<String> = assignments.iter().map(|a| a.id.clone()).collect();
        let submissions = store.submissions(STUDENT, &ids).await.unwrap();
        assert_eq!(submissions.len(), 5);
        assert_eq!(store.goals(STUDENT).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn assignments_outside_period_are_excluded() {
        let store = store();
        let mut query = query(&store);
        query.period = ReportPeriod::last_days(now().date_naive(), 20).unwrap();
        let assignments = store.assignments(&query).await.unwrap();
        assert!(assignments.iter().all(|a| a.falls_within(&query.period)));
        assert!(assignments.len() < 6);
    }

    #[tokio::test]
    async fn access_follows_relationships() {
        let store = store();
        let student = store.student(STUDENT).await.unwrap().unwrap();
        let teacher = store.user(TEACHER).await.unwrap().unwrap();
        let parent = store.user(PARENT).await.unwrap().unwrap();
        assert!(store.can_view(&teacher, &student).await.unwrap());
        assert!(store.can_view(&parent, &student).await.unwrap());

        let stranger = UserRecord {
            id: "64b7f0c2a1e4d3b2c1a00009".into(),
            role: UserRole::Teacher,
            ..teacher.clone()
        };
        assert!(!store.can_view(&stranger, &student).await.unwrap());

        let admin = UserRecord {
            role: UserRole::Admin,
            ..stranger
        };
        assert!(store.can_view(&admin, &student).await.unwrap());
    }

    #[tokio::test]
    async fn injected_failures_are_consumed_then_reads_succeed() {
        let store = store();
        store.fail_reads(ReadStep::Goals, 2);

        assert!(store.goals(STUDENT).await.is_err());
        let err = store.goals(STUDENT).await.unwrap_err();
        assert!(err.to_string().contains("goal read"));
        assert!(store.goals(STUDENT).await.is_ok());
        assert_eq!(store.calls(ReadStep::Goals), 3);
        assert_eq!(store.calls(ReadStep::Assignments), 0);
    }
}
