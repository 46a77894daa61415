//! The performance snapshot: the single value handed from aggregation (or
//! fallback) to rendering and to JSON consumers.
//!
//! Field names serialize in camelCase. Optional fields serialize as `null`
//! rather than being skipped so every snapshot has the same key set.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{GoalStatus, ReportPeriod};

/// Subject name used when assignments carry no class grouping.
pub const GENERAL_SUBJECT: &str = "Genel";

/// Number of months covered by the monthly progress series.
pub const MONTHLY_WINDOW: usize = 6;

/// Maximum entries in `recentAssignments` and `goals`.
pub const LIST_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSnapshot {
    pub student: StudentIdentity,
    pub teacher: TeacherIdentity,
    pub period: ReportPeriod,
    pub performance: Performance,
    pub statistics: Statistics,
    pub subjects: Vec<SubjectStat>,
    pub monthly_progress: Vec<MonthlyProgress>,
    pub recent_assignments: Vec<AssignmentSummary>,
    pub goals: Vec<GoalSummary>,
    pub insights: Insights,
    pub generated_at: DateTime<Utc>,
}

impl PerformanceSnapshot {
    /// Every percentage-valued field, in a fixed order.
    pub fn percentages(&self) -> Vec<u8> {
        let p = &self.performance;
        let mut values = vec![
            p.assignment_completion,
            p.grading_rate,
            p.average_grade,
            p.goals_progress,
            p.overall_performance,
        ];
        values.extend(self.subjects.iter().map(|s| s.average_grade));
        values.extend(self.monthly_progress.iter().map(|m| m.average_grade));
        values
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentIdentity {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub class_name: Option<String>,
}

impl StudentIdentity {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherIdentity {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl TeacherIdentity {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Derived percentages, each in `0..=100`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Performance {
    pub assignment_completion: u8,
    pub grading_rate: u8,
    pub average_grade: u8,
    pub goals_progress: u8,
    pub overall_performance: u8,
}

/// Raw counts behind the percentages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_assignments: u32,
    pub submitted_assignments: u32,
    pub graded_assignments: u32,
    pub pending_assignments: u32,
    pub total_goals: u32,
    pub completed_goals: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectStat {
    pub name: String,
    pub total_assignments: u32,
    pub completed_assignments: u32,
    pub average_grade: u8,
}

impl SubjectStat {
    /// The zeroed "Genel" placeholder.
    pub fn general() -> Self {
        Self {
            name: GENERAL_SUBJECT.to_string(),
            total_assignments: 0,
            completed_assignments: 0,
            average_grade: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyProgress {
    /// Label such as `"Oct 2026"`.
    pub month: String,
    pub assignments_completed: u32,
    pub goals_achieved: u32,
    pub average_grade: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentStatus {
    Pending,
    Submitted,
    Graded,
    Overdue,
}

impl AssignmentStatus {
    pub fn label(&self) -> &'static str {
        match self {
            AssignmentStatus::Pending => "Pending",
            AssignmentStatus::Submitted => "Submitted",
            AssignmentStatus::Graded => "Graded",
            AssignmentStatus::Overdue => "Overdue",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentSummary {
    pub id: String,
    pub title: String,
    pub subject: String,
    pub due_date: DateTime<Utc>,
    pub status: AssignmentStatus,
    pub grade: Option<f64>,
    pub max_grade: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalSummary {
    pub id: String,
    pub title: String,
    pub status: GoalStatus,
    pub target_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insights {
    pub strengths: Vec<String>,
    pub areas_for_improvement: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Response metadata for a rendered report. Surfaced alongside the document
/// (headers, CLI output), never embedded in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,
    pub student_id: String,
    pub requested_by: String,
    pub filename: String,
    pub content_type: String,
}

impl ReportMetadata {
    /// Header name/value pairs for a request/response boundary.
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Content-Type", self.content_type.clone()),
            (
                "Content-Disposition",
                format!("attachment; filename=\"{}\"", self.filename),
            ),
            ("X-Report-Generated-At", self.generated_at.to_rfc3339()),
            ("X-Student-Id", self.student_id.clone()),
            ("X-Requested-By", self.requested_by.clone()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn serializes_with_camel_case_names() {
        let stat = SubjectStat::general();
        let json = serde_json::to_value(&stat).unwrap();
        assert_eq!(json["name"], "Genel");
        assert!(json.get("totalAssignments").is_some());
        assert!(json.get("completedAssignments").is_some());
        assert!(json.get("averageGrade").is_some());
    }

    #[test]
    fn optional_fields_serialize_as_null() {
        let identity = StudentIdentity {
            id: "s".into(),
            first_name: "A".into(),
            last_name: "B".into(),
            email: "a@b.c".into(),
            class_name: None,
        };
        let json = serde_json::to_value(&identity).unwrap();
        assert!(json.get("className").unwrap().is_null());
    }

    #[test]
    fn metadata_headers() {
        let meta = ReportMetadata {
            generated_at: Utc.with_ymd_and_hms(2026, 10, 19, 8, 30, 0).unwrap(),
            student_id: "stu".into(),
            requested_by: "tch".into(),
            filename: "performance-report-a-b-2026-10-19.pdf".into(),
            content_type: "application/pdf".into(),
        };
        let headers = meta.headers();
        let find = |name: &str| {
            headers
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.clone())
                .unwrap()
        };
        assert_eq!(find("X-Student-Id"), "stu");
        assert_eq!(find("X-Requested-By"), "tch");
        assert!(find("X-Report-Generated-At").starts_with("2026-10-19T08:30:00"));
        assert!(find("Content-Disposition").contains("performance-report-a-b-2026-10-19.pdf"));
    }
}
