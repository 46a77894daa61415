//! Core data model types for perfreport.
//!
//! Request-side types (identifiers, report period) are validated on
//! construction. Record types mirror what the collaborating stores hand back
//! and are taken as-is.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ReportError;

/// Default report window when the caller does not supply one.
pub const DEFAULT_PERIOD_DAYS: i64 = 90;

/// A validated entity identifier: a 24-character hex object id or a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityId(String);

impl EntityId {
    pub fn parse(raw: &str) -> Result<Self, ReportError> {
        let trimmed = raw.trim();
        let is_object_id =
            trimmed.len() == 24 && trimmed.chars().all(|c| c.is_ascii_hexdigit());
        if is_object_id || Uuid::parse_str(trimmed).is_ok() {
            Ok(EntityId(trimmed.to_string()))
        } else {
            Err(ReportError::validation(format!(
                "malformed identifier: '{raw}'"
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EntityId {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityId::parse(s)
    }
}

impl TryFrom<String> for EntityId {
    type Error = ReportError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        EntityId::parse(&value)
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

/// The date window a report covers. Both bounds are inclusive days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ReportPeriod {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ReportError> {
        let period = Self { start, end };
        period.validate()?;
        Ok(period)
    }

    /// The `days`-long window ending on `today`.
    pub fn last_days(today: NaiveDate, days: i64) -> Result<Self, ReportError> {
        Self::new(days_before(today, days)?, today)
    }

    /// Build a period from optional caller bounds, defaulting to the last
    /// `default_days` days ending `today`.
    pub fn resolve(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        today: NaiveDate,
        default_days: i64,
    ) -> Result<Self, ReportError> {
        let end = end.unwrap_or(today);
        let start = match start {
            Some(start) => start,
            None => days_before(end, default_days)?,
        };
        Self::new(start, end)
    }

    pub fn validate(&self) -> Result<(), ReportError> {
        if self.start >= self.end {
            return Err(ReportError::validation(format!(
                "period start {} must be before end {}",
                self.start, self.end
            )));
        }
        Ok(())
    }

    /// Whether `at` falls on one of the period's days (UTC).
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        let day = at.date_naive();
        day >= self.start && day <= self.end
    }
}

fn days_before(end: NaiveDate, days: i64) -> Result<NaiveDate, ReportError> {
    Duration::try_days(days.max(1))
        .and_then(|span| end.checked_sub_signed(span))
        .ok_or_else(|| {
            ReportError::validation(format!("a {days}-day period before {end} is out of range"))
        })
}

/// A single report request, after identifier validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub student_id: EntityId,
    /// The teacher or parent asking for the report.
    pub viewer_id: EntityId,
    pub period: ReportPeriod,
}

impl ReportRequest {
    pub fn parse(student_id: &str, viewer_id: &str, period: ReportPeriod) -> Result<Self, ReportError> {
        Ok(Self {
            student_id: EntityId::parse(student_id)?,
            viewer_id: EntityId::parse(viewer_id)?,
            period,
        })
    }

    pub fn validate(&self) -> Result<(), ReportError> {
        self.period.validate()
    }
}

// ---------------------------------------------------------------------------
// Collaborator records
// ---------------------------------------------------------------------------

/// A student as returned by the student directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Classes the student is enrolled in.
    #[serde(default)]
    pub class_ids: Vec<String>,
    /// Teachers with a direct relationship to the student.
    #[serde(default)]
    pub teacher_ids: Vec<String>,
    /// Guardians of the student.
    #[serde(default)]
    pub parent_ids: Vec<String>,
}


/// Role of the user requesting a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Teacher,
    Parent,
    Admin,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Teacher => write!(f, "teacher"),
            UserRole::Parent => write!(f, "parent"),
            UserRole::Admin => write!(f, "admin"),
        }
    }
}

/// A teacher, parent or administrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: UserRole,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassRecord {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRecord {
    pub id: String,
    pub title: String,
    /// Owning class; its name is the assignment's subject.
    #[serde(default)]
    pub class_id: Option<String>,
    /// Students the assignment was handed to directly.
    #[serde(default)]
    pub assigned_to: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    /// Display only; grades are not normalized by it.
    #[serde(default)]
    pub max_grade: Option<f64>,
}

impl AssignmentRecord {
    /// Whether the assignment reaches the student directly or through one of
    /// their classes.
    pub fn is_attributable_to(&self, student: &StudentRecord) -> bool {
        self.assigned_to.iter().any(|id| id == &student.id)
            || self
                .class_id
                .as_ref()
                .is_some_and(|class_id| student.class_ids.contains(class_id))
    }

    pub fn falls_within(&self, period: &ReportPeriod) -> bool {
        period.contains(self.created_at) || period.contains(self.due_date)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    pub id: String,
    pub assignment_id: String,
    pub student_id: String,
    pub submitted_at: DateTime<Utc>,
    #[serde(default)]
    pub grade: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalStatus {
    Active,
    Completed,
    Abandoned,
}

impl fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GoalStatus::Active => write!(f, "active"),
            GoalStatus::Completed => write!(f, "completed"),
            GoalStatus::Abandoned => write!(f, "abandoned"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalRecord {
    pub id: String,
    pub student_id: String,
    pub title: String,
    pub status: GoalStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub target_date: Option<NaiveDate>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}
