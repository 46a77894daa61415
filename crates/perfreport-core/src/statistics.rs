//! Derived performance metrics.
//!
//! Everything here is pure: given the collected records, the report period and
//! "now", [`build_snapshot`] always yields the same snapshot. Percentages are
//! rounded half away from zero and clamped into `0..=100`; a zero
//! denominator yields 0.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};

use crate::error::ReportError;

use crate::model::{
    AssignmentRecord, ClassRecord, GoalRecord, GoalStatus, ReportPeriod, StudentRecord,
    SubmissionRecord, UserRecord,
};
use crate::snapshot::{
    AssignmentStatus, AssignmentSummary, GoalSummary, Insights, MonthlyProgress, Performance,
    PerformanceSnapshot, Statistics, StudentIdentity, SubjectStat, TeacherIdentity,
    GENERAL_SUBJECT, LIST_LIMIT, MONTHLY_WINDOW,
};

/// At or above this a metric counts as a strength.
pub const STRENGTH_THRESHOLD: u8 = 80;
/// Below this a metric counts as an area for improvement.
pub const IMPROVEMENT_THRESHOLD: u8 = 60;

/// Round and clamp a raw percentage. Non-finite input maps to 0.
pub fn clamp_percent(value: f64) -> u8 {
    if !value.is_finite() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}

/// `part / whole` as a clamped percentage.
pub fn percentage(part: u32, whole: u32) -> u8 {
    if whole == 0 {
        return 0;
    }
    clamp_percent(part as f64 / whole as f64 * 100.0)
}

/// Unweighted mean of raw grades, not normalized by `maxGrade`.
pub fn mean_grade(grades: &[f64]) -> u8 {
    if grades.is_empty() {
        return 0;
    }
    clamp_percent(grades.iter().sum::<f64>() / grades.len() as f64)
}

/// Rounded mean of already-rounded percentages.
pub fn composite(parts: &[u8]) -> u8 {
    if parts.is_empty() {
        return 0;
    }
    let sum: u32 = parts.iter().map(|&p| p as u32).sum();
    clamp_percent(sum as f64 / parts.len() as f64)
}

// ---------------------------------------------------------------------------
// Monthly windows
// ---------------------------------------------------------------------------

/// One calendar month, `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthWindow {
    pub label: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl MonthWindow {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at < self.end
    }
}

/// The six calendar months ending with the month of `now`, oldest first.
pub fn month_windows(now: DateTime<Utc>) -> Result<Vec<MonthWindow>, ReportError> {
    (0..MONTHLY_WINDOW as i32)
        .rev()
        .map(|back| {
            let (year, month) = shift_month(now.year(), now.month(), -back);
            let (next_year, next_month) = shift_month(year, month, 1);
            let start = first_of_month(year, month)?;
            Ok(MonthWindow {
                label: start.format("%b %Y").to_string(),
                start,
                end: first_of_month(next_year, next_month)?,
            })
        })
        .collect()
}

/// The six monthly entries with every value zeroed.
pub fn empty_monthly_progress(now: DateTime<Utc>) -> Result<Vec<MonthlyProgress>, ReportError> {
    Ok(month_windows(now)?
        .into_iter()
        .map(|window| MonthlyProgress {
            month: window.label,
            assignments_completed: 0,
            goals_achieved: 0,
            average_grade: 0,
        })
        .collect())
}

fn shift_month(year: i32, month: u32, delta: i32) -> (i32, u32) {
    let index = year * 12 + (month as i32 - 1) + delta;
    (index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
}

fn first_of_month(year: i32, month: u32) -> Result<DateTime<Utc>, ReportError> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|day| day.and_time(NaiveTime::MIN).and_utc())
        .ok_or_else(|| ReportError::validation(format!("month {year}-{month:02} is out of range")))
}

// ---------------------------------------------------------------------------
// Snapshot construction
// ---------------------------------------------------------------------------

/// Everything the aggregator read for one request.
#[derive(Debug, Clone)]
pub struct CollectedRecords {
    pub student: StudentRecord,
    pub viewer: UserRecord,
    pub classes: Vec<ClassRecord>,
    pub assignments: Vec<AssignmentRecord>,
    pub submissions: Vec<SubmissionRecord>,
    pub goals: Vec<GoalRecord>,
}

#[derive(Default)]
struct SubjectTally {
    total: u32,
    completed: u32,
    grades: Vec<f64>,
}

/// Compute the full snapshot from collected records.
///
/// Records are re-filtered here (attribution, period, ownership) so the
/// result does not depend on how strictly a store applied the query.
pub fn build_snapshot(
    records: &CollectedRecords,
    period: &ReportPeriod,
    now: DateTime<Utc>,
) -> Result<PerformanceSnapshot, ReportError> {
    let student = &records.student;
    let class_names: HashMap<&str, &str> = records
        .classes
        .iter()
        .filter(|c| !c.name.trim().is_empty())
        .map(|c| (c.id.as_str(), c.name.as_str()))
        .collect();
    let subject_of = |assignment: &AssignmentRecord| -> String {
        assignment
            .class_id
            .as_deref()
            .and_then(|id| class_names.get(id))
            .map(|name| name.to_string())
            .unwrap_or_else(|| GENERAL_SUBJECT.to_string())
    };

    let mut assignments: Vec<&AssignmentRecord> = records
        .assignments
        .iter()
        .filter(|a| a.is_attributable_to(student) && a.falls_within(period))
        .collect();
    assignments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    let mut seen = HashSet::new();
    assignments.retain(|a| seen.insert(a.id.as_str()));

    // Latest submission per assignment.
    let assignment_ids: HashSet<&str> = assignments.iter().map(|a| a.id.as_str()).collect();
    let mut latest: HashMap<&str, &SubmissionRecord> = HashMap::new();
    for submission in records.submissions.iter().filter(|s| {
        s.student_id == student.id && assignment_ids.contains(s.assignment_id.as_str())
    }) {
        latest
            .entry(submission.assignment_id.as_str())
            .and_modify(|current| {
                if (submission.submitted_at, &submission.id) > (current.submitted_at, &current.id) {
                    *current = submission;
                }
            })
            .or_insert(submission);
    }
    let grade_of = |a: &AssignmentRecord| latest.get(a.id.as_str()).and_then(|s| s.grade);

    let total = assignments.len() as u32;
    let submitted = latest.len() as u32;
    let grades: Vec<f64> = assignments.iter().filter_map(|&a| grade_of(a)).collect();
    let graded = grades.len() as u32;

    let mut goals: Vec<&GoalRecord> = records
        .goals
        .iter()
        .filter(|g| g.student_id == student.id)
        .collect();
    goals.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
    let total_goals = goals.len() as u32;
    let completed_goals = goals
        .iter()
        .filter(|g| g.status == GoalStatus::Completed)
        .count() as u32;

    let statistics = Statistics {
        total_assignments: total,
        submitted_assignments: submitted,
        graded_assignments: graded,
        pending_assignments: total.saturating_sub(submitted),
        total_goals,
        completed_goals,
    };

    let assignment_completion = percentage(submitted, total);
    let grading_rate = percentage(graded, submitted);
    let average_grade = mean_grade(&grades);
    let goals_progress = percentage(completed_goals, total_goals);
    let performance = Performance {
        assignment_completion,
        grading_rate,
        average_grade,
        goals_progress,
        overall_performance: composite(&[
            assignment_completion,
            grading_rate,
            average_grade,
            goals_progress,
        ]),
    };

    let mut tallies: BTreeMap<String, SubjectTally> = BTreeMap::new();
    for &assignment in &assignments {
        let tally = tallies.entry(subject_of(assignment)).or_default();
        tally.total += 1;
        if latest.contains_key(assignment.id.as_str()) {
            tally.completed += 1;
        }
        if let Some(grade) = grade_of(assignment) {
            tally.grades.push(grade);
        }
    }
    let mut subjects: Vec<SubjectStat> = tallies
        .into_iter()
        .map(|(name, tally)| SubjectStat {
            name,
            total_assignments: tally.total,
            completed_assignments: tally.completed,
            average_grade: mean_grade(&tally.grades),
        })
        .collect();
    if subjects.is_empty() {
        subjects.push(SubjectStat::general());
    }

    let monthly_progress = month_windows(now)?
        .into_iter()
        .map(|window| {
            let created_in: Vec<&AssignmentRecord> = assignments
                .iter()
                .copied()
                .filter(|a| window.contains(a.created_at))
                .collect();
            let completed = created_in
                .iter()
                .filter(|a| latest.contains_key(a.id.as_str()))
                .count() as u32;
            let month_grades: Vec<f64> = created_in.iter().filter_map(|&a| grade_of(a)).collect();
            let achieved = goals
                .iter()
                .filter(|g| {
                    g.status == GoalStatus::Completed
                        && g.completed_at.is_some_and(|at| window.contains(at))
                })
                .count() as u32;
            MonthlyProgress {
                month: window.label,
                assignments_completed: completed,
                goals_achieved: achieved,
                average_grade: mean_grade(&month_grades),
            }
        })
        .collect();

    let mut by_due = assignments.clone();
    by_due.sort_by(|a, b| b.due_date.cmp(&a.due_date).then_with(|| a.id.cmp(&b.id)));
    let recent_assignments = by_due
        .into_iter()
        .take(LIST_LIMIT)
        .map(|a| {
            let submission = latest.get(a.id.as_str());
            let status = match submission {
                Some(s) if s.grade.is_some() => AssignmentStatus::Graded,
                Some(_) => AssignmentStatus::Submitted,
                None if a.due_date < now => AssignmentStatus::Overdue,
                None => AssignmentStatus::Pending,
            };
            AssignmentSummary {
                id: a.id.clone(),
                title: a.title.clone(),
                subject: subject_of(a),
                due_date: a.due_date,
                status,
                grade: submission.and_then(|s| s.grade),
                max_grade: a.max_grade,
            }
        })
        .collect();

    let goal_summaries = goals
        .iter()
        .take(LIST_LIMIT)
        .map(|g| GoalSummary {
            id: g.id.clone(),
            title: g.title.clone(),
            status: g.status,
            target_date: g.target_date,
        })
        .collect();

    let class_name = student
        .class_ids
        .iter()
        .find_map(|id| class_names.get(id.as_str()))
        .map(|name| name.to_string());

    Ok(PerformanceSnapshot {
        student: StudentIdentity {
            id: student.id.clone(),
            first_name: student.first_name.clone(),
            last_name: student.last_name.clone(),
            email: student.email.clone(),
            class_name,
        },
        teacher: teacher_identity(&records.viewer),
        period: *period,
        performance,
        statistics,
        subjects,
        monthly_progress,
        recent_assignments,
        goals: goal_summaries,
        insights: derive_insights(&performance, &statistics),
        generated_at: now,
    })
}

pub fn teacher_identity(user: &UserRecord) -> TeacherIdentity {
    TeacherIdentity {
        id: user.id.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        email: user.email.clone(),
    }
}

// ---------------------------------------------------------------------------
// Insights
// ---------------------------------------------------------------------------

const MAINTENANCE_RECOMMENDATION: &str =
    "Keep the current study routine and set a new goal for the next period.";

/// Threshold rules over the derived metrics. Metrics without underlying data
/// (no assignments, no grades, no goals) are not judged.
pub fn derive_insights(performance: &Performance, statistics: &Statistics) -> Insights {
    let mut insights = Insights::default();

    if statistics.total_assignments > 0 {
        judge(
            &mut insights,
            performance.assignment_completion,
            |v| format!("Completes assignments consistently ({v}% submitted)"),
            |v| format!("Assignment completion is low ({v}% submitted)"),
            "Plan a weekly schedule for pending assignments and submit before the due date.",
        );
    }
    if statistics.graded_assignments > 0 {
        judge(
            &mut insights,
            performance.average_grade,
            |v| format!("Strong average grade ({v})"),
            |v| format!("Average grade is below target ({v})"),
            "Review graded feedback with the teacher and revisit the weakest topics.",
        );
    }
    if statistics.total_goals > 0 {
        judge(
            &mut insights,
            performance.goals_progress,
            |v| format!("Follows through on personal goals ({v}% completed)"),
            |v| format!("Few personal goals completed ({v}%)"),
            "Break goals into smaller milestones and check progress every week.",
        );
    }

    if insights.recommendations.is_empty() {
        insights
            .recommendations
            .push(MAINTENANCE_RECOMMENDATION.to_string());
    }
    insights
}

fn judge(
    insights: &mut Insights,
    value: u8,
    strength: impl FnOnce(u8) -> String,
    area: impl FnOnce(u8) -> String,
    recommendation: &str,
) {
    if value >= STRENGTH_THRESHOLD {
        insights.strengths.push(strength(value));
    } else if value < IMPROVEMENT_THRESHOLD {
        insights.areas_for_improvement.push(area(value));
        insights.recommendations.push(recommendation.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    use crate::model::UserRole;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn student() -> StudentRecord {
        StudentRecord {
            id: "stu".into(),
            first_name: "Elif".into(),
            last_name: "Kaya".into(),
            email: "elif@example.com".into(),
            class_ids: vec!["math".into()],
            teacher_ids: vec!["tch".into()],
            parent_ids: vec![],
        }
    }

    fn viewer() -> UserRecord {
        UserRecord {
            id: "tch".into(),
            first_name: "Ahmet".into(),
            last_name: "Demir".into(),
            email: "ahmet@example.com".into(),
            role: UserRole::Teacher,
        }
    }

    fn assignment(id: &str, class_id: Option<&str>, created: DateTime<Utc>) -> AssignmentRecord {
        AssignmentRecord {
            id: id.into(),
            title: format!("Assignment {id}"),
            class_id: class_id.map(String::from),
            assigned_to: vec!["stu".into()],
            created_at: created,
            due_date: created + chrono::Duration::days(7),
            max_grade: Some(100.0),
        }
    }

    fn submission(assignment_id: &str, grade: Option<f64>, at: DateTime<Utc>) -> SubmissionRecord {
        SubmissionRecord {
            id: format!("sub-{assignment_id}"),
            assignment_id: assignment_id.into(),
            student_id: "stu".into(),
            submitted_at: at,
            grade,
        }
    }

    fn period() -> ReportPeriod {
        ReportPeriod::new(
            NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
        )
        .unwrap()
    }

    fn now() -> DateTime<Utc> {
        at(2026, 10, 19)
    }

    /// 10 assignments, 8 submitted, 5 graded with grades summing to 400.
    fn reference_records() -> CollectedRecords {
        let assignments: Vec<_> = (0..10)
            .map(|i| assignment(&format!("a{i}"), Some("math"), at(2026, 9, 1 + i)))
            .collect();
        let grades = [70.0, 90.0, 80.0, 75.0, 85.0];
        let submissions = (0..8)
            .map(|i| {
                let grade = grades.get(i as usize).copied();
                submission(&format!("a{i}"), grade, at(2026, 9, 10 + i))
            })
            .collect();
        CollectedRecords {
            student: student(),
            viewer: viewer(),
            classes: vec![ClassRecord {
                id: "math".into(),
                name: "Mathematics".into(),
            }],
            assignments,
            submissions,
            goals: vec![],
        }
    }

    #[test]
    fn percentage_rounds_and_guards_zero() {
        assert_eq!(percentage(8, 10), 80);
        assert_eq!(percentage(5, 8), 63);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(3, 0), 0);
        assert_eq!(percentage(15, 10), 100);
    }

    #[test]
    fn clamp_handles_out_of_range_and_nan() {
        assert_eq!(clamp_percent(-12.0), 0);
        assert_eq!(clamp_percent(140.2), 100);
        assert_eq!(clamp_percent(f64::NAN), 0);
        assert_eq!(clamp_percent(f64::INFINITY), 0);
        assert_eq!(clamp_percent(49.5), 50);
    }

    #[test]
    fn mean_grade_is_unweighted() {
        assert_eq!(mean_grade(&[]), 0);
        assert_eq!(mean_grade(&[70.0, 90.0]), 80);
        // Raw grades above 100 (e.g. a max grade of 120) are clamped, not normalized.
        assert_eq!(mean_grade(&[120.0, 110.0]), 100);
    }

    #[test]
    fn reference_scenario_metrics() {
        let snapshot = build_snapshot(&reference_records(), &period(), now()).unwrap();
        assert_eq!(snapshot.statistics.total_assignments, 10);
        assert_eq!(snapshot.statistics.submitted_assignments, 8);
        assert_eq!(snapshot.statistics.graded_assignments, 5);
        assert_eq!(snapshot.statistics.pending_assignments, 2);
        assert_eq!(snapshot.performance.assignment_completion, 80);
        assert_eq!(snapshot.performance.grading_rate, 63);
        assert_eq!(snapshot.performance.average_grade, 80);
        assert_eq!(snapshot.performance.goals_progress, 0);
        // (80 + 63 + 80 + 0) / 4 = 55.75
        assert_eq!(snapshot.performance.overall_performance, 56);
    }

    #[test]
    fn subjects_group_by_class_name_with_general_fallback() {
        let mut records = reference_records();
        records
            .assignments
            .push(assignment("loose", None, at(2026, 10, 1)));
        records
            .assignments
            .push(assignment("orphan", Some("unknown-class"), at(2026, 10, 2)));

        let snapshot = build_snapshot(&records, &period(), now()).unwrap();
        let names: Vec<&str> = snapshot.subjects.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Genel", "Mathematics"]);

        let general = &snapshot.subjects[0];
        assert_eq!(general.total_assignments, 2);
        assert_eq!(general.completed_assignments, 0);

        let math = &snapshot.subjects[1];
        assert_eq!(math.total_assignments, 10);
        assert_eq!(math.completed_assignments, 8);
        assert_eq!(math.average_grade, 80);
    }

    #[test]
    fn no_assignments_yields_single_general_subject() {
        let mut records = reference_records();
        records.assignments.clear();
        records.submissions.clear();

        let snapshot = build_snapshot(&records, &period(), now()).unwrap();
        assert_eq!(snapshot.subjects, vec![SubjectStat::general()]);
        assert_eq!(snapshot.performance, Performance::default());
    }

    #[test]
    fn assignments_outside_period_or_not_attributable_are_ignored() {
        let mut records = reference_records();
        let mut old = assignment("old", Some("math"), at(2025, 1, 1));
        old.due_date = at(2025, 1, 8);
        records.assignments.push(old);
        let mut foreign = assignment("foreign", Some("history"), at(2026, 9, 15));
        foreign.assigned_to.clear();
        records.assignments.push(foreign);

        let snapshot = build_snapshot(&records, &period(), now()).unwrap();
        assert_eq!(snapshot.statistics.total_assignments, 10);
    }

    #[test]
    fn latest_submission_wins() {
        let mut records = reference_records();
        records.submissions.clear();
        records
            .submissions
            .push(submission("a0", Some(40.0), at(2026, 9, 2)));
        let mut resubmitted = submission("a0", Some(90.0), at(2026, 9, 5));
        resubmitted.id = "sub-a0-second".into();
        records.submissions.push(resubmitted);

        let snapshot = build_snapshot(&records, &period(), now()).unwrap();
        assert_eq!(snapshot.statistics.submitted_assignments, 1);
        assert_eq!(snapshot.performance.average_grade, 90);
    }

    #[test]
    fn monthly_windows_cross_year_boundary() {
        let windows = month_windows(at(2026, 2, 14)).unwrap();
        let labels: Vec<&str> = windows.iter().map(|w| w.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Sep 2025", "Oct 2025", "Nov 2025", "Dec 2025", "Jan 2026", "Feb 2026"]
        );
        for pair in windows.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
    }

    #[test]
    fn month_windows_past_the_calendar_end_are_errors() {
        let err = month_windows(DateTime::<Utc>::MAX_UTC).unwrap_err();
        assert!(matches!(err, ReportError::Validation(_)), "got {err:?}");
    }

    #[test]
    fn monthly_progress_counts_by_creation_month() {
        let snapshot = build_snapshot(&reference_records(), &period(), now()).unwrap();
        assert_eq!(snapshot.monthly_progress.len(), 6);
        assert_eq!(snapshot.monthly_progress[5].month, "Oct 2026");

        let september = &snapshot.monthly_progress[4];
        assert_eq!(september.month, "Sep 2026");
        assert_eq!(september.assignments_completed, 8);
        assert_eq!(september.average_grade, 80);

        let total_completed: u32 = snapshot
            .monthly_progress
            .iter()
            .map(|m| m.assignments_completed)
            .sum();
        assert_eq!(total_completed, 8);
    }

    #[test]
    fn goals_achieved_by_completion_month() {
        let mut records = reference_records();
        records.goals = vec![
            GoalRecord {
                id: "g1".into(),
                student_id: "stu".into(),
                title: "Read 5 books".into(),
                status: GoalStatus::Completed,
                created_at: at(2026, 6, 1),
                target_date: None,
                completed_at: Some(at(2026, 8, 20)),
            },
            GoalRecord {
                id: "g2".into(),
                student_id: "stu".into(),
                title: "Practice daily".into(),
                status: GoalStatus::Active,
                created_at: at(2026, 7, 1),
                target_date: NaiveDate::from_ymd_opt(2026, 12, 1),
                completed_at: None,
            },
        ];

        let snapshot = build_snapshot(&records, &period(), now()).unwrap();
        assert_eq!(snapshot.statistics.total_goals, 2);
        assert_eq!(snapshot.statistics.completed_goals, 1);
        assert_eq!(snapshot.performance.goals_progress, 50);
        let august = &snapshot.monthly_progress[3];
        assert_eq!(august.month, "Aug 2026");
        assert_eq!(august.goals_achieved, 1);
        // Newest goal first.
        assert_eq!(snapshot.goals[0].id, "g2");
    }

    #[test]
    fn recent_assignments_are_latest_due_first_and_capped() {
        let snapshot = build_snapshot(&reference_records(), &period(), now()).unwrap();
        assert_eq!(snapshot.recent_assignments.len(), LIST_LIMIT);
        let ids: Vec<&str> = snapshot
            .recent_assignments
            .iter()
            .map(|a| a.id.as_str())
            .collect();
        assert_eq!(ids, vec!["a9", "a8", "a7", "a6", "a5"]);
        // a9 and a8 were never submitted and their due dates have passed.
        assert_eq!(snapshot.recent_assignments[0].status, AssignmentStatus::Overdue);
        assert_eq!(snapshot.recent_assignments[2].status, AssignmentStatus::Submitted);
        assert_eq!(snapshot.recent_assignments[2].grade, None);
        assert_eq!(snapshot.recent_assignments[2].max_grade, Some(100.0));
    }

    #[test]
    fn insights_follow_thresholds() {
        let statistics = Statistics {
            total_assignments: 10,
            submitted_assignments: 9,
            graded_assignments: 5,
            pending_assignments: 1,
            total_goals: 4,
            completed_goals: 1,
        };
        let performance = Performance {
            assignment_completion: 90,
            grading_rate: 56,
            average_grade: 55,
            goals_progress: 70,
            overall_performance: 68,
        };
        let insights = derive_insights(&performance, &statistics);
        assert_eq!(insights.strengths.len(), 1);
        assert!(insights.strengths[0].contains("90%"));
        assert_eq!(insights.areas_for_improvement.len(), 1);
        assert!(insights.areas_for_improvement[0].contains("55"));
        assert_eq!(insights.recommendations.len(), 1);
    }

    #[test]
    fn insights_skip_metrics_without_data() {
        let insights = derive_insights(&Performance::default(), &Statistics::default());
        assert!(insights.strengths.is_empty());
        assert!(insights.areas_for_improvement.is_empty());
        assert_eq!(insights.recommendations, vec![MAINTENANCE_RECOMMENDATION]);
    }

    #[test]
    fn snapshot_is_deterministic() {
        let records = reference_records();
        let first = serde_json::to_string(&build_snapshot(&records, &period(), now()).unwrap()).unwrap();
        let second = serde_json::to_string(&build_snapshot(&records, &period(), now()).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn every_percentage_in_range() {
        let mut records = reference_records();
        for s in &mut records.submissions {
            s.grade = Some(250.0);
        }
        let snapshot = build_snapshot(&records, &period(), now()).unwrap();
        assert!(snapshot.percentages().iter().all(|&p| p <= 100));
        assert_eq!(snapshot.performance.average_grade, 100);
    }
}
