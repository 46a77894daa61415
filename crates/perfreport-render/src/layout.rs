//! Report layout: turns a snapshot into positioned lines.
//!
//! Sections always appear in the same order and every line, spacers
//! included, goes through the cursor so pagination stays uniform.

use perfreport_core::snapshot::{AssignmentSummary, PerformanceSnapshot};

use crate::cursor::{Document, LayoutConfig, RenderCursor, TextRun};
use crate::text::{pad_numeric, truncate_cell, wrap};

pub const REPORT_TITLE: &str = "Student Performance Report";
pub const PRODUCT_LABEL: &str = "perfreport - Student Performance Report";

const NUMERIC_WIDTH: usize = 5;

/// A table column at a fixed x offset relative to the left margin.
#[derive(Debug, Clone, Copy)]
struct Column {
    title: &'static str,
    x: f32,
    numeric: bool,
}

const fn text(title: &'static str, x: f32) -> Column {
    Column {
        title,
        x,
        numeric: false,
    }
}

const fn number(title: &'static str, x: f32) -> Column {
    Column {
        title,
        x,
        numeric: true,
    }
}

const SUBJECT_COLUMNS: [Column; 4] = [
    text("Subject", 0.0),
    number("Assignments", 150.0),
    number("Completed", 240.0),
    number("Avg grade", 330.0),
];

const MONTHLY_COLUMNS: [Column; 4] = [
    text("Month", 0.0),
    number("Completed", 150.0),
    number("Goals met", 240.0),
    number("Avg grade", 330.0),
];

const ASSIGNMENT_COLUMNS: [Column; 5] = [
    text("Title", 0.0),
    text("Subject", 100.0),
    text("Due", 200.0),
    text("Status", 280.0),
    number("Grade", 370.0),
];

const GOAL_COLUMNS: [Column; 3] = [
    text("Title", 0.0),
    text("Status", 150.0),
    text("Target", 240.0),
];

fn emit_table(cursor: &mut RenderCursor, columns: &[Column], rows: Vec<Vec<String>>) {
    let left = cursor.config().left_margin;
    cursor.emit_line(
        columns
            .iter()
            .map(|c| TextRun::bold(left + c.x, c.title))
            .collect(),
    );
    for row in rows {
        let runs = columns
            .iter()
            .zip(row)
            .map(|(column, cell)| {
                let cell = if column.numeric {
                    pad_numeric(cell, NUMERIC_WIDTH)
                } else {
                    truncate_cell(&cell)
                };
                TextRun::regular(left + column.x, cell)
            })
            .collect();
        cursor.emit_line(runs);
    }
}

fn emit_wrapped(cursor: &mut RenderCursor, bullet: &str) {
    let width = cursor.config().wrap_width;
    for (i, line) in wrap(bullet, width.saturating_sub(2)).into_iter().enumerate() {
        let prefix = if i == 0 { "- " } else { "  " };
        cursor.emit_text(format!("{prefix}{line}"));
    }
}

fn emit_bullets(cursor: &mut RenderCursor, heading: &str, items: &[String]) {
    cursor.emit_bold(heading);
    if items.is_empty() {
        cursor.emit_text("- None");
    }
    for item in items {
        emit_wrapped(cursor, item);
    }
}

fn format_grade(grade: f64) -> String {
    if grade.fract() == 0.0 {
        format!("{grade:.0}")
    } else {
        format!("{grade:.1}")
    }
}

fn assignment_grade(assignment: &AssignmentSummary) -> String {
    match (assignment.grade, assignment.max_grade) {
        (Some(grade), Some(max)) => format!("{}/{}", format_grade(grade), format_grade(max)),
        (Some(grade), None) => format_grade(grade),
        (None, _) => "-".to_string(),
    }
}

fn person(name: String, email: &str) -> String {
    let name = if name.is_empty() { "-".to_string() } else { name };
    if email.is_empty() {
        name
    } else {
        format!("{name} <{email}>")
    }
}

/// Lay out every section of the report and stamp the footers.
pub fn lay_out(snapshot: &PerformanceSnapshot, config: LayoutConfig) -> Document {
    let mut cursor = RenderCursor::new(config);

    cursor.emit_section(
        REPORT_TITLE,
        [
            format!(
                "Generated: {}",
                snapshot.generated_at.format("%Y-%m-%d %H:%M UTC")
            ),
            format!(
                "Period: {} to {}",
                snapshot.period.start.format("%Y-%m-%d"),
                snapshot.period.end.format("%Y-%m-%d")
            ),
        ],
    );
    cursor.emit_spacer();

    let student = &snapshot.student;
    cursor.emit_section(
        "Student & Teacher",
        [
            format!("Student: {}", person(student.full_name(), &student.email)),
            format!("Class: {}", student.class_name.as_deref().unwrap_or("-")),
            format!(
                "Teacher: {}",
                person(snapshot.teacher.full_name(), &snapshot.teacher.email)
            ),
        ],
    );
    cursor.emit_spacer();

    let p = &snapshot.performance;
    cursor.emit_section(
        "Performance Summary",
        [
            format!("Assignment completion: {}%", p.assignment_completion),
            format!("Grading rate: {}%", p.grading_rate),
            format!("Average grade: {}", p.average_grade),
            format!("Goals progress: {}%", p.goals_progress),
            format!("Overall performance: {}%", p.overall_performance),
        ],
    );
    cursor.emit_spacer();

    let s = &snapshot.statistics;
    cursor.emit_section(
        "Statistics",
        [
            format!("Total assignments: {}", s.total_assignments),
            format!("Submitted: {}", s.submitted_assignments),
            format!("Graded: {}", s.graded_assignments),
            format!("Pending: {}", s.pending_assignments),
            format!("Goals: {} ({} completed)", s.total_goals, s.completed_goals),
        ],
    );
    cursor.emit_spacer();

    cursor.emit_bold("Subjects");
    emit_table(
        &mut cursor,
        &SUBJECT_COLUMNS,
        snapshot
            .subjects
            .iter()
            .map(|subject| {
                vec![
                    subject.name.clone(),
                    subject.total_assignments.to_string(),
                    subject.completed_assignments.to_string(),
                    subject.average_grade.to_string(),
                ]
            })
            .collect(),
    );
    cursor.emit_spacer();

    cursor.emit_bold("Monthly Progress");
    emit_table(
        &mut cursor,
        &MONTHLY_COLUMNS,
        snapshot
            .monthly_progress
            .iter()
            .map(|month| {
                vec![
                    month.month.clone(),
                    month.assignments_completed.to_string(),
                    month.goals_achieved.to_string(),
                    month.average_grade.to_string(),
                ]
            })
            .collect(),
    );
    cursor.emit_spacer();

    cursor.emit_bold("Recent Assignments");
    if snapshot.recent_assignments.is_empty() {
        cursor.emit_text("No assignments in this period.");
    } else {
        emit_table(
            &mut cursor,
            &ASSIGNMENT_COLUMNS,
            snapshot
                .recent_assignments
                .iter()
                .map(|a| {
                    vec![
                        a.title.clone(),
                        a.subject.clone(),
                        a.due_date.format("%Y-%m-%d").to_string(),
                        a.status.label().to_string(),
                        assignment_grade(a),
                    ]
                })
                .collect(),
        );
    }
    cursor.emit_spacer();

    cursor.emit_bold("Goals");
    if snapshot.goals.is_empty() {
        cursor.emit_text("No goals recorded.");
    } else {
        emit_table(
            &mut cursor,
            &GOAL_COLUMNS,
            snapshot
                .goals
                .iter()
                .map(|g| {
                    vec![
                        g.title.clone(),
                        g.status.to_string(),
                        g.target_date
                            .map(|d| d.format("%Y-%m-%d").to_string())
                            .unwrap_or_else(|| "-".to_string()),
                    ]
                })
                .collect(),
        );
    }
    cursor.emit_spacer();

    cursor.emit_bold("Insights");
    let insights = &snapshot.insights;
    emit_bullets(&mut cursor, "Strengths", &insights.strengths);
    emit_bullets(&mut cursor, "Areas for improvement", &insights.areas_for_improvement);
    emit_bullets(&mut cursor, "Recommendations", &insights.recommendations);

    let title = match student.full_name() {
        name if name.is_empty() => REPORT_TITLE.to_string(),
        name => format!("{REPORT_TITLE} - {name}"),
    };
    cursor.finish(title, PRODUCT_LABEL)
}
