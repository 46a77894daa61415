use chrono::{Duration, NaiveDate, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use perfreport_core::model::{
    AssignmentRecord, ClassRecord, GoalRecord, GoalStatus, ReportPeriod, StudentRecord,
    SubmissionRecord, UserRecord, UserRole,
};
use perfreport_core::snapshot::{Performance, Statistics};
use perfreport_core::statistics::{build_snapshot, derive_insights, month_windows, CollectedRecords};

const STUDENT: &str = "64b7f0c2a1e4d3b2c1a00001";

fn make_records(assignments: u32) -> CollectedRecords {
    let base = Utc.with_ymd_and_hms(2026, 5, 1, 8, 0, 0).unwrap();
    let classes = ["math", "physics", "history", "literature"];

    CollectedRecords {
        student: StudentRecord {
            id: STUDENT.into(),
            first_name: "Bench".into(),
            last_name: "Student".into(),
            email: "bench@example.com".into(),
            class_ids: classes.iter().map(|c| c.to_string()).collect(),
            teacher_ids: vec![],
            parent_ids: vec![],
        },
        viewer: UserRecord {
            id: "64b7f0c2a1e4d3b2c1a00002".into(),
            first_name: "Bench".into(),
            last_name: "Teacher".into(),
            email: "teacher@example.com".into(),
            role: UserRole::Teacher,
        },
        classes: classes
            .iter()
            .map(|c| ClassRecord {
                id: c.to_string(),
                name: c.to_uppercase(),
            })
            .collect(),
        assignments: (0..assignments)
            .map(|i| AssignmentRecord {
                id: format!("a{i}"),
                title: format!("Assignment {i}"),
                class_id: Some(classes[i as usize % classes.len()].to_string()),
                assigned_to: vec![],
                created_at: base + Duration::hours(i as i64 * 6),
                due_date: base + Duration::hours(i as i64 * 6 + 72),
                max_grade: Some(100.0),
            })
            .collect(),
        submissions: (0..assignments)
            .filter(|i| i % 4 != 0)
            .map(|i| SubmissionRecord {
                id: format!("s{i}"),
                assignment_id: format!("a{i}"),
                student_id: STUDENT.into(),
                submitted_at: base + Duration::hours(i as i64 * 6 + 48),
                grade: (i % 3 != 0).then(|| 50.0 + (i % 50) as f64),
            })
            .collect(),
        goals: (0..20)
            .map(|i| GoalRecord {
                id: format!("g{i}"),
                student_id: STUDENT.into(),
                title: format!("Goal {i}"),
                status: if i % 2 == 0 { GoalStatus::Completed } else { GoalStatus::Active },
                created_at: base + Duration::days(i),
                target_date: None,
                completed_at: (i % 2 == 0).then(|| base + Duration::days(i + 10)),
            })
            .collect(),
    }
}

fn bench_build_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_snapshot");
    let period = ReportPeriod::new(
        NaiveDate::from_ymd_opt(2026, 5, 1).unwrap(),
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
    )
    .unwrap();
    let now = Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap();

    for size in [10, 100, 500] {
        let records = make_records(size);
        group.bench_function(format!("assignments={size}"), |b| {
            b.iter(|| build_snapshot(black_box(&records), black_box(&period), black_box(now)))
        });
    }

    group.finish();
}

fn bench_helpers(c: &mut Criterion) {
    let now = Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap();
    c.bench_function("month_windows", |b| b.iter(|| month_windows(black_box(now))));

    let performance = Performance {
        assignment_completion: 80,
        grading_rate: 63,
        average_grade: 80,
        goals_progress: 0,
        overall_performance: 56,
    };
    let statistics = Statistics {
        total_assignments: 10,
        submitted_assignments: 8,
        graded_assignments: 5,
        pending_assignments: 2,
        total_goals: 0,
        completed_goals: 0,
    };
    c.bench_function("derive_insights", |b| {
        b.iter(|| derive_insights(black_box(&performance), black_box(&statistics)))
    });
}

criterion_group!(benches, bench_build_snapshot, bench_helpers);
criterion_main!(benches);
