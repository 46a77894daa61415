//! Download file names for rendered reports.

use perfreport_core::snapshot::PerformanceSnapshot;

use crate::text::slugify;

/// `performance-report-<first>-<last>-<YYYY-MM-DD>.pdf`, lowercase ASCII.
/// Name parts that slugify to nothing are dropped; with no usable name the
/// student part reads `student`.
pub fn report_file_name(snapshot: &PerformanceSnapshot) -> String {
    let parts: Vec<String> = [&snapshot.student.first_name, &snapshot.student.last_name]
        .into_iter()
        .map(|part| slugify(part))
        .filter(|slug| !slug.is_empty())
        .collect();
    let name = if parts.is_empty() {
        "student".to_string()
    } else {
        parts.join("-")
    };
    format!(
        "performance-report-{name}-{}.pdf",
        snapshot.generated_at.format("%Y-%m-%d")
    )
}
