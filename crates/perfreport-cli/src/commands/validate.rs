//! The `perfreport validate` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use perfreport_sources::Dataset;

pub fn execute(data: PathBuf) -> Result<()> {
    let dataset = Dataset::load(&data)?;

    println!("Dataset: {}", data.display());
    let mut table = Table::new();
    table.set_header(vec!["Collection", "Records"]);
    for (name, count) in [
        ("students", dataset.students.len()),
        ("users", dataset.users.len()),
        ("classes", dataset.classes.len()),
        ("assignments", dataset.assignments.len()),
        ("submissions", dataset.submissions.len()),
        ("goals", dataset.goals.len()),
    ] {
        table.add_row(vec![Cell::new(name), Cell::new(count)]);
    }
    println!("{table}");

    let issues = dataset.check();
    for issue in &issues {
        println!("  [{}:{}] WARNING: {}", issue.collection, issue.id, issue.message);
    }

    if issues.is_empty() {
        println!("Dataset valid.");
        Ok(())
    } else {
        anyhow::bail!("{} issue(s) found in {}", issues.len(), data.display())
    }
}
