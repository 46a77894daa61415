//! The `perfreport init` command.

use std::path::Path;

use anyhow::Result;
use chrono::Utc;

use perfreport_sources::Dataset;

const CONFIG_FILE: &str = "perfreport.toml";
const DATA_FILE: &str = "perfreport-data.json";

pub fn execute() -> Result<()> {
    if Path::new(CONFIG_FILE).exists() {
        println!("{CONFIG_FILE} already exists, skipping.");
    } else {
        std::fs::write(CONFIG_FILE, SAMPLE_CONFIG)?;
        println!("Created {CONFIG_FILE}");
    }

    if Path::new(DATA_FILE).exists() {
        println!("{DATA_FILE} already exists, skipping.");
    } else {
        Dataset::sample(Utc::now()).save(Path::new(DATA_FILE))?;
        println!("Created {DATA_FILE}");
    }

    println!("\nNext steps:");
    println!("  1. Run: perfreport validate --data {DATA_FILE}");
    println!(
        "  2. Run: perfreport render --student 64b7f0c2a1e4d3b2c1a00001 --viewer 64b7f0c2a1e4d3b2c1a00002"
    );
    println!("  3. Point [source] in {CONFIG_FILE} at your school's API");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# perfreport configuration

max_attempts = 3
retry_delay_ms = 250
timeout_secs = 30
default_period_days = 90
output_dir = "./reports"

[source]
type = "dataset"
path = "perfreport-data.json"

# [source]
# type = "http"
# base_url = "https://school.example.com/api"
# api_token = "${PERFREPORT_API_TOKEN}"
"#;
