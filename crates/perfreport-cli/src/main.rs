//! perfreport CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "perfreport", version, about = "Student performance reports")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Arguments shared by the commands that build a report.
#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    /// Student to report on
    #[arg(long)]
    student: String,

    /// Teacher or parent requesting the report
    #[arg(long)]
    viewer: String,

    /// First day of the report period (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last day of the report period (YYYY-MM-DD, default: today)
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Read records from this dataset file instead of the configured source
    #[arg(long)]
    data: Option<PathBuf>,

    /// Config file path
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the performance snapshot as JSON
    Snapshot {
        #[command(flatten)]
        report: ReportArgs,

        /// Single-line JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,
    },

    /// Render the PDF report
    Render {
        #[command(flatten)]
        report: ReportArgs,

        /// Output directory (default: from config)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Check a dataset file for consistency
    Validate {
        /// Path to the dataset JSON file
        #[arg(long)]
        data: PathBuf,
    },

    /// Create starter config and sample dataset
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("perfreport=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Snapshot { report, compact } => commands::snapshot::execute(report, compact).await,
        Commands::Render { report, output } => commands::render::execute(report, output).await,
        Commands::Validate { data } => commands::validate::execute(data),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
