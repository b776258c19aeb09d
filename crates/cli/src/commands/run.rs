//! Suite execution and reporting

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use qarelay_common::{FrameworkConfig, Platform};
use qarelay_report::AggregateReport;
use qarelay_runner::{SuiteRunner, TestSuite};

use crate::commands::report::route_record;

#[derive(Args)]
pub struct RunArgs {
    /// Suite file or directory of suites to execute
    #[arg(default_value = "suites")]
    pub suite: PathBuf,

    /// Run a single `Group` or `Group.case` selector
    #[arg(short, long)]
    pub test: Option<String>,

    /// Override the configured target platform
    #[arg(short, long)]
    pub platform: Option<Platform>,

    /// Where to write the run record
    #[arg(short, long, default_value = "test-results/latest.json")]
    pub output: PathBuf,

    /// Skip all reporting sinks
    #[arg(long)]
    pub no_report: bool,
}

pub async fn execute(args: RunArgs, config_path: &Path) -> Result<()> {
    let mut config = FrameworkConfig::load(config_path)?;
    if let Some(platform) = args.platform {
        config.platform = platform;
    }

    let suite = load_suite(&args.suite, args.test.as_deref())?;

    let runner = SuiteRunner::new(&config);
    let record = runner.run(&suite).await?;
    record.save(&args.output)?;

    let report = AggregateReport::from_results(&record.results);
    print_summary(&report);

    if !args.no_report {
        route_record(&config, &record, &report).await?;
    }

    if report.failed > 0 {
        std::process::exit(1);
    }

    Ok(())
}

/// Load one suite file, or merge every suite below a directory into a
/// single run the way a full regression sweep executes
fn load_suite(path: &Path, selector: Option<&str>) -> Result<TestSuite> {
    let mut suite = if path.is_dir() {
        let mut suites = TestSuite::load_all(path)?;
        if suites.is_empty() {
            anyhow::bail!("No suite files found under {}", path.display());
        }

        if suites.len() == 1 {
            suites.remove(0)
        } else {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "all".to_string());
            let groups = suites.iter_mut().flat_map(|s| s.groups.drain(..)).collect();
            TestSuite {
                name,
                description: String::new(),
                groups,
            }
        }
    } else {
        TestSuite::from_file(path)?
    };

    if let Some(selector) = selector {
        suite = suite.select(selector)?;
    }

    Ok(suite)
}

fn print_summary(report: &AggregateReport) {
    println!();
    println!("{}", "Run Summary".bold());
    println!("  Total:  {}", report.total);
    println!(
        "  Passed: {} ({})",
        report.passed.to_string().green(),
        report.passed_percentage
    );
    if report.failed > 0 {
        println!(
            "  Failed: {} ({})",
            report.failed.to_string().red(),
            report.failed_percentage
        );
    }
}
