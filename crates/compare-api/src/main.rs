//! compare-api CLI
//!
//! Builds a deduplicated testcase corpus from traffic logs, replays it
//! against two HTTP endpoints and reports where their responses diverge.
//!
//! Usage:
//!   compare-api extract --logs logs/requests.jsonl
//!   compare-api run [--testcases artifacts/testcases.json] [--max N]
//!   compare-api from-logs --logs logs/requests.jsonl

use anyhow::{bail, Context};
use clap::{Args as ClapArgs, Parser, Subcommand};
use compare_api::config::TargetsInfo;
use compare_api::corpus::{load_testcases, save_testcases};
use compare_api::diff::BodyComparison;
use compare_api::logs::{load_logs, LogFormat};
use compare_api::{Config, CorpusBuilder, Executor, Report, RunResult, TestCase};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

// ANSI color codes
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

/// Logs probed when `--logs` is not given.
const DEFAULT_LOGS: &[&str] = &["logs/requests.jsonl", "logs/requests.json"];

/// Compare API responses across two endpoints from log-derived testcases
#[derive(Parser, Debug)]
#[command(name = "compare-api")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Debug-level logging (RUST_LOG still takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(ClapArgs, Debug)]
struct Common {
    /// Configuration file (defaults to config.yml / config.yaml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Traffic log file
    #[arg(short, long)]
    logs: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the testcase corpus from logs
    Extract {
        #[command(flatten)]
        common: Common,

        /// Where to write the testcases
        #[arg(short, long, default_value = "artifacts/testcases.json")]
        out: PathBuf,
    },

    /// Replay testcases against both targets
    Run {
        #[command(flatten)]
        common: Common,

        /// Testcases file (defaults to <artifacts>/testcases.json)
        #[arg(short, long)]
        testcases: Option<PathBuf>,

        /// Re-extract testcases from logs before running
        #[arg(long)]
        refresh_from_logs: bool,

        /// Output directory for artifacts
        #[arg(short, long, default_value = "artifacts")]
        artifacts: PathBuf,

        /// Only run the first N testcases
        #[arg(short, long)]
        max: Option<usize>,
    },

    /// Extract from logs, then run
    FromLogs {
        #[command(flatten)]
        common: Common,

        /// Output directory for artifacts
        #[arg(short, long, default_value = "artifacts")]
        artifacts: PathBuf,

        /// Only run the first N testcases
        #[arg(short, long)]
        max: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    match args.command {
        Command::Extract { common, out } => {
            let config = Config::load(common.config.as_deref())?;
            let cases = extract(&config, common.logs, None)?;
            save_testcases(&out, &cases)?;
            println!(
                "{GREEN}Extracted{RESET} {} testcases -> {}",
                cases.len(),
                out.display()
            );
        }
        Command::Run {
            common,
            testcases,
            refresh_from_logs,
            artifacts,
            max,
        } => {
            let config = Config::load(common.config.as_deref())?;
            let cases = if refresh_from_logs || (testcases.is_none() && common.logs.is_some()) {
                let cases = extract(&config, common.logs, max)?;
                save_testcases(&artifacts.join("testcases.json"), &cases)?;
                cases
            } else {
                let path = testcases.unwrap_or_else(|| artifacts.join("testcases.json"));
                if !path.exists() {
                    bail!(
                        "Testcases file not found: {}. Use --refresh-from-logs or run 'compare-api extract' first.",
                        path.display()
                    );
                }
                truncate(load_testcases(&path)?, max)
            };
            run(&config, cases, &artifacts).await?;
        }
        Command::FromLogs {
            common,
            artifacts,
            max,
        } => {
            let config = Config::load(common.config.as_deref())?;
            let cases = extract(&config, common.logs, max)?;
            save_testcases(&artifacts.join("testcases.json"), &cases)?;
            run(&config, cases, &artifacts).await?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn resolve_logs(logs: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    if let Some(path) = logs {
        return Ok(path);
    }
    DEFAULT_LOGS
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
        .with_context(|| {
            format!(
                "No logs file given and none of the defaults exist: {}",
                DEFAULT_LOGS.join(", ")
            )
        })
}

fn truncate(mut cases: Vec<TestCase>, max: Option<usize>) -> Vec<TestCase> {
    if let Some(max) = max.filter(|m| *m > 0) {
        cases.truncate(max);
    }
    cases
}

fn extract(
    config: &Config,
    logs: Option<PathBuf>,
    max: Option<usize>,
) -> anyhow::Result<Vec<TestCase>> {
    let path = resolve_logs(logs)?;
    let format = LogFormat::parse(&config.log_input.format)?;
    let records = load_logs(&path, format)?;
    info!("Read {} log records from {}", records.len(), path.display());
    Ok(truncate(CorpusBuilder::new(config).build(&records), max))
}

async fn run(config: &Config, cases: Vec<TestCase>, artifacts: &Path) -> anyhow::Result<()> {
    println!("{BOLD}{CYAN}compare-api{RESET}");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!(
        "Left:  {} ({})",
        config.targets.left.name, config.targets.left.base_url
    );
    println!(
        "Right: {} ({})",
        config.targets.right.name, config.targets.right.base_url
    );
    println!();

    let executor = Arc::new(Executor::new(config)?);
    let results = executor.run_all(cases).await;
    let report = Report::assemble(results, TargetsInfo::from(&config.targets));

    let results_path = artifacts.join("results.json");
    report.write(&results_path)?;

    print_summary(&report);
    println!("JSON:   {}", results_path.display());
    Ok(())
}

/// One-line reason a result did not compare equal.
fn describe(result: &RunResult) -> String {
    if let Some(error) = &result.error {
        return format!("error: {error}");
    }
    let Some(cmp) = &result.compare else {
        return "no comparison".to_string();
    };

    let mut reasons = Vec::new();
    if !cmp.status.equal {
        reasons.push(format!("status {} vs {}", cmp.status.left, cmp.status.right));
    }
    if !cmp.headers.equal {
        let keys: Vec<&str> = cmp.headers.diffs.iter().map(|d| d.key.as_str()).collect();
        reasons.push(format!("headers differ: {}", keys.join(", ")));
    }
    match &cmp.bodies {
        BodyComparison::Json { equal: false, diff, .. } => {
            let paths: Vec<&str> = diff.iter().take(3).map(|c| c.path.as_str()).collect();
            let more = diff.len().saturating_sub(paths.len());
            let suffix = if more > 0 { format!(" (+{more} more)") } else { String::new() };
            reasons.push(format!("json body differs at {}{suffix}", paths.join(", ")));
        }
        other if !other.equal() => reasons.push(format!("{} body differs", other.mode())),
        _ => {}
    }
    reasons.join("; ")
}

fn print_summary(report: &Report) {
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("{BOLD}Comparison Summary{RESET}");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("  Testcases: {}", report.summary.total);
    println!();
    println!("  {}Passed:  {}{}", GREEN, report.summary.passed, RESET);
    println!("  {}Failed:  {}{}", RED, report.summary.failed, RESET);
    println!();

    if report.summary.failed > 0 {
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        println!("{RED}Failure Details{RESET}");
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        for result in report.failures() {
            println!(
                "  {}FAIL{} #{} {} {}",
                RED, RESET, result.id, result.request.method, result.request.path
            );
            println!("       {DIM}{}{RESET}", describe(result));
        }
        println!();
    }

    if report.summary.total == 0 {
        println!("{YELLOW}Warning:{RESET} No testcases were run");
    } else if report.summary.failed == 0 {
        println!("{GREEN}All responses matched!{RESET}");
    } else {
        println!(
            "{}{} of {} testcase(s) differ. See details above.{}",
            RED, report.summary.failed, report.summary.total, RESET
        );
    }
}
