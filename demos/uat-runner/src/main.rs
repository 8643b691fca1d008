//! UAT runner: asks the generated question bank and writes a report.
//!
//! Exits non-zero when the run misses its accuracy target.

use anyhow::{Context, Result};
use campaign_qa::config::{
    DEFAULT_ENDPOINT, DEFAULT_PERCENTAGE_TOLERANCE, DEFAULT_TARGET_ACCURACY, DEFAULT_TOLERANCE,
};
use campaign_qa::models::MetricKind;
use campaign_qa::{CampaignQa, RecordFilter, Tolerance, ToleranceMode};
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "uat-runner", version, about = "Validate analytics answers against a campaign CSV")]
struct Args {
    /// Campaign CSV the answers should agree with
    #[arg(long, default_value = "campaign_data.csv")]
    csv: PathBuf,

    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Relative for currency and counts, absolute for ratios
    #[arg(long, default_value_t = DEFAULT_TOLERANCE)]
    tolerance: f64,

    /// Absolute window for percentages, as a fraction (0.001 = 0.1 points)
    #[arg(long, default_value_t = DEFAULT_PERCENTAGE_TOLERANCE)]
    percentage_tolerance: f64,

    /// Ask only this many questions, picked at random
    #[arg(long)]
    sample: Option<usize>,

    /// Seed for --sample
    #[arg(long)]
    seed: Option<u64>,

    /// Serve answers from the cache only
    #[arg(long)]
    offline: bool,

    #[arg(long)]
    no_cache: bool,

    /// Clear cached answers before running
    #[arg(long)]
    refresh: bool,

    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Only include these platforms (repeatable)
    #[arg(long)]
    platform: Vec<String>,

    /// Only include these campaigns (repeatable)
    #[arg(long)]
    campaign: Vec<String>,

    /// First day to include (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last day to include (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Report path; a .gz suffix compresses it
    #[arg(long, default_value = "uat_report.json")]
    report: PathBuf,

    /// Required share of passing questions
    #[arg(long, default_value_t = DEFAULT_TARGET_ACCURACY)]
    target: f64,

    /// HTTP timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    for (flag, value) in [
        ("--tolerance", args.tolerance),
        ("--percentage-tolerance", args.percentage_tolerance),
    ] {
        if !value.is_finite() || value < 0.0 {
            anyhow::bail!("{flag} must be a non-negative number");
        }
    }
    let tolerance = Tolerance::uniform(args.tolerance).with(
        MetricKind::Percentage,
        ToleranceMode::absolute(args.percentage_tolerance),
    );

    let filter = RecordFilter {
        date_from: args.from,
        date_to: args.to,
        platforms: args.platform.clone(),
        campaigns: args.campaign.clone(),
    };

    let mut builder = CampaignQa::builder()
        .csv_path(&args.csv)
        .filter(filter)
        .endpoint(&args.endpoint)
        .timeout(Duration::from_secs(args.timeout))
        .offline(args.offline)
        .no_cache(args.no_cache)
        .tolerance(tolerance)
        .target_accuracy(args.target);
    if let Some(dir) = &args.cache_dir {
        builder = builder.cache_dir(dir);
    }
    let qa = builder
        .build()
        .with_context(|| format!("failed to prepare QA run for {}", args.csv.display()))?;
    info!("{}", qa);

    if args.refresh {
        qa.refresh().context("failed to clear the answer cache")?;
    }

    let mut bank = qa.question_bank();
    if let Some(n) = args.sample {
        bank = bank.sample(n, args.seed);
    }
    info!(questions = bank.len(), "starting run");

    let report = qa.run(&bank);
    print!("{}", report);
    for failure in report.failures().take(20) {
        warn!(
            question = %failure.question,
            reason = ?failure.reason,
            "{}",
            failure.message
        );
    }

    report
        .save(&args.report)
        .with_context(|| format!("failed to write {}", args.report.display()))?;
    info!(path = %args.report.display(), "report written");

    if !report.target_met {
        std::process::exit(1);
    }
    Ok(())
}
