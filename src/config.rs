use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://marketing-data-app.vercel.app/api/ai/query";
pub const DEFAULT_SESSION_ID: &str = "qa_test";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Tolerance used when the caller does not pick one: 2% relative for
/// currency/count, 0.02 absolute for ratios.
pub const DEFAULT_TOLERANCE: f64 = 0.02;

/// Absolute window for percentages, as a fraction: 0.1 percentage points.
pub const DEFAULT_PERCENTAGE_TOLERANCE: f64 = 0.001;

/// Share of passing questions a run must reach to count as a pass.
pub const DEFAULT_TARGET_ACCURACY: f64 = 0.98;

/// Answers to qualitative questions shorter than this (after trimming) are
/// not considered substantive.
pub const MIN_SUBSTANTIVE_LEN: usize = 10;

/// Lowercased signatures of the service's generic help template.
pub const FALLBACK_PHRASES: &[&str] = &[
    "i understand you're asking about",
    "i can help you analyze your campaign data",
    "try asking about",
    "platform performance (e.g.,",
    "campaign metrics (e.g.,",
    "financial metrics (e.g.,",
    "comparative analysis (e.g.,",
    "executive summary (e.g.,",
    "optimization insights (e.g.,",
];

/// Columns every campaign CSV must carry.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "date",
    "platform",
    "campaign_name",
    "spend",
    "impressions",
    "clicks",
    "conversions",
    "roas",
];

/// Columns derived from the row when the CSV leaves them out.
pub const DERIVED_COLUMNS: &[&str] = &["ctr", "cpc", "cpm"];

pub const ANSWER_CACHE_FILE: &str = "answers.json";

pub fn default_cache_dir() -> PathBuf {
    if let Some(cache) = dirs::cache_dir() {
        cache.join("campaign-qa")
    } else {
        PathBuf::from(".campaign-qa-cache")
    }
}
