//! Shared test fixtures for the campaign QA integration tests.
//!
//! The sample data covers four platforms and three campaigns, including a
//! zero-spend platform (`Dv360`). Totals: spend 4,000, revenue 12,800,
//! impressions 200,000, clicks 4,000, conversions 200.

#![allow(dead_code)]

use campaign_qa::aggregate;
use campaign_qa::models::{MetricsSnapshot, PerformanceRecord};
use chrono::NaiveDate;
use std::io::Write;
use tempfile::NamedTempFile;

pub const SAMPLE_CSV: &str = "\
date,platform,campaign_name,spend,impressions,clicks,conversions,roas
2024-06-01,Meta,FreshNest Summer Grilling,1000.00,50000,1000,50,4.0
2024-06-02,Meta,FreshNest Back to School,500.00,20000,400,20,2.0
2024-06-01,Amazon,FreshNest Summer Grilling,800.00,40000,1200,60,3.5
2024-06-03,Amazon,FreshNest Holiday Feast,700.00,30000,600,35,5.0
2024-06-02,Dv360,FreshNest Back to School,0,5000,0,0,0
2024-06-03,Tradedesk,FreshNest Holiday Feast,1000.00,55000,800,35,1.5
";

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// The rows of [`SAMPLE_CSV`] as records.
pub fn sample_records() -> Vec<PerformanceRecord> {
    vec![
        PerformanceRecord::new(day(2024, 6, 1), "Meta", "FreshNest Summer Grilling", 1000.0, 50_000, 1_000, 50, 4.0),
        PerformanceRecord::new(day(2024, 6, 2), "Meta", "FreshNest Back to School", 500.0, 20_000, 400, 20, 2.0),
        PerformanceRecord::new(day(2024, 6, 1), "Amazon", "FreshNest Summer Grilling", 800.0, 40_000, 1_200, 60, 3.5),
        PerformanceRecord::new(day(2024, 6, 3), "Amazon", "FreshNest Holiday Feast", 700.0, 30_000, 600, 35, 5.0),
        PerformanceRecord::new(day(2024, 6, 2), "Dv360", "FreshNest Back to School", 0.0, 5_000, 0, 0, 0.0),
        PerformanceRecord::new(day(2024, 6, 3), "Tradedesk", "FreshNest Holiday Feast", 1000.0, 55_000, 800, 35, 1.5),
    ]
}

pub fn sample_snapshot() -> MetricsSnapshot {
    aggregate(&sample_records())
}

/// Write `contents` to a temporary `.csv` file.
///
/// The caller must keep the returned handle alive for as long as the file is
/// needed.
pub fn write_csv(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("campaign-")
        .suffix(".csv")
        .tempfile()
        .unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() <= 1e-9 * expected.abs().max(1.0),
        "expected {expected}, got {actual}"
    );
}
