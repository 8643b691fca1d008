//! Report summaries and persistence.

mod common;

use campaign_qa::models::{FailureReason, QuestionCategory};
use campaign_qa::{validate, ValidationReport};
use common::sample_snapshot;

fn sample_report(target: f64) -> ValidationReport {
    let snap = sample_snapshot();
    let outcomes = vec![
        validate("What is our total spend?", "$4,000.00", &snap, 0.02),
        validate("What is our total revenue?", "$12,800", &snap, 0.02),
        validate("What is our overall ROAS?", "About 9.9x", &snap, 0.02),
        validate("What should I optimize?", "Try asking about ROAS.", &snap, 0.02),
    ];
    ValidationReport::from_outcomes(outcomes, target)
}

fn assert_same(loaded: &ValidationReport, report: &ValidationReport) {
    assert_eq!(loaded.generated_at, report.generated_at);
    assert_eq!(loaded.total, report.total);
    assert_eq!(loaded.passed, report.passed);
    assert_eq!(loaded.target_met, report.target_met);
    assert_eq!(loaded.failures_by_reason, report.failures_by_reason);
    assert_eq!(loaded.by_category, report.by_category);
    assert_eq!(loaded.outcomes.len(), report.outcomes.len());
    for (a, b) in loaded.outcomes.iter().zip(&report.outcomes) {
        assert_eq!(a.question, b.question);
        assert_eq!(a.passed, b.passed);
        assert_eq!(a.reason, b.reason);
        assert_eq!(a.scope, b.scope);
    }
}

#[test]
fn summary_counts() {
    let report = sample_report(0.5);
    assert_eq!(report.total, 4);
    assert_eq!(report.passed, 2);
    assert_eq!(report.failed, 2);
    assert_eq!(report.accuracy, 0.5);
    assert!(report.target_met);
    assert_eq!(report.failures_by_reason[&FailureReason::ToleranceExceeded], 1);
    assert_eq!(report.failures_by_reason[&FailureReason::FallbackResponse], 1);

    let basic = report.by_category[&QuestionCategory::BasicMetrics];
    assert_eq!((basic.passed, basic.total), (2, 3));
    assert_eq!(report.failures().count(), 2);
}

#[test]
fn target_not_met() {
    let report = sample_report(0.98);
    assert!(!report.target_met);
    let text = report.to_string();
    assert!(text.contains("2/4 passed"));
    assert!(text.contains("NOT MET"));
    assert!(text.contains("generic fallback response"));
}

#[test]
fn empty_run_never_meets_target() {
    let report = ValidationReport::from_outcomes(Vec::new(), 0.0);
    assert_eq!(report.total, 0);
    assert_eq!(report.accuracy, 0.0);
    assert!(!report.target_met);
}

#[test]
fn save_and_load_json() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("reports").join("run.json");
    let report = sample_report(0.98);
    report.save(&path).unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json["total"], 4);
    assert_eq!(json["failures_by_reason"]["tolerance_exceeded"], 1);
    assert_eq!(json["outcomes"].as_array().unwrap().len(), 4);

    assert_same(&ValidationReport::load(&path).unwrap(), &report);
}

#[test]
fn save_and_load_gzip() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("run.json.gz");
    let report = sample_report(0.5);
    report.save(&path).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[..2], &[0x1f, 0x8b]);
    assert_same(&ValidationReport::load(&path).unwrap(), &report);
}

#[test]
fn load_missing_file_fails() {
    let tmp = tempfile::tempdir().unwrap();
    assert!(ValidationReport::load(tmp.path().join("nope.json")).is_err());
}
