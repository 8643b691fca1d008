//! CampaignQa facade tests, run fully offline.

mod common;

use campaign_qa::models::FailureReason;
use campaign_qa::{Answer, AnswerCache, CampaignQa, QaError, RecordFilter};
use common::{sample_records, write_csv, SAMPLE_CSV};

const ENDPOINT: &str = "https://example.invalid/api/ai/query";

fn offline_qa(cache_dir: &std::path::Path) -> CampaignQa {
    CampaignQa::builder()
        .records(sample_records())
        .endpoint(ENDPOINT)
        .cache_dir(cache_dir)
        .offline(true)
        .build()
        .unwrap()
}

#[test]
fn build_from_csv() {
    let file = write_csv(SAMPLE_CSV);
    let tmp = tempfile::tempdir().unwrap();
    let qa = CampaignQa::builder()
        .csv_path(file.path())
        .cache_dir(tmp.path())
        .build()
        .unwrap();
    assert_eq!(qa.records().len(), 6);
    assert_eq!(qa.snapshot().overall.spend, 4000.0);
    assert!(qa.connection().is_some());

    let rows = qa
        .sql("SELECT COUNT(*) AS n FROM raw_records", &[])
        .unwrap();
    assert_eq!(rows[0]["n"], 6);
    assert!(qa.to_string().contains("records=6"));
}

#[test]
fn filter_applies_to_csv_and_records() {
    let file = write_csv(SAMPLE_CSV);
    let tmp = tempfile::tempdir().unwrap();
    let filter = RecordFilter::new().platform("Meta");

    let from_csv = CampaignQa::builder()
        .csv_path(file.path())
        .filter(filter.clone())
        .cache_dir(tmp.path())
        .build()
        .unwrap();
    let from_records = CampaignQa::builder()
        .records(sample_records())
        .filter(filter)
        .cache_dir(tmp.path())
        .build()
        .unwrap();
    assert_eq!(from_csv.snapshot(), from_records.snapshot());
    assert_eq!(from_csv.snapshot().platforms.len(), 1);
}

#[test]
fn builder_rejects_bad_configuration() {
    let tmp = tempfile::tempdir().unwrap();
    assert!(matches!(
        CampaignQa::builder().cache_dir(tmp.path()).build(),
        Err(QaError::InvalidArgument(_))
    ));
    assert!(matches!(
        CampaignQa::builder()
            .records(sample_records())
            .offline(true)
            .no_cache(true)
            .build(),
        Err(QaError::InvalidArgument(_))
    ));
    assert!(matches!(
        CampaignQa::builder()
            .records(sample_records())
            .cache_dir(tmp.path())
            .target_accuracy(1.5)
            .build(),
        Err(QaError::InvalidArgument(_))
    ));
}

#[test]
fn check_uses_cached_answers() {
    let tmp = tempfile::tempdir().unwrap();
    AnswerCache::new(Some(tmp.path().to_path_buf()), false, ENDPOINT)
        .unwrap()
        .insert("What is our total spend?", Answer::text("Total spend was $4,000.00"))
        .unwrap();

    let qa = offline_qa(tmp.path());
    let hit = qa.check("What is our total spend?");
    assert!(hit.passed, "{}", hit.message);

    let miss = qa.check("What is our total revenue?");
    assert_eq!(miss.reason, Some(FailureReason::RequestFailed));
}

#[test]
fn run_with_fetcher_builds_report() {
    let tmp = tempfile::tempdir().unwrap();
    let qa = offline_qa(tmp.path());
    let bank = qa.question_bank();
    let fallback = |_: &str| -> campaign_qa::Result<Answer> {
        Ok(Answer::text("I understand you're asking about that. Try asking about ROAS."))
    };
    let report = qa.run_with(&bank, &fallback);
    assert_eq!(report.total, bank.len());
    assert_eq!(report.passed, 0);
    assert_eq!(
        report.failures_by_reason[&FailureReason::FallbackResponse],
        bank.len()
    );
    assert!(!report.target_met);
}

#[test]
fn run_offline_with_empty_cache_fails_every_question() {
    let tmp = tempfile::tempdir().unwrap();
    let qa = offline_qa(tmp.path());
    let sample = qa.question_bank().sample(5, Some(1));
    let report = qa.run(&sample);
    assert_eq!(report.total, 5);
    assert_eq!(report.failures_by_reason[&FailureReason::RequestFailed], 5);
}

#[test]
fn refresh_clears_cached_answers() {
    let tmp = tempfile::tempdir().unwrap();
    AnswerCache::new(Some(tmp.path().to_path_buf()), false, ENDPOINT)
        .unwrap()
        .insert("q", Answer::text("a"))
        .unwrap();
    let qa = offline_qa(tmp.path());
    assert_eq!(qa.refresh().unwrap(), 1);
    assert_eq!(qa.client().cached_answers(), 0);
}

#[test]
fn records_only_facade_has_no_sql() {
    let tmp = tempfile::tempdir().unwrap();
    let qa = offline_qa(tmp.path());
    assert!(qa.connection().is_none());
    assert!(matches!(qa.sql("SELECT 1", &[]), Err(QaError::NotFound(_))));
}
