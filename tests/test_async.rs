//! AsyncCampaignQa tests (requires the `async` feature).

#![cfg(feature = "async")]

mod common;

use campaign_qa::models::FailureReason;
use campaign_qa::{AsyncCampaignQa, CampaignQa};
use common::{sample_records, write_csv, SAMPLE_CSV};

#[tokio::test]
async fn build_and_run_closure() {
    let file = write_csv(SAMPLE_CSV);
    let tmp = tempfile::tempdir().unwrap();
    let qa = AsyncCampaignQa::builder()
        .csv_path(file.path())
        .cache_dir(tmp.path())
        .offline(true)
        .build()
        .await
        .unwrap();

    let spend = qa.run(|q| Ok(q.snapshot().overall.spend)).await.unwrap();
    assert_eq!(spend, 4000.0);
}

#[tokio::test]
async fn validate_all_offline_reports_request_failures() {
    let tmp = tempfile::tempdir().unwrap();
    let sync = CampaignQa::builder()
        .records(sample_records())
        .cache_dir(tmp.path())
        .offline(true)
        .build()
        .unwrap();
    let qa = AsyncCampaignQa::from_sync(sync);

    let report = qa
        .validate_all(vec!["What is our total spend?".to_string()])
        .await
        .unwrap();
    assert_eq!(report.total, 1);
    assert_eq!(
        report.failures_by_reason[&FailureReason::RequestFailed],
        1
    );
    assert_eq!(qa.refresh().await.unwrap(), 0);
}
