//! Campaign QA for Rust.
//!
//! Validates free-text answers from a conversational analytics service
//! against figures computed from the campaign CSV they are meant to describe.
//! The CSV is loaded through DuckDB, aggregated once into a
//! [`MetricsSnapshot`](models::MetricsSnapshot), and every answer is judged
//! against that snapshot with a per-kind tolerance.
//!
//! # Quick start
//!
//! ```no_run
//! use campaign_qa::CampaignQa;
//!
//! let qa = CampaignQa::builder()
//!     .csv_path("campaign_data.csv")
//!     .build()
//!     .unwrap();
//!
//! // One question against the live service
//! let outcome = qa.check("What is our total spend?");
//! println!("{}: {}", outcome.passed, outcome.message);
//!
//! // A seeded sample of the generated question bank
//! let report = qa.run(&qa.question_bank().sample(25, Some(7)));
//! println!("{report}");
//! ```
//!
//! The core is available without any I/O:
//!
//! ```
//! use campaign_qa::{aggregate, validate, models::PerformanceRecord};
//! use chrono::NaiveDate;
//!
//! let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
//! let records = vec![
//!     PerformanceRecord::new(day, "Meta", "Summer Grilling", 1000.0, 50_000, 1_000, 50, 4.0),
//!     PerformanceRecord::new(day, "Amazon", "Summer Grilling", 500.0, 25_000, 500, 20, 3.0),
//! ];
//! let snapshot = aggregate(&records);
//! let outcome = validate("What is our total spend?", "Total spend was $1,500.00", &snapshot, 0.02);
//! assert!(outcome.passed);
//! ```

pub mod aggregate;
#[cfg(feature = "async")]
pub mod async_client;
pub mod cache;
pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod extract;
pub mod models;
pub mod question;
pub mod questions;
pub mod report;
pub mod sql_builder;
pub mod tolerance;
pub mod validator;

pub use aggregate::aggregate;
#[cfg(feature = "async")]
pub use async_client::AsyncCampaignQa;
pub use cache::AnswerCache;
pub use client::QueryClient;
pub use connection::{Connection, RecordFilter};
pub use error::{QaError, Result};
pub use questions::{Question, QuestionBank};
pub use report::ValidationReport;
pub use sql_builder::SqlBuilder;
pub use tolerance::{Tolerance, ToleranceMode};
pub use validator::{validate, validate_all, Answer, AnswerFetcher, ResponseValidator};

use models::{MetricsSnapshot, PerformanceRecord, ValidationOutcome};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

// ---------------------------------------------------------------------------
// CampaignQaBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`CampaignQa`] instance.
///
/// Use [`CampaignQa::builder()`] to obtain a builder, chain configuration
/// methods, and call [`build()`](CampaignQaBuilder::build).
pub struct CampaignQaBuilder {
    csv_path: Option<PathBuf>,
    records: Option<Vec<PerformanceRecord>>,
    filter: RecordFilter,
    endpoint: String,
    session_id: String,
    timeout: Duration,
    cache_dir: Option<PathBuf>,
    offline: bool,
    no_cache: bool,
    tolerance: Tolerance,
    target_accuracy: f64,
}

impl Default for CampaignQaBuilder {
    fn default() -> Self {
        Self {
            csv_path: None,
            records: None,
            filter: RecordFilter::default(),
            endpoint: config::DEFAULT_ENDPOINT.to_string(),
            session_id: config::DEFAULT_SESSION_ID.to_string(),
            timeout: config::DEFAULT_TIMEOUT,
            cache_dir: None,
            offline: false,
            no_cache: false,
            tolerance: Tolerance::default(),
            target_accuracy: config::DEFAULT_TARGET_ACCURACY,
        }
    }
}

impl CampaignQaBuilder {
    /// CSV file holding the campaign records.
    pub fn csv_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.csv_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Use records already in memory instead of a CSV.
    ///
    /// Ignored when a CSV path is also set.
    pub fn records(mut self, records: Vec<PerformanceRecord>) -> Self {
        self.records = Some(records);
        self
    }

    /// Restrict which records enter the snapshot.
    pub fn filter(mut self, filter: RecordFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Query endpoint. Defaults to [`config::DEFAULT_ENDPOINT`].
    pub fn endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    pub fn session_id(mut self, session_id: &str) -> Self {
        self.session_id = session_id.to_string();
        self
    }

    /// HTTP request timeout. Defaults to 30 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom answer cache directory.
    ///
    /// If not set, the platform-appropriate default cache directory is used
    /// (e.g. `~/.cache/campaign-qa` on Linux).
    pub fn cache_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.cache_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Serve only cached answers; a question never seen before is an error.
    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    /// Always hit the service and never write the answer cache.
    pub fn no_cache(mut self, no_cache: bool) -> Self {
        self.no_cache = no_cache;
        self
    }

    pub fn tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Share of passing questions a run needs. Defaults to 0.98.
    pub fn target_accuracy(mut self, target: f64) -> Self {
        self.target_accuracy = target;
        self
    }

    /// Load and aggregate the records and set up the client.
    ///
    /// No network traffic happens here; questions are sent lazily.
    pub fn build(self) -> Result<CampaignQa> {
        if self.offline && self.no_cache {
            return Err(QaError::InvalidArgument(
                "offline mode needs the answer cache".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.target_accuracy) {
            return Err(QaError::InvalidArgument(format!(
                "target accuracy {} is outside [0, 1]",
                self.target_accuracy
            )));
        }

        let (conn, records) = match (self.csv_path, self.records) {
            (Some(path), _) => {
                let conn = Connection::open_in_memory()?;
                conn.load_csv(&path)?;
                let records = conn.records(&self.filter)?;
                (Some(conn), records)
            }
            (None, Some(records)) => {
                let records = records
                    .into_iter()
                    .filter(|r| self.filter.matches(r))
                    .collect();
                (None, records)
            }
            (None, None) => {
                return Err(QaError::InvalidArgument(
                    "either a CSV path or records must be provided".to_string(),
                ))
            }
        };

        let snapshot = aggregate(&records);
        let validator = ResponseValidator::for_snapshot(&snapshot, self.tolerance);

        let mut client = QueryClient::new(&self.endpoint, &self.session_id, self.timeout);
        if !self.no_cache {
            client = client.with_cache(AnswerCache::new(
                self.cache_dir,
                self.offline,
                &self.endpoint,
            )?);
        }

        info!(
            records = records.len(),
            platforms = snapshot.platforms.len(),
            campaigns = snapshot.campaigns.len(),
            "campaign QA ready"
        );
        Ok(CampaignQa {
            conn,
            records,
            snapshot,
            validator,
            client,
            target_accuracy: self.target_accuracy,
        })
    }
}

// ---------------------------------------------------------------------------
// CampaignQa
// ---------------------------------------------------------------------------

/// The main entry point: a loaded snapshot plus a client to question.
///
/// Created via [`CampaignQa::builder()`].
pub struct CampaignQa {
    conn: Option<Connection>,
    records: Vec<PerformanceRecord>,
    snapshot: MetricsSnapshot,
    validator: ResponseValidator,
    client: QueryClient,
    target_accuracy: f64,
}

impl CampaignQa {
    pub fn builder() -> CampaignQaBuilder {
        CampaignQaBuilder::default()
    }

    pub fn records(&self) -> &[PerformanceRecord] {
        &self.records
    }

    /// Expected figures every answer is judged against.
    pub fn snapshot(&self) -> &MetricsSnapshot {
        &self.snapshot
    }

    pub fn validator(&self) -> &ResponseValidator {
        &self.validator
    }

    pub fn client(&self) -> &QueryClient {
        &self.client
    }

    /// The DuckDB connection, when records came from a CSV.
    pub fn connection(&self) -> Option<&Connection> {
        self.conn.as_ref()
    }

    pub fn target_accuracy(&self) -> f64 {
        self.target_accuracy
    }

    /// Every generated question for the loaded platforms and campaigns.
    pub fn question_bank(&self) -> QuestionBank {
        QuestionBank::generate(&self.snapshot.known_entities())
    }

    /// Ask the service (or the cache) one question.
    pub fn ask(&self, question: &str) -> Result<Answer> {
        self.client.ask(question)
    }

    /// Judge an answer obtained elsewhere.
    pub fn validate(&self, question: &str, answer: &Answer) -> ValidationOutcome {
        self.validator.validate(question, answer, &self.snapshot)
    }

    /// Ask one question and judge the answer.
    pub fn check(&self, question: &str) -> ValidationOutcome {
        self.validator.check(question, &self.client, &self.snapshot)
    }

    /// Ask every question and summarize the run.
    pub fn run<'q, I>(&self, questions: I) -> ValidationReport
    where
        I: IntoIterator<Item = &'q Question>,
    {
        self.run_with(questions, &self.client)
    }

    /// Like [`run`](Self::run), with answers from `fetcher` instead of the
    /// configured client.
    pub fn run_with<I, Q, F>(&self, questions: I, fetcher: &F) -> ValidationReport
    where
        I: IntoIterator<Item = Q>,
        Q: AsRef<str>,
        F: AnswerFetcher + ?Sized,
    {
        let outcomes = self
            .validator
            .validate_all(questions, fetcher, &self.snapshot);
        let report = ValidationReport::from_outcomes(outcomes, self.target_accuracy);
        info!(
            total = report.total,
            passed = report.passed,
            accuracy = report.accuracy,
            target_met = report.target_met,
            "validation run finished"
        );
        report
    }

    /// Execute raw SQL against the loaded CSV table.
    pub fn sql(
        &self,
        query: &str,
        params: &[String],
    ) -> Result<Vec<HashMap<String, serde_json::Value>>> {
        match &self.conn {
            Some(conn) => conn.execute(query, params),
            None => Err(QaError::NotFound(
                "records were not loaded from a CSV".to_string(),
            )),
        }
    }

    /// Drop every cached answer so the next run asks the service afresh.
    ///
    /// Returns the number of answers removed.
    pub fn refresh(&self) -> Result<usize> {
        let removed = self.client.clear_cache()?;
        info!(removed, "answer cache refreshed");
        Ok(removed)
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for CampaignQa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CampaignQa(records={}, platforms={}, campaigns={}, endpoint={}, offline={})",
            self.records.len(),
            self.snapshot.platforms.len(),
            self.snapshot.campaigns.len(),
            self.client.endpoint(),
            self.client.is_offline()
        )
    }
}
