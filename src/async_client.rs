//! Async wrapper around [`CampaignQa`] for use in async runtimes (Tokio, etc.).
//!
//! Runs every operation on the blocking thread pool via
//! [`tokio::task::spawn_blocking`], since loading, aggregation and the HTTP
//! client are all synchronous.
//!
//! # Example
//!
//! ```no_run
//! use campaign_qa::AsyncCampaignQa;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let qa = AsyncCampaignQa::builder()
//!         .csv_path("campaign_data.csv")
//!         .build()
//!         .await
//!         .unwrap();
//!
//!     // Run any sync method via closure
//!     let total = qa.run(|q| Ok(q.snapshot().overall.spend)).await.unwrap();
//!
//!     // Ask and judge a batch of questions
//!     let report = qa
//!         .validate_all(vec!["What is our total spend?".to_string()])
//!         .await
//!         .unwrap();
//! }
//! ```

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::{QaError, Result};
use crate::{CampaignQa, CampaignQaBuilder, RecordFilter, Tolerance, ValidationReport};

// ---------------------------------------------------------------------------
// AsyncCampaignQaBuilder
// ---------------------------------------------------------------------------

/// Builder for an [`AsyncCampaignQa`]. Mirrors [`CampaignQaBuilder`].
#[derive(Default)]
pub struct AsyncCampaignQaBuilder {
    inner: CampaignQaBuilder,
}

impl AsyncCampaignQaBuilder {
    pub fn csv_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.inner = self.inner.csv_path(path);
        self
    }

    pub fn filter(mut self, filter: RecordFilter) -> Self {
        self.inner = self.inner.filter(filter);
        self
    }

    pub fn endpoint(mut self, endpoint: &str) -> Self {
        self.inner = self.inner.endpoint(endpoint);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.inner = self.inner.timeout(timeout);
        self
    }

    pub fn cache_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.inner = self.inner.cache_dir(path);
        self
    }

    pub fn offline(mut self, offline: bool) -> Self {
        self.inner = self.inner.offline(offline);
        self
    }

    pub fn tolerance(mut self, tolerance: Tolerance) -> Self {
        self.inner = self.inner.tolerance(tolerance);
        self
    }

    /// Build on the blocking pool, so CSV loading won't stall the runtime.
    pub async fn build(self) -> Result<AsyncCampaignQa> {
        tokio::task::spawn_blocking(move || {
            let qa = self.inner.build()?;
            Ok(AsyncCampaignQa {
                inner: Arc::new(Mutex::new(qa)),
            })
        })
        .await
        .map_err(|e| QaError::InvalidArgument(format!("Task join error: {e}")))?
    }
}

// ---------------------------------------------------------------------------
// AsyncCampaignQa
// ---------------------------------------------------------------------------

/// Async wrapper around [`CampaignQa`].
///
/// The inner facade uses `RefCell` for its lazy HTTP client and cache, so it
/// sits behind a [`Mutex`] and each call holds the lock for its duration.
pub struct AsyncCampaignQa {
    inner: Arc<Mutex<CampaignQa>>,
}

impl AsyncCampaignQa {
    pub fn builder() -> AsyncCampaignQaBuilder {
        AsyncCampaignQaBuilder::default()
    }

    /// Wrap an already built facade.
    pub fn from_sync(qa: CampaignQa) -> Self {
        Self {
            inner: Arc::new(Mutex::new(qa)),
        }
    }

    /// Run a sync operation on the blocking thread pool.
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&CampaignQa) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let qa = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let guard = qa
                .lock()
                .map_err(|_| QaError::InvalidArgument("CampaignQa lock poisoned".into()))?;
            f(&guard)
        })
        .await
        .map_err(|e| QaError::InvalidArgument(format!("Task join error: {e}")))?
    }

    /// Ask and judge each question, then summarize.
    pub async fn validate_all(&self, questions: Vec<String>) -> Result<ValidationReport> {
        self.run(move |q| Ok(q.run_with(&questions, q.client()))).await
    }

    /// Drop every cached answer.
    pub async fn refresh(&self) -> Result<usize> {
        self.run(|q| q.refresh()).await
    }
}
