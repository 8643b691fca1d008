//! Blocking HTTP client for the conversational analytics endpoint.
//!
//! Sends `{"query", "sessionId"}` as JSON and reads back
//! `{"content": ..., "data": {"value": ...}}`. When an [`AnswerCache`] is
//! attached, cached answers are served first and fresh ones are stored.

use crate::cache::AnswerCache;
use crate::config;
use crate::error::{QaError, Result};
use crate::validator::{Answer, AnswerFetcher};
use reqwest::blocking::Client;
use serde_json::{json, Value};
use std::cell::RefCell;
use std::time::Duration;
use tracing::{debug, warn};

pub struct QueryClient {
    endpoint: String,
    session_id: String,
    timeout: Duration,
    client: RefCell<Option<Client>>,
    cache: Option<RefCell<AnswerCache>>,
}

impl QueryClient {
    pub fn new(endpoint: &str, session_id: &str, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            session_id: session_id.to_string(),
            timeout,
            client: RefCell::new(None),
            cache: None,
        }
    }

    /// Client for the default endpoint and session.
    pub fn with_defaults() -> Self {
        Self::new(
            config::DEFAULT_ENDPOINT,
            config::DEFAULT_SESSION_ID,
            config::DEFAULT_TIMEOUT,
        )
    }

    /// Serve and store answers through `cache`.
    pub fn with_cache(mut self, cache: AnswerCache) -> Self {
        self.cache = Some(RefCell::new(cache));
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Whether only cached answers will be served.
    pub fn is_offline(&self) -> bool {
        self.cache.as_ref().is_some_and(|c| c.borrow().offline)
    }

    /// Number of cached answers (0 without a cache).
    pub fn cached_answers(&self) -> usize {
        self.cache.as_ref().map_or(0, |c| c.borrow().len())
    }

    /// Ask one question, from the cache when possible.
    pub fn ask(&self, question: &str) -> Result<Answer> {
        if let Some(cache) = &self.cache {
            if let Some(answer) = cache.borrow().lookup(question)? {
                debug!(question, "answer served from cache");
                return Ok(answer);
            }
        }

        let answer = self.post(question)?;
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.borrow_mut().insert(question, answer.clone()) {
                warn!(error = %e, "failed to persist answer cache");
            }
        }
        Ok(answer)
    }

    /// Drop all cached answers. Returns how many were removed.
    pub fn clear_cache(&self) -> Result<usize> {
        match &self.cache {
            Some(cache) => {
                let mut cache = cache.borrow_mut();
                let removed = cache.len();
                cache.clear()?;
                Ok(removed)
            }
            None => Ok(0),
        }
    }

    /// Lazy HTTP client, created on first use.
    fn http(&self) -> Result<Client> {
        let mut slot = self.client.borrow_mut();
        if let Some(client) = slot.as_ref() {
            return Ok(client.clone());
        }
        let client = Client::builder().timeout(self.timeout).build()?;
        *slot = Some(client.clone());
        Ok(client)
    }

    fn post(&self, question: &str) -> Result<Answer> {
        debug!(endpoint = %self.endpoint, question, "querying service");
        let body = json!({ "query": question, "sessionId": self.session_id });
        let resp = self
            .http()?
            .post(&self.endpoint)
            .json(&body)
            .send()?
            .error_for_status()?;
        let payload: Value = resp.json()?;
        parse_response(&payload)
    }
}

impl AnswerFetcher for QueryClient {
    fn fetch(&self, question: &str) -> Result<Answer> {
        self.ask(question)
    }
}

/// Turn a response body into an [`Answer`].
///
/// An `"error"` field is a service error. `data.value`, when numeric, rides
/// along as the structured value.
pub fn parse_response(payload: &Value) -> Result<Answer> {
    if let Some(err) = payload.get("error").filter(|e| !e.is_null()) {
        let message = err
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| err.to_string());
        return Err(QaError::Service(message));
    }
    let value = payload
        .get("data")
        .and_then(|d| d.get("value"))
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite());
    let content = payload.get("content").and_then(Value::as_str);

    match (content, value) {
        (None, None) => Err(QaError::Service(
            "response has neither content nor data.value".to_string(),
        )),
        (content, value) => Ok(Answer {
            content: content.unwrap_or_default().to_string(),
            value,
        }),
    }
}
