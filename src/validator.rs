//! Judge free-text answers against a [`MetricsSnapshot`].
//!
//! Every call returns a [`ValidationOutcome`]; malformed questions, empty
//! answers and failed fetches are reported in the outcome, never as errors.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config;
use crate::error::Result;
use crate::extract::{extract_number, is_fallback_response};
use crate::models::{FailureReason, KnownEntities, MetricsSnapshot, ValidationOutcome};
use crate::question::{QuestionResolver, RankSubject, Resolution};
use crate::tolerance::Tolerance;

// ---------------------------------------------------------------------------
// Answer / AnswerFetcher
// ---------------------------------------------------------------------------

/// A service answer: free text plus an optional structured value.
///
/// When `value` is present it is used instead of parsing `content`. It is
/// taken to be in the metric's own unit (a CTR of 4% is `0.04`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

impl Answer {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            value: None,
        }
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }
}

impl From<&str> for Answer {
    fn from(content: &str) -> Self {
        Answer::text(content)
    }
}

impl From<String> for Answer {
    fn from(content: String) -> Self {
        Answer::text(content)
    }
}

/// Anything that can answer a question: the HTTP client, a cache, or a
/// closure in tests.
pub trait AnswerFetcher {
    fn fetch(&self, question: &str) -> Result<Answer>;
}

impl<F> AnswerFetcher for F
where
    F: Fn(&str) -> Result<Answer>,
{
    fn fetch(&self, question: &str) -> Result<Answer> {
        self(question)
    }
}

// ---------------------------------------------------------------------------
// ResponseValidator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ResponseValidator {
    resolver: QuestionResolver,
    tolerance: Tolerance,
}

impl ResponseValidator {
    pub fn new(entities: &KnownEntities, tolerance: Tolerance) -> Self {
        Self {
            resolver: QuestionResolver::new(entities),
            tolerance,
        }
    }

    /// A validator that knows every platform and campaign in `snapshot`.
    pub fn for_snapshot(snapshot: &MetricsSnapshot, tolerance: Tolerance) -> Self {
        Self::new(&snapshot.known_entities(), tolerance)
    }

    pub fn tolerance(&self) -> &Tolerance {
        &self.tolerance
    }

    pub fn resolve(&self, question: &str) -> Resolution {
        self.resolver.resolve(question)
    }

    pub fn validate(
        &self,
        question: &str,
        answer: &Answer,
        snapshot: &MetricsSnapshot,
    ) -> ValidationOutcome {
        let resolution = self.resolver.resolve(question);
        let outcome = self.judge(question, answer, &resolution, snapshot);
        debug!(
            question,
            passed = outcome.passed,
            reason = ?outcome.reason,
            "validated answer"
        );
        outcome
    }

    /// Fetch and validate each question in turn. Fetch errors become
    /// [`FailureReason::RequestFailed`] outcomes.
    pub fn validate_all<I, Q, F>(
        &self,
        questions: I,
        fetcher: &F,
        snapshot: &MetricsSnapshot,
    ) -> Vec<ValidationOutcome>
    where
        I: IntoIterator<Item = Q>,
        Q: AsRef<str>,
        F: AnswerFetcher + ?Sized,
    {
        questions
            .into_iter()
            .map(|q| self.check(q.as_ref(), fetcher, snapshot))
            .collect()
    }

    /// Fetch one answer and validate it.
    pub fn check<F>(
        &self,
        question: &str,
        fetcher: &F,
        snapshot: &MetricsSnapshot,
    ) -> ValidationOutcome
    where
        F: AnswerFetcher + ?Sized,
    {
        match fetcher.fetch(question) {
            Ok(answer) => self.validate(question, &answer, snapshot),
            Err(e) => {
                let resolution = self.resolver.resolve(question);
                debug!(question, error = %e, "fetch failed");
                base_outcome(question, "", &resolution)
                    .fail(FailureReason::RequestFailed, e.to_string())
            }
        }
    }

    fn judge(
        &self,
        question: &str,
        answer: &Answer,
        resolution: &Resolution,
        snapshot: &MetricsSnapshot,
    ) -> ValidationOutcome {
        let text = answer.content.trim();
        let mut outcome = base_outcome(question, &answer.content, resolution);

        if text.is_empty() && answer.value.is_none() {
            return outcome.fail(FailureReason::EmptyAnswer, "answer text is empty");
        }
        // Checked before extraction: the help template lists example
        // questions that contain stray numbers.
        if is_fallback_response(text) {
            return outcome.fail(
                FailureReason::FallbackResponse,
                "answer is the generic help template",
            );
        }

        match resolution {
            Resolution::Unrecognized => outcome.fail(
                FailureReason::UnrecognizedQuestion,
                "question names no known metric or scope",
            ),
            Resolution::Comparative {
                subject,
                metric,
                order,
            } => {
                let leader = match subject {
                    RankSubject::Platforms => snapshot.rank_platforms_by(*metric, *order),
                    RankSubject::Campaigns => snapshot.rank_campaigns_by(*metric, *order),
                }
                .into_iter()
                .next();
                let note = match leader {
                    Some((name, value)) => {
                        let mentioned = text.to_lowercase().contains(&name.to_lowercase());
                        format!(
                            "{} {} is {} ({}){}",
                            order.label(),
                            metric,
                            name,
                            metric.kind().format(value),
                            if mentioned { ", named in answer" } else { ", not named in answer" }
                        )
                    }
                    None => "no ranked entities in snapshot".to_string(),
                };
                substantive(outcome, text, &note)
            }
            Resolution::OpenEnded { .. } => substantive(outcome, text, "open-ended question"),
            Resolution::Numeric { metric, scope } => {
                let kind = metric.kind();
                let Some(expected) = resolution.expected(snapshot) else {
                    return outcome.fail(
                        FailureReason::UnrecognizedQuestion,
                        format!("no data for {}", scope),
                    );
                };
                outcome.expected = Some(expected);

                let Some(actual) = answer.value.or_else(|| extract_number(text, kind)) else {
                    return outcome.fail(
                        FailureReason::NoNumericValue,
                        format!("no {} value found for {} ({})", kind.label(), metric, scope),
                    );
                };
                outcome.extracted = Some(actual);

                let mode = self.tolerance.for_kind(kind);
                let difference = mode.difference(actual, expected);
                outcome.difference = Some(difference);
                let summary = format!(
                    "{} {}: expected {}, got {} (diff {:.4})",
                    scope,
                    metric,
                    kind.format(expected),
                    kind.format(actual),
                    difference
                );
                if mode.accepts(actual, expected) {
                    outcome.pass(summary)
                } else {
                    outcome.fail(FailureReason::ToleranceExceeded, summary)
                }
            }
        }
    }
}

fn base_outcome(question: &str, answer: &str, resolution: &Resolution) -> ValidationOutcome {
    let mut outcome = ValidationOutcome::new(question, answer, resolution.category());
    match resolution {
        Resolution::Numeric { metric, scope } => {
            outcome.metric = Some(*metric);
            outcome.kind = Some(metric.kind());
            outcome.scope = Some(scope.clone());
        }
        Resolution::Comparative { metric, .. } => {
            outcome.metric = Some(*metric);
            outcome.kind = Some(metric.kind());
        }
        Resolution::OpenEnded { scope } => outcome.scope = Some(scope.clone()),
        Resolution::Unrecognized => {}
    }
    outcome
}

/// Qualitative answers pass when they are long enough and not an error echo.
fn substantive(outcome: ValidationOutcome, text: &str, note: &str) -> ValidationOutcome {
    if text.chars().count() <= config::MIN_SUBSTANTIVE_LEN {
        return outcome.fail(
            FailureReason::NotSubstantive,
            format!("answer too short; {}", note),
        );
    }
    if text.to_lowercase().starts_with("error") {
        return outcome.fail(
            FailureReason::NotSubstantive,
            format!("answer is an error message; {}", note),
        );
    }
    outcome.pass(format!("substantive answer; {}", note))
}

// ---------------------------------------------------------------------------
// Free-function surface
// ---------------------------------------------------------------------------

/// Validate one answer with a uniform tolerance (see [`Tolerance::uniform`]).
///
/// Entity names are taken from `snapshot`.
pub fn validate(
    question: &str,
    answer_text: &str,
    snapshot: &MetricsSnapshot,
    tolerance: f64,
) -> ValidationOutcome {
    ResponseValidator::for_snapshot(snapshot, Tolerance::uniform(tolerance)).validate(
        question,
        &Answer::text(answer_text),
        snapshot,
    )
}

/// Fetch and validate a batch of questions with a uniform tolerance.
pub fn validate_all<I, Q, F>(
    questions: I,
    fetcher: &F,
    snapshot: &MetricsSnapshot,
    tolerance: f64,
) -> Vec<ValidationOutcome>
where
    I: IntoIterator<Item = Q>,
    Q: AsRef<str>,
    F: AnswerFetcher + ?Sized,
{
    ResponseValidator::for_snapshot(snapshot, Tolerance::uniform(tolerance)).validate_all(
        questions, fetcher, snapshot,
    )
}
