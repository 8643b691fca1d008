use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Metric — What a question asks about
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Spend,
    Revenue,
    Impressions,
    Clicks,
    Conversions,
    Ctr,
    Roas,
    Cpc,
    Cpm,
    Cpa,
    PlatformCount,
    CampaignCount,
}

impl Metric {
    /// Every metric, in display order.
    pub const ALL: [Metric; 12] = [
        Metric::Spend,
        Metric::Revenue,
        Metric::Impressions,
        Metric::Clicks,
        Metric::Conversions,
        Metric::Ctr,
        Metric::Roas,
        Metric::Cpc,
        Metric::Cpm,
        Metric::Cpa,
        Metric::PlatformCount,
        Metric::CampaignCount,
    ];

    /// How the metric is written in free text, which decides how it is parsed.
    pub fn kind(self) -> MetricKind {
        match self {
            Metric::Spend | Metric::Revenue | Metric::Cpc | Metric::Cpm | Metric::Cpa => {
                MetricKind::Currency
            }
            Metric::Ctr => MetricKind::Percentage,
            Metric::Roas => MetricKind::Ratio,
            Metric::Impressions
            | Metric::Clicks
            | Metric::Conversions
            | Metric::PlatformCount
            | Metric::CampaignCount => MetricKind::Count,
        }
    }

    /// Short label used in diagnostics and generated questions.
    pub fn label(self) -> &'static str {
        match self {
            Metric::Spend => "spend",
            Metric::Revenue => "revenue",
            Metric::Impressions => "impressions",
            Metric::Clicks => "clicks",
            Metric::Conversions => "conversions",
            Metric::Ctr => "CTR",
            Metric::Roas => "ROAS",
            Metric::Cpc => "CPC",
            Metric::Cpm => "CPM",
            Metric::Cpa => "CPA",
            Metric::PlatformCount => "platform count",
            Metric::CampaignCount => "campaign count",
        }
    }

    /// Cost metrics, where the best performer has the lowest value.
    pub fn lower_is_better(self) -> bool {
        matches!(self, Metric::Cpc | Metric::Cpm | Metric::Cpa)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Currency,
    Percentage,
    Ratio,
    Count,
}

impl MetricKind {
    pub fn label(self) -> &'static str {
        match self {
            MetricKind::Currency => "currency",
            MetricKind::Percentage => "percentage",
            MetricKind::Ratio => "ratio",
            MetricKind::Count => "count",
        }
    }

    /// Render a value of this kind the way the service writes it.
    pub fn format(self, value: f64) -> String {
        match self {
            MetricKind::Currency => format!("${:.2}", value),
            MetricKind::Percentage => format!("{:.2}%", value * 100.0),
            MetricKind::Ratio => format!("{:.2}x", value),
            MetricKind::Count => format!("{}", value.round()),
        }
    }
}

// ---------------------------------------------------------------------------
// RankOrder
// ---------------------------------------------------------------------------

/// Which end of a ranking a superlative question asks for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankOrder {
    #[default]
    Highest,
    Lowest,
}

impl RankOrder {
    pub fn label(self) -> &'static str {
        match self {
            RankOrder::Highest => "highest",
            RankOrder::Lowest => "lowest",
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            RankOrder::Highest => RankOrder::Lowest,
            RankOrder::Lowest => RankOrder::Highest,
        }
    }
}

// ---------------------------------------------------------------------------
// Scope — Which slice of the data a question is about
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "name", rename_all = "snake_case")]
pub enum Scope {
    Overall,
    Platform(String),
    Campaign(String),
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Overall => f.write_str("overall"),
            Scope::Platform(name) => write!(f, "platform {}", name),
            Scope::Campaign(name) => write!(f, "campaign {}", name),
        }
    }
}

// ---------------------------------------------------------------------------
// QuestionCategory — Reporting bucket for an outcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionCategory {
    BasicMetrics,
    PlatformSpecific,
    CampaignSpecific,
    Comparative,
    Strategic,
    Unrecognized,
}

impl QuestionCategory {
    pub fn label(self) -> &'static str {
        match self {
            QuestionCategory::BasicMetrics => "basic_metrics",
            QuestionCategory::PlatformSpecific => "platform_specific",
            QuestionCategory::CampaignSpecific => "campaign_specific",
            QuestionCategory::Comparative => "comparative",
            QuestionCategory::Strategic => "strategic",
            QuestionCategory::Unrecognized => "unrecognized",
        }
    }
}

// ---------------------------------------------------------------------------
// FailureReason — Why a question failed validation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// The question maps to no known metric or scope.
    UnrecognizedQuestion,
    /// The answer text was empty or whitespace.
    EmptyAnswer,
    /// The answer matched the service's generic help template.
    FallbackResponse,
    /// No number of the expected kind could be found in the answer.
    NoNumericValue,
    /// A number was found but lies outside the tolerance.
    ToleranceExceeded,
    /// A qualitative answer was too thin to count as an answer.
    NotSubstantive,
    /// The answer could not be fetched at all.
    RequestFailed,
}

impl FailureReason {
    pub fn describe(self) -> &'static str {
        match self {
            FailureReason::UnrecognizedQuestion => "unrecognized question",
            FailureReason::EmptyAnswer => "empty answer",
            FailureReason::FallbackResponse => "generic fallback response",
            FailureReason::NoNumericValue => "no numeric value extracted",
            FailureReason::ToleranceExceeded => "value outside tolerance",
            FailureReason::NotSubstantive => "answer not substantive",
            FailureReason::RequestFailed => "request failed",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

// ---------------------------------------------------------------------------
// ValidationOutcome — Verdict for one (question, answer) pair
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub question: String,
    pub answer: String,
    pub category: QuestionCategory,
    pub metric: Option<Metric>,
    pub kind: Option<MetricKind>,
    pub scope: Option<Scope>,
    /// `None` for qualitative and unrecognized questions.
    pub expected: Option<f64>,
    pub extracted: Option<f64>,
    /// Relative or absolute difference, matching the tolerance mode applied.
    pub difference: Option<f64>,
    pub passed: bool,
    pub reason: Option<FailureReason>,
    pub message: String,
}

impl ValidationOutcome {
    pub(crate) fn new(question: &str, answer: &str, category: QuestionCategory) -> Self {
        Self {
            question: question.to_string(),
            answer: answer.to_string(),
            category,
            metric: None,
            kind: None,
            scope: None,
            expected: None,
            extracted: None,
            difference: None,
            passed: false,
            reason: None,
            message: String::new(),
        }
    }

    pub(crate) fn fail(mut self, reason: FailureReason, message: impl Into<String>) -> Self {
        self.passed = false;
        self.reason = Some(reason);
        self.message = message.into();
        self
    }

    pub(crate) fn pass(mut self, message: impl Into<String>) -> Self {
        self.passed = true;
        self.reason = None;
        self.message = message.into();
        self
    }
}
