//! Resolve a free-text question to the metric and scope it asks about.
//!
//! Matching is keyword based. Question text is lowercased and reduced to
//! space-separated words (hyphens kept), and every term is matched at a word
//! start, so `"click"` matches `"clicks"` but not `"unclickable"`. Metric
//! terms are tried in priority order: compound terms such as
//! "return on ad spend" or "cost per click" are listed before the bare words
//! they contain. Ranking cues are the exception: they must be whole words,
//! so "topline" is not "top".

use crate::models::{KnownEntities, Metric, MetricsSnapshot, QuestionCategory, RankOrder, Scope};

/// Metric synonym table in priority order.
const METRIC_TERMS: &[(Metric, &[&str])] = &[
    (
        Metric::Roas,
        &["roas", "return on ad spend", "return on investment", "roi"],
    ),
    (
        Metric::Ctr,
        &["ctr", "click-through", "click through", "click rate"],
    ),
    (Metric::Cpc, &["cpc", "cost per click"]),
    (Metric::Cpm, &["cpm", "cost per thousand", "cost per mille"]),
    (
        Metric::Cpa,
        &["cpa", "cost per acquisition", "cost per conversion"],
    ),
    (
        Metric::Spend,
        &["spend", "spent", "budget", "cost", "invest", "money"],
    ),
    (
        Metric::Revenue,
        &["revenue", "earn", "income", "return", "sales"],
    ),
    (
        Metric::Impressions,
        &["impression", "view", "display", "shown"],
    ),
    (Metric::Clicks, &["click", "interaction", "engagement"]),
    (Metric::Conversions, &["conversion", "acquisition", "purchase"]),
];

const PLATFORM_COUNT_TERMS: &[&str] = &[
    "how many platforms",
    "number of platforms",
    "platform count",
];

const CAMPAIGN_COUNT_TERMS: &[&str] = &[
    "how many campaigns",
    "number of campaigns",
    "campaign count",
];

/// Open-ended asks with no single numeric answer. Word-start prefixes, so
/// `"optimi"` covers "optimize" and "optimization".
const OPEN_ENDED_TERMS: &[&str] = &[
    "insight",
    "recommend",
    "suggest",
    "optimi",
    "improve",
    "boost",
    "increase",
    "how can",
    "learn",
    "takeaway",
    "should i",
    "should we",
    "best practice",
    "strateg",
    "reallocat",
    "what worked",
    "work well",
    "didn't work",
    "did not work",
];

/// Summary and confirmation cues that only count when no metric is named:
/// "is this data accurate?" is open-ended, "what is this month's spend?" is
/// not.
const SUMMARY_TERMS: &[&str] = &[
    "performance",
    "performing",
    "result",
    "summary",
    "overview",
    "doing",
    "explain",
    "verify",
    "confirm",
    "is this",
    "does this",
    "are these",
];

/// Superlative and ranking cues, matched as whole words.
const COMPARATIVE_WORDS: &[&str] = &[
    "which",
    "top",
    "rank",
    "ranked",
    "ranking",
    "best",
    "worst",
    "highest",
    "lowest",
    "most",
    "least",
    "fewest",
    "cheapest",
    "compare",
    "compared",
    "comparing",
    "comparison",
    "versus",
    "vs",
    "outperform",
    "outperformed",
    "outperforming",
    "winning",
];

/// Phrases built from comparative words that are not comparisons.
const NON_COMPARATIVE_PHRASES: &[&str] = &["most recent", "at least", "at most"];

/// Cues that ask for the low end of a ranking.
const LOW_END_WORDS: &[&str] = &["lowest", "least", "fewest", "cheapest", "smallest"];

/// Cues that ask for the high end whatever the metric.
const HIGH_END_WORDS: &[&str] = &["highest", "most", "top", "largest", "biggest"];

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Whether a ranking question ranks platforms or campaigns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankSubject {
    Platforms,
    Campaigns,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// A question with one numeric answer.
    Numeric { metric: Metric, scope: Scope },
    /// "Which platform had the highest X". `metric` is what the ranking is
    /// by; performance superlatives without a named metric rank by ROAS.
    /// `order` is the end of the ranking the question asks for.
    Comparative {
        subject: RankSubject,
        metric: Metric,
        order: RankOrder,
    },
    /// Insights, recommendations, summaries.
    OpenEnded { scope: Scope },
    Unrecognized,
}

impl Resolution {
    pub fn category(&self) -> QuestionCategory {
        match self {
            Resolution::Numeric { scope, .. } => match scope {
                Scope::Overall => QuestionCategory::BasicMetrics,
                Scope::Platform(_) => QuestionCategory::PlatformSpecific,
                Scope::Campaign(_) => QuestionCategory::CampaignSpecific,
            },
            Resolution::Comparative { .. } => QuestionCategory::Comparative,
            Resolution::OpenEnded { .. } => QuestionCategory::Strategic,
            Resolution::Unrecognized => QuestionCategory::Unrecognized,
        }
    }

    /// The expected value of a numeric resolution, looked up in `snapshot`.
    ///
    /// `None` for non-numeric resolutions and for entities that have no
    /// bucket in the snapshot.
    pub fn expected(&self, snapshot: &MetricsSnapshot) -> Option<f64> {
        let Resolution::Numeric { metric, scope } = self else {
            return None;
        };
        match metric {
            Metric::PlatformCount => return Some(snapshot.platforms.len() as f64),
            Metric::CampaignCount => return Some(snapshot.campaigns.len() as f64),
            _ => {}
        }
        let bucket = match scope {
            Scope::Overall => Some(&snapshot.overall),
            Scope::Platform(name) => snapshot.platform(name),
            Scope::Campaign(name) => snapshot.campaign(name),
        }?;
        bucket.value(*metric)
    }
}

// ---------------------------------------------------------------------------
// QuestionResolver
// ---------------------------------------------------------------------------

/// Maps question text to a [`Resolution`] against a fixed set of entity names.
#[derive(Debug, Clone)]
pub struct QuestionResolver {
    /// (normalized, original), longest normalized name first.
    platforms: Vec<(String, String)>,
    campaigns: Vec<(String, String)>,
}

impl QuestionResolver {
    pub fn new(entities: &KnownEntities) -> Self {
        Self {
            platforms: index_names(&entities.platforms),
            campaigns: index_names(&entities.campaigns),
        }
    }

    pub fn resolve(&self, question: &str) -> Resolution {
        let text = normalize(question);
        if text.trim().is_empty() {
            return Resolution::Unrecognized;
        }

        if mentions_any(&text, PLATFORM_COUNT_TERMS) {
            return Resolution::Numeric {
                metric: Metric::PlatformCount,
                scope: Scope::Overall,
            };
        }
        if mentions_any(&text, CAMPAIGN_COUNT_TERMS) {
            return Resolution::Numeric {
                metric: Metric::CampaignCount,
                scope: Scope::Overall,
            };
        }

        // Entity names are removed before cue matching so a campaign called
        // "Top Sellers" or "Growth Strategy" does not read as a cue.
        let (scope, mut text) = self.scope(&text);
        for phrase in NON_COMPARATIVE_PHRASES {
            text = text.replace(&format!(" {} ", phrase), " ");
        }

        if mentions_any(&text, OPEN_ENDED_TERMS) {
            return Resolution::OpenEnded { scope };
        }

        let metric = metric_in(&text);
        if mentions_any_word(&text, COMPARATIVE_WORDS) {
            let subject = if mentions(&text, "campaign") {
                RankSubject::Campaigns
            } else {
                RankSubject::Platforms
            };
            let metric = metric.unwrap_or(Metric::Roas);
            return Resolution::Comparative {
                subject,
                metric,
                order: rank_order(&text, metric),
            };
        }

        match metric {
            Some(metric) => Resolution::Numeric { metric, scope },
            None if mentions_any(&text, SUMMARY_TERMS) => Resolution::OpenEnded { scope },
            None => Resolution::Unrecognized,
        }
    }

    /// Campaigns are matched first (substring), then platforms (whole word).
    ///
    /// Returns the scope and `text` with the matched name blanked out.
    fn scope(&self, text: &str) -> (Scope, String) {
        if let Some((norm, name)) = self
            .campaigns
            .iter()
            .find(|(norm, _)| text.contains(norm.as_str()))
        {
            let rest = text.replacen(norm.as_str(), " ", 1);
            return (Scope::Campaign(name.clone()), rest);
        }
        if let Some((norm, name)) = self
            .platforms
            .iter()
            .find(|(norm, _)| text.contains(&format!(" {} ", norm)))
        {
            let rest = text.replacen(&format!(" {} ", norm), " ", 1);
            return (Scope::Platform(name.clone()), rest);
        }
        (Scope::Overall, text.to_string())
    }
}

/// Low-end cues win; "best" and "worst" flip for cost metrics.
fn rank_order(text: &str, metric: Metric) -> RankOrder {
    if mentions_any_word(text, LOW_END_WORDS) {
        return RankOrder::Lowest;
    }
    if mentions_any_word(text, HIGH_END_WORDS) {
        return RankOrder::Highest;
    }
    let best = if metric.lower_is_better() {
        RankOrder::Lowest
    } else {
        RankOrder::Highest
    };
    if mentions_word(text, "worst") {
        best.reversed()
    } else {
        best
    }
}

fn index_names(names: &[String]) -> Vec<(String, String)> {
    let mut indexed: Vec<(String, String)> = names
        .iter()
        .map(|n| (normalize(n).trim().to_string(), n.trim().to_string()))
        .filter(|(norm, _)| !norm.is_empty())
        .collect();
    indexed.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));
    indexed
}

/// The first metric in priority order that `text` mentions.
pub fn detect_metric(text: &str) -> Option<Metric> {
    metric_in(&normalize(text))
}

fn metric_in(normalized: &str) -> Option<Metric> {
    METRIC_TERMS
        .iter()
        .find(|(_, terms)| mentions_any(normalized, terms))
        .map(|(metric, _)| *metric)
}

/// Lowercase, keep letters/digits/hyphens/apostrophes, collapse everything
/// else to single spaces, and pad both ends with a space.
pub(crate) fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push(' ');
    let mut last_space = true;
    for ch in text.chars() {
        let ch = if ch == '\u{2019}' { '\'' } else { ch };
        if ch.is_alphanumeric() || ch == '-' || ch == '\'' {
            for lower in ch.to_lowercase() {
                out.push(lower);
            }
            last_space = false;
        } else if !last_space {
            out.push(' ');
            last_space = true;
        }
    }
    if !last_space {
        out.push(' ');
    }
    // Possessives: "meta's" -> "meta".
    out.replace("'s ", " ")
}

/// Whether `term` occurs in normalized `text` starting at a word boundary.
/// Terms are prefixes: `"strateg"` matches "strategy" and "strategic".
fn mentions(text: &str, term: &str) -> bool {
    text.contains(&format!(" {}", term))
}

fn mentions_any(text: &str, terms: &[&str]) -> bool {
    terms.iter().any(|t| mentions(text, t))
}

/// Whether `word` occurs in normalized `text` as a whole word.
fn mentions_word(text: &str, word: &str) -> bool {
    text.contains(&format!(" {} ", word))
}

fn mentions_any_word(text: &str, words: &[&str]) -> bool {
    words.iter().any(|w| mentions_word(text, w))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_pads_and_strips_possessive() {
        assert_eq!(normalize("What is Meta's CTR?"), " what is meta ctr ");
        assert_eq!(normalize("Click-through  rate!"), " click-through rate ");
    }

    #[test]
    fn compound_terms_win_over_bare_words() {
        assert_eq!(detect_metric("return on ad spend"), Some(Metric::Roas));
        assert_eq!(detect_metric("cost per click"), Some(Metric::Cpc));
        assert_eq!(detect_metric("cost per conversion"), Some(Metric::Cpa));
        assert_eq!(detect_metric("click rate"), Some(Metric::Ctr));
    }

    #[test]
    fn word_start_matching_rejects_embedded_terms() {
        // "overview" must not be read as "view".
        assert_eq!(detect_metric("give me an overview"), None);
    }
}
