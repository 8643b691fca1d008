//! Number extraction from free-text answers, one canonical pattern per
//! [`MetricKind`], plus detection of the service's generic fallback template.

use regex::Regex;
use std::sync::LazyLock;

use crate::config;
use crate::models::MetricKind;

/// `$1,234.56`, `1,234`, `1234.5`. The number must start with a digit so a
/// stray comma is never read as a value.
static CURRENCY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\$)?(\d[\d,]*\.?\d*)").unwrap());

/// `4.12%`, `4.12 %`.
static PERCENTAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+\.?\d*)\s*%").unwrap());

/// `3.14x`, `3.14 X`.
static RATIO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+\.?\d*)\s*x\b").unwrap());

/// `1,234,567`.
static COUNT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d[\d,]*)").unwrap());

/// Extract the value of a `kind` number from `text`.
///
/// - currency: the first `$`-prefixed amount, else the first bare number
/// - percentage: the first `N%`, returned as a fraction (`4.12%` -> `0.0412`)
/// - ratio: the first `Nx`
/// - count: the first integer
///
/// Thousands separators are stripped. Returns `None` when nothing matches.
pub fn extract_number(text: &str, kind: MetricKind) -> Option<f64> {
    match kind {
        MetricKind::Currency => {
            let mut first_bare = None;
            for caps in CURRENCY_RE.captures_iter(text) {
                let Some(value) = caps.get(2).and_then(|m| parse_number(m.as_str())) else {
                    continue;
                };
                if caps.get(1).is_some() {
                    return Some(value);
                }
                first_bare.get_or_insert(value);
            }
            first_bare
        }
        MetricKind::Percentage => PERCENTAGE_RE
            .captures_iter(text)
            .find_map(|c| c.get(1).and_then(|m| parse_number(m.as_str())))
            .map(|v| v / 100.0),
        MetricKind::Ratio => RATIO_RE
            .captures_iter(text)
            .find_map(|c| c.get(1).and_then(|m| parse_number(m.as_str()))),
        MetricKind::Count => COUNT_RE
            .captures_iter(text)
            .find_map(|c| c.get(1).and_then(|m| parse_number(m.as_str()))),
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != ',').collect();
    let cleaned = cleaned.trim_end_matches('.');
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Whether `text` is the service's generic help template.
///
/// Matched case-insensitively against [`config::FALLBACK_PHRASES`]; curly
/// apostrophes are treated as straight ones.
pub fn is_fallback_response(text: &str) -> bool {
    let lower = text.replace('\u{2019}', "'").to_lowercase();
    config::FALLBACK_PHRASES
        .iter()
        .any(|phrase| lower.contains(phrase))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_number_strips_separators_and_trailing_dot() {
        assert_eq!(parse_number("1,234."), Some(1234.0));
        assert_eq!(parse_number(","), None);
    }

    #[test]
    fn currency_prefers_dollar_amount_over_earlier_number() {
        let text = "Across 6 platforms we spent $12,500.00 in June";
        assert_eq!(extract_number(text, MetricKind::Currency), Some(12500.0));
    }

    #[test]
    fn currency_falls_back_to_first_bare_number() {
        assert_eq!(
            extract_number("Total spend: 1,234.56 USD", MetricKind::Currency),
            Some(1234.56)
        );
    }
}
