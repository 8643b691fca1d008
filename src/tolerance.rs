//! How close an extracted value must be to the expected one.

use serde::{Deserialize, Serialize};

use crate::config;
use crate::models::MetricKind;

/// Guards the relative-difference denominator.
const EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "snake_case")]
pub enum ToleranceMode {
    /// `|actual - expected| / |expected| <= t`; an expected value of zero
    /// only accepts an exact zero.
    Relative(f64),
    /// `|actual - expected| <= t`.
    Absolute(f64),
}

impl ToleranceMode {
    /// Panics if `t` is negative or not finite.
    pub fn relative(t: f64) -> Self {
        assert!(t.is_finite() && t >= 0.0, "tolerance must be finite and >= 0, got {t}");
        ToleranceMode::Relative(t)
    }

    /// Panics if `t` is negative or not finite.
    pub fn absolute(t: f64) -> Self {
        assert!(t.is_finite() && t >= 0.0, "tolerance must be finite and >= 0, got {t}");
        ToleranceMode::Absolute(t)
    }

    /// The difference this mode measures between `actual` and `expected`.
    pub fn difference(self, actual: f64, expected: f64) -> f64 {
        let diff = (actual - expected).abs();
        match self {
            ToleranceMode::Relative(_) => diff / expected.abs().max(EPSILON),
            ToleranceMode::Absolute(_) => diff,
        }
    }

    pub fn accepts(self, actual: f64, expected: f64) -> bool {
        match self {
            ToleranceMode::Relative(_) if expected == 0.0 => actual == 0.0,
            ToleranceMode::Relative(t) | ToleranceMode::Absolute(t) => {
                self.difference(actual, expected) <= t
            }
        }
    }
}

/// Per-kind tolerance. Currency and count totals are compared relatively;
/// percentages and ratios absolutely, since small values blow up relative
/// error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    pub currency: ToleranceMode,
    pub percentage: ToleranceMode,
    pub ratio: ToleranceMode,
    pub count: ToleranceMode,
}

impl Tolerance {
    /// One number for every kind: relative for currency/count, absolute for
    /// percentage/ratio. Percentages are fractions here, so `t` is also the
    /// percentage window (0.02 is two percentage points).
    pub fn uniform(t: f64) -> Self {
        Self {
            currency: ToleranceMode::relative(t),
            percentage: ToleranceMode::absolute(t),
            ratio: ToleranceMode::absolute(t),
            count: ToleranceMode::relative(t),
        }
    }

    pub fn with(mut self, kind: MetricKind, mode: ToleranceMode) -> Self {
        match kind {
            MetricKind::Currency => self.currency = mode,
            MetricKind::Percentage => self.percentage = mode,
            MetricKind::Ratio => self.ratio = mode,
            MetricKind::Count => self.count = mode,
        }
        self
    }

    pub fn for_kind(&self, kind: MetricKind) -> ToleranceMode {
        match kind {
            MetricKind::Currency => self.currency,
            MetricKind::Percentage => self.percentage,
            MetricKind::Ratio => self.ratio,
            MetricKind::Count => self.count,
        }
    }
}

impl Default for Tolerance {
    /// [`uniform`](Self::uniform) at the default tolerance, with percentages
    /// held to [`DEFAULT_PERCENTAGE_TOLERANCE`](config::DEFAULT_PERCENTAGE_TOLERANCE):
    /// a CTR near 2% would otherwise accept anything from 0% to 4%.
    fn default() -> Self {
        Self::uniform(config::DEFAULT_TOLERANCE).with(
            MetricKind::Percentage,
            ToleranceMode::absolute(config::DEFAULT_PERCENTAGE_TOLERANCE),
        )
    }
}
