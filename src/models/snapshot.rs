use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::outcome::Metric;
use super::record::PerformanceRecord;

// ---------------------------------------------------------------------------
// AggregateBucket — Sums and ratio-of-sums for one grouping key
// ---------------------------------------------------------------------------

/// Totals for one grouping key ("overall", a platform, or a campaign).
///
/// Ratios are computed from the sums, never averaged per row, and every
/// ratio with a zero denominator is `0.0`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateBucket {
    pub rows: usize,
    pub spend: f64,
    pub impressions: u64,
    pub clicks: u64,
    pub conversions: u64,
    pub revenue: f64,
    pub ctr: f64,
    pub roas: f64,
    pub cpc: f64,
    pub cpm: f64,
    pub cpa: f64,
}

impl AggregateBucket {
    /// The bucket's value for a per-bucket metric.
    ///
    /// Returns `None` for the entity-count metrics, which only exist at
    /// snapshot level.
    pub fn value(&self, metric: Metric) -> Option<f64> {
        let v = match metric {
            Metric::Spend => self.spend,
            Metric::Revenue => self.revenue,
            Metric::Impressions => self.impressions as f64,
            Metric::Clicks => self.clicks as f64,
            Metric::Conversions => self.conversions as f64,
            Metric::Ctr => self.ctr,
            Metric::Roas => self.roas,
            Metric::Cpc => self.cpc,
            Metric::Cpm => self.cpm,
            Metric::Cpa => self.cpa,
            Metric::PlatformCount | Metric::CampaignCount => return None,
        };
        Some(v)
    }
}

/// Accumulates sums for one key; [`finish`](Self::finish) derives the ratios.
#[derive(Debug, Clone, Default)]
pub struct BucketBuilder {
    rows: usize,
    spend: f64,
    impressions: u64,
    clicks: u64,
    conversions: u64,
    revenue: f64,
}

impl BucketBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, record: &PerformanceRecord) -> &mut Self {
        self.rows += 1;
        self.spend += record.spend;
        self.impressions = self.impressions.saturating_add(record.impressions);
        self.clicks = self.clicks.saturating_add(record.clicks);
        self.conversions = self.conversions.saturating_add(record.conversions);
        self.revenue += record.revenue();
        self
    }

    pub fn finish(&self) -> AggregateBucket {
        let impressions = self.impressions as f64;
        let clicks = self.clicks as f64;
        let conversions = self.conversions as f64;
        AggregateBucket {
            rows: self.rows,
            spend: self.spend,
            impressions: self.impressions,
            clicks: self.clicks,
            conversions: self.conversions,
            revenue: self.revenue,
            ctr: safe_div(clicks, impressions),
            roas: safe_div(self.revenue, self.spend),
            cpc: safe_div(self.spend, clicks),
            cpm: safe_div(self.spend, impressions) * 1000.0,
            cpa: safe_div(self.spend, conversions),
        }
    }
}

/// Division that yields `0.0` for a zero denominator and never NaN/inf.
pub(crate) fn safe_div(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        return 0.0;
    }
    let v = num / den;
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// MetricsSnapshot — Full output of aggregation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub overall: AggregateBucket,
    pub platforms: BTreeMap<String, AggregateBucket>,
    pub campaigns: BTreeMap<String, AggregateBucket>,
}

impl MetricsSnapshot {
    pub fn platform(&self, name: &str) -> Option<&AggregateBucket> {
        self.platforms.get(name.trim())
    }

    pub fn campaign(&self, name: &str) -> Option<&AggregateBucket> {
        self.campaigns.get(name.trim())
    }

    /// Names of every platform and campaign present in the snapshot.
    pub fn known_entities(&self) -> KnownEntities {
        KnownEntities::new(
            self.platforms.keys().cloned(),
            self.campaigns.keys().cloned(),
        )
    }
}

// ---------------------------------------------------------------------------
// KnownEntities — Platform and campaign names a question may mention
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownEntities {
    pub platforms: Vec<String>,
    pub campaigns: Vec<String>,
}

impl KnownEntities {
    /// Names are trimmed, de-duplicated and sorted.
    pub fn new<P, C>(platforms: P, campaigns: C) -> Self
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
        C: IntoIterator,
        C::Item: AsRef<str>,
    {
        Self {
            platforms: normalize_names(platforms),
            campaigns: normalize_names(campaigns),
        }
    }
}

fn normalize_names<I>(names: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut out: Vec<String> = names
        .into_iter()
        .map(|n| n.as_ref().trim().to_string())
        .filter(|n| !n.is_empty())
        .collect();
    out.sort();
    out.dedup();
    out
}
