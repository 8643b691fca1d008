//! Single-pass aggregation of campaign records into a [`MetricsSnapshot`].
//!
//! Sums are accumulated per key (overall, platform, campaign) and the derived
//! ratios are computed once at the end from those sums. Platform and campaign
//! names are trimmed before grouping so `" Foo "` and `"Foo"` share a bucket.

use std::collections::BTreeMap;

use crate::models::{
    AggregateBucket, BucketBuilder, Metric, MetricsSnapshot, PerformanceRecord, RankOrder,
};

/// Aggregate a sequence of records.
///
/// Pure and total: an empty input yields zeroed buckets, and no ratio is ever
/// NaN or infinite.
pub fn aggregate<'a, I>(records: I) -> MetricsSnapshot
where
    I: IntoIterator<Item = &'a PerformanceRecord>,
{
    let mut overall = BucketBuilder::new();
    let mut platforms: BTreeMap<String, BucketBuilder> = BTreeMap::new();
    let mut campaigns: BTreeMap<String, BucketBuilder> = BTreeMap::new();

    for record in records {
        overall.add(record);
        platforms
            .entry(record.platform.trim().to_string())
            .or_default()
            .add(record);
        campaigns
            .entry(record.campaign.trim().to_string())
            .or_default()
            .add(record);
    }

    MetricsSnapshot {
        overall: overall.finish(),
        platforms: finish_all(platforms),
        campaigns: finish_all(campaigns),
    }
}

fn finish_all(builders: BTreeMap<String, BucketBuilder>) -> BTreeMap<String, AggregateBucket> {
    builders
        .into_iter()
        .map(|(name, b)| (name, b.finish()))
        .collect()
}

// ---------------------------------------------------------------------------
// Rankings
// ---------------------------------------------------------------------------

impl MetricsSnapshot {
    /// Platforms ordered by `metric`, highest first.
    ///
    /// A ratio whose denominator is zero is a placeholder, not a measurement,
    /// so those platforms are left out (zero spend for ROAS, zero conversions
    /// for CPA, and so on).
    pub fn rank_platforms(&self, metric: Metric) -> Vec<(&str, f64)> {
        rank(&self.platforms, metric, RankOrder::Highest)
    }

    /// Campaigns ordered by `metric`, highest first. Same exclusions as
    /// [`rank_platforms`](Self::rank_platforms).
    pub fn rank_campaigns(&self, metric: Metric) -> Vec<(&str, f64)> {
        rank(&self.campaigns, metric, RankOrder::Highest)
    }

    /// Platforms ordered from the `order` end of the ranking.
    pub fn rank_platforms_by(&self, metric: Metric, order: RankOrder) -> Vec<(&str, f64)> {
        rank(&self.platforms, metric, order)
    }

    pub fn rank_campaigns_by(&self, metric: Metric, order: RankOrder) -> Vec<(&str, f64)> {
        rank(&self.campaigns, metric, order)
    }

    pub fn top_platform(&self, metric: Metric) -> Option<(&str, f64)> {
        self.rank_platforms(metric).into_iter().next()
    }

    pub fn top_campaign(&self, metric: Metric) -> Option<(&str, f64)> {
        self.rank_campaigns(metric).into_iter().next()
    }
}

fn rank(
    buckets: &BTreeMap<String, AggregateBucket>,
    metric: Metric,
    order: RankOrder,
) -> Vec<(&str, f64)> {
    let mut ranked: Vec<(&str, f64)> = buckets
        .iter()
        .filter(|(_, b)| is_measured(b, metric))
        .filter_map(|(name, b)| b.value(metric).map(|v| (name.as_str(), v)))
        .collect();
    // Stable sort keeps name order for ties.
    match order {
        RankOrder::Highest => ranked.sort_by(|a, b| b.1.total_cmp(&a.1)),
        RankOrder::Lowest => ranked.sort_by(|a, b| a.1.total_cmp(&b.1)),
    }
    ranked
}

fn is_measured(bucket: &AggregateBucket, metric: Metric) -> bool {
    match metric {
        Metric::Roas => bucket.spend > 0.0,
        Metric::Ctr | Metric::Cpm => bucket.impressions > 0,
        Metric::Cpc => bucket.clicks > 0,
        Metric::Cpa => bucket.conversions > 0,
        _ => true,
    }
}
