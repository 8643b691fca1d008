use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// PerformanceRecord — One row of the campaign performance CSV
// ---------------------------------------------------------------------------

/// A single day of delivery for one campaign on one platform.
///
/// Revenue is never stored; it is always `spend * roas` (see [`revenue`](Self::revenue)).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PerformanceRecord {
    pub date: NaiveDate,
    pub platform: String,
    #[serde(rename = "campaign_name")]
    pub campaign: String,
    pub spend: f64,
    pub impressions: u64,
    pub clicks: u64,
    pub conversions: u64,
    pub ctr: f64,
    pub cpc: f64,
    pub cpm: f64,
    pub roas: f64,
}

impl PerformanceRecord {
    /// Build a record from its base measures, deriving `ctr`, `cpc` and `cpm`
    /// from the row itself.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        date: NaiveDate,
        platform: impl Into<String>,
        campaign: impl Into<String>,
        spend: f64,
        impressions: u64,
        clicks: u64,
        conversions: u64,
        roas: f64,
    ) -> Self {
        let ratio = |num: f64, den: u64| if den == 0 { 0.0 } else { num / den as f64 };
        Self {
            date,
            platform: platform.into(),
            campaign: campaign.into(),
            spend,
            impressions,
            clicks,
            conversions,
            ctr: ratio(clicks as f64, impressions),
            cpc: ratio(spend, clicks),
            cpm: ratio(spend, impressions) * 1000.0,
            roas,
        }
    }

    /// Revenue attributed to this row: `spend * roas`.
    pub fn revenue(&self) -> f64 {
        self.spend * self.roas
    }
}
