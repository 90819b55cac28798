//! Age Gate
//!
//! Runs before any tier is evaluated. A token younger than the global
//! minimum is ineligible no matter what its other metrics look like.

use crate::models::{IneligibleReason, TokenAge};
use crate::utils::constants::{AGE_HEURISTIC_BUCKETS, AGE_HEURISTIC_FLOOR_DAYS};

/// "10 days", "1 day", "12 hours", "10 days, 12 hours"
pub fn format_age_display(days: f64) -> String {
    let days = if days.is_finite() { days.max(0.0) } else { 0.0 };
    let whole_days = days.floor() as u64;
    let hours = ((days - whole_days as f64) * 24.0).floor() as u64;

    let plural = |n: u64, unit: &str| {
        if n == 1 {
            format!("1 {}", unit)
        } else {
            format!("{} {}s", n, unit)
        }
    };

    match (whole_days, hours) {
        (0, h) => plural(h, "hour"),
        (d, 0) => plural(d, "day"),
        (d, h) => format!("{}, {}", plural(d, "day"), plural(h, "hour")),
    }
}

/// Rough age from market depth, only used once every timestamp source failed
pub fn estimate_age_from_market(volume_24h_usd: f64, liquidity_usd: f64, market_cap_usd: f64) -> Option<f64> {
    if volume_24h_usd <= 0.0 && liquidity_usd <= 0.0 {
        return None;
    }
    let days = AGE_HEURISTIC_BUCKETS
        .iter()
        .find(|(volume, liquidity, mcap, _)| {
            volume_24h_usd >= *volume && liquidity_usd >= *liquidity && market_cap_usd >= *mcap
        })
        .map(|(_, _, _, days)| *days)
        .unwrap_or(AGE_HEURISTIC_FLOOR_DAYS);
    Some(days)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeGate {
    pub min_age_days: u32,
}

impl AgeGate {
    pub fn new(min_age_days: u32) -> Self {
        Self { min_age_days }
    }

    /// `None` when the token is old enough
    pub fn check(&self, age: &TokenAge) -> Option<IneligibleReason> {
        if age.project_age_days >= self.min_age_days as f64 {
            return None;
        }
        Some(IneligibleReason::TooYoung {
            project_age_days: age.project_age_days,
            age_display: format_age_display(age.project_age_days),
            minimum_age_required: self.min_age_days,
            age_confidence: age.confidence,
        })
    }
}
