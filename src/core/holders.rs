//! Holder Distribution Analyzer
//!
//! Pure function of the fetched holder list. Supply is the sum of the
//! fetched amounts, never an externally reported total.

use crate::models::{
    ConcentrationRisk, DistributionMetrics, Holder, HolderInfo, SuspiciousActivity,
};
use crate::utils::constants::{
    CONCENTRATION_HIGH_PERCENT, CONCENTRATION_MEDIUM_PERCENT, CONCENTRATION_VERY_HIGH_PERCENT,
    CONTRACT_HOLDER_THRESHOLD_PERCENT, SELL_OFF_THRESHOLD_PERCENT, WHALE_THRESHOLD_PERCENT,
};
use crate::utils::looks_like_contract;

/// Bucket for the largest holder's share (percent)
pub fn concentration_bucket(top1_percent: f64) -> ConcentrationRisk {
    if top1_percent > CONCENTRATION_VERY_HIGH_PERCENT {
        ConcentrationRisk::VeryHigh
    } else if top1_percent > CONCENTRATION_HIGH_PERCENT {
        ConcentrationRisk::High
    } else if top1_percent > CONCENTRATION_MEDIUM_PERCENT {
        ConcentrationRisk::Medium
    } else {
        ConcentrationRisk::Low
    }
}

/// `holder_count` is the upstream total, `None` when the provider cannot report it
pub fn analyze_holders(mut holders: Vec<Holder>, holder_count: Option<u64>) -> HolderInfo {
    holders.retain(|h| h.amount.is_finite() && h.amount > 0.0);
    holders.sort_by(|a, b| {
        b.amount
            .partial_cmp(&a.amount)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let total: f64 = holders.iter().map(|h| h.amount).sum();
    let holder_count = holder_count.map(|count| count.max(holders.len() as u64));

    if holders.is_empty() || total <= 0.0 {
        return HolderInfo {
            holders,
            holder_count,
            distribution: DistributionMetrics::default(),
            activity: SuspiciousActivity {
                sell_off_percent: 0.0,
                affected_wallets_percent: 0.0,
                suspicious_wallets: 0,
                concentration_risk: ConcentrationRisk::Unknown,
            },
        };
    }

    let share = |h: &Holder| h.amount / total * 100.0;

    let top1_percent = share(&holders[0]);
    let top5_percent: f64 = holders.iter().take(5).map(share).sum();

    let whales: Vec<f64> = holders
        .iter()
        .map(share)
        .filter(|s| *s > WHALE_THRESHOLD_PERCENT)
        .collect();

    let mut sell_off_percent = 0.0;
    let mut flagged = 0u32;
    for holder in &holders {
        let pct = share(holder);
        let sell_off = pct > SELL_OFF_THRESHOLD_PERCENT;
        let contract = pct > CONTRACT_HOLDER_THRESHOLD_PERCENT && looks_like_contract(&holder.address);
        if sell_off {
            sell_off_percent += pct;
        }
        if sell_off || contract {
            flagged += 1;
        }
    }

    let affected_wallets_percent = flagged as f64 / holders.len() as f64 * 100.0;

    HolderInfo {
        distribution: DistributionMetrics {
            top1_percent,
            top5_percent,
            whale_count: whales.len() as u32,
            whale_concentration_percent: whales.iter().sum(),
        },
        activity: SuspiciousActivity {
            sell_off_percent,
            affected_wallets_percent,
            suspicious_wallets: flagged,
            concentration_risk: concentration_bucket(top1_percent),
        },
        holders,
        holder_count,
    }
}
