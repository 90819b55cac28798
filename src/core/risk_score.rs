//! Risk Scoring Module
//! Combines per-facet trust sub-scores into one 0-100 risk score
//!
//! Each sub-score is a trust value (100 = safest). The weighted trust uses the
//! matched tier's weights and the risk score is `100 - trust`, so a higher
//! score always means riskier.

use serde::{Deserialize, Serialize};

use crate::models::{ConcentrationRisk, LiquidityInfo, LpStatus, RiskLevel, ScoringWeights, TokenSnapshot};

/// Holder counts below this lose trust regardless of distribution
const THIN_HOLDER_BASE: u64 = 100;
const THIN_HOLDER_PENALTY: f64 = 20.0;

/// Final risk score with its explanation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskScore {
    /// Overall risk (0-100, higher is riskier)
    pub total: u8,
    pub level: RiskLevel,
    /// Weighted trust before inversion
    pub trust: f64,
    pub components: TrustComponents,
    /// Detailed breakdown for transparency
    pub breakdown: Vec<ScoreFactor>,
}

/// Trust sub-scores (0-100, higher is safer)
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct TrustComponents {
    pub liquidity: u8,
    pub lock: u8,
    pub holders: u8,
    pub contract: u8,
}

/// Individual factor contributing to score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreFactor {
    pub name: String,
    pub score: u8,
    pub weight: f64,
    pub reason: String,
}

// ============================================
// SUB-SCORES
// ============================================

pub fn liquidity_health(liquidity: &LiquidityInfo) -> u8 {
    if liquidity.lp_status == LpStatus::Unknown && liquidity.liquidity_usd <= 0.0 {
        return 0;
    }
    let usd = liquidity.liquidity_usd;
    if usd >= 1_000_000.0 {
        100
    } else if usd >= 250_000.0 {
        90
    } else if usd >= 100_000.0 {
        80
    } else if usd >= 50_000.0 {
        65
    } else if usd >= 10_000.0 {
        45
    } else if usd >= 1_000.0 {
        25
    } else {
        5
    }
}

pub fn lock_assurance(liquidity: &LiquidityInfo) -> u8 {
    match liquidity.lp_status {
        LpStatus::Burned => 100,
        LpStatus::Locked => match liquidity.lock_duration_months.unwrap_or(0) {
            m if m >= 12 => 90,
            m if m >= 6 => 75,
            m if m >= 3 => 60,
            _ => 45,
        },
        LpStatus::Distributed => 20,
        LpStatus::Unknown => 0,
    }
}

pub fn holder_cleanliness(snapshot: &TokenSnapshot) -> u8 {
    let holders = &snapshot.holders;
    if holders.holders.is_empty() {
        return 0;
    }

    let concentration_penalty = match holders.activity.concentration_risk {
        ConcentrationRisk::VeryHigh => 60.0,
        ConcentrationRisk::High => 35.0,
        ConcentrationRisk::Medium => 15.0,
        ConcentrationRisk::Low => 0.0,
        ConcentrationRisk::Unknown => 100.0,
    };

    let mut trust = 100.0
        - concentration_penalty
        - 0.5 * holders.activity.sell_off_percent
        - 0.5 * holders.activity.affected_wallets_percent;
    // An unknown total is scored as thin
    if holders.holder_count.map_or(true, |count| count < THIN_HOLDER_BASE) {
        trust -= THIN_HOLDER_PENALTY;
    }

    trust.round().clamp(0.0, 100.0) as u8
}

// ============================================
// COMPOSITE
// ============================================

impl RiskScore {
    pub fn calculate(snapshot: &TokenSnapshot, weights: &ScoringWeights) -> Self {
        let components = TrustComponents {
            liquidity: liquidity_health(&snapshot.liquidity),
            lock: lock_assurance(&snapshot.liquidity),
            holders: holder_cleanliness(snapshot),
            contract: snapshot.contract.security_score.min(100),
        };

        let total_weight = weights.total();
        let normalize = |w: f64| if total_weight > 0.0 { w / total_weight } else { 0.25 };

        let breakdown = vec![
            ScoreFactor {
                name: "Liquidity health".to_string(),
                score: components.liquidity,
                weight: normalize(weights.liquidity),
                reason: format!("${:.0} pooled liquidity", snapshot.liquidity.liquidity_usd),
            },
            ScoreFactor {
                name: "Lock assurance".to_string(),
                score: components.lock,
                weight: normalize(weights.lock),
                reason: match (snapshot.liquidity.lp_status, snapshot.liquidity.lock_duration_months) {
                    (LpStatus::Locked, Some(m)) => format!("LP locked for {} months", m),
                    (status, _) => format!("LP {:?}", status).to_lowercase(),
                },
            },
            ScoreFactor {
                name: "Holder cleanliness".to_string(),
                score: components.holders,
                weight: normalize(weights.holders),
                reason: format!(
                    "{} concentration, {:.1}% sell-off exposure",
                    snapshot.holders.activity.concentration_risk.as_str(),
                    snapshot.holders.activity.sell_off_percent
                ),
            },
            ScoreFactor {
                name: "Contract security".to_string(),
                score: components.contract,
                weight: normalize(weights.contract),
                reason: format!(
                    "{} critical, {} high, {} medium findings",
                    snapshot.contract.critical_count,
                    snapshot.contract.high_count,
                    snapshot.contract.medium_count
                ),
            },
        ];

        let trust: f64 = breakdown
            .iter()
            .map(|f| f.score as f64 * f.weight)
            .sum::<f64>()
            .clamp(0.0, 100.0);

        let total = (100.0 - trust).round().clamp(0.0, 100.0) as u8;

        Self {
            total,
            level: RiskLevel::from_score(total),
            trust,
            components,
            breakdown,
        }
    }
}

/// `Score(snapshot, weights)`
pub fn score(snapshot: &TokenSnapshot, weights: &ScoringWeights) -> u8 {
    RiskScore::calculate(snapshot, weights).total
}
