//! Tier Classifier
//!
//! One canonical rules engine over the loaded tier table.
//!
//! `Unclassified -> Ineligible | Tier(T)`, decided once per snapshot:
//! 1. Age gate (global minimum) short-circuits to `TooYoung`.
//! 2. Every tier is evaluated in table order (least strict first) and the
//!    LAST match is kept.
//! 3. The matched tier's weights feed the risk score.

use std::sync::Arc;
use tracing::{debug, info};

use super::age_gate::AgeGate;
use super::risk_score::RiskScore;
use crate::models::{
    ClassificationResult, IneligibleReason, LpStatus, TierConfig, TierDefinition, TierEvaluation,
    TokenSnapshot,
};

#[derive(Debug, Clone)]
pub struct TierClassifier {
    tiers: Arc<TierConfig>,
    gate: AgeGate,
}

impl TierClassifier {
    pub fn new(tiers: Arc<TierConfig>) -> Self {
        let gate = AgeGate::new(tiers.min_project_age_days);
        Self { tiers, gate }
    }

    /// Raise the global minimum age (never lowers the table's own minimum)
    pub fn with_min_age(mut self, min_age_days: u32) -> Self {
        self.gate = AgeGate::new(self.gate.min_age_days.max(min_age_days));
        self
    }

    pub fn tiers(&self) -> &TierConfig {
        &self.tiers
    }

    pub fn min_age_days(&self) -> u32 {
        self.gate.min_age_days
    }

    /// Check every clause of one tier; failures are human-readable
    pub fn evaluate_tier(tier: &TierDefinition, snapshot: &TokenSnapshot) -> TierEvaluation {
        let criteria = &tier.criteria;
        let mut failures = Vec::new();

        let age = snapshot.age.project_age_days;
        if !criteria.project_age_days.contains(age) {
            failures.push(format!(
                "project age {:.1} days not in {}",
                age,
                criteria.project_age_days.describe()
            ));
        }

        let lp_usd = snapshot.liquidity.liquidity_usd;
        if !criteria.lp_amount_usd.contains(lp_usd) {
            failures.push(format!(
                "liquidity ${:.0} not in {}",
                lp_usd,
                criteria.lp_amount_usd.describe()
            ));
        }

        if !criteria.lp_lock_months.is_unbounded() {
            match (snapshot.liquidity.lp_status, snapshot.liquidity.lock_duration_months) {
                // Burned LP is permanent and satisfies any lock range
                (LpStatus::Burned, _) => {}
                (LpStatus::Locked, Some(months)) if criteria.lp_lock_months.contains(months as f64) => {}
                (LpStatus::Locked, Some(months)) => failures.push(format!(
                    "LP lock {} months not in {}",
                    months,
                    criteria.lp_lock_months.describe()
                )),
                (status, _) => failures.push(format!(
                    "LP lock required ({}), LP is {:?}",
                    criteria.lp_lock_months.describe(),
                    status
                )),
            }
        }

        let wallets = &criteria.wallet_activity;
        let holders = &snapshot.holders;
        match holders.holder_count {
            Some(count) => {
                if count < wallets.min_active_wallets {
                    failures.push(format!(
                        "{} holders below minimum {}",
                        count, wallets.min_active_wallets
                    ));
                }
                if let Some(max) = wallets.max_active_wallets {
                    if count > max {
                        failures.push(format!("{} holders above maximum {}", count, max));
                    }
                }
            }
            None if wallets.min_active_wallets > 0 || wallets.max_active_wallets.is_some() => {
                failures.push("holder count unknown".to_string());
            }
            None => {}
        }
        if holders.distribution.top1_percent > wallets.max_top_holder_percent {
            failures.push(format!(
                "top holder {:.1}% above {}%",
                holders.distribution.top1_percent, wallets.max_top_holder_percent
            ));
        }
        if holders.activity.sell_off_percent > wallets.flag_sell_off_over {
            failures.push(format!(
                "sell-off exposure {:.1}% above {}%",
                holders.activity.sell_off_percent, wallets.flag_sell_off_over
            ));
        }
        if holders.activity.affected_wallets_percent > wallets.flag_affected_wallets_over {
            failures.push(format!(
                "affected wallets {:.1}% above {}%",
                holders.activity.affected_wallets_percent, wallets.flag_affected_wallets_over
            ));
        }

        let limits = &criteria.contract_risk;
        let contract = &snapshot.contract;
        let counts = [
            ("critical", contract.critical_count, limits.max_critical),
            ("high", contract.high_count, limits.max_high),
            ("medium", contract.medium_count, limits.max_medium),
        ];
        for (label, count, max) in counts {
            if count > max {
                failures.push(format!("{} {} findings above maximum {}", count, label, max));
            }
        }
        // Absent audit data never fails a tier
        if limits.require_full_audit && contract.has_full_audit == Some(false) {
            failures.push("full audit required".to_string());
        }
        if limits.require_bug_bounty && contract.has_bug_bounty == Some(false) {
            failures.push("bug bounty required".to_string());
        }

        TierEvaluation {
            tier: tier.name.clone(),
            matched: failures.is_empty(),
            failures,
        }
    }

    /// Classification plus the score breakdown when a tier matched
    pub fn classify_with_score(&self, snapshot: &TokenSnapshot) -> (ClassificationResult, Option<RiskScore>) {
        if let Some(reason) = self.gate.check(&snapshot.age) {
            info!(
                address = %snapshot.address,
                age_days = snapshot.age.project_age_days,
                "⏳ Too young: {}",
                reason.message()
            );
            return (
                ClassificationResult {
                    eligible: false,
                    tier: None,
                    risk_score: None,
                    risk_level: None,
                    reason: Some(reason),
                    evaluations: Vec::new(),
                    provenance: snapshot.provenance.clone(),
                },
                None,
            );
        }

        let evaluations: Vec<TierEvaluation> = self
            .tiers
            .tiers
            .iter()
            .map(|tier| Self::evaluate_tier(tier, snapshot))
            .collect();

        for eval in evaluations.iter().filter(|e| !e.matched) {
            debug!(tier = %eval.tier, failures = ?eval.failures, "Tier not matched");
        }

        let matched = evaluations
            .iter()
            .rposition(|e| e.matched)
            .map(|idx| &self.tiers.tiers[idx]);

        match matched {
            Some(tier) => {
                let score = RiskScore::calculate(snapshot, &tier.weights);
                info!(
                    address = %snapshot.address,
                    tier = %tier.name,
                    risk_score = score.total,
                    "{} Classified as {} ({})",
                    score.level.emoji(),
                    tier.name,
                    score.level.as_str()
                );
                (
                    ClassificationResult {
                        eligible: true,
                        tier: Some(tier.name.clone()),
                        risk_score: Some(score.total),
                        risk_level: Some(score.level),
                        reason: None,
                        evaluations,
                        provenance: snapshot.provenance.clone(),
                    },
                    Some(score),
                )
            }
            None => {
                info!(address = %snapshot.address, "🚫 No tier matched");
                (
                    ClassificationResult {
                        eligible: false,
                        tier: None,
                        risk_score: None,
                        risk_level: None,
                        reason: Some(IneligibleReason::NoTierMatch),
                        evaluations,
                        provenance: snapshot.provenance.clone(),
                    },
                    None,
                )
            }
        }
    }

    pub fn classify(&self, snapshot: &TokenSnapshot) -> ClassificationResult {
        self.classify_with_score(snapshot).0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::{snapshot_aged, snapshot_fixture};
    use crate::models::{Holder, RiskLevel};
    use crate::core::holders::analyze_holders;

    fn classifier() -> TierClassifier {
        TierClassifier::new(Arc::new(TierConfig::embedded().unwrap()))
    }

    #[test]
    fn test_strictest_tier_wins() {
        let result = classifier().classify(&snapshot_fixture());
        assert!(result.eligible);
        assert_eq!(result.tier.as_deref(), Some("Stellar"));
        assert_eq!(result.risk_level, Some(RiskLevel::Low));
        assert!(result.evaluations.iter().all(|e| e.matched));
    }

    #[test]
    fn test_deterministic() {
        let c = classifier();
        let snapshot = snapshot_fixture();
        assert_eq!(c.classify(&snapshot), c.classify(&snapshot));
    }

    #[test]
    fn test_too_young_short_circuits() {
        let result = classifier().classify(&snapshot_aged(10.0));
        assert!(!result.eligible);
        assert!(result.evaluations.is_empty());
        match result.reason {
            Some(IneligibleReason::TooYoung { ref age_display, minimum_age_required, .. }) => {
                assert_eq!(age_display, "10 days");
                assert_eq!(minimum_age_required, 14);
            }
            ref other => panic!("unexpected reason {:?}", other),
        }
    }

    #[test]
    fn test_min_age_override_only_raises() {
        let c = classifier().with_min_age(30);
        assert_eq!(c.min_age_days(), 30);
        assert!(!c.classify(&snapshot_aged(20.0)).eligible);
        assert_eq!(classifier().with_min_age(7).min_age_days(), 14);
    }

    #[test]
    fn test_concentrated_holder_fails_capped_tiers() {
        let mut snapshot = snapshot_fixture();
        let mut holders = vec![Holder::new("Whale1xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRu", 60.0)];
        for i in 0..8 {
            holders.push(Holder::new(format!("Wallet{}xKXtg2CW87d97TXJSDpbD5jBkheTqA83T", i), 5.0));
        }
        snapshot.holders = analyze_holders(holders, Some(100_000));

        let result = classifier().classify(&snapshot);
        assert!(!result.eligible);
        assert_eq!(result.reason, Some(IneligibleReason::NoTierMatch));
        for eval in &result.evaluations {
            assert!(eval.failures.iter().any(|f| f.starts_with("top holder 60.0%")));
        }
    }

    #[test]
    fn test_unknown_holder_count_fails_bounded_tiers() {
        let mut snapshot = snapshot_fixture();
        snapshot.holders.holder_count = None;

        let result = classifier().classify(&snapshot);
        assert!(!result.eligible);
        assert_eq!(result.reason, Some(IneligibleReason::NoTierMatch));
        for eval in &result.evaluations {
            assert!(eval.failures.iter().any(|f| f == "holder count unknown"));
            assert!(!eval.failures.iter().any(|f| f.contains("below minimum")));
        }
    }

    #[test]
    fn test_explicit_false_audit_fails_but_absent_passes() {
        let mut snapshot = snapshot_fixture();
        snapshot.contract.has_bug_bounty = None;
        assert_eq!(classifier().classify(&snapshot).tier.as_deref(), Some("Stellar"));

        snapshot.contract.has_bug_bounty = Some(false);
        let result = classifier().classify(&snapshot);
        assert_eq!(result.tier.as_deref(), Some("Sprout"));
        let bloom = result.evaluations.iter().find(|e| e.tier == "Bloom").unwrap();
        assert_eq!(bloom.failures, vec!["bug bounty required".to_string()]);
    }

    #[test]
    fn test_unlocked_lp_fails_lock_range() {
        let mut snapshot = snapshot_fixture();
        snapshot.liquidity.lp_status = LpStatus::Distributed;
        snapshot.liquidity.burned = false;
        let result = classifier().classify(&snapshot);
        // Seed has no lock requirement
        assert_eq!(result.tier.as_deref(), Some("Seed"));
    }

    #[test]
    fn test_short_lock_limits_tier() {
        let mut snapshot = snapshot_fixture();
        snapshot.liquidity.lp_status = LpStatus::Locked;
        snapshot.liquidity.burned = false;
        snapshot.liquidity.locked = true;
        snapshot.liquidity.lock_duration_months = Some(6);
        assert_eq!(classifier().classify(&snapshot).tier.as_deref(), Some("Bloom"));
    }

    #[test]
    fn test_score_bounds() {
        let (result, score) = classifier().classify_with_score(&snapshot_fixture());
        let score = score.unwrap();
        assert_eq!(result.risk_score, Some(score.total));
        assert!(score.total <= 100);
    }
}
