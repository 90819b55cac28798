//! Liquidity Lock/Burn Detector
//!
//! Reads the pool's LP-token holder list. First match wins:
//! burn address > lock registry > >90% unregistered holder > distributed.
//! With no LP data the outcome is `Unknown`; nothing is assumed.

use serde::{Deserialize, Serialize};

use crate::models::{Holder, LiquidityInfo, LpStatus};
use crate::utils::constants::{
    find_lock_contract, is_burn_address, DEFAULT_UNKNOWN_LOCK_MONTHS,
    LP_LOCK_CONCENTRATION_PERCENT, UNKNOWN_LOCK_CONTRACT,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LpLockOutcome {
    pub status: LpStatus,
    pub lock_duration_months: Option<u32>,
    pub lock_contract: Option<String>,
}

impl LpLockOutcome {
    pub fn unknown() -> Self {
        Self {
            status: LpStatus::Unknown,
            lock_duration_months: None,
            lock_contract: None,
        }
    }

    /// Copy the verdict onto a liquidity facet
    pub fn apply(self, info: &mut LiquidityInfo) {
        info.burned = self.status == LpStatus::Burned;
        info.locked = self.status == LpStatus::Locked;
        info.lp_status = self.status;
        info.lock_duration_months = self.lock_duration_months;
        info.lock_contract = self.lock_contract;
    }
}

/// `total_supply` falls back to the sum of the listed holders
pub fn detect_lp_lock(holders: &[Holder], total_supply: Option<f64>) -> LpLockOutcome {
    let top = match holders
        .iter()
        .filter(|h| h.amount > 0.0)
        .max_by(|a, b| {
            a.amount
                .partial_cmp(&b.amount)
                .unwrap_or(std::cmp::Ordering::Equal)
        }) {
        Some(top) => top,
        None => return LpLockOutcome::unknown(),
    };

    if is_burn_address(&top.address) {
        return LpLockOutcome {
            status: LpStatus::Burned,
            lock_duration_months: None,
            lock_contract: None,
        };
    }

    if let Some(lock) = find_lock_contract(&top.address) {
        return LpLockOutcome {
            status: LpStatus::Locked,
            lock_duration_months: Some(lock.default_lock_months),
            lock_contract: Some(lock.name.to_string()),
        };
    }

    let listed: f64 = holders.iter().map(|h| h.amount.max(0.0)).sum();
    let supply = total_supply.filter(|s| *s > 0.0).unwrap_or(listed);
    let top_share = if supply > 0.0 {
        top.amount / supply * 100.0
    } else {
        0.0
    };

    if top_share > LP_LOCK_CONCENTRATION_PERCENT {
        return LpLockOutcome {
            status: LpStatus::Locked,
            lock_duration_months: Some(DEFAULT_UNKNOWN_LOCK_MONTHS),
            lock_contract: Some(UNKNOWN_LOCK_CONTRACT.to_string()),
        };
    }

    LpLockOutcome {
        status: LpStatus::Distributed,
        lock_duration_months: None,
        lock_contract: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burned() {
        let holders = vec![
            Holder::new("1nc1nerator11111111111111111111111111111111", 990.0),
            Holder::new("SomeWallet1xKXtg2CW87d97TXJSDpbD5jBkheTqA8", 10.0),
        ];
        let outcome = detect_lp_lock(&holders, None);
        assert_eq!(outcome.status, LpStatus::Burned);
        assert!(outcome.lock_duration_months.is_none());
    }

    #[test]
    fn test_registry_lock() {
        let holders = vec![Holder::new("strmRqUCoQUgGUan5YhzUZa6KqdzwX5L6FpUxfmKg5m", 400.0)];
        let outcome = detect_lp_lock(&holders, Some(1000.0));
        assert_eq!(outcome.status, LpStatus::Locked);
        assert_eq!(outcome.lock_contract.as_deref(), Some("Streamflow"));
        assert_eq!(outcome.lock_duration_months, Some(12));
    }

    #[test]
    fn test_unregistered_concentrated_holder_is_conservative_lock() {
        let holders = vec![
            Holder::new("Vau1tHolderxKXtg2CW87d97TXJSDpbD5jBkheTqA8", 95.0),
            Holder::new("SomeWallet1xKXtg2CW87d97TXJSDpbD5jBkheTqA8", 5.0),
        ];
        let outcome = detect_lp_lock(&holders, None);
        assert_eq!(outcome.status, LpStatus::Locked);
        assert_eq!(outcome.lock_duration_months, Some(3));
        assert_eq!(outcome.lock_contract.as_deref(), Some("unknown"));
    }

    #[test]
    fn test_reported_supply_dilutes_share() {
        let holders = vec![Holder::new("Vau1tHolderxKXtg2CW87d97TXJSDpbD5jBkheTqA8", 95.0)];
        let outcome = detect_lp_lock(&holders, Some(200.0));
        assert_eq!(outcome.status, LpStatus::Distributed);
    }

    #[test]
    fn test_no_data_is_unknown() {
        let outcome = detect_lp_lock(&[], None);
        assert_eq!(outcome, LpLockOutcome::unknown());

        let mut info = LiquidityInfo::unknown();
        info.burned = true;
        outcome.apply(&mut info);
        assert!(!info.burned);
        assert!(!info.locked);
        assert_eq!(info.lp_status, LpStatus::Unknown);
    }
}
