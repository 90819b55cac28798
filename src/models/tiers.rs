//! Tier configuration
//!
//! The tier table is data, not code: it is loaded once (embedded default or
//! `TIER_CONFIG_PATH`), validated, and then shared read-only behind an `Arc`.
//! Nothing in the classifier mutates it.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

use super::errors::{AppError, AppResult};

/// Embedded default tier table
const EMBEDDED_TIERS: &str = include_str!("../../config/tiers.json");

/// Inclusive numeric range; a missing side is unbounded
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl Bounds {
    pub fn at_least(min: f64) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }

    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    pub fn describe(&self) -> String {
        match (self.min, self.max) {
            (Some(min), Some(max)) => format!("{}..={}", min, max),
            (Some(min), None) => format!(">= {}", min),
            (None, Some(max)) => format!("<= {}", max),
            (None, None) => "any".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletActivityCriteria {
    pub min_active_wallets: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_active_wallets: Option<u64>,
    pub max_top_holder_percent: f64,
    /// Fails when the sell-off percentage is strictly above this
    pub flag_sell_off_over: f64,
    /// Fails when the affected-wallet percentage is strictly above this
    pub flag_affected_wallets_over: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractCriteria {
    pub max_critical: u32,
    pub max_high: u32,
    pub max_medium: u32,
    #[serde(default)]
    pub require_full_audit: bool,
    #[serde(default)]
    pub require_bug_bounty: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierCriteria {
    pub project_age_days: Bounds,
    pub lp_amount_usd: Bounds,
    #[serde(default)]
    pub lp_lock_months: Bounds,
    pub wallet_activity: WalletActivityCriteria,
    pub contract_risk: ContractCriteria,
}

/// Relative weight of each sub-score in the trust blend
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub liquidity: f64,
    pub lock: f64,
    pub holders: f64,
    pub contract: f64,
}

impl ScoringWeights {
    pub fn total(&self) -> f64 {
        self.liquidity + self.lock + self.holders + self.contract
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            liquidity: 0.25,
            lock: 0.25,
            holders: 0.25,
            contract: 0.25,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierDefinition {
    pub name: String,
    /// Higher rank = stricter tier
    pub rank: u32,
    #[serde(default)]
    pub description: String,
    pub criteria: TierCriteria,
    #[serde(default)]
    pub weights: ScoringWeights,
}

/// Ordered tier table, least strict first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierConfig {
    pub version: String,
    pub min_project_age_days: u32,
    pub tiers: Vec<TierDefinition>,
}

impl TierConfig {
    /// The table compiled into the binary
    pub fn embedded() -> AppResult<Self> {
        Self::from_json_str(EMBEDDED_TIERS)
    }

    pub fn from_path(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::config_invalid(format!(
                "Failed to read tier config {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json_str(&raw)
    }

    /// `TIER_CONFIG_PATH` when set, otherwise the embedded table
    pub fn load(path: Option<&str>) -> AppResult<Self> {
        let config = match path {
            Some(p) if !p.trim().is_empty() => {
                info!("📋 Loading tier config from {}", p);
                Self::from_path(p)?
            }
            _ => Self::embedded()?,
        };
        info!(
            "📋 Tier config v{} loaded: {} tiers, minimum age {} days",
            config.version,
            config.tiers.len(),
            config.min_project_age_days
        );
        Ok(config)
    }

    pub fn from_json_str(raw: &str) -> AppResult<Self> {
        let config: TierConfig = serde_json::from_str(raw)
            .map_err(|e| AppError::config_invalid(format!("Invalid tier config JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.tiers.is_empty() {
            return Err(AppError::config_invalid("Tier config defines no tiers"));
        }

        let mut seen = HashSet::new();
        let mut last_rank = 0u32;
        for tier in &self.tiers {
            if tier.name.trim().is_empty() {
                return Err(AppError::config_invalid("Tier with empty name"));
            }
            if !seen.insert(tier.name.as_str()) {
                return Err(AppError::config_invalid(format!(
                    "Duplicate tier name: {}",
                    tier.name
                )));
            }
            if tier.rank < last_rank {
                return Err(AppError::config_invalid(format!(
                    "Tier {} is out of order (rank {} after {})",
                    tier.name, tier.rank, last_rank
                )));
            }
            last_rank = tier.rank;

            let w = &tier.weights;
            if [w.liquidity, w.lock, w.holders, w.contract]
                .iter()
                .any(|v| !v.is_finite() || *v < 0.0)
                || w.total() <= 0.0
            {
                return Err(AppError::config_invalid(format!(
                    "Tier {} has invalid scoring weights",
                    tier.name
                )));
            }

            for (label, bounds) in [
                ("project_age_days", &tier.criteria.project_age_days),
                ("lp_amount_usd", &tier.criteria.lp_amount_usd),
                ("lp_lock_months", &tier.criteria.lp_lock_months),
            ] {
                if let (Some(min), Some(max)) = (bounds.min, bounds.max) {
                    if min > max {
                        return Err(AppError::config_invalid(format!(
                            "Tier {} has empty {} range",
                            tier.name, label
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&TierDefinition> {
        self.tiers.iter().find(|t| t.name == name)
    }

    /// Tier names, most strict first
    pub fn names_strictest_first(&self) -> Vec<String> {
        self.tiers.iter().rev().map(|t| t.name.clone()).collect()
    }
}
