//! Type definitions for the vetting pipeline
//! All core data structures shared by providers, analyzers and the API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================
// PROVENANCE
// ============================================

/// How a value was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    /// Observed directly from a provider
    Verified,
    /// Derived from a heuristic or a partial observation
    Estimated,
    /// Nothing usable was observed; value is a tagged placeholder
    Unknown,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Verified => "verified",
            Confidence::Estimated => "estimated",
            Confidence::Unknown => "unknown",
        }
    }
}

/// Upstream provider (or fallback level) that produced a facet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    SolanaRpc,
    HeliusDas,
    DexScreener,
    Solscan,
    Raydium,
    RugCheck,
    KnownTokenTable,
    MarketHeuristic,
    Synthetic,
    Default,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::SolanaRpc => "solana_rpc",
            DataSource::HeliusDas => "helius_das",
            DataSource::DexScreener => "dexscreener",
            DataSource::Solscan => "solscan",
            DataSource::Raydium => "raydium",
            DataSource::RugCheck => "rugcheck",
            DataSource::KnownTokenTable => "known_token_table",
            DataSource::MarketHeuristic => "market_heuristic",
            DataSource::Synthetic => "synthetic",
            DataSource::Default => "default",
        }
    }
}

/// Provenance of a single facet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetProvenance {
    pub source: DataSource,
    pub confidence: Confidence,
    /// 0 = first provider in the chain answered
    pub fallback_depth: u8,
    /// One entry per provider that failed before `source` answered
    pub failures: Vec<String>,
}

impl FacetProvenance {
    pub fn new(
        source: DataSource,
        confidence: Confidence,
        fallback_depth: u8,
        failures: Vec<String>,
    ) -> Self {
        Self {
            source,
            confidence,
            fallback_depth,
            failures,
        }
    }

    /// Placeholder provenance for an exhausted chain
    pub fn unknown(failures: Vec<String>) -> Self {
        let depth = failures.len().min(u8::MAX as usize) as u8;
        Self::new(DataSource::Default, Confidence::Unknown, depth, failures)
    }

    pub fn is_degraded(&self) -> bool {
        self.fallback_depth > 0 || self.confidence == Confidence::Unknown
    }

    pub fn is_unknown(&self) -> bool {
        self.confidence == Confidence::Unknown
    }
}

/// Per-facet provenance attached to every snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    pub metadata: FacetProvenance,
    pub age: FacetProvenance,
    pub holders: FacetProvenance,
    pub liquidity: FacetProvenance,
    pub audit: FacetProvenance,
}

impl Provenance {
    /// Degraded when any data facet fell back or stayed unknown.
    /// The audit signal is optional and never degrades a snapshot.
    pub fn is_degraded(&self) -> bool {
        self.metadata.is_degraded()
            || self.age.is_degraded()
            || self.holders.is_degraded()
            || self.liquidity.is_degraded()
    }
}

// ============================================
// IDENTITY & AUTHORITIES
// ============================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenIdentity {
    pub symbol: String,
    pub name: String,
    pub decimals: Option<u8>,
    /// Total supply in UI units (already divided by 10^decimals)
    pub total_supply: Option<f64>,
}

impl TokenIdentity {
    pub fn placeholder() -> Self {
        Self {
            symbol: "UNKNOWN".to_string(),
            name: "Unknown Token".to_string(),
            decimals: None,
            total_supply: None,
        }
    }

    pub fn has_placeholder_name(&self) -> bool {
        self.symbol == "UNKNOWN" || self.name == "Unknown Token"
    }
}

/// Mint/freeze authority state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "address", rename_all = "snake_case")]
pub enum AuthorityStatus {
    Revoked,
    Active(String),
    Unknown,
}

impl AuthorityStatus {
    pub fn from_option(address: Option<String>) -> Self {
        match address {
            Some(addr) if !addr.is_empty() => AuthorityStatus::Active(addr),
            _ => AuthorityStatus::Revoked,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, AuthorityStatus::Active(_))
    }
}

// ============================================
// AGE
// ============================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenAge {
    pub created_at: Option<DateTime<Utc>>,
    /// Never negative; fractional for sub-day precision
    pub project_age_days: f64,
    pub confidence: Confidence,
}

impl TokenAge {
    pub fn from_created_at(created_at: DateTime<Utc>, now: DateTime<Utc>, confidence: Confidence) -> Self {
        let seconds = (now - created_at).num_seconds().max(0) as f64;
        Self {
            created_at: Some(created_at),
            project_age_days: seconds / 86_400.0,
            confidence,
        }
    }

    pub fn estimated_days(days: f64) -> Self {
        Self {
            created_at: None,
            project_age_days: days.max(0.0),
            confidence: Confidence::Estimated,
        }
    }

    pub fn unknown(default_days: f64) -> Self {
        Self {
            created_at: None,
            project_age_days: default_days.max(0.0),
            confidence: Confidence::Unknown,
        }
    }
}

// ============================================
// LIQUIDITY
// ============================================

/// Outcome of the LP lock/burn detector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LpStatus {
    Burned,
    Locked,
    Distributed,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiquidityInfo {
    pub liquidity_usd: f64,
    /// None when burned (permanent) or when no lock was detected
    pub lock_duration_months: Option<u32>,
    pub burned: bool,
    pub locked: bool,
    pub lock_contract: Option<String>,
    pub lp_status: LpStatus,
    pub pair_address: Option<String>,
    pub dex_id: Option<String>,
    pub lp_mint: Option<String>,
    pub volume_24h_usd: f64,
    pub market_cap_usd: f64,
    pub pool_count: u32,
}

impl LiquidityInfo {
    pub fn unknown() -> Self {
        Self {
            liquidity_usd: 0.0,
            lock_duration_months: None,
            burned: false,
            locked: false,
            lock_contract: None,
            lp_status: LpStatus::Unknown,
            pair_address: None,
            dex_id: None,
            lp_mint: None,
            volume_24h_usd: 0.0,
            market_cap_usd: 0.0,
            pool_count: 0,
        }
    }
}

// ============================================
// HOLDERS
// ============================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holder {
    pub address: String,
    pub amount: f64,
}

impl Holder {
    pub fn new(address: impl Into<String>, amount: f64) -> Self {
        Self {
            address: address.into(),
            amount,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConcentrationRisk {
    Low,
    Medium,
    High,
    VeryHigh,
    Unknown,
}

impl ConcentrationRisk {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConcentrationRisk::Low => "low",
            ConcentrationRisk::Medium => "medium",
            ConcentrationRisk::High => "high",
            ConcentrationRisk::VeryHigh => "very_high",
            ConcentrationRisk::Unknown => "unknown",
        }
    }
}

/// Percentages are 0-100
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DistributionMetrics {
    pub top1_percent: f64,
    pub top5_percent: f64,
    pub whale_count: u32,
    pub whale_concentration_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuspiciousActivity {
    pub sell_off_percent: f64,
    pub affected_wallets_percent: f64,
    pub suspicious_wallets: u32,
    pub concentration_risk: ConcentrationRisk,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HolderInfo {
    /// Sorted descending by amount
    pub holders: Vec<Holder>,
    /// Total holder count reported upstream; `None` when no provider reports a total
    pub holder_count: Option<u64>,
    pub distribution: DistributionMetrics,
    pub activity: SuspiciousActivity,
}

// ============================================
// CONTRACT RISK
// ============================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vulnerability {
    pub severity: Severity,
    pub title: String,
    pub detail: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractRiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractRisk {
    pub critical_count: u32,
    pub high_count: u32,
    pub medium_count: u32,
    pub authority_risk: ContractRiskLevel,
    /// None = not reported; only an explicit `false` can fail a tier
    pub has_full_audit: Option<bool>,
    pub has_bug_bounty: Option<bool>,
    pub internal_score: u8,
    pub external_score: Option<u8>,
    /// Composite 0-100, higher is safer
    pub security_score: u8,
    pub risk_level: ContractRiskLevel,
    pub vulnerabilities: Vec<Vulnerability>,
}

// ============================================
// SNAPSHOT
// ============================================

/// Unit of work: assembled fresh per request, never mutated afterwards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenSnapshot {
    pub address: String,
    pub identity: TokenIdentity,
    pub mint_authority: AuthorityStatus,
    pub freeze_authority: AuthorityStatus,
    pub age: TokenAge,
    pub liquidity: LiquidityInfo,
    pub holders: HolderInfo,
    pub contract: ContractRisk,
    pub provenance: Provenance,
    pub degraded: bool,
    pub fetched_at: DateTime<Utc>,
}

impl TokenSnapshot {
    /// Every data facet exhausted its chain
    pub fn is_fully_unknown(&self) -> bool {
        self.provenance.metadata.is_unknown()
            && self.provenance.age.is_unknown()
            && self.provenance.holders.is_unknown()
            && self.provenance.liquidity.is_unknown()
    }
}

// ============================================
// CLASSIFICATION
// ============================================

/// Final risk bucket (0 = safest)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(rename = "Low Risk")]
    Low,
    #[serde(rename = "Medium Risk")]
    Medium,
    #[serde(rename = "High Risk")]
    High,
    #[serde(rename = "Critical Risk")]
    Critical,
}

impl RiskLevel {
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=25 => RiskLevel::Low,
            26..=50 => RiskLevel::Medium,
            51..=75 => RiskLevel::High,
            _ => RiskLevel::Critical,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low Risk",
            RiskLevel::Medium => "Medium Risk",
            RiskLevel::High => "High Risk",
            RiskLevel::Critical => "Critical Risk",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            RiskLevel::Low => "✅",
            RiskLevel::Medium => "🟡",
            RiskLevel::High => "🔴",
            RiskLevel::Critical => "💀",
        }
    }
}

/// Result of checking one tier's clauses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierEvaluation {
    pub tier: String,
    pub matched: bool,
    /// Human-readable failed clauses; empty when matched
    pub failures: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IneligibleReason {
    TooYoung {
        project_age_days: f64,
        age_display: String,
        minimum_age_required: u32,
        age_confidence: Confidence,
    },
    NoTierMatch,
}

impl IneligibleReason {
    pub fn message(&self) -> String {
        match self {
            IneligibleReason::TooYoung {
                age_display,
                minimum_age_required,
                ..
            } => format!(
                "Project is too young: {} old, minimum age is {} days",
                age_display, minimum_age_required
            ),
            IneligibleReason::NoTierMatch => {
                "Token does not satisfy the criteria of any tier".to_string()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub eligible: bool,
    pub tier: Option<String>,
    pub risk_score: Option<u8>,
    pub risk_level: Option<RiskLevel>,
    pub reason: Option<IneligibleReason>,
    pub evaluations: Vec<TierEvaluation>,
    pub provenance: Provenance,
}
