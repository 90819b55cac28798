//! API Request/Response Types

use serde::{Deserialize, Serialize};

use crate::core::{BatchEntry, BatchReport, BatchStats, ScoreFactor, TierGroup, VettingReport};
use crate::core::age_gate::format_age_display;
use crate::models::{
    AppError, AuthorityStatus, Confidence, ConcentrationRisk, ContractRiskLevel, IneligibleReason,
    LpStatus, Provenance, TierDefinition, TierEvaluation, TokenSnapshot, Vulnerability,
};
use crate::utils::VettingStats;

/// API Response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
    pub latency_ms: f64,
    pub timestamp: i64,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T, latency_ms: f64) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            latency_ms,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }

    /// Structured negative outcome that still carries its result
    pub fn rejected(data: T, error: ApiError, latency_ms: f64) -> Self {
        Self {
            success: false,
            data: Some(data),
            error: Some(error),
            latency_ms,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

impl ApiResponse<()> {
    pub fn error(error: ApiError, latency_ms: f64) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            latency_ms,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

/// API Error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn too_young(message: impl Into<String>) -> Self {
        Self {
            code: "PROJECT_TOO_YOUNG".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn rate_limited(retry_after: u64) -> Self {
        Self {
            code: "API_RATE_LIMITED".to_string(),
            message: format!("Rate limit exceeded. Retry after {} seconds", retry_after),
            details: Some(serde_json::json!({ "retry_after": retry_after })),
        }
    }
}

impl From<&AppError> for ApiError {
    fn from(err: &AppError) -> Self {
        Self {
            code: err.code_str().to_string(),
            message: err.message.clone(),
            details: err.details.clone(),
        }
    }
}

// ============================================
// Requests
// ============================================

#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    #[serde(rename = "contractAddress")]
    pub contract_address: String,
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    #[serde(rename = "contractAddresses")]
    pub contract_addresses: Vec<String>,
}

// ============================================
// Single scan
// ============================================

/// Flattened snapshot projection returned as `metadata`
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenMetadataView {
    pub symbol: String,
    pub name: String,
    pub decimals: Option<u8>,
    pub total_supply: Option<f64>,

    pub project_age_days: f64,
    pub age_display: String,
    pub age_confidence: Confidence,

    pub liquidity_usd: f64,
    pub lp_status: LpStatus,
    pub lp_burned: bool,
    pub lp_locked: bool,
    pub lock_duration_months: Option<u32>,
    pub lock_contract: Option<String>,
    pub pair_address: Option<String>,
    pub dex_id: Option<String>,
    pub volume_24h_usd: f64,
    pub market_cap_usd: f64,

    pub holder_count: Option<u64>,
    pub top1_percent: f64,
    pub top5_percent: f64,
    pub whale_count: u32,
    pub concentration_risk: ConcentrationRisk,
    pub sell_off_percent: f64,
    pub affected_wallets_percent: f64,

    pub mint_authority: AuthorityStatus,
    pub freeze_authority: AuthorityStatus,
    pub security_score: u8,
    pub contract_risk_level: ContractRiskLevel,
    pub vulnerabilities: Vec<Vulnerability>,

    pub provenance: Provenance,
}

impl From<&TokenSnapshot> for TokenMetadataView {
    fn from(s: &TokenSnapshot) -> Self {
        Self {
            symbol: s.identity.symbol.clone(),
            name: s.identity.name.clone(),
            decimals: s.identity.decimals,
            total_supply: s.identity.total_supply,
            project_age_days: s.age.project_age_days,
            age_display: format_age_display(s.age.project_age_days),
            age_confidence: s.age.confidence,
            liquidity_usd: s.liquidity.liquidity_usd,
            lp_status: s.liquidity.lp_status,
            lp_burned: s.liquidity.burned,
            lp_locked: s.liquidity.locked,
            lock_duration_months: s.liquidity.lock_duration_months,
            lock_contract: s.liquidity.lock_contract.clone(),
            pair_address: s.liquidity.pair_address.clone(),
            dex_id: s.liquidity.dex_id.clone(),
            volume_24h_usd: s.liquidity.volume_24h_usd,
            market_cap_usd: s.liquidity.market_cap_usd,
            holder_count: s.holders.holder_count,
            top1_percent: s.holders.distribution.top1_percent,
            top5_percent: s.holders.distribution.top5_percent,
            whale_count: s.holders.distribution.whale_count,
            concentration_risk: s.holders.activity.concentration_risk,
            sell_off_percent: s.holders.activity.sell_off_percent,
            affected_wallets_percent: s.holders.activity.affected_wallets_percent,
            mint_authority: s.mint_authority.clone(),
            freeze_authority: s.freeze_authority.clone(),
            security_score: s.contract.security_score,
            contract_risk_level: s.contract.risk_level,
            vulnerabilities: s.contract.vulnerabilities.clone(),
            provenance: s.provenance.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScanData {
    pub scan_id: String,
    pub contract_address: String,
    pub eligible: bool,
    pub tier: Option<String>,
    pub risk_score: Option<u8>,
    pub risk_level: Option<String>,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<IneligibleReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_display: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_age_required: Option<u32>,
    pub degraded: bool,
    pub metadata: TokenMetadataView,
    pub score_breakdown: Vec<ScoreFactor>,
    pub tier_evaluations: Vec<TierEvaluation>,
}

impl From<&VettingReport> for ScanData {
    fn from(report: &VettingReport) -> Self {
        let c = &report.classification;
        let (age_display, minimum_age_required) = match &c.reason {
            Some(IneligibleReason::TooYoung {
                age_display,
                minimum_age_required,
                ..
            }) => (Some(age_display.clone()), Some(*minimum_age_required)),
            _ => (None, None),
        };
        Self {
            scan_id: report.scan_id.clone(),
            contract_address: report.address.clone(),
            eligible: c.eligible,
            tier: c.tier.clone(),
            risk_score: c.risk_score,
            risk_level: c.risk_level.map(|l| l.as_str().to_string()),
            summary: report.summary.clone(),
            reason: c.reason.clone(),
            age_display,
            minimum_age_required,
            degraded: report.degraded,
            metadata: TokenMetadataView::from(&report.snapshot),
            score_breakdown: report
                .score
                .as_ref()
                .map(|s| s.breakdown.clone())
                .unwrap_or_default(),
            tier_evaluations: c.evaluations.clone(),
        }
    }
}

// ============================================
// Batch scan
// ============================================

#[derive(Debug, Serialize, Deserialize)]
pub struct BatchItemData {
    pub index: usize,
    pub contract_address: String,
    pub status: String,
    pub eligible: bool,
    pub tier: Option<String>,
    pub risk_score: Option<u8>,
    pub risk_level: Option<String>,
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<IneligibleReason>,
    pub degraded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&BatchEntry> for BatchItemData {
    fn from(entry: &BatchEntry) -> Self {
        let report = entry.report.as_ref();
        let c = report.map(|r| &r.classification);
        Self {
            index: entry.index,
            contract_address: entry.address.clone(),
            status: entry.status.clone(),
            eligible: c.map(|c| c.eligible).unwrap_or(false),
            tier: c.and_then(|c| c.tier.clone()),
            risk_score: c.and_then(|c| c.risk_score),
            risk_level: c.and_then(|c| c.risk_level).map(|l| l.as_str().to_string()),
            summary: report.map(|r| r.summary.clone()),
            reason: c.and_then(|c| c.reason.clone()),
            degraded: report.map(|r| r.degraded).unwrap_or(false),
            error: entry.error.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BatchData {
    pub batch_id: String,
    pub total_requested: usize,
    pub results: Vec<BatchItemData>,
    pub stats: BatchStats,
    pub tiers: Vec<TierGroup>,
    pub processing_time_ms: f64,
}

impl From<&BatchReport> for BatchData {
    fn from(report: &BatchReport) -> Self {
        Self {
            batch_id: report.batch_id.clone(),
            total_requested: report.results.len(),
            results: report.results.iter().map(BatchItemData::from).collect(),
            stats: report.stats.clone(),
            tiers: report.tiers.clone(),
            processing_time_ms: report.processing_time_ms,
        }
    }
}

// ============================================
// Tiers / Health / Stats
// ============================================

#[derive(Debug, Serialize, Deserialize)]
pub struct TiersData {
    pub version: String,
    pub min_project_age_days: u32,
    pub tiers: Vec<TierDefinition>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub tier_config_version: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatsData {
    #[serde(flatten)]
    pub vetting: VettingStats,
    pub uptime_seconds: u64,
    pub api_version: String,
}
