//! Vetting Pipeline
//!
//! validate -> aggregate -> age gate -> tier classification -> risk score.
//! One fresh snapshot per address; batches fan out one pipeline per address
//! with bounded concurrency and never abort on a single failure.

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::aggregator::DataAggregator;
use super::classifier::TierClassifier;
use super::risk_score::RiskScore;
use crate::models::{
    AppError, AppResult, ClassificationResult, IneligibleReason, TierConfig, TokenSnapshot,
    VettingConfig,
};
use crate::providers::SourceSet;
use crate::utils::{invalid_indices, is_valid_address, short_address, VettingTelemetry};

// ============================================
// REPORT TYPES
// ============================================

/// Outcome of vetting one address
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VettingReport {
    pub scan_id: String,
    pub address: String,
    pub summary: String,
    pub classification: ClassificationResult,
    /// Present only when a tier matched
    pub score: Option<RiskScore>,
    pub snapshot: TokenSnapshot,
    pub degraded: bool,
    pub latency_ms: f64,
    pub vetted_at: DateTime<Utc>,
}

impl VettingReport {
    pub fn eligible(&self) -> bool {
        self.classification.eligible
    }

    pub fn is_too_young(&self) -> bool {
        matches!(self.classification.reason, Some(IneligibleReason::TooYoung { .. }))
    }
}

/// One entry of a batch: a report or an isolated failure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchEntry {
    pub index: usize,
    pub address: String,
    /// "success" | "error"
    pub status: String,
    pub report: Option<VettingReport>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchStats {
    pub total: usize,
    pub eligible: usize,
    pub too_young: usize,
    pub no_tier_match: usize,
    pub failed: usize,
    pub degraded: usize,
    /// Mean risk score over eligible tokens
    pub average_eligible_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierMember {
    pub address: String,
    pub symbol: String,
    pub risk_score: u8,
}

/// Eligible tokens of one tier, riskiest first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierGroup {
    pub tier: String,
    pub tokens: Vec<TierMember>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub batch_id: String,
    pub results: Vec<BatchEntry>,
    pub stats: BatchStats,
    /// Strictest tier first
    pub tiers: Vec<TierGroup>,
    pub processing_time_ms: f64,
}

// ============================================
// PIPELINE
// ============================================

#[derive(Clone)]
pub struct VettingPipeline {
    aggregator: DataAggregator,
    classifier: TierClassifier,
    config: Arc<VettingConfig>,
    telemetry: Arc<VettingTelemetry>,
}

impl VettingPipeline {
    pub fn new(config: VettingConfig, tiers: Arc<TierConfig>, sources: SourceSet) -> Self {
        let config = Arc::new(config);
        let classifier = TierClassifier::new(tiers).with_min_age(config.min_age_days);
        Self {
            aggregator: DataAggregator::new(sources, config.clone()),
            classifier,
            config,
            telemetry: Arc::new(VettingTelemetry::new()),
        }
    }

    /// Production wiring: tier table from `TIER_CONFIG_PATH` or embedded
    pub fn from_config(config: VettingConfig) -> AppResult<Self> {
        let tiers = TierConfig::load(config.tier_config_path.as_deref())?;
        let sources = SourceSet::from_config(&config)
            .map_err(|e| AppError::config_invalid(format!("Failed to build providers: {}", e)))?;
        Ok(Self::new(config, Arc::new(tiers), sources))
    }

    pub fn with_telemetry(mut self, telemetry: Arc<VettingTelemetry>) -> Self {
        self.telemetry = telemetry;
        self
    }

    pub fn telemetry(&self) -> Arc<VettingTelemetry> {
        self.telemetry.clone()
    }

    pub fn tiers(&self) -> &TierConfig {
        self.classifier.tiers()
    }

    pub fn config(&self) -> &VettingConfig {
        &self.config
    }

    /// Vet one address. Only a malformed address is an error.
    pub async fn vet(&self, address: &str) -> AppResult<VettingReport> {
        let address = address.trim();
        if !is_valid_address(address) {
            self.telemetry.record_invalid();
            return Err(AppError::invalid_address(address));
        }
        Ok(self.vet_validated(address).await)
    }

    async fn vet_validated(&self, address: &str) -> VettingReport {
        let start = Instant::now();
        let (snapshot, degraded) = self.aggregator.aggregate(address).await;

        let (classification, score) = self.classifier.classify_with_score(&snapshot);
        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;

        if snapshot.is_fully_unknown() {
            self.telemetry.record_upstream_unavailable();
        }
        self.telemetry
            .record_result(&classification, degraded, latency_ms as u64);

        let summary = summarize(&snapshot, &classification);
        info!("🧾 {} ({:.0}ms)", summary, latency_ms);

        VettingReport {
            scan_id: Uuid::new_v4().to_string(),
            address: address.to_string(),
            summary,
            classification,
            score,
            snapshot,
            degraded,
            latency_ms,
            vetted_at: Utc::now(),
        }
    }

    /// Vet up to `max_batch_size` addresses. The batch is rejected before any
    /// upstream call when it is empty, too large, or has a malformed entry.
    pub async fn vet_batch(&self, addresses: &[String]) -> AppResult<BatchReport> {
        let start = Instant::now();

        if addresses.is_empty() {
            self.telemetry.record_invalid();
            return Err(AppError::empty_batch());
        }
        if addresses.len() > self.config.max_batch_size {
            self.telemetry.record_invalid();
            return Err(AppError::batch_too_large(self.config.max_batch_size));
        }
        let invalid = invalid_indices(addresses);
        if !invalid.is_empty() {
            warn!("🚫 Batch rejected, malformed entries at {:?}", invalid);
            self.telemetry.record_invalid();
            return Err(AppError::invalid_batch(invalid));
        }

        info!("📦 Vetting batch of {} addresses", addresses.len());

        let semaphore = Arc::new(Semaphore::new(self.config.batch_concurrency.max(1)));
        let handles: Vec<_> = addresses
            .iter()
            .map(|addr| {
                let sem = semaphore.clone();
                let pipeline = self.clone();
                let addr = addr.trim().to_string();
                tokio::spawn(async move {
                    let _permit = sem.acquire_owned().await.ok();
                    pipeline.vet_validated(&addr).await
                })
            })
            .collect();

        let results: Vec<BatchEntry> = join_all(handles)
            .await
            .into_iter()
            .zip(addresses.iter())
            .enumerate()
            .map(|(index, (joined, addr))| match joined {
                Ok(report) => BatchEntry {
                    index,
                    address: report.address.clone(),
                    status: "success".to_string(),
                    report: Some(report),
                    error: None,
                },
                Err(e) => {
                    error!("❌ Batch entry {} ({}) failed: {}", index, short_address(addr), e);
                    BatchEntry {
                        index,
                        address: addr.trim().to_string(),
                        status: "error".to_string(),
                        report: None,
                        error: Some(format!("Vetting task failed: {}", e)),
                    }
                }
            })
            .collect();

        let stats = batch_stats(&results);
        let tiers = group_by_tier(&results, &self.classifier.tiers().names_strictest_first());

        info!(
            "✅ Batch done: {} eligible, {} too young, {} no tier, {} failed",
            stats.eligible, stats.too_young, stats.no_tier_match, stats.failed
        );

        Ok(BatchReport {
            batch_id: Uuid::new_v4().to_string(),
            results,
            stats,
            tiers,
            processing_time_ms: start.elapsed().as_secs_f64() * 1000.0,
        })
    }
}

// ============================================
// HELPERS
// ============================================

pub fn summarize(snapshot: &TokenSnapshot, result: &ClassificationResult) -> String {
    let symbol = &snapshot.identity.symbol;
    let mut summary = match (&result.tier, result.risk_score, result.risk_level, &result.reason) {
        (Some(tier), Some(score), Some(level), _) => format!(
            "{} qualifies for the {} tier with a risk score of {}/100 ({})",
            symbol,
            tier,
            score,
            level.as_str()
        ),
        (_, _, _, Some(reason)) => format!("{} is not eligible: {}", symbol, reason.message()),
        _ => format!("{} is not eligible", symbol),
    };
    if snapshot.degraded {
        summary.push_str(" [partial data]");
    }
    summary
}

pub fn batch_stats(results: &[BatchEntry]) -> BatchStats {
    let reports: Vec<&VettingReport> = results.iter().filter_map(|r| r.report.as_ref()).collect();
    let scores: Vec<f64> = reports
        .iter()
        .filter_map(|r| r.classification.risk_score)
        .map(f64::from)
        .collect();

    BatchStats {
        total: results.len(),
        eligible: reports.iter().filter(|r| r.eligible()).count(),
        too_young: reports.iter().filter(|r| r.is_too_young()).count(),
        no_tier_match: reports
            .iter()
            .filter(|r| r.classification.reason == Some(IneligibleReason::NoTierMatch))
            .count(),
        failed: results.len() - reports.len(),
        degraded: reports.iter().filter(|r| r.degraded).count(),
        average_eligible_score: if scores.is_empty() {
            None
        } else {
            Some(scores.iter().sum::<f64>() / scores.len() as f64)
        },
    }
}

/// Groups in `tier_order`; members sorted by descending risk score
pub fn group_by_tier(results: &[BatchEntry], tier_order: &[String]) -> Vec<TierGroup> {
    tier_order
        .iter()
        .filter_map(|tier| {
            let mut tokens: Vec<TierMember> = results
                .iter()
                .filter_map(|r| r.report.as_ref())
                .filter(|r| r.classification.tier.as_deref() == Some(tier.as_str()))
                .filter_map(|r| {
                    r.classification.risk_score.map(|risk_score| TierMember {
                        address: r.address.clone(),
                        symbol: r.snapshot.identity.symbol.clone(),
                        risk_score,
                    })
                })
                .collect();
            if tokens.is_empty() {
                return None;
            }
            tokens.sort_by(|a, b| b.risk_score.cmp(&a.risk_score));
            Some(TierGroup {
                tier: tier.clone(),
                tokens,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::{snapshot_aged, snapshot_fixture};
    use crate::models::ErrorCode;

    fn pipeline() -> VettingPipeline {
        VettingPipeline::new(
            VettingConfig::for_tests(),
            Arc::new(TierConfig::embedded().unwrap()),
            SourceSet::default(),
        )
    }

    fn entry(index: usize, tier: Option<&str>, score: Option<u8>) -> BatchEntry {
        let snapshot = snapshot_fixture();
        let classifier = TierClassifier::new(Arc::new(TierConfig::embedded().unwrap()));
        let mut classification = classifier.classify(&snapshot);
        classification.tier = tier.map(str::to_string);
        classification.risk_score = score;
        classification.eligible = tier.is_some();
        if tier.is_none() {
            classification.reason = Some(IneligibleReason::NoTierMatch);
        }
        BatchEntry {
            index,
            address: format!("addr{}", index),
            status: "success".to_string(),
            report: Some(VettingReport {
                scan_id: String::new(),
                address: format!("addr{}", index),
                summary: String::new(),
                classification,
                score: None,
                snapshot,
                degraded: false,
                latency_ms: 0.0,
                vetted_at: Utc::now(),
            }),
            error: None,
        }
    }

    #[tokio::test]
    async fn test_invalid_address_rejected() {
        let err = pipeline().vet("not-an-address").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidAddressFormat);
    }

    #[tokio::test]
    async fn test_batch_limits() {
        let p = pipeline();
        let err = p.vet_batch(&[]).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::EmptyBatch);

        let many: Vec<String> = (0..21)
            .map(|_| "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v".to_string())
            .collect();
        let err = p.vet_batch(&many).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::BatchTooLarge);
        assert_eq!(err.message, "Maximum 20 contract addresses allowed per batch request");

        let mixed = vec![
            "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v".to_string(),
            "0xdeadbeef".to_string(),
        ];
        let err = p.vet_batch(&mixed).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidBatchAddresses);
        assert_eq!(err.details, Some(serde_json::json!({ "invalid_indices": [1] })));
        assert_eq!(p.telemetry().snapshot().invalid_requests, 3);
    }

    #[test]
    fn test_stats_and_grouping() {
        let results = vec![
            entry(0, Some("Seed"), Some(40)),
            entry(1, Some("Stellar"), Some(5)),
            entry(2, Some("Seed"), Some(60)),
            entry(3, None, None),
            BatchEntry {
                index: 4,
                address: "addr4".to_string(),
                status: "error".to_string(),
                report: None,
                error: Some("boom".to_string()),
            },
        ];

        let stats = batch_stats(&results);
        assert_eq!(stats.total, 5);
        assert_eq!(stats.eligible, 3);
        assert_eq!(stats.no_tier_match, 1);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.average_eligible_score, Some(35.0));

        let order = TierConfig::embedded().unwrap().names_strictest_first();
        let groups = group_by_tier(&results, &order);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].tier, "Stellar");
        assert_eq!(groups[1].tier, "Seed");
        assert_eq!(groups[1].tokens[0].risk_score, 60);
        assert_eq!(groups[1].tokens[1].risk_score, 40);
    }

    #[test]
    fn test_summary_text() {
        let classifier = TierClassifier::new(Arc::new(TierConfig::embedded().unwrap()));
        let snapshot = snapshot_fixture();
        let summary = summarize(&snapshot, &classifier.classify(&snapshot));
        assert!(summary.starts_with("GOOD qualifies for the Stellar tier"));

        let young = snapshot_aged(10.0);
        let summary = summarize(&young, &classifier.classify(&young));
        assert!(summary.contains("10 days old"));
    }
}
