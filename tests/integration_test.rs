//! Integration tests for the vetting pipeline (stub upstreams, no network)

mod common;

use common::*;
use std::sync::Arc;
use token_vetter::models::{
    Confidence, ConcentrationRisk, DataSource, ErrorCode, Holder, IneligibleReason, LpStatus,
    RiskLevel,
};
use token_vetter::SourceSet;

#[tokio::test]
async fn test_healthy_token_lands_in_strictest_tier() {
    let (pipeline, _) = stub_pipeline(TokenProfile::healthy());
    let report = pipeline.vet(GOOD_MINT).await.unwrap();

    let c = &report.classification;
    assert!(c.eligible);
    assert_eq!(c.tier.as_deref(), Some("Stellar"));
    assert_eq!(c.risk_level, Some(RiskLevel::Low));
    assert!(c.risk_score.unwrap() <= 25);
    assert!(!report.degraded);

    let s = &report.snapshot;
    assert_eq!(s.identity.symbol, "GOOD");
    assert_eq!(s.liquidity.lp_status, LpStatus::Burned);
    assert_eq!(s.liquidity.lp_mint.as_deref(), Some(LP_MINT));
    assert_eq!(s.holders.holder_count, Some(100_000));
    assert_eq!(s.contract.security_score, 100);
    assert_eq!(s.provenance.age.confidence, Confidence::Verified);
}

#[tokio::test]
async fn test_classification_is_deterministic() {
    let (pipeline, _) = stub_pipeline(TokenProfile::healthy());
    let a = pipeline.vet(GOOD_MINT).await.unwrap();
    let b = pipeline.vet(GOOD_MINT).await.unwrap();
    assert_eq!(a.classification.tier, b.classification.tier);
    assert_eq!(a.classification.risk_score, b.classification.risk_score);
}

#[tokio::test]
async fn test_ten_day_old_token_is_too_young() {
    let (pipeline, _) = stub_pipeline(TokenProfile::aged(10));
    let report = pipeline.vet(YOUNG_MINT).await.unwrap();

    assert!(!report.classification.eligible);
    assert!(report.classification.tier.is_none());
    assert!(report.classification.risk_score.is_none());
    match &report.classification.reason {
        Some(IneligibleReason::TooYoung {
            age_display,
            minimum_age_required,
            ..
        }) => {
            assert_eq!(age_display, "10 days");
            assert_eq!(*minimum_age_required, 14);
        }
        other => panic!("expected too young, got {:?}", other),
    }
}

#[tokio::test]
async fn test_young_token_ineligible_regardless_of_metrics() {
    for days in [0, 1, 7, 13] {
        let (pipeline, _) = stub_pipeline(TokenProfile::aged(days));
        let report = pipeline.vet(YOUNG_MINT).await.unwrap();
        assert!(report.is_too_young(), "{} days should be too young", days);
    }
}

#[tokio::test]
async fn test_whale_holder_fails_every_capped_tier() {
    let mut profile = TokenProfile::healthy();
    let mut holders = vec![Holder::new("WhaLe1xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZR", 60.0)];
    holders.extend(equal_holders(8).into_iter().map(|h| Holder::new(h.address, 5.0)));
    profile.holders = holders;

    let (pipeline, _) = stub_pipeline(profile);
    let report = pipeline.vet(GOOD_MINT).await.unwrap();

    assert_eq!(
        report.snapshot.holders.activity.concentration_risk,
        ConcentrationRisk::VeryHigh
    );
    assert!(!report.classification.eligible);
    assert_eq!(report.classification.reason, Some(IneligibleReason::NoTierMatch));
}

#[tokio::test]
async fn test_mint_authority_blocks_eligibility() {
    let mut profile = TokenProfile::healthy();
    profile.mint_authority = Some("MintAuth1xKXtg2CW87d97TXJSDpbD5jBkheTqA83T".to_string());
    let (pipeline, _) = stub_pipeline(profile);
    let report = pipeline.vet(GOOD_MINT).await.unwrap();

    assert_eq!(report.snapshot.contract.critical_count, 1);
    assert!(!report.classification.eligible);
}

#[tokio::test]
async fn test_exhausted_chains_still_return_snapshot() {
    let calls = CallCounter::default();
    let pipeline = pipeline_with(dead_sources(calls.clone()));
    let report = pipeline.vet(GOOD_MINT).await.unwrap();

    let s = &report.snapshot;
    assert!(report.degraded);
    assert!(s.is_fully_unknown());
    assert_eq!(s.provenance.metadata.failures.len(), 1);
    assert_eq!(s.provenance.holders.confidence, Confidence::Unknown);
    assert_eq!(s.liquidity.lp_status, LpStatus::Unknown);
    assert!(!s.liquidity.burned && !s.liquidity.locked);
    // Unknown age never passes the gate
    assert!(report.is_too_young());
    assert_eq!(calls.count(), 4);
    assert_eq!(pipeline.telemetry().snapshot().upstream_unavailable, 1);
}

#[tokio::test]
async fn test_fallback_depth_recorded() {
    let calls = CallCounter::default();
    let mut sources = stub_sources(TokenProfile::healthy(), calls.clone());
    let dead = Arc::new(DeadUpstream { calls: calls.clone() });
    sources.metadata.insert(0, dead);

    let report = pipeline_with(sources).vet(GOOD_MINT).await.unwrap();
    let metadata = &report.snapshot.provenance.metadata;
    assert_eq!(metadata.fallback_depth, 1);
    assert_eq!(metadata.source, DataSource::SolanaRpc);
    assert!(metadata.failures[0].contains("503"));
    assert!(report.degraded);
    assert!(report.classification.eligible);
}

#[tokio::test]
async fn test_hanging_metadata_source_keeps_other_facets() {
    let calls = CallCounter::default();
    let mut sources = stub_sources(TokenProfile::healthy(), calls);
    sources.metadata = vec![Arc::new(HangingMetadata)];

    let report = pipeline_with(sources).vet(GOOD_MINT).await.unwrap();
    let s = &report.snapshot;
    assert!(s.provenance.metadata.is_unknown());
    assert_eq!(s.provenance.liquidity.confidence, Confidence::Verified);
    assert_eq!(s.liquidity.liquidity_usd, 500_000.0);
    // Identity gap filled from the market pair
    assert_eq!(s.identity.symbol, "GOOD");
}

#[tokio::test]
async fn test_rpc_only_holders_leave_count_unknown() {
    let calls = CallCounter::default();
    let mut sources = stub_sources(TokenProfile::healthy(), calls.clone());
    sources.holders = vec![Arc::new(RpcLargestHolders { calls })];

    let report = pipeline_with(sources).vet(GOOD_MINT).await.unwrap();
    let s = &report.snapshot;
    assert_eq!(s.holders.holders.len(), 20);
    assert_eq!(s.holders.holder_count, None);
    assert_eq!(s.provenance.holders.source, DataSource::SolanaRpc);
    assert_eq!(s.provenance.holders.confidence, Confidence::Estimated);

    let c = &report.classification;
    assert!(!c.eligible);
    assert_eq!(c.reason, Some(IneligibleReason::NoTierMatch));
    for eval in &c.evaluations {
        assert!(eval.failures.iter().any(|f| f == "holder count unknown"));
        assert!(!eval.failures.iter().any(|f| f.contains("below minimum")));
    }
}

#[tokio::test]
async fn test_batch_rejections_make_no_upstream_calls() {
    let (pipeline, calls) = stub_pipeline(TokenProfile::healthy());

    let many: Vec<String> = (0..21).map(|_| GOOD_MINT.to_string()).collect();
    let err = pipeline.vet_batch(&many).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::BatchTooLarge);
    assert_eq!(err.message, "Maximum 20 contract addresses allowed per batch request");

    let mixed = vec!["not/a/mint".to_string(), GOOD_MINT.to_string()];
    let err = pipeline.vet_batch(&mixed).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidBatchAddresses);
    assert_eq!(err.details, Some(serde_json::json!({ "invalid_indices": [0] })));

    let err = pipeline.vet_batch(&[]).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::EmptyBatch);

    let err = pipeline.vet("0x1234").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidAddressFormat);

    // Base58 text that does not decode to a 32-byte key
    let err = pipeline.vet(&"z".repeat(44)).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidAddressFormat);

    let short = vec![GOOD_MINT.to_string(), "2".repeat(32)];
    let err = pipeline.vet_batch(&short).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidBatchAddresses);
    assert_eq!(err.details, Some(serde_json::json!({ "invalid_indices": [1] })));

    assert_eq!(calls.count(), 0);
}

#[tokio::test]
async fn test_batch_aggregates_results() {
    let (pipeline, _) = stub_pipeline(TokenProfile::healthy());
    let addresses = vec![
        GOOD_MINT.to_string(),
        YOUNG_MINT.to_string(),
        format!("  {}  ", LP_MINT),
    ];
    let batch = pipeline.vet_batch(&addresses).await.unwrap();

    assert_eq!(batch.results.len(), 3);
    assert!(batch.results.iter().all(|r| r.status == "success"));
    assert_eq!(batch.results[2].address, LP_MINT);
    assert_eq!(batch.stats.eligible, 3);
    assert_eq!(batch.stats.failed, 0);
    assert!(batch.stats.average_eligible_score.is_some());
    assert_eq!(batch.tiers.len(), 1);
    assert_eq!(batch.tiers[0].tier, "Stellar");
    assert_eq!(batch.tiers[0].tokens.len(), 3);
}

#[tokio::test]
async fn test_empty_source_set_never_panics() {
    let pipeline = pipeline_with(SourceSet::default());
    let report = pipeline.vet(GOOD_MINT).await.unwrap();
    assert!(report.snapshot.is_fully_unknown());
    assert!(report.summary.contains("not eligible"));
}
