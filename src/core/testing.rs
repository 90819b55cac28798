//! Shared snapshot fixtures for unit tests

use chrono::{Duration, Utc};

use super::contract::analyze_contract;
use super::holders::analyze_holders;
use crate::models::*;

pub const FIXTURE_MINT: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

pub fn verified(source: DataSource) -> FacetProvenance {
    FacetProvenance::new(source, Confidence::Verified, 0, vec![])
}

/// 40 equal holders, 100k reported holders
pub fn clean_holders() -> HolderInfo {
    let holders = (0..40)
        .map(|i| Holder::new(format!("Holder{:02}xKXtg2CW87d97TXJSDpbD5jBkheTqA8", i), 1_000.0))
        .collect();
    analyze_holders(holders, Some(100_000))
}

/// One-year-old token, $500k burned liquidity, revoked authorities
pub fn snapshot_fixture() -> TokenSnapshot {
    let now = Utc::now();
    let mut liquidity = LiquidityInfo::unknown();
    liquidity.liquidity_usd = 500_000.0;
    liquidity.burned = true;
    liquidity.lp_status = LpStatus::Burned;
    liquidity.pool_count = 1;

    TokenSnapshot {
        address: FIXTURE_MINT.to_string(),
        identity: TokenIdentity {
            symbol: "GOOD".to_string(),
            name: "Good Token".to_string(),
            decimals: Some(6),
            total_supply: Some(40_000.0),
        },
        mint_authority: AuthorityStatus::Revoked,
        freeze_authority: AuthorityStatus::Revoked,
        age: TokenAge::from_created_at(now - Duration::days(365), now, Confidence::Verified),
        liquidity,
        holders: clean_holders(),
        contract: analyze_contract(&AuthorityStatus::Revoked, &AuthorityStatus::Revoked, None),
        provenance: Provenance {
            metadata: verified(DataSource::SolanaRpc),
            age: verified(DataSource::KnownTokenTable),
            holders: verified(DataSource::Solscan),
            liquidity: verified(DataSource::DexScreener),
            audit: FacetProvenance::unknown(vec![]),
        },
        degraded: false,
        fetched_at: now,
    }
}

/// Same snapshot, `days` old
pub fn snapshot_aged(days: f64) -> TokenSnapshot {
    let mut snapshot = snapshot_fixture();
    snapshot.age = TokenAge {
        created_at: None,
        project_age_days: days,
        confidence: Confidence::Verified,
    };
    snapshot
}
