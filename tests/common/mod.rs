//! Stub facet sources shared by the integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use eyre::{eyre, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use token_vetter::models::{DataSource, Holder, TierConfig, VettingConfig};
use token_vetter::providers::*;
use token_vetter::VettingPipeline;

pub const GOOD_MINT: &str = "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU";
pub const YOUNG_MINT: &str = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM";
pub const LP_MINT: &str = "8HoQnePLqPj4M7PUDzfw8e3Ymdwgc7NLGnaTUapubyvu";
pub const BURN: &str = "1nc1nerator11111111111111111111111111111111";

/// Counts every upstream call made through the stubs
#[derive(Debug, Clone, Default)]
pub struct CallCounter(Arc<AtomicUsize>);

impl CallCounter {
    pub fn hit(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// What the stub upstreams report for every address
#[derive(Debug, Clone)]
pub struct TokenProfile {
    pub age_days: i64,
    pub liquidity_usd: f64,
    pub lp_burned: bool,
    pub holders: Vec<Holder>,
    pub holder_count: u64,
    pub mint_authority: Option<String>,
    pub freeze_authority: Option<String>,
}

impl TokenProfile {
    /// 365 days, $500k, burned LP, 100k holders, revoked authorities
    pub fn healthy() -> Self {
        Self {
            age_days: 365,
            liquidity_usd: 500_000.0,
            lp_burned: true,
            holders: equal_holders(40),
            holder_count: 100_000,
            mint_authority: None,
            freeze_authority: None,
        }
    }

    pub fn aged(days: i64) -> Self {
        Self {
            age_days: days,
            ..Self::healthy()
        }
    }
}

pub fn equal_holders(n: usize) -> Vec<Holder> {
    (0..n)
        .map(|i| Holder::new(format!("Hodler{:02}xKXtg2CW87d97TXJSDpbD5jBkheTqA8", i), 1_000.0))
        .collect()
}

// ============================================
// STUBS
// ============================================

pub struct StubUpstream {
    pub profile: TokenProfile,
    pub calls: CallCounter,
}

#[async_trait]
impl MetadataSource for StubUpstream {
    fn source(&self) -> DataSource {
        DataSource::SolanaRpc
    }

    async fn fetch_metadata(&self, _address: &str) -> Result<MetadataPayload> {
        self.calls.hit();
        Ok(MetadataPayload::RpcMint(RpcMintInfo {
            decimals: 6,
            supply: "40000000000".to_string(),
            mint_authority: self.profile.mint_authority.clone(),
            freeze_authority: self.profile.freeze_authority.clone(),
        }))
    }
}

#[async_trait]
impl HolderSource for StubUpstream {
    fn source(&self) -> DataSource {
        DataSource::Solscan
    }

    async fn fetch_holders(&self, _address: &str, _limit: usize) -> Result<HolderPayload> {
        self.calls.hit();
        let items = self
            .profile
            .holders
            .iter()
            .map(|h| {
                serde_json::from_value(serde_json::json!({
                    "owner": h.address,
                    "amount": h.amount,
                    "decimals": 0
                }))
            })
            .collect::<std::result::Result<Vec<SolscanHolderItem>, _>>()?;
        Ok(HolderPayload::Solscan(SolscanHolders {
            total: Some(self.profile.holder_count),
            items,
        }))
    }
}

#[async_trait]
impl LiquiditySource for StubUpstream {
    fn source(&self) -> DataSource {
        DataSource::DexScreener
    }

    async fn fetch_liquidity(&self, address: &str) -> Result<LiquidityPayload> {
        self.calls.hit();
        let pair: DexPair = serde_json::from_value(serde_json::json!({
            "chainId": "solana",
            "dexId": "raydium",
            "pairAddress": "58oQChx4yWmvKdwLLZzBi4ChoCc2fqCUWBkwMihLYQo2",
            "baseToken": { "address": address, "name": "Good Token", "symbol": "GOOD" },
            "quoteToken": { "address": "So11111111111111111111111111111111111111112", "name": "Wrapped SOL", "symbol": "SOL" },
            "liquidity": { "usd": self.profile.liquidity_usd },
            "volume": { "h24": 250000.0 },
            "marketCap": 25000000.0
        }))?;
        Ok(LiquidityPayload::DexScreener { pair, pool_count: 1 })
    }
}

#[async_trait]
impl AgeSource for StubUpstream {
    fn source(&self) -> DataSource {
        DataSource::KnownTokenTable
    }

    async fn fetch_creation(&self, _address: &str) -> Result<AgePayload> {
        self.calls.hit();
        let created: DateTime<Utc> = Utc::now() - Duration::days(self.profile.age_days);
        Ok(AgePayload::KnownToken(created))
    }
}

#[async_trait]
impl LpMintResolver for StubUpstream {
    async fn resolve_lp_mint(&self, _pool_id: &str) -> Result<Option<String>> {
        self.calls.hit();
        Ok(Some(LP_MINT.to_string()))
    }
}

#[async_trait]
impl LpHolderSource for StubUpstream {
    async fn fetch_lp_holders(&self, _lp_mint: &str) -> Result<LpHolders> {
        self.calls.hit();
        let top = if self.profile.lp_burned {
            BURN
        } else {
            "LPowner1xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZ"
        };
        Ok(LpHolders {
            holders: vec![
                Holder::new(top, 600.0),
                Holder::new("LPowner2xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZ", 400.0),
            ],
            total_supply: Some(1_000.0),
        })
    }
}

/// Every call fails
pub struct DeadUpstream {
    pub calls: CallCounter,
}

#[async_trait]
impl MetadataSource for DeadUpstream {
    fn source(&self) -> DataSource {
        DataSource::SolanaRpc
    }
    async fn fetch_metadata(&self, _address: &str) -> Result<MetadataPayload> {
        self.calls.hit();
        Err(eyre!("503 Service Unavailable"))
    }
}

#[async_trait]
impl HolderSource for DeadUpstream {
    fn source(&self) -> DataSource {
        DataSource::Solscan
    }
    async fn fetch_holders(&self, _address: &str, _limit: usize) -> Result<HolderPayload> {
        self.calls.hit();
        Err(eyre!("503 Service Unavailable"))
    }
}

#[async_trait]
impl LiquiditySource for DeadUpstream {
    fn source(&self) -> DataSource {
        DataSource::DexScreener
    }
    async fn fetch_liquidity(&self, _address: &str) -> Result<LiquidityPayload> {
        self.calls.hit();
        Err(eyre!("503 Service Unavailable"))
    }
}

#[async_trait]
impl AgeSource for DeadUpstream {
    fn source(&self) -> DataSource {
        DataSource::SolanaRpc
    }
    async fn fetch_creation(&self, _address: &str) -> Result<AgePayload> {
        self.calls.hit();
        Err(eyre!("503 Service Unavailable"))
    }
}

/// Largest-accounts RPC view: a truncated list and no total
pub struct RpcLargestHolders {
    pub calls: CallCounter,
}

#[async_trait]
impl HolderSource for RpcLargestHolders {
    fn source(&self) -> DataSource {
        DataSource::SolanaRpc
    }
    async fn fetch_holders(&self, _address: &str, _limit: usize) -> Result<HolderPayload> {
        self.calls.hit();
        Ok(HolderPayload::RpcLargestAccounts(equal_holders(20)))
    }
}

/// Never answers within any sane timeout
pub struct HangingMetadata;

#[async_trait]
impl MetadataSource for HangingMetadata {
    fn source(&self) -> DataSource {
        DataSource::SolanaRpc
    }
    async fn fetch_metadata(&self, _address: &str) -> Result<MetadataPayload> {
        tokio::time::sleep(std::time::Duration::from_secs(60)).await;
        Err(eyre!("unreachable"))
    }
}

// ============================================
// WIRING
// ============================================

pub fn stub_sources(profile: TokenProfile, calls: CallCounter) -> SourceSet {
    let stub = Arc::new(StubUpstream { profile, calls });
    let mut sources = SourceSet::default();
    sources.metadata.push(stub.clone());
    sources.holders.push(stub.clone());
    sources.liquidity.push(stub.clone());
    sources.age.push(stub.clone());
    sources.lp_resolver = Some(stub.clone());
    sources.lp_holders = Some(stub);
    sources
}

pub fn dead_sources(calls: CallCounter) -> SourceSet {
    let dead = Arc::new(DeadUpstream { calls });
    let mut sources = SourceSet::default();
    sources.metadata.push(dead.clone());
    sources.holders.push(dead.clone());
    sources.liquidity.push(dead.clone());
    sources.age.push(dead);
    sources
}

pub fn pipeline_with(sources: SourceSet) -> VettingPipeline {
    VettingPipeline::new(
        VettingConfig::for_tests(),
        Arc::new(TierConfig::embedded().expect("embedded tier table")),
        sources,
    )
}

pub fn stub_pipeline(profile: TokenProfile) -> (VettingPipeline, CallCounter) {
    let calls = CallCounter::default();
    (pipeline_with(stub_sources(profile, calls.clone())), calls)
}
