//! Providers Module - External Data Sources
//!
//! One client per upstream provider. Every client is reached through a
//! narrow facet-source trait so the aggregator can walk a fallback chain
//! (and tests can swap in stubs). Each provider answer is a distinct
//! payload variant with an explicit mapping into the common facet type.

pub mod das;
pub mod dexscreener;
pub mod known_tokens;
pub mod raydium;
pub mod rpc;
pub mod rugcheck;
pub mod solscan;
pub mod synthetic;

pub use das::*;
pub use dexscreener::*;
pub use known_tokens::*;
pub use raydium::*;
pub use rpc::*;
pub use rugcheck::*;
pub use solscan::*;
pub use synthetic::*;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use eyre::{eyre, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING, USER_AGENT};
use std::sync::Arc;
use std::time::Duration;

use crate::models::{
    AuthorityStatus, Confidence, DataSource, Holder, LiquidityInfo, LpStatus, TokenAge,
    TokenIdentity, VettingConfig,
};
use crate::utils::constants::USER_AGENT as USER_AGENT_CONST;

// ============================================
// FACET SOURCE TRAITS
// ============================================

#[async_trait]
pub trait MetadataSource: Send + Sync {
    fn source(&self) -> DataSource;
    async fn fetch_metadata(&self, address: &str) -> Result<MetadataPayload>;
}

#[async_trait]
pub trait HolderSource: Send + Sync {
    fn source(&self) -> DataSource;
    /// Largest `limit` holders, biggest first
    async fn fetch_holders(&self, address: &str, limit: usize) -> Result<HolderPayload>;
}

#[async_trait]
pub trait LiquiditySource: Send + Sync {
    fn source(&self) -> DataSource;
    async fn fetch_liquidity(&self, address: &str) -> Result<LiquidityPayload>;
}

#[async_trait]
pub trait AgeSource: Send + Sync {
    fn source(&self) -> DataSource;
    async fn fetch_creation(&self, address: &str) -> Result<AgePayload>;
}

#[async_trait]
pub trait AuditSource: Send + Sync {
    fn source(&self) -> DataSource;
    async fn fetch_audit(&self, address: &str) -> Result<AuditPayload>;
}

/// Holders of a pool's LP token mint
#[async_trait]
pub trait LpHolderSource: Send + Sync {
    async fn fetch_lp_holders(&self, lp_mint: &str) -> Result<LpHolders>;
}

/// Pool id -> LP mint, for pools whose listing omitted it
#[async_trait]
pub trait LpMintResolver: Send + Sync {
    async fn resolve_lp_mint(&self, pool_id: &str) -> Result<Option<String>>;
}

// ============================================
// COMMON FACET TYPES
// ============================================

#[derive(Debug, Clone, PartialEq)]
pub struct MetadataFacet {
    pub identity: TokenIdentity,
    pub mint_authority: AuthorityStatus,
    pub freeze_authority: AuthorityStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawHolders {
    pub holders: Vec<Holder>,
    /// Upstream total, not the page length
    pub holder_count: Option<u64>,
    pub confidence: Confidence,
}

/// Liquidity before lock detection, plus side data reused by other facets
#[derive(Debug, Clone, PartialEq)]
pub struct LiquidityFacet {
    pub info: LiquidityInfo,
    pub base_symbol: Option<String>,
    pub base_name: Option<String>,
    pub pair_created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LpHolders {
    pub holders: Vec<Holder>,
    /// LP mint supply when the provider reports it
    pub total_supply: Option<f64>,
}

/// Optional third-party audit signal
#[derive(Debug, Clone, PartialEq)]
pub struct AuditSignal {
    /// 0-100, higher is safer
    pub external_score: u8,
    /// (level, name) as reported
    pub findings: Vec<(String, String)>,
    pub has_full_audit: Option<bool>,
    pub has_bug_bounty: Option<bool>,
}

// ============================================
// PROVIDER PAYLOADS
// ============================================

#[derive(Debug, Clone)]
pub enum MetadataPayload {
    RpcMint(RpcMintInfo),
    DasAsset(DasAsset),
    DexPair(DexPair),
}

impl MetadataPayload {
    pub fn into_facet(self) -> MetadataFacet {
        match self {
            MetadataPayload::RpcMint(mint) => {
                let mut identity = TokenIdentity::placeholder();
                identity.decimals = Some(mint.decimals);
                identity.total_supply = Some(ui_amount(&mint.supply, mint.decimals));
                MetadataFacet {
                    identity,
                    mint_authority: AuthorityStatus::from_option(mint.mint_authority),
                    freeze_authority: AuthorityStatus::from_option(mint.freeze_authority),
                }
            }
            MetadataPayload::DasAsset(asset) => {
                let placeholder = TokenIdentity::placeholder();
                let metadata = asset.content.and_then(|c| c.metadata);
                let token_info = asset.token_info;
                let decimals = token_info.as_ref().and_then(|t| t.decimals);
                let supply = token_info
                    .as_ref()
                    .and_then(|t| t.supply)
                    .map(|raw| raw as f64 / 10f64.powi(decimals.unwrap_or(0) as i32));
                let (mint_authority, freeze_authority) = match token_info {
                    Some(info) => (
                        AuthorityStatus::from_option(info.mint_authority),
                        AuthorityStatus::from_option(info.freeze_authority),
                    ),
                    None => (AuthorityStatus::Unknown, AuthorityStatus::Unknown),
                };
                MetadataFacet {
                    identity: TokenIdentity {
                        symbol: metadata
                            .as_ref()
                            .and_then(|m| non_empty(m.symbol.clone()))
                            .unwrap_or(placeholder.symbol),
                        name: metadata
                            .as_ref()
                            .and_then(|m| non_empty(m.name.clone()))
                            .unwrap_or(placeholder.name),
                        decimals,
                        total_supply: supply,
                    },
                    mint_authority,
                    freeze_authority,
                }
            }
            MetadataPayload::DexPair(pair) => {
                let placeholder = TokenIdentity::placeholder();
                MetadataFacet {
                    identity: TokenIdentity {
                        symbol: non_empty(pair.base_token.symbol).unwrap_or(placeholder.symbol),
                        name: non_empty(pair.base_token.name).unwrap_or(placeholder.name),
                        decimals: None,
                        total_supply: None,
                    },
                    mint_authority: AuthorityStatus::Unknown,
                    freeze_authority: AuthorityStatus::Unknown,
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub enum HolderPayload {
    Solscan(SolscanHolders),
    RpcLargestAccounts(Vec<Holder>),
    Synthetic(SyntheticHolders),
}

impl HolderPayload {
    pub fn into_facet(self) -> RawHolders {
        match self {
            HolderPayload::Solscan(page) => {
                let holders: Vec<Holder> = page
                    .items
                    .into_iter()
                    .map(|item| Holder::new(item.owner, ui_amount_f64(item.amount, item.decimals)))
                    .collect();
                RawHolders {
                    holders,
                    holder_count: page.total,
                    confidence: Confidence::Verified,
                }
            }
            HolderPayload::RpcLargestAccounts(holders) => RawHolders {
                // The RPC only exposes the largest accounts, not the total
                holder_count: None,
                holders,
                confidence: Confidence::Estimated,
            },
            HolderPayload::Synthetic(synthetic) => RawHolders {
                holders: synthetic.holders,
                holder_count: Some(synthetic.holder_count),
                confidence: Confidence::Unknown,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub enum LiquidityPayload {
    DexScreener { pair: DexPair, pool_count: u32 },
    Raydium { pool: RaydiumPool, pool_count: u32 },
}

impl LiquidityPayload {
    pub fn into_facet(self) -> LiquidityFacet {
        match self {
            LiquidityPayload::DexScreener { pair, pool_count } => {
                let mut info = LiquidityInfo::unknown();
                info.liquidity_usd = pair.liquidity_usd();
                info.pair_address = Some(pair.pair_address.clone());
                info.dex_id = Some(pair.dex_id.clone());
                info.volume_24h_usd = pair.volume.as_ref().and_then(|v| v.h24).unwrap_or(0.0);
                info.market_cap_usd = pair.market_cap.or(pair.fdv).unwrap_or(0.0);
                info.pool_count = pool_count;
                LiquidityFacet {
                    info,
                    pair_created_at: pair.pair_created_at.and_then(from_millis),
                    base_symbol: non_empty(pair.base_token.symbol),
                    base_name: non_empty(pair.base_token.name),
                }
            }
            LiquidityPayload::Raydium { pool, pool_count } => {
                let mut info = LiquidityInfo::unknown();
                info.liquidity_usd = pool.tvl.unwrap_or(0.0);
                info.pair_address = Some(pool.id.clone());
                info.dex_id = Some("raydium".to_string());
                info.lp_mint = pool.lp_mint.as_ref().map(|m| m.address.clone());
                info.volume_24h_usd = pool.day.as_ref().and_then(|d| d.volume).unwrap_or(0.0);
                info.pool_count = pool_count;
                info.lp_status = LpStatus::Unknown;
                LiquidityFacet {
                    info,
                    base_symbol: None,
                    base_name: None,
                    pair_created_at: pool.open_time.and_then(from_seconds),
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub enum AgePayload {
    KnownToken(DateTime<Utc>),
    /// Earliest signature block time; `complete` is false when the page cap was hit
    RpcSignatures { earliest_block_time: i64, complete: bool },
    SolscanMeta { created_time: i64 },
}

impl AgePayload {
    pub fn into_age(self, now: DateTime<Utc>) -> Result<TokenAge> {
        match self {
            AgePayload::KnownToken(created_at) => {
                Ok(TokenAge::from_created_at(created_at, now, Confidence::Verified))
            }
            AgePayload::RpcSignatures {
                earliest_block_time,
                complete,
            } => {
                let created_at = from_seconds(earliest_block_time)
                    .ok_or_else(|| eyre!("Invalid block time {}", earliest_block_time))?;
                // A capped scan only proves a lower bound
                let confidence = if complete {
                    Confidence::Verified
                } else {
                    Confidence::Estimated
                };
                Ok(TokenAge::from_created_at(created_at, now, confidence))
            }
            AgePayload::SolscanMeta { created_time } => {
                let created_at = from_seconds(created_time)
                    .ok_or_else(|| eyre!("Invalid created_time {}", created_time))?;
                Ok(TokenAge::from_created_at(created_at, now, Confidence::Verified))
            }
        }
    }
}

#[derive(Debug, Clone)]
pub enum AuditPayload {
    RugCheck(RugCheckSummary),
}

impl AuditPayload {
    pub fn into_signal(self) -> AuditSignal {
        match self {
            AuditPayload::RugCheck(summary) => {
                let normalised = summary.score_normalised.unwrap_or(0.0).clamp(0.0, 100.0);
                AuditSignal {
                    external_score: (100.0 - normalised).round() as u8,
                    findings: summary
                        .risks
                        .into_iter()
                        .map(|r| (r.level.unwrap_or_default(), r.name))
                        .collect(),
                    has_full_audit: None,
                    has_bug_bounty: None,
                }
            }
        }
    }
}

// ============================================
// SOURCE SET
// ============================================

/// Ordered fallback chains, one per facet
#[derive(Clone, Default)]
pub struct SourceSet {
    pub metadata: Vec<Arc<dyn MetadataSource>>,
    pub holders: Vec<Arc<dyn HolderSource>>,
    pub liquidity: Vec<Arc<dyn LiquiditySource>>,
    /// Table, RPC and indexer steps; market-derived steps run after the join
    pub age: Vec<Arc<dyn AgeSource>>,
    pub audit: Option<Arc<dyn AuditSource>>,
    pub lp_holders: Option<Arc<dyn LpHolderSource>>,
    pub lp_resolver: Option<Arc<dyn LpMintResolver>>,
}

impl SourceSet {
    /// Production chains wired from configuration
    pub fn from_config(config: &VettingConfig) -> Result<Self> {
        let rpc = Arc::new(SolanaRpcClient::new(config)?);
        let dexscreener = Arc::new(DexScreenerClient::new(config)?);
        let raydium = Arc::new(RaydiumClient::new(config)?);
        let solscan = Arc::new(SolscanClient::new(config)?);

        let mut metadata: Vec<Arc<dyn MetadataSource>> = Vec::new();
        metadata.push(rpc.clone());
        if config.helius_api_key.is_some() {
            metadata.push(Arc::new(DasClient::new(config)?));
        }
        metadata.push(dexscreener.clone());

        let mut holders: Vec<Arc<dyn HolderSource>> = Vec::new();
        if solscan.has_key() {
            holders.push(solscan.clone());
        }
        holders.push(rpc.clone());
        if config.allow_synthetic_holders {
            holders.push(Arc::new(SyntheticHolderSource::default()));
        }

        let mut age: Vec<Arc<dyn AgeSource>> = Vec::new();
        age.push(Arc::new(KnownTokenTable));
        age.push(rpc.clone());
        if solscan.has_key() {
            age.push(solscan);
        }

        let mut liquidity: Vec<Arc<dyn LiquiditySource>> = Vec::new();
        liquidity.push(dexscreener);
        liquidity.push(raydium.clone());

        Ok(Self {
            metadata,
            holders,
            liquidity,
            age,
            audit: Some(Arc::new(RugCheckClient::new(config)?)),
            lp_holders: Some(rpc),
            lp_resolver: Some(raydium),
        })
    }
}

// ============================================
// SHARED HELPERS
// ============================================

/// HTTP client with User-Agent and gzip, shared shape for every provider
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_CONST));
    headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));

    reqwest::Client::builder()
        .default_headers(headers)
        .timeout(timeout)
        .gzip(true)
        .build()
        .map_err(|e| eyre!("Failed to build HTTP client: {}", e))
}

/// Raw integer amount string -> UI units
pub fn ui_amount(raw: &str, decimals: u8) -> f64 {
    raw.parse::<f64>().unwrap_or(0.0) / 10f64.powi(decimals as i32)
}

pub fn ui_amount_f64(raw: f64, decimals: u8) -> f64 {
    raw / 10f64.powi(decimals as i32)
}

pub fn from_seconds(ts: i64) -> Option<DateTime<Utc>> {
    if ts <= 0 {
        return None;
    }
    Utc.timestamp_opt(ts, 0).single()
}

pub fn from_millis(ms: i64) -> Option<DateTime<Utc>> {
    if ms <= 0 {
        return None;
    }
    Utc.timestamp_millis_opt(ms).single()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
