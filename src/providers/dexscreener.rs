//! DexScreener API Client
//!
//! ✅ USED FOR:
//! - Liquidity facet (richest Solana pair), first in chain
//! - Token identity (name, symbol) as metadata fallback
//! - Pair creation time and market activity for the age fallbacks
//!
//! API: https://api.dexscreener.com/latest/dex/tokens/{tokenAddress}
//! Free, no API key required

use async_trait::async_trait;
use eyre::{eyre, Result};
use serde::Deserialize;
use tracing::info;

use super::{build_http_client, LiquidityPayload, LiquiditySource, MetadataPayload, MetadataSource};
use crate::models::{DataSource, VettingConfig};
use crate::utils::{short_address, DEXSCREENER_CHAIN};

/// DexScreener API response
#[derive(Debug, Deserialize)]
pub struct DexScreenerResponse {
    #[serde(default)]
    pub pairs: Option<Vec<DexPair>>,
}

/// A trading pair from DexScreener
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DexPair {
    /// Chain ID (e.g., "solana")
    pub chain_id: String,
    /// DEX identifier (e.g., "raydium", "orca", "meteora")
    pub dex_id: String,
    /// Pair (pool) address
    pub pair_address: String,
    #[serde(default)]
    pub labels: Vec<String>,
    pub base_token: DexToken,
    pub quote_token: DexToken,
    pub liquidity: Option<DexLiquidity>,
    pub price_usd: Option<String>,
    pub volume: Option<DexVolume>,
    pub fdv: Option<f64>,
    pub market_cap: Option<f64>,
    /// Unix milliseconds
    pub pair_created_at: Option<i64>,
}

impl DexPair {
    pub fn liquidity_usd(&self) -> f64 {
        self.liquidity.as_ref().and_then(|l| l.usd).unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DexToken {
    pub address: String,
    pub name: Option<String>,
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DexLiquidity {
    pub usd: Option<f64>,
    pub base: Option<f64>,
    pub quote: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DexVolume {
    pub h24: Option<f64>,
}

/// DexScreener API client
pub struct DexScreenerClient {
    client: reqwest::Client,
    base_url: String,
}

impl DexScreenerClient {
    pub fn new(config: &VettingConfig) -> Result<Self> {
        Ok(Self {
            client: build_http_client(config.provider_timeout)?,
            base_url: format!(
                "{}/latest/dex",
                config.dexscreener_base_url.trim_end_matches('/')
            ),
        })
    }

    /// Fetch all Solana pairs for a token address, highest liquidity first
    pub async fn get_token_pairs(&self, token_address: &str) -> Result<Vec<DexPair>> {
        let url = format!("{}/tokens/{}", self.base_url, token_address);

        info!("🔍 DexScreener: Fetching pairs for {}", short_address(token_address));

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| eyre!("DexScreener request failed: {}", e))?;

        if !response.status().is_success() {
            return Err(eyre!("DexScreener API error: {}", response.status()));
        }

        let data: DexScreenerResponse = response
            .json()
            .await
            .map_err(|e| eyre!("Failed to parse DexScreener response: {}", e))?;

        let pairs = select_solana_pairs(data.pairs.unwrap_or_default());
        info!("📊 DexScreener: Found {} Solana pairs", pairs.len());

        Ok(pairs)
    }

    /// Highest-liquidity pair plus the number of pools seen
    pub async fn get_best_pair(&self, token_address: &str) -> Result<(DexPair, u32)> {
        let pairs = self.get_token_pairs(token_address).await?;
        let pool_count = pairs.len() as u32;
        pairs
            .into_iter()
            .next()
            .map(|p| (p, pool_count))
            .ok_or_else(|| eyre!("No Solana pairs on DexScreener"))
    }
}

/// Keep Solana pairs and sort by liquidity (highest first)
pub fn select_solana_pairs(pairs: Vec<DexPair>) -> Vec<DexPair> {
    let mut pairs: Vec<DexPair> = pairs
        .into_iter()
        .filter(|p| p.chain_id.eq_ignore_ascii_case(DEXSCREENER_CHAIN))
        .collect();
    pairs.sort_by(|a, b| {
        b.liquidity_usd()
            .partial_cmp(&a.liquidity_usd())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    pairs
}

#[async_trait]
impl LiquiditySource for DexScreenerClient {
    fn source(&self) -> DataSource {
        DataSource::DexScreener
    }

    async fn fetch_liquidity(&self, address: &str) -> Result<LiquidityPayload> {
        let (pair, pool_count) = self.get_best_pair(address).await?;
        Ok(LiquidityPayload::DexScreener { pair, pool_count })
    }
}

#[async_trait]
impl MetadataSource for DexScreenerClient {
    fn source(&self) -> DataSource {
        DataSource::DexScreener
    }

    async fn fetch_metadata(&self, address: &str) -> Result<MetadataPayload> {
        let (pair, _) = self.get_best_pair(address).await?;
        Ok(MetadataPayload::DexPair(pair))
    }
}
