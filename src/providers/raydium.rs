//! Raydium API v3 pool index
//!
//! Second liquidity source (scan pools by mint, keep the largest TVL) and
//! LP-mint lookup by pool id for pairs discovered elsewhere.

use async_trait::async_trait;
use eyre::{eyre, Result};
use serde::{Deserialize, Deserializer};
use tracing::{debug, info};

use super::{build_http_client, LiquidityPayload, LiquiditySource, LpMintResolver};
use crate::models::{DataSource, VettingConfig};
use crate::utils::short_address;

#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    success: bool,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct PoolPage {
    #[serde(default)]
    data: Vec<RaydiumPool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RaydiumMint {
    pub address: String,
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RaydiumDayStats {
    pub volume: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaydiumPool {
    pub id: String,
    #[serde(rename = "type", default)]
    pub pool_type: Option<String>,
    pub mint_a: RaydiumMint,
    pub mint_b: RaydiumMint,
    pub tvl: Option<f64>,
    pub day: Option<RaydiumDayStats>,
    pub lp_mint: Option<RaydiumMint>,
    /// Unix seconds; the API sends it as a string
    #[serde(default, deserialize_with = "lenient_i64")]
    pub open_time: Option<i64>,
}

impl RaydiumPool {
    pub fn contains_mint(&self, mint: &str) -> bool {
        self.mint_a.address == mint || self.mint_b.address == mint
    }
}

fn lenient_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_i64(),
        Some(serde_json::Value::String(s)) => s.parse().ok(),
        _ => None,
    })
}

/// Raydium v3 API client
pub struct RaydiumClient {
    client: reqwest::Client,
    base_url: String,
}

impl RaydiumClient {
    pub fn new(config: &VettingConfig) -> Result<Self> {
        Ok(Self {
            client: build_http_client(config.provider_timeout)?,
            base_url: config.raydium_api_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get<T: for<'de> Deserialize<'de>>(&self, url: &str) -> Result<T> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| eyre!("Raydium request failed: {}", e))?;

        if !response.status().is_success() {
            return Err(eyre!("Raydium API error: {}", response.status()));
        }

        let envelope: ApiEnvelope<T> = response
            .json()
            .await
            .map_err(|e| eyre!("Failed to parse Raydium response: {}", e))?;

        if !envelope.success {
            return Err(eyre!("Raydium API reported failure"));
        }
        envelope.data.ok_or_else(|| eyre!("Raydium response without data"))
    }

    /// Pools holding `mint` on either side
    pub async fn pools_for_mint(&self, mint: &str) -> Result<Vec<RaydiumPool>> {
        let url = format!(
            "{}/pools/info/mint?mint1={}&poolType=all&poolSortField=liquidity&sortType=desc&pageSize=100&page=1",
            self.base_url, mint
        );
        info!("🔍 Raydium: Scanning pools for {}", short_address(mint));
        let page: PoolPage = self.get(&url).await?;
        Ok(page.data)
    }

    /// Largest-TVL pool for `mint` and the number of matching pools
    pub async fn best_pool(&self, mint: &str) -> Result<(RaydiumPool, u32)> {
        let pools = self.pools_for_mint(mint).await?;
        select_largest_pool(pools, mint).ok_or_else(|| eyre!("No Raydium pool holds this mint"))
    }

    pub async fn pool_by_id(&self, pool_id: &str) -> Result<Option<RaydiumPool>> {
        let url = format!("{}/pools/info/ids?ids={}", self.base_url, pool_id);
        let pools: Vec<Option<RaydiumPool>> = self.get(&url).await?;
        Ok(pools.into_iter().flatten().find(|p| p.id == pool_id))
    }
}

/// Pools matching on mintA or mintB, largest TVL wins
pub fn select_largest_pool(pools: Vec<RaydiumPool>, mint: &str) -> Option<(RaydiumPool, u32)> {
    let matching: Vec<RaydiumPool> = pools.into_iter().filter(|p| p.contains_mint(mint)).collect();
    let count = matching.len() as u32;
    matching
        .into_iter()
        .max_by(|a, b| {
            a.tvl
                .unwrap_or(0.0)
                .partial_cmp(&b.tvl.unwrap_or(0.0))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|p| (p, count))
}

#[async_trait]
impl LiquiditySource for RaydiumClient {
    fn source(&self) -> DataSource {
        DataSource::Raydium
    }

    async fn fetch_liquidity(&self, address: &str) -> Result<LiquidityPayload> {
        let (pool, pool_count) = self.best_pool(address).await?;
        debug!(
            "Raydium pool {} tvl ${:.0} ({} pools)",
            short_address(&pool.id),
            pool.tvl.unwrap_or(0.0),
            pool_count
        );
        Ok(LiquidityPayload::Raydium { pool, pool_count })
    }
}

#[async_trait]
impl LpMintResolver for RaydiumClient {
    async fn resolve_lp_mint(&self, pool_id: &str) -> Result<Option<String>> {
        Ok(self
            .pool_by_id(pool_id)
            .await?
            .and_then(|p| p.lp_mint)
            .map(|m| m.address))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(id: &str, a: &str, b: &str, tvl: f64) -> RaydiumPool {
        serde_json::from_value(serde_json::json!({
            "type": "Standard",
            "id": id,
            "mintA": { "address": a },
            "mintB": { "address": b },
            "tvl": tvl,
            "lpMint": { "address": format!("lp-{}", id) },
            "openTime": "1700000000"
        }))
        .unwrap()
    }

    #[test]
    fn test_select_largest_pool() {
        let pools = vec![
            pool("p1", "MINT", "SOL", 10_000.0),
            pool("p2", "USDC", "MINT", 80_000.0),
            pool("p3", "OTHER", "SOL", 1_000_000.0),
        ];
        let (best, count) = select_largest_pool(pools, "MINT").unwrap();
        assert_eq!(best.id, "p2");
        assert_eq!(count, 2);
        assert_eq!(best.lp_mint.unwrap().address, "lp-p2");
    }

    #[test]
    fn test_open_time_as_string() {
        let p = pool("p1", "MINT", "SOL", 1.0);
        assert_eq!(p.open_time, Some(1_700_000_000));
    }

    #[test]
    fn test_no_matching_pool() {
        assert!(select_largest_pool(vec![pool("p", "A", "B", 5.0)], "MINT").is_none());
    }
}
