//! Solscan Pro API v2 client (holder list + token creation time)
//!
//! Requires `SOLSCAN_API_KEY`; without it the client is left out of every chain.

use async_trait::async_trait;
use eyre::{eyre, Result};
use serde::Deserialize;
use tracing::info;

use super::{build_http_client, AgePayload, AgeSource, HolderPayload, HolderSource};
use crate::models::{DataSource, VettingConfig};
use crate::utils::short_address;

/// Page sizes accepted by `/token/holders`
const PAGE_SIZES: [usize; 4] = [10, 20, 30, 40];

#[derive(Debug, Deserialize)]
struct SolscanEnvelope<T> {
    success: bool,
    data: Option<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SolscanHolderItem {
    pub owner: String,
    /// Raw integer amount
    pub amount: f64,
    #[serde(default)]
    pub decimals: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SolscanHolders {
    pub total: Option<u64>,
    #[serde(default)]
    pub items: Vec<SolscanHolderItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SolscanTokenMeta {
    pub created_time: Option<i64>,
    pub first_mint_time: Option<i64>,
}

pub struct SolscanClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl SolscanClient {
    pub fn new(config: &VettingConfig) -> Result<Self> {
        Ok(Self {
            client: build_http_client(config.provider_timeout)?,
            base_url: config.solscan_base_url.trim_end_matches('/').to_string(),
            api_key: config.solscan_api_key.clone(),
        })
    }

    pub fn has_key(&self) -> bool {
        self.api_key.is_some()
    }

    async fn get<T: for<'de> Deserialize<'de>>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| eyre!("SOLSCAN_API_KEY not configured"))?;

        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .header("token", key)
            .query(query)
            .send()
            .await
            .map_err(|e| eyre!("Solscan request failed: {}", e))?;

        let status = response.status();
        if status == 429 {
            return Err(eyre!("Solscan rate limited (HTTP 429)"));
        }
        if !status.is_success() {
            return Err(eyre!("Solscan API error: {}", status));
        }

        let envelope: SolscanEnvelope<T> = response
            .json()
            .await
            .map_err(|e| eyre!("Failed to parse Solscan response: {}", e))?;
        if !envelope.success {
            return Err(eyre!("Solscan reported failure"));
        }
        envelope.data.ok_or_else(|| eyre!("Solscan response without data"))
    }

    pub async fn token_holders(&self, mint: &str, limit: usize) -> Result<SolscanHolders> {
        let page_size = page_size_for(limit);
        info!("👥 Solscan: Fetching top {} holders for {}", page_size, short_address(mint));
        let mut holders: SolscanHolders = self
            .get(
                "/token/holders",
                &[
                    ("address", mint.to_string()),
                    ("page", "1".to_string()),
                    ("page_size", page_size.to_string()),
                ],
            )
            .await?;
        if holders.items.is_empty() {
            return Err(eyre!("Solscan returned no holders"));
        }
        holders.items.truncate(limit);
        Ok(holders)
    }

    pub async fn token_meta(&self, mint: &str) -> Result<SolscanTokenMeta> {
        self.get("/token/meta", &[("address", mint.to_string())]).await
    }
}

/// Smallest accepted page size covering `limit` (capped at the maximum)
fn page_size_for(limit: usize) -> usize {
    PAGE_SIZES
        .iter()
        .copied()
        .find(|size| *size >= limit)
        .unwrap_or(PAGE_SIZES[PAGE_SIZES.len() - 1])
}

#[async_trait]
impl HolderSource for SolscanClient {
    fn source(&self) -> DataSource {
        DataSource::Solscan
    }

    async fn fetch_holders(&self, address: &str, limit: usize) -> Result<HolderPayload> {
        self.token_holders(address, limit)
            .await
            .map(HolderPayload::Solscan)
    }
}

#[async_trait]
impl AgeSource for SolscanClient {
    fn source(&self) -> DataSource {
        DataSource::Solscan
    }

    async fn fetch_creation(&self, address: &str) -> Result<AgePayload> {
        let meta = self.token_meta(address).await?;
        let created_time = meta
            .created_time
            .or(meta.first_mint_time)
            .filter(|t| *t > 0)
            .ok_or_else(|| eyre!("Solscan meta has no creation time"))?;
        Ok(AgePayload::SolscanMeta { created_time })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size_for() {
        assert_eq!(page_size_for(5), 10);
        assert_eq!(page_size_for(40), 40);
        assert_eq!(page_size_for(100), 40);
    }

    #[test]
    fn test_parse_holders() {
        let raw = serde_json::json!({
            "success": true,
            "data": {
                "total": 98231,
                "items": [
                    { "address": "acct1", "amount": 5000000000.0, "decimals": 6, "owner": "wallet1", "rank": 1 },
                    { "address": "acct2", "amount": 1000000.0, "decimals": 6, "owner": "wallet2", "rank": 2 }
                ]
            }
        });
        let envelope: SolscanEnvelope<SolscanHolders> = serde_json::from_value(raw).unwrap();
        let holders = envelope.data.unwrap();
        assert_eq!(holders.total, Some(98231));
        assert_eq!(holders.items[0].owner, "wallet1");
    }
}
