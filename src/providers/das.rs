//! Helius DAS `getAsset` client (secondary metadata source)

use async_trait::async_trait;
use eyre::{eyre, Result};
use serde::Deserialize;
use tracing::info;

use super::{build_http_client, MetadataPayload, MetadataSource};
use crate::models::{DataSource, VettingConfig};
use crate::utils::short_address;

#[derive(Debug, Deserialize)]
struct DasResponse {
    result: Option<DasAsset>,
    error: Option<DasError>,
}

#[derive(Debug, Deserialize)]
struct DasError {
    message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DasAsset {
    pub id: String,
    pub content: Option<DasContent>,
    pub token_info: Option<DasTokenInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DasContent {
    pub metadata: Option<DasMetadata>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DasMetadata {
    pub name: Option<String>,
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DasTokenInfo {
    pub decimals: Option<u8>,
    /// Raw integer supply
    pub supply: Option<u64>,
    pub mint_authority: Option<String>,
    pub freeze_authority: Option<String>,
}

pub struct DasClient {
    client: reqwest::Client,
    url: String,
}

impl DasClient {
    pub fn new(config: &VettingConfig) -> Result<Self> {
        let key = config
            .helius_api_key
            .as_deref()
            .ok_or_else(|| eyre!("HELIUS_API_KEY not configured"))?;
        Ok(Self {
            client: build_http_client(config.provider_timeout)?,
            url: format!(
                "{}/?api-key={}",
                config.helius_rpc_url.trim_end_matches('/'),
                key
            ),
        })
    }

    pub async fn get_asset(&self, mint: &str) -> Result<DasAsset> {
        info!("🧾 Helius DAS: getAsset {}", short_address(mint));
        let payload = serde_json::json!({
            "jsonrpc": "2.0",
            "id": "token-vetter",
            "method": "getAsset",
            "params": { "id": mint }
        });

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| eyre!("DAS request failed: {}", e))?;

        if !response.status().is_success() {
            return Err(eyre!("DAS API error: {}", response.status()));
        }

        let body: DasResponse = response
            .json()
            .await
            .map_err(|e| eyre!("Failed to parse DAS response: {}", e))?;

        if let Some(error) = body.error {
            return Err(eyre!("DAS error: {}", error.message));
        }
        body.result.ok_or_else(|| eyre!("DAS returned no asset"))
    }
}

#[async_trait]
impl MetadataSource for DasClient {
    fn source(&self) -> DataSource {
        DataSource::HeliusDas
    }

    async fn fetch_metadata(&self, address: &str) -> Result<MetadataPayload> {
        self.get_asset(address).await.map(MetadataPayload::DasAsset)
    }
}
