//! Solana JSON-RPC Client
//!
//! 1. Primary RPC with optional fallback endpoint
//! 2. Exponential backoff retry with jitter (rate limits, transient errors)
//! 3. User-Agent header & gzip compression
//! 4. Mint account (`getAccountInfo` jsonParsed), creation time
//!    (`getSignaturesForAddress` paginated), largest holders
//!    (`getTokenLargestAccounts` + owner resolution)
//!
//! URLs are only ever logged masked.

use async_trait::async_trait;
use eyre::{eyre, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{
    build_http_client, AgePayload, AgeSource, HolderPayload, HolderSource, LpHolderSource,
    LpHolders, MetadataPayload, MetadataSource,
};
use crate::models::{DataSource, Holder, VettingConfig};
use crate::utils::{masked_url, short_address, SIGNATURE_PAGE_SIZE};

// ============================================
// RETRY CONSTANTS
// ============================================

/// Base retry delay in milliseconds
pub const BASE_RETRY_MS: u64 = 250;

/// Maximum retry delay in milliseconds
pub const MAX_RETRY_MS: u64 = 2_000;

/// Jitter percentage for retry delay (avoid thundering herd)
pub const RETRY_JITTER_PERCENT: u64 = 20;

/// `getMultipleAccounts` accepts at most 100 keys
const MAX_MULTIPLE_ACCOUNTS: usize = 100;

/// Backoff for the given attempt (1-based), with random jitter
pub fn retry_delay_ms(attempt: u32) -> u64 {
    let base_delay = BASE_RETRY_MS.saturating_mul(2_u64.saturating_pow(attempt.saturating_sub(1)));
    let capped_delay = base_delay.min(MAX_RETRY_MS);

    let jitter_range = (capped_delay * RETRY_JITTER_PERCENT) / 100;
    let jitter: i64 =
        rand::thread_rng().gen_range(-(jitter_range as i64)..=(jitter_range as i64));
    (capped_delay as i64 + jitter).max(50) as u64
}

// ============================================
// WIRE TYPES
// ============================================

/// JSON-RPC response structure
#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

/// JSON-RPC error structure
#[derive(Debug, Clone, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

impl RpcError {
    /// Rate limited (HTTP 429 surfaced as code -32005 by some nodes)
    pub fn is_rate_limit(&self) -> bool {
        self.code == -32005 || self.message.to_lowercase().contains("rate limit")
    }
}

/// Solana wraps most results in `{ context, value }`
#[derive(Debug, Deserialize)]
struct WithContext<T> {
    value: T,
}

#[derive(Debug, Deserialize)]
struct ParsedAccount {
    data: ParsedData,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ParsedData {
    Parsed { parsed: ParsedInner },
    // Base64 tuple or anything else we cannot interpret
    Raw(serde_json::Value),
}

#[derive(Debug, Deserialize)]
struct ParsedInner {
    #[serde(rename = "type", default)]
    kind: String,
    info: serde_json::Value,
}

/// SPL mint account as returned by `jsonParsed`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcMintInfo {
    pub decimals: u8,
    /// Raw integer supply
    pub supply: String,
    pub mint_authority: Option<String>,
    pub freeze_authority: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenAccountInfo {
    owner: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LargestAccount {
    address: String,
    ui_amount: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenSupply {
    ui_amount: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignatureInfo {
    signature: String,
    block_time: Option<i64>,
}

// ============================================
// CLIENT
// ============================================

/// Solana RPC client with retry logic and fallback support
#[derive(Clone)]
pub struct SolanaRpcClient {
    primary_url: String,
    fallback_url: Option<String>,
    client: reqwest::Client,
    retries: u32,
    signature_pages: usize,
}

impl SolanaRpcClient {
    pub fn new(config: &VettingConfig) -> Result<Self> {
        let client = build_http_client(config.provider_timeout)?;
        info!(
            "✅ Solana RPC initialized ({}{})",
            masked_url(&config.rpc_url),
            if config.rpc_fallback_url.is_some() {
                ", fallback configured"
            } else {
                ""
            }
        );
        Ok(Self {
            primary_url: config.rpc_url.clone(),
            fallback_url: config.rpc_fallback_url.clone(),
            client,
            retries: config.rpc_retries,
            signature_pages: config.signature_pages,
        })
    }

    /// Get RPC URL (masked for logging)
    pub fn masked_url(&self) -> String {
        masked_url(&self.primary_url)
    }

    /// Execute JSON-RPC call with retry logic and fallback
    pub async fn call<T: for<'de> Deserialize<'de>>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T> {
        let payload = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });

        let primary_err = match self.call_with_retry(&self.primary_url, &payload).await {
            Ok(result) => return Ok(result),
            Err(e) => {
                warn!("⚠️ Primary RPC failed on {}: {}", method, e);
                e
            }
        };

        if let Some(ref fallback) = self.fallback_url {
            info!("🔄 Trying fallback RPC for {}", method);
            match self.call_with_retry(fallback, &payload).await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    warn!("⚠️ Fallback RPC also failed: {}", e);
                }
            }
        }

        Err(eyre!("All RPC endpoints failed for {}: {}", method, primary_err))
    }

    async fn call_with_retry<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        payload: &serde_json::Value,
    ) -> Result<T> {
        let mut last_error = None;

        for attempt in 0..=self.retries {
            if attempt > 0 {
                let delay = retry_delay_ms(attempt);
                debug!("⏳ Retry {}/{} after {}ms", attempt, self.retries, delay);
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }

            match self.execute_call::<T>(url, payload).await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    if e.to_string().contains("429") || e.to_string().contains("rate limit") {
                        warn!(
                            "⏳ Rate limited, backing off (attempt {}/{})",
                            attempt + 1,
                            self.retries + 1
                        );
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| eyre!("RPC call failed after {} retries", self.retries)))
    }

    async fn execute_call<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        payload: &serde_json::Value,
    ) -> Result<T> {
        let response = self
            .client
            .post(url)
            .json(payload)
            .send()
            .await
            .map_err(|e| eyre!("Request failed: {}", e))?;

        let status = response.status();
        if status == 429 {
            return Err(eyre!("Rate limited (HTTP 429)"));
        }
        if !status.is_success() {
            return Err(eyre!("HTTP error: {}", status));
        }

        let json: RpcResponse<T> = response
            .json()
            .await
            .map_err(|e| eyre!("Failed to parse response: {}", e))?;

        if let Some(error) = json.error {
            if error.is_rate_limit() {
                return Err(eyre!("RPC rate limit: {}", error.message));
            }
            return Err(eyre!("RPC error: {} (code: {})", error.message, error.code));
        }

        json.result.ok_or_else(|| eyre!("No result in response"))
    }

    // ============================================
    // MINT ACCOUNT
    // ============================================

    pub async fn get_mint_info(&self, mint: &str) -> Result<RpcMintInfo> {
        let params = serde_json::json!([mint, { "encoding": "jsonParsed" }]);
        let account: WithContext<Option<ParsedAccount>> =
            self.call("getAccountInfo", params).await?;

        let account = account
            .value
            .ok_or_else(|| eyre!("Mint account {} not found", short_address(mint)))?;

        match account.data {
            ParsedData::Parsed { parsed } if parsed.kind == "mint" => {
                serde_json::from_value(parsed.info)
                    .map_err(|e| eyre!("Failed to parse mint info: {}", e))
            }
            ParsedData::Parsed { parsed } => {
                Err(eyre!("Account is a {} account, not a mint", parsed.kind))
            }
            ParsedData::Raw(_) => Err(eyre!("Account data is not a parsed SPL mint")),
        }
    }

    // ============================================
    // CREATION TIME
    // ============================================

    /// Walk signatures newest-first with `before` until a short page.
    /// Returns (earliest block time, scan complete).
    pub async fn earliest_signature_time(&self, address: &str) -> Result<(i64, bool)> {
        let mut before: Option<String> = None;
        let mut earliest: Option<i64> = None;

        for page in 0..self.signature_pages {
            let mut options = serde_json::json!({ "limit": SIGNATURE_PAGE_SIZE });
            if let Some(ref sig) = before {
                options["before"] = serde_json::Value::String(sig.clone());
            }
            let params = serde_json::json!([address, options]);
            let signatures: Vec<SignatureInfo> =
                self.call("getSignaturesForAddress", params).await?;

            if let Some(time) = signatures.iter().rev().find_map(|s| s.block_time) {
                earliest = Some(time);
            }

            if signatures.len() < SIGNATURE_PAGE_SIZE {
                debug!(
                    "📜 Signature scan for {} complete after {} pages",
                    short_address(address),
                    page + 1
                );
                return earliest
                    .map(|t| (t, true))
                    .ok_or_else(|| eyre!("No signatures with block time"));
            }

            before = signatures.last().map(|s| s.signature.clone());
        }

        warn!(
            "📜 Signature scan for {} hit the {}-page cap, age is a lower bound",
            short_address(address),
            self.signature_pages
        );
        earliest
            .map(|t| (t, false))
            .ok_or_else(|| eyre!("No signatures with block time"))
    }

    // ============================================
    // HOLDERS
    // ============================================

    /// Largest token accounts resolved to their owner wallets, merged per owner
    pub async fn largest_holders(&self, mint: &str, limit: usize) -> Result<Vec<Holder>> {
        let params = serde_json::json!([mint]);
        let largest: WithContext<Vec<LargestAccount>> =
            self.call("getTokenLargestAccounts", params).await?;

        let accounts: Vec<LargestAccount> = largest.value.into_iter().take(limit).collect();
        if accounts.is_empty() {
            return Err(eyre!("No token accounts for {}", short_address(mint)));
        }

        let owners = self.resolve_owners(&accounts).await;

        let mut merged: HashMap<String, f64> = HashMap::new();
        let mut order: Vec<String> = Vec::new();
        for account in &accounts {
            let owner = owners
                .get(&account.address)
                .cloned()
                .unwrap_or_else(|| account.address.clone());
            let amount = account.ui_amount.unwrap_or(0.0);
            if !merged.contains_key(&owner) {
                order.push(owner.clone());
            }
            *merged.entry(owner).or_insert(0.0) += amount;
        }

        let mut holders: Vec<Holder> = order
            .into_iter()
            .map(|owner| {
                let amount = merged.get(&owner).copied().unwrap_or(0.0);
                Holder::new(owner, amount)
            })
            .collect();
        holders.sort_by(|a, b| {
            b.amount
                .partial_cmp(&a.amount)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(holders)
    }

    /// Token account -> owner. Failures leave the token account address in place.
    async fn resolve_owners(&self, accounts: &[LargestAccount]) -> HashMap<String, String> {
        let mut owners = HashMap::new();
        for chunk in accounts.chunks(MAX_MULTIPLE_ACCOUNTS) {
            let keys: Vec<&str> = chunk.iter().map(|a| a.address.as_str()).collect();
            let params = serde_json::json!([keys, { "encoding": "jsonParsed" }]);
            let result: Result<WithContext<Vec<Option<ParsedAccount>>>> =
                self.call("getMultipleAccounts", params).await;

            match result {
                Ok(resp) => {
                    for (account, parsed) in chunk.iter().zip(resp.value) {
                        let owner = parsed.and_then(|p| match p.data {
                            ParsedData::Parsed { parsed } => {
                                serde_json::from_value::<TokenAccountInfo>(parsed.info)
                                    .ok()
                                    .map(|i| i.owner)
                            }
                            ParsedData::Raw(_) => None,
                        });
                        if let Some(owner) = owner {
                            owners.insert(account.address.clone(), owner);
                        }
                    }
                }
                Err(e) => warn!("⚠️ Owner resolution failed, using token accounts: {}", e),
            }
        }
        owners
    }

    pub async fn token_supply(&self, mint: &str) -> Result<f64> {
        let params = serde_json::json!([mint]);
        let supply: WithContext<TokenSupply> = self.call("getTokenSupply", params).await?;
        supply
            .value
            .ui_amount
            .ok_or_else(|| eyre!("Token supply missing uiAmount"))
    }
}

// ============================================
// FACET SOURCES
// ============================================

#[async_trait]
impl MetadataSource for SolanaRpcClient {
    fn source(&self) -> DataSource {
        DataSource::SolanaRpc
    }

    async fn fetch_metadata(&self, address: &str) -> Result<MetadataPayload> {
        self.get_mint_info(address).await.map(MetadataPayload::RpcMint)
    }
}

#[async_trait]
impl AgeSource for SolanaRpcClient {
    fn source(&self) -> DataSource {
        DataSource::SolanaRpc
    }

    async fn fetch_creation(&self, address: &str) -> Result<AgePayload> {
        let (earliest_block_time, complete) = self.earliest_signature_time(address).await?;
        Ok(AgePayload::RpcSignatures {
            earliest_block_time,
            complete,
        })
    }
}

#[async_trait]
impl HolderSource for SolanaRpcClient {
    fn source(&self) -> DataSource {
        DataSource::SolanaRpc
    }

    async fn fetch_holders(&self, address: &str, limit: usize) -> Result<HolderPayload> {
        self.largest_holders(address, limit)
            .await
            .map(HolderPayload::RpcLargestAccounts)
    }
}

#[async_trait]
impl LpHolderSource for SolanaRpcClient {
    async fn fetch_lp_holders(&self, lp_mint: &str) -> Result<LpHolders> {
        let holders = self.largest_holders(lp_mint, usize::MAX).await?;
        let total_supply = match self.token_supply(lp_mint).await {
            Ok(supply) => Some(supply),
            Err(e) => {
                debug!("LP supply unavailable for {}: {}", short_address(lp_mint), e);
                None
            }
        };
        Ok(LpHolders {
            holders,
            total_supply,
        })
    }
}
