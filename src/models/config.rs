//! Runtime configuration for the vetting engine
//!
//! All provider endpoints, keys, timeouts and limits come from the
//! environment. API keys are never logged.

use std::time::Duration;
use tracing::info;

use crate::utils::constants::{
    DEFAULT_DEXSCREENER_URL, DEFAULT_HELIUS_RPC_URL, DEFAULT_RAYDIUM_API_URL,
    DEFAULT_RUGCHECK_URL, DEFAULT_SOLANA_RPC_URL, DEFAULT_SOLSCAN_URL,
};

/// Engine configuration shared by every provider client and the pipeline
#[derive(Debug, Clone)]
pub struct VettingConfig {
    /// Primary Solana JSON-RPC endpoint
    pub rpc_url: String,
    /// Secondary RPC endpoint used when the primary keeps failing
    pub rpc_fallback_url: Option<String>,
    pub helius_api_key: Option<String>,
    pub helius_rpc_url: String,
    pub solscan_api_key: Option<String>,
    pub solscan_base_url: String,
    pub dexscreener_base_url: String,
    pub raydium_api_url: String,
    pub rugcheck_base_url: String,

    /// Budget for a single provider call
    pub provider_timeout: Duration,
    /// Budget for a whole snapshot
    pub request_timeout: Duration,
    /// Global minimum project age, applied before any tier
    pub min_age_days: u32,
    pub max_batch_size: usize,
    pub batch_concurrency: usize,
    /// Number of largest holders analysed
    pub holder_limit: usize,
    /// Cap on 1000-signature pages scanned for the creation time
    pub signature_pages: usize,
    pub rpc_retries: u32,
    /// Permit the seeded synthetic holder list as last resort
    pub allow_synthetic_holders: bool,
    pub tier_config_path: Option<String>,
}

impl Default for VettingConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_SOLANA_RPC_URL.to_string(),
            rpc_fallback_url: None,
            helius_api_key: None,
            helius_rpc_url: DEFAULT_HELIUS_RPC_URL.to_string(),
            solscan_api_key: None,
            solscan_base_url: DEFAULT_SOLSCAN_URL.to_string(),
            dexscreener_base_url: DEFAULT_DEXSCREENER_URL.to_string(),
            raydium_api_url: DEFAULT_RAYDIUM_API_URL.to_string(),
            rugcheck_base_url: DEFAULT_RUGCHECK_URL.to_string(),
            provider_timeout: Duration::from_millis(5_000),
            request_timeout: Duration::from_millis(20_000),
            min_age_days: 14,
            max_batch_size: 20,
            batch_concurrency: 20,
            holder_limit: 40,
            signature_pages: 10,
            rpc_retries: 2,
            allow_synthetic_holders: false,
            tier_config_path: None,
        }
    }
}

impl VettingConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let config = Self {
            rpc_url: env_string("SOLANA_RPC_URL").unwrap_or(defaults.rpc_url),
            rpc_fallback_url: env_string("SOLANA_RPC_FALLBACK_URL"),
            helius_api_key: env_key("HELIUS_API_KEY"),
            helius_rpc_url: env_string("HELIUS_RPC_URL").unwrap_or(defaults.helius_rpc_url),
            solscan_api_key: env_key("SOLSCAN_API_KEY"),
            solscan_base_url: env_string("SOLSCAN_BASE_URL").unwrap_or(defaults.solscan_base_url),
            dexscreener_base_url: env_string("DEXSCREENER_BASE_URL")
                .unwrap_or(defaults.dexscreener_base_url),
            raydium_api_url: env_string("RAYDIUM_API_URL").unwrap_or(defaults.raydium_api_url),
            rugcheck_base_url: env_string("RUGCHECK_BASE_URL")
                .unwrap_or(defaults.rugcheck_base_url),
            provider_timeout: env_parse("VETTING_PROVIDER_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.provider_timeout),
            request_timeout: env_parse("VETTING_REQUEST_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.request_timeout),
            min_age_days: env_parse("VETTING_MIN_AGE_DAYS").unwrap_or(defaults.min_age_days),
            max_batch_size: env_parse("VETTING_MAX_BATCH").unwrap_or(defaults.max_batch_size),
            batch_concurrency: env_parse::<usize>("VETTING_BATCH_CONCURRENCY")
                .unwrap_or(defaults.batch_concurrency)
                .max(1),
            holder_limit: env_parse::<usize>("VETTING_HOLDER_LIMIT")
                .unwrap_or(defaults.holder_limit)
                .max(1),
            signature_pages: env_parse::<usize>("VETTING_SIGNATURE_PAGES")
                .unwrap_or(defaults.signature_pages)
                .max(1),
            rpc_retries: env_parse("VETTING_RPC_RETRIES").unwrap_or(defaults.rpc_retries),
            allow_synthetic_holders: env_parse("VETTING_ALLOW_SYNTHETIC_HOLDERS")
                .unwrap_or(defaults.allow_synthetic_holders),
            tier_config_path: env_string("TIER_CONFIG_PATH"),
        };

        if config.helius_api_key.is_some() {
            info!("🔑 HELIUS_API_KEY configured (key hidden for security)");
        }
        if config.solscan_api_key.is_some() {
            info!("🔑 SOLSCAN_API_KEY configured (key hidden for security)");
        }
        if config.allow_synthetic_holders {
            info!("⚠️  Synthetic holder fallback ENABLED (results tagged unknown)");
        }

        config
    }

    /// Shorter timeouts, no retries: used by tests that hit stub sources
    pub fn for_tests() -> Self {
        Self {
            provider_timeout: Duration::from_millis(500),
            request_timeout: Duration::from_millis(2_000),
            rpc_retries: 0,
            ..Self::default()
        }
    }
}

/// HTTP server configuration for the vetting API
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let port = env_parse("PORT")
            .or_else(|| env_parse("VETTER_PORT"))
            .unwrap_or(8080);
        Self {
            host: env_string("VETTER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
        }
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Keys left at a template placeholder count as unset
fn env_key(name: &str) -> Option<String> {
    env_string(name).filter(|k| k != "YOUR_API_KEY")
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env_string(name).and_then(|v| v.parse().ok())
}
