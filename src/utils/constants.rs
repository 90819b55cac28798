//! Constants Module - Single Source of Truth
//!
//! Provider endpoints, analyzer thresholds and the known-address
//! registries (burn addresses, lock contracts, program authorities,
//! known-token creation dates) live here and nowhere else.

use chrono::{DateTime, TimeZone, Utc};
use lazy_static::lazy_static;
use std::collections::HashMap;

// ============================================
// APPLICATION CONSTANTS
// ============================================

/// Application name
pub const APP_NAME: &str = "TokenVetter";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// User-Agent for provider HTTP requests
pub const USER_AGENT: &str = "TokenVetter/0.1.0";

// ============================================
// PROVIDER ENDPOINTS
// ============================================

pub const DEFAULT_SOLANA_RPC_URL: &str = "https://api.mainnet-beta.solana.com";
pub const DEFAULT_HELIUS_RPC_URL: &str = "https://mainnet.helius-rpc.com";
pub const DEFAULT_SOLSCAN_URL: &str = "https://pro-api.solscan.io/v2.0";
pub const DEFAULT_DEXSCREENER_URL: &str = "https://api.dexscreener.com";
pub const DEFAULT_RAYDIUM_API_URL: &str = "https://api-v3.raydium.io";
pub const DEFAULT_RUGCHECK_URL: &str = "https://api.rugcheck.xyz/v1";

/// DexScreener chain id for Solana pairs
pub const DEXSCREENER_CHAIN: &str = "solana";

/// Signatures per `getSignaturesForAddress` page (RPC maximum)
pub const SIGNATURE_PAGE_SIZE: usize = 1_000;

// ============================================
// ADDRESS FORMAT
// ============================================

pub const MIN_ADDRESS_LEN: usize = 32;
pub const MAX_ADDRESS_LEN: usize = 44;

/// Decoded length of an ed25519 public key
pub const PUBKEY_BYTES: usize = 32;

// ============================================
// HOLDER ANALYZER THRESHOLDS (percent of supply)
// ============================================

pub const WHALE_THRESHOLD_PERCENT: f64 = 5.0;
pub const SELL_OFF_THRESHOLD_PERCENT: f64 = 25.0;
pub const CONTRACT_HOLDER_THRESHOLD_PERCENT: f64 = 5.0;
/// Identical consecutive characters marking a vanity/program address
pub const REPEATED_CHAR_RUN: usize = 5;

pub const CONCENTRATION_VERY_HIGH_PERCENT: f64 = 50.0;
pub const CONCENTRATION_HIGH_PERCENT: f64 = 25.0;
pub const CONCENTRATION_MEDIUM_PERCENT: f64 = 10.0;

/// Address suffixes used by program-derived vanity addresses
pub const PROGRAM_SUFFIXES: &[&str] = &["pump", "1111", "Program", "Vault", "Authority"];

// ============================================
// LIQUIDITY LOCK DETECTOR
// ============================================

/// Top LP holder share above which an unregistered holder is treated as a lock
pub const LP_LOCK_CONCENTRATION_PERCENT: f64 = 90.0;
/// Conservative lock duration for an unregistered lock holder
pub const DEFAULT_UNKNOWN_LOCK_MONTHS: u32 = 3;
pub const UNKNOWN_LOCK_CONTRACT: &str = "unknown";

/// Canonical unspendable addresses
pub const BURN_ADDRESSES: &[&str] = &[
    "11111111111111111111111111111111",
    "1nc1nerator11111111111111111111111111111111",
];

/// Known lock/vesting program
#[derive(Debug, Clone, Copy)]
pub struct LockContract {
    pub name: &'static str,
    pub address: &'static str,
    pub default_lock_months: u32,
}

pub const LOCK_CONTRACTS: &[LockContract] = &[
    LockContract {
        name: "Streamflow",
        address: "strmRqUCoQUgGUan5YhzUZa6KqdzwX5L6FpUxfmKg5m",
        default_lock_months: 12,
    },
    LockContract {
        name: "UNCX Network",
        address: "UNCXwJaodKz7uGqz3yXzx4qcAa6aKMxxdFTvVkYsw5W",
        default_lock_months: 6,
    },
    LockContract {
        name: "Token Metrics",
        address: "tokenmeknbxE4gQUmRpEQZxBc7KHPgKBLxDJeFGhogU",
        default_lock_months: 12,
    },
];

pub fn find_lock_contract(address: &str) -> Option<&'static LockContract> {
    LOCK_CONTRACTS.iter().find(|c| c.address == address)
}

pub fn is_burn_address(address: &str) -> bool {
    BURN_ADDRESSES.contains(&address)
}

// ============================================
// KNOWN PROGRAM / AMM AUTHORITY ADDRESSES
// ============================================

pub const KNOWN_PROGRAM_ADDRESSES: &[&str] = &[
    // Raydium AMM v4 authority
    "5Q544fKrFoe6tsEbD7S8EmxGTJYAKtTVhAW5Q5pge4j1",
    // Raydium AMM v4 program
    "675kPX9MHTjS2zt1qfr1NYHuzeLXfQM9H24wFSUt1Mp8",
    // Raydium CPMM program
    "CPMMoo8L3F4NbTegBCKVNunggL7H1ZpdTHKxQB5qKP1C",
    // Orca Whirlpool program
    "whirLbMiicVdio4qvUfM5KAg6Ct8VwpYzGff3uctyCc",
    // pump.fun bonding curve program
    "6EF8rrecthR5Dkzon8Nwu78hRvfCKubJ14M5uBEwF6P",
    // SPL token program
    "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA",
];

pub fn is_known_program(address: &str) -> bool {
    KNOWN_PROGRAM_ADDRESSES.contains(&address)
}

// ============================================
// KNOWN TOKEN AGE TABLE
// ============================================

/// Well-known mint with a fixed creation date
#[derive(Debug, Clone)]
pub struct KnownToken {
    pub symbol: &'static str,
    pub name: &'static str,
    pub created_at: DateTime<Utc>,
}

fn known(symbol: &'static str, name: &'static str, y: i32, m: u32, d: u32) -> Option<KnownToken> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0)
        .single()
        .map(|created_at| KnownToken {
            symbol,
            name,
            created_at,
        })
}

lazy_static! {
    pub static ref KNOWN_TOKENS: HashMap<&'static str, KnownToken> = {
        let entries = [
            ("So11111111111111111111111111111111111111112", known("SOL", "Wrapped SOL", 2020, 3, 16)),
            ("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v", known("USDC", "USD Coin", 2020, 10, 8)),
            ("Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB", known("USDT", "Tether USD", 2020, 12, 3)),
            ("4k3Dyjzvzp8eMZWUXbBCjEvwSkkk59S5iCNLY3QrkX6R", known("RAY", "Raydium", 2021, 2, 21)),
            ("DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263", known("BONK", "Bonk", 2022, 12, 25)),
            ("JUPyiwrYJFskUPiHa7hkeR8VUtAeFoSYbKedZNsDvCN", known("JUP", "Jupiter", 2024, 1, 25)),
            ("EKpQGSJtjMFqKZ9KQanSqYXRcF8fBopzLHYxdM65zcjm", known("WIF", "dogwifhat", 2023, 11, 20)),
        ];
        entries
            .into_iter()
            .filter_map(|(addr, token)| token.map(|t| (addr, t)))
            .collect()
    };
}

pub fn known_token(address: &str) -> Option<&'static KnownToken> {
    KNOWN_TOKENS.get(address)
}

// ============================================
// AGE HEURISTIC (market-activity buckets)
// ============================================

/// (min 24h volume USD, min liquidity USD, min market cap USD, estimated age days)
/// First bucket whose every threshold is met wins.
pub const AGE_HEURISTIC_BUCKETS: &[(f64, f64, f64, f64)] = &[
    (1_000_000.0, 1_000_000.0, 100_000_000.0, 365.0),
    (250_000.0, 250_000.0, 10_000_000.0, 180.0),
    (50_000.0, 100_000.0, 1_000_000.0, 60.0),
    (10_000.0, 25_000.0, 100_000.0, 21.0),
];

/// Estimate when trading exists but no bucket matches
pub const AGE_HEURISTIC_FLOOR_DAYS: f64 = 3.0;

/// Age assigned when every age source failed; never passes the gate
pub const UNKNOWN_AGE_DEFAULT_DAYS: f64 = 0.0;
