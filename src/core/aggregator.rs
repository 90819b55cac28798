//! Data Aggregator
//!
//! Builds a `TokenSnapshot` from the configured fallback chains.
//!
//! - Facets (metadata, holders, liquidity + LP lock, age, audit) run
//!   concurrently; providers within one facet are tried sequentially.
//! - Every provider call has its own timeout; every facet is also bounded
//!   by the request deadline. A facet that misses the deadline is replaced
//!   by its tagged fallback while completed facets are kept.
//! - Never fails: an exhausted chain yields an `unknown` facet.

use chrono::{DateTime, Utc};
use eyre::Result;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{timeout, timeout_at};
use tracing::{debug, info, warn};

use super::age_gate::estimate_age_from_market;
use super::contract::analyze_contract;
use super::holders::analyze_holders;
use super::liquidity::detect_lp_lock;
use crate::models::{
    AuthorityStatus, Confidence, DataSource, FacetProvenance, LiquidityInfo, Provenance,
    TokenAge, TokenIdentity, TokenSnapshot, VettingConfig,
};
use crate::providers::{AuditSignal, LiquidityFacet, MetadataFacet, RawHolders, SourceSet};
use crate::utils::constants::UNKNOWN_AGE_DEFAULT_DAYS;
use crate::utils::short_address;

const DEADLINE_FAILURE: &str = "request deadline exceeded";

/// Winner of one fallback chain
struct Resolved<T> {
    value: T,
    source: DataSource,
    depth: u8,
}

/// Result of walking one chain
struct ChainOutcome<T> {
    resolved: Option<Resolved<T>>,
    failures: Vec<String>,
}

impl<T> ChainOutcome<T> {
    fn exhausted(failures: Vec<String>) -> Self {
        Self {
            resolved: None,
            failures,
        }
    }

    fn provenance(&self, confidence: impl Fn(&Resolved<T>) -> Confidence) -> FacetProvenance {
        match &self.resolved {
            Some(r) => FacetProvenance::new(r.source, confidence(r), r.depth, self.failures.clone()),
            None => FacetProvenance::unknown(self.failures.clone()),
        }
    }
}

#[derive(Clone)]
pub struct DataAggregator {
    sources: SourceSet,
    config: Arc<VettingConfig>,
}

impl DataAggregator {
    pub fn new(sources: SourceSet, config: Arc<VettingConfig>) -> Self {
        Self { sources, config }
    }

    /// `Aggregate(address) -> (TokenSnapshot, degraded)`
    pub async fn aggregate(&self, address: &str) -> (TokenSnapshot, bool) {
        let started = Instant::now();
        let now = Utc::now();
        let deadline = tokio::time::Instant::now() + self.config.request_timeout;

        info!("🔎 Aggregating {}", short_address(address));

        let (metadata, holders, liquidity, age, audit) = tokio::join!(
            self.bounded(deadline, "metadata", self.fetch_metadata(address)),
            self.bounded(deadline, "holders", self.fetch_holders(address)),
            self.bounded(deadline, "liquidity", self.fetch_liquidity(address)),
            self.bounded(deadline, "age", self.fetch_age(address, now)),
            self.bounded(deadline, "audit", self.fetch_audit(address)),
        );

        // Metadata
        let metadata_provenance = metadata.provenance(|r| match r.source {
            // Market data has identity but no authority view
            DataSource::DexScreener => Confidence::Estimated,
            _ => Confidence::Verified,
        });
        let MetadataFacet {
            mut identity,
            mint_authority,
            freeze_authority,
        } = metadata.resolved.map(|r| r.value).unwrap_or_else(|| MetadataFacet {
            identity: TokenIdentity::placeholder(),
            mint_authority: AuthorityStatus::Unknown,
            freeze_authority: AuthorityStatus::Unknown,
        });

        // Liquidity
        let liquidity_provenance = liquidity.provenance(|_| Confidence::Verified);
        let liquidity_source = liquidity.resolved.as_ref().map(|r| r.source);
        let (liquidity_info, base_symbol, base_name, pair_created_at) = match liquidity.resolved {
            Some(r) => (r.value.info, r.value.base_symbol, r.value.base_name, r.value.pair_created_at),
            None => (LiquidityInfo::unknown(), None, None, None),
        };

        fill_identity_gaps(&mut identity, base_symbol, base_name);

        // Holders
        let holders_provenance = holders.provenance(|r| r.value.confidence);
        let holder_info = match holders.resolved {
            Some(r) => analyze_holders(r.value.holders, r.value.holder_count),
            None => analyze_holders(Vec::new(), None),
        };

        // Age continues with market data from the liquidity facet
        let (token_age, age_provenance) =
            self.finish_age(age, liquidity_source, pair_created_at, &liquidity_info, now);

        // Audit (optional, never degrades)
        let audit_provenance = audit.provenance(|_| Confidence::Verified);
        let audit_signal: Option<AuditSignal> = audit.resolved.map(|r| r.value);

        let contract = analyze_contract(&mint_authority, &freeze_authority, audit_signal.as_ref());

        let provenance = Provenance {
            metadata: metadata_provenance,
            age: age_provenance,
            holders: holders_provenance,
            liquidity: liquidity_provenance,
            audit: audit_provenance,
        };
        let degraded = provenance.is_degraded();

        let snapshot = TokenSnapshot {
            address: address.to_string(),
            identity,
            mint_authority,
            freeze_authority,
            age: token_age,
            liquidity: liquidity_info,
            holders: holder_info,
            contract,
            provenance,
            degraded,
            fetched_at: now,
        };

        if snapshot.is_fully_unknown() {
            warn!(address = %address, "❌ Every facet chain exhausted");
        } else if degraded {
            warn!(address = %address, "⚠️ Snapshot degraded");
        }
        info!(
            "📦 Snapshot for {} ready in {}ms (age: {:.1}d, liquidity: ${:.0}, holders: {:?})",
            short_address(address),
            started.elapsed().as_millis(),
            snapshot.age.project_age_days,
            snapshot.liquidity.liquidity_usd,
            snapshot.holders.holder_count
        );

        (snapshot, degraded)
    }

    // ============================================
    // FACET CHAINS
    // ============================================

    async fn fetch_metadata(&self, address: &str) -> ChainOutcome<MetadataFacet> {
        self.walk_chain("metadata", &self.sources.metadata, |s| s.source(), |s| async move {
            s.fetch_metadata(address).await.map(|p| p.into_facet())
        })
        .await
    }

    async fn fetch_holders(&self, address: &str) -> ChainOutcome<RawHolders> {
        let limit = self.config.holder_limit;
        self.walk_chain("holders", &self.sources.holders, |s| s.source(), |s| async move {
            s.fetch_holders(address, limit).await.map(|p| p.into_facet())
        })
        .await
    }

    async fn fetch_age(&self, address: &str, now: DateTime<Utc>) -> ChainOutcome<TokenAge> {
        self.walk_chain("age", &self.sources.age, |s| s.source(), |s| async move {
            s.fetch_creation(address).await.and_then(|p| p.into_age(now))
        })
        .await
    }

    async fn fetch_audit(&self, address: &str) -> ChainOutcome<AuditSignal> {
        let chain: Vec<_> = self.sources.audit.iter().cloned().collect();
        self.walk_chain("audit", &chain, |s| s.source(), |s| async move {
            s.fetch_audit(address).await.map(|p| p.into_signal())
        })
        .await
    }

    /// Liquidity source chain, then LP lock detection on the winner
    async fn fetch_liquidity(&self, address: &str) -> ChainOutcome<LiquidityFacet> {
        let mut outcome = self
            .walk_chain("liquidity", &self.sources.liquidity, |s| s.source(), |s| async move {
                s.fetch_liquidity(address).await.map(|p| p.into_facet())
            })
            .await;

        if let Some(resolved) = outcome.resolved.as_mut() {
            if let Err(e) = self.detect_lock(&mut resolved.value.info).await {
                warn!("⚠️ LP lock detection failed for {}: {}", short_address(address), e);
            }
        }
        outcome
    }

    async fn detect_lock(&self, info: &mut LiquidityInfo) -> Result<()> {
        let lp_holders = match &self.sources.lp_holders {
            Some(source) => source,
            None => return Ok(()),
        };

        let lp_mint = match (&info.lp_mint, &info.pair_address, &self.sources.lp_resolver) {
            (Some(mint), _, _) => Some(mint.clone()),
            (None, Some(pool_id), Some(resolver)) if is_raydium_pool(info.dex_id.as_deref()) => {
                timeout(self.config.provider_timeout, resolver.resolve_lp_mint(pool_id))
                    .await
                    .map_err(|_| eyre::eyre!("LP mint resolution timed out"))??
            }
            _ => None,
        };

        let lp_mint = match lp_mint {
            Some(mint) => mint,
            None => {
                debug!("No LP mint for pool {:?}", info.pair_address);
                return Ok(());
            }
        };

        let lp = timeout(self.config.provider_timeout, lp_holders.fetch_lp_holders(&lp_mint))
            .await
            .map_err(|_| eyre::eyre!("LP holder lookup timed out"))??;

        let outcome = detect_lp_lock(&lp.holders, lp.total_supply);
        debug!("LP {} -> {:?}", short_address(&lp_mint), outcome.status);
        info.lp_mint = Some(lp_mint);
        outcome.apply(info);
        Ok(())
    }

    /// Market-derived age steps that need the liquidity facet
    fn finish_age(
        &self,
        age: ChainOutcome<TokenAge>,
        liquidity_source: Option<DataSource>,
        pair_created_at: Option<DateTime<Utc>>,
        liquidity: &LiquidityInfo,
        now: DateTime<Utc>,
    ) -> (TokenAge, FacetProvenance) {
        let mut failures = age.failures;
        if let Some(r) = age.resolved {
            let provenance =
                FacetProvenance::new(r.source, r.value.confidence, r.depth, failures);
            return (r.value, provenance);
        }

        let mut depth = self.sources.age.len();

        if let (Some(created_at), Some(source)) = (pair_created_at, liquidity_source) {
            let age = TokenAge::from_created_at(created_at, now, Confidence::Verified);
            let provenance = FacetProvenance::new(source, Confidence::Verified, clamp_depth(depth), failures);
            return (age, provenance);
        }
        failures.push("pair creation time unavailable".to_string());
        depth += 1;

        if let Some(days) = estimate_age_from_market(
            liquidity.volume_24h_usd,
            liquidity.liquidity_usd,
            liquidity.market_cap_usd,
        ) {
            info!("📐 Age estimated from market depth: {} days", days);
            let provenance = FacetProvenance::new(
                DataSource::MarketHeuristic,
                Confidence::Estimated,
                clamp_depth(depth),
                failures,
            );
            return (TokenAge::estimated_days(days), provenance);
        }
        failures.push("no market activity for age estimate".to_string());

        (
            TokenAge::unknown(UNKNOWN_AGE_DEFAULT_DAYS),
            FacetProvenance::unknown(failures),
        )
    }

    // ============================================
    // CHAIN PLUMBING
    // ============================================

    /// Try providers in order; first success wins
    async fn walk_chain<S, T, Fut>(
        &self,
        facet: &'static str,
        chain: &[Arc<S>],
        label: impl Fn(&S) -> DataSource,
        fetch: impl Fn(Arc<S>) -> Fut,
    ) -> ChainOutcome<T>
    where
        S: ?Sized,
        Fut: Future<Output = Result<T>>,
    {
        let mut failures = Vec::new();

        for (depth, source) in chain.iter().enumerate() {
            let name = label(source.as_ref()).as_str();
            match timeout(self.config.provider_timeout, fetch(source.clone())).await {
                Ok(Ok(value)) => {
                    if depth > 0 {
                        info!(facet, "↪️ {} answered by fallback {} (depth {})", facet, name, depth);
                    } else {
                        debug!(facet, "{} answered by {}", facet, name);
                    }
                    return ChainOutcome {
                        resolved: Some(Resolved {
                            value,
                            source: label(source.as_ref()),
                            depth: clamp_depth(depth),
                        }),
                        failures,
                    };
                }
                Ok(Err(e)) => {
                    warn!(facet, "⚠️ {} failed on {}: {}", facet, name, e);
                    failures.push(format!("{}: {}", name, e));
                }
                Err(_) => {
                    warn!(
                        facet,
                        "⏱️ {} timed out on {} after {}ms",
                        facet,
                        name,
                        self.config.provider_timeout.as_millis()
                    );
                    failures.push(format!(
                        "{}: timed out after {}ms",
                        name,
                        self.config.provider_timeout.as_millis()
                    ));
                }
            }
        }

        ChainOutcome::exhausted(failures)
    }

    /// Bound a facet by the request deadline
    async fn bounded<T>(
        &self,
        deadline: tokio::time::Instant,
        facet: &'static str,
        fut: impl Future<Output = ChainOutcome<T>>,
    ) -> ChainOutcome<T> {
        match timeout_at(deadline, fut).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(facet, "⏱️ {} still in flight at the request deadline", facet);
                ChainOutcome::exhausted(vec![DEADLINE_FAILURE.to_string()])
            }
        }
    }
}

/// Only Raydium pool ids can be resolved to an LP mint
fn is_raydium_pool(dex_id: Option<&str>) -> bool {
    dex_id.map_or(false, |id| id.to_lowercase().starts_with("raydium"))
}

fn clamp_depth(depth: usize) -> u8 {
    depth.min(u8::MAX as usize) as u8
}

fn fill_identity_gaps(identity: &mut TokenIdentity, symbol: Option<String>, name: Option<String>) {
    if identity.symbol.is_empty() || identity.symbol == "UNKNOWN" {
        if let Some(symbol) = symbol {
            identity.symbol = symbol;
        }
    }
    if identity.name.is_empty() || identity.name == "Unknown Token" {
        if let Some(name) = name {
            identity.name = name;
        }
    }
}
