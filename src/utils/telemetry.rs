//! In-process vetting counters
//!
//! Lock-free atomics shared by the pipeline and the API. No addresses are
//! stored, only counts and latencies.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::models::{ClassificationResult, IneligibleReason};

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct VettingStats {
    pub total_scans: u64,
    pub eligible: u64,
    pub too_young: u64,
    pub no_tier_match: u64,
    pub invalid_requests: u64,
    pub degraded_snapshots: u64,
    pub upstream_unavailable: u64,
    pub avg_latency_ms: f64,
}

/// Atomic counters for fast updates from concurrent requests
#[derive(Debug, Default)]
pub struct VettingTelemetry {
    total_scans: AtomicU64,
    eligible: AtomicU64,
    too_young: AtomicU64,
    no_tier_match: AtomicU64,
    invalid_requests: AtomicU64,
    degraded_snapshots: AtomicU64,
    upstream_unavailable: AtomicU64,
    total_latency_ms: AtomicU64,
}

impl VettingTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one completed vetting run
    pub fn record_result(&self, result: &ClassificationResult, degraded: bool, latency_ms: u64) {
        self.total_scans.fetch_add(1, Ordering::Relaxed);
        self.total_latency_ms.fetch_add(latency_ms, Ordering::Relaxed);

        match &result.reason {
            None if result.eligible => {
                self.eligible.fetch_add(1, Ordering::Relaxed);
            }
            Some(IneligibleReason::TooYoung { .. }) => {
                self.too_young.fetch_add(1, Ordering::Relaxed);
            }
            _ => {
                self.no_tier_match.fetch_add(1, Ordering::Relaxed);
            }
        }

        if degraded {
            self.degraded_snapshots.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_invalid(&self) {
        self.invalid_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_upstream_unavailable(&self) {
        self.upstream_unavailable.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> VettingStats {
        let total = self.total_scans.load(Ordering::Relaxed);
        let latency = self.total_latency_ms.load(Ordering::Relaxed);
        VettingStats {
            total_scans: total,
            eligible: self.eligible.load(Ordering::Relaxed),
            too_young: self.too_young.load(Ordering::Relaxed),
            no_tier_match: self.no_tier_match.load(Ordering::Relaxed),
            invalid_requests: self.invalid_requests.load(Ordering::Relaxed),
            degraded_snapshots: self.degraded_snapshots.load(Ordering::Relaxed),
            upstream_unavailable: self.upstream_unavailable.load(Ordering::Relaxed),
            avg_latency_ms: if total > 0 {
                latency as f64 / total as f64
            } else {
                0.0
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Confidence, FacetProvenance, Provenance};

    fn provenance() -> Provenance {
        let p = FacetProvenance::unknown(vec![]);
        Provenance {
            metadata: p.clone(),
            age: p.clone(),
            holders: p.clone(),
            liquidity: p.clone(),
            audit: p,
        }
    }

    fn result(eligible: bool, reason: Option<IneligibleReason>) -> ClassificationResult {
        ClassificationResult {
            eligible,
            tier: None,
            risk_score: None,
            risk_level: None,
            reason,
            evaluations: vec![],
            provenance: provenance(),
        }
    }

    #[test]
    fn test_counters() {
        let telemetry = VettingTelemetry::new();
        telemetry.record_result(&result(true, None), false, 100);
        telemetry.record_result(
            &result(
                false,
                Some(IneligibleReason::TooYoung {
                    project_age_days: 3.0,
                    age_display: "3 days".into(),
                    minimum_age_required: 14,
                    age_confidence: Confidence::Verified,
                }),
            ),
            true,
            300,
        );
        telemetry.record_result(&result(false, Some(IneligibleReason::NoTierMatch)), false, 200);
        telemetry.record_invalid();

        let stats = telemetry.snapshot();
        assert_eq!(stats.total_scans, 3);
        assert_eq!(stats.eligible, 1);
        assert_eq!(stats.too_young, 1);
        assert_eq!(stats.no_tier_match, 1);
        assert_eq!(stats.invalid_requests, 1);
        assert_eq!(stats.degraded_snapshots, 1);
        assert!((stats.avg_latency_ms - 200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_stats() {
        let stats = VettingTelemetry::new().snapshot();
        assert_eq!(stats, VettingStats::default());
    }
}
