//! Token Vetter Library
//!
//! Multi-source vetting engine for Solana tokens:
//! - Fallback-chain data aggregation across independent providers
//! - Holder-distribution and LP lock/burn heuristics
//! - Composite 0-100 risk scoring
//! - Tier classification from a versioned tier table

pub mod api;
pub mod core;
pub mod models;
pub mod providers;
pub mod utils;

pub use crate::core::{
    AgeGate, BatchReport, DataAggregator, RiskScore, TierClassifier, VettingPipeline,
    VettingReport,
};
pub use models::{
    AppError, AppResult, ClassificationResult, ErrorCode, RiskLevel, TierConfig, TokenSnapshot,
    VettingConfig,
};
pub use providers::SourceSet;
pub use utils::{VettingStats, VettingTelemetry};
