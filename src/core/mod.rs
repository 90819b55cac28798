//! Core Module - Vetting Business Logic
//!
//! Aggregation, the holder/LP/contract analyzers, risk scoring, the age
//! gate, the tier classifier and the pipeline that ties them together.

pub mod age_gate;
pub mod aggregator;
pub mod classifier;
pub mod contract;
pub mod holders;
pub mod liquidity;
pub mod pipeline;
pub mod risk_score;

#[cfg(test)]
pub(crate) mod testing;

pub use age_gate::*;
pub use aggregator::*;
pub use classifier::*;
pub use contract::*;
pub use holders::*;
pub use liquidity::*;
pub use pipeline::*;
pub use risk_score::*;
