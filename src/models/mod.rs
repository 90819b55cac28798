//! Models Module - Data Structures & Configuration
//!
//! Single source of truth for the snapshot model, the tier table,
//! runtime configuration and the error taxonomy.

pub mod config;
pub mod errors;
pub mod tiers;
pub mod types;

pub use config::*;
pub use errors::*;
pub use tiers::*;
pub use types::*;
