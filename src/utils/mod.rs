//! Utils Module - Helper Functions & Shared Utilities
//!
//! Known-address registries, address validation and vetting counters.

pub mod address;
pub mod constants;
pub mod telemetry;

pub use address::*;
pub use constants::*;
pub use telemetry::*;
