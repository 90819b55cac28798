//! Deterministic synthetic holder list
//!
//! Last-resort holder source for local testing. Only wired in when
//! `VETTING_ALLOW_SYNTHETIC_HOLDERS` is set, and always tagged
//! `unknown`/`synthetic` in provenance.

use async_trait::async_trait;
use eyre::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{HolderPayload, HolderSource};
use crate::models::{DataSource, Holder};

#[derive(Debug, Clone)]
pub struct SyntheticHolders {
    pub holders: Vec<Holder>,
    pub holder_count: u64,
}

#[derive(Debug, Clone, Default)]
pub struct SyntheticHolderSource;

impl SyntheticHolderSource {
    /// Same address, same list
    pub fn generate(address: &str, limit: usize) -> SyntheticHolders {
        let seed = address
            .bytes()
            .fold(0xcbf2_9ce4_8422_2325u64, |h, b| {
                (h ^ b as u64).wrapping_mul(0x0000_0100_0000_01b3)
            });
        let mut rng = StdRng::seed_from_u64(seed);

        let count = limit.clamp(1, 100);
        let mut amount = rng.gen_range(1_000_000.0..50_000_000.0);
        let holders = (0..count)
            .map(|i| {
                let holder = Holder::new(format!("synthetic-holder-{:03}", i), amount);
                amount *= rng.gen_range(0.55..0.95);
                holder
            })
            .collect();

        SyntheticHolders {
            holders,
            holder_count: rng.gen_range(count as u64..5_000),
        }
    }
}

#[async_trait]
impl HolderSource for SyntheticHolderSource {
    fn source(&self) -> DataSource {
        DataSource::Synthetic
    }

    async fn fetch_holders(&self, address: &str, limit: usize) -> Result<HolderPayload> {
        Ok(HolderPayload::Synthetic(Self::generate(address, limit)))
    }
}
