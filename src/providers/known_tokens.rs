//! Known-token creation table as the first age source

use async_trait::async_trait;
use eyre::{eyre, Result};

use super::{AgePayload, AgeSource};
use crate::models::DataSource;
use crate::utils::known_token;

/// Fixed creation dates for well-known mints (no network)
#[derive(Debug, Clone, Copy, Default)]
pub struct KnownTokenTable;

#[async_trait]
impl AgeSource for KnownTokenTable {
    fn source(&self) -> DataSource {
        DataSource::KnownTokenTable
    }

    async fn fetch_creation(&self, address: &str) -> Result<AgePayload> {
        known_token(address)
            .map(|t| AgePayload::KnownToken(t.created_at))
            .ok_or_else(|| eyre!("Not a known token"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Confidence;
    use chrono::Utc;

    #[tokio::test]
    async fn test_known_token_age_is_verified() {
        let payload = KnownTokenTable
            .fetch_creation("DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263")
            .await
            .unwrap();
        let age = payload.into_age(Utc::now()).unwrap();
        assert_eq!(age.confidence, Confidence::Verified);
        assert!(age.project_age_days > 365.0);
    }

    #[tokio::test]
    async fn test_unknown_token_fails() {
        assert!(KnownTokenTable
            .fetch_creation("7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJospump")
            .await
            .is_err());
    }
}
