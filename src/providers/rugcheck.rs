//! RugCheck report summary (optional external audit signal)

use async_trait::async_trait;
use eyre::{eyre, Result};
use serde::Deserialize;
use tracing::debug;

use super::{build_http_client, AuditPayload, AuditSource};
use crate::models::{DataSource, VettingConfig};
use crate::utils::short_address;

#[derive(Debug, Clone, Deserialize)]
pub struct RugCheckRisk {
    pub name: String,
    /// "danger" | "warn" | "info"
    pub level: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RugCheckSummary {
    /// 0-100, higher is riskier
    pub score_normalised: Option<f64>,
    #[serde(default)]
    pub risks: Vec<RugCheckRisk>,
}

pub struct RugCheckClient {
    client: reqwest::Client,
    base_url: String,
}

impl RugCheckClient {
    pub fn new(config: &VettingConfig) -> Result<Self> {
        Ok(Self {
            client: build_http_client(config.provider_timeout)?,
            base_url: config.rugcheck_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn report_summary(&self, mint: &str) -> Result<RugCheckSummary> {
        let url = format!("{}/tokens/{}/report/summary", self.base_url, mint);
        debug!("🛡️ RugCheck summary for {}", short_address(mint));

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| eyre!("RugCheck request failed: {}", e))?;

        if !response.status().is_success() {
            return Err(eyre!("RugCheck API error: {}", response.status()));
        }

        let summary: RugCheckSummary = response
            .json()
            .await
            .map_err(|e| eyre!("Failed to parse RugCheck response: {}", e))?;

        if summary.score_normalised.is_none() {
            return Err(eyre!("RugCheck summary without score"));
        }
        Ok(summary)
    }
}

#[async_trait]
impl AuditSource for RugCheckClient {
    fn source(&self) -> DataSource {
        DataSource::RugCheck
    }

    async fn fetch_audit(&self, address: &str) -> Result<AuditPayload> {
        self.report_summary(address).await.map(AuditPayload::RugCheck)
    }
}
