//! Supabase (PostgREST) insert client.

use super::{InspectionRecord, Record, StoreConfig, StoreError, INSPECTIONS_TABLE};
use crate::llm::types::Verdict;

/// Writes verdicts into the `inspections` table over the REST API.
#[derive(Debug, Clone)]
pub struct SupabaseStore {
    config: StoreConfig,
    http: reqwest::Client,
}

impl SupabaseStore {
    pub fn new(config: StoreConfig) -> Self {
        if !config.is_configured() {
            log::warn!(
                "[STORE] Supabase URL or anon key is missing — database logging disabled"
            );
        }
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.is_configured()
    }

    /// Insert one row. Single attempt.
    pub async fn insert(&self, record: &InspectionRecord) -> Result<(), StoreError> {
        let (Some(url), Some(key)) = (self.config.url.as_deref(), self.config.anon_key.as_deref())
        else {
            return Err(StoreError::NotConfigured);
        };

        let endpoint = format!("{}/rest/v1/{}", url.trim_end_matches('/'), INSPECTIONS_TABLE);
        let response = self
            .http
            .post(&endpoint)
            .header("apikey", key)
            .bearer_auth(key)
            .header("Prefer", "return=minimal")
            .json(&[record])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

impl Record for SupabaseStore {
    async fn record(&self, verdict: &Verdict) {
        if !self.is_enabled() {
            log::warn!("[STORE] Supabase client not initialized — skipping save");
            return;
        }

        let start = std::time::Instant::now();
        match self.insert(&InspectionRecord::from(verdict)).await {
            Ok(()) => log::info!(
                "[STORE] Inspection saved to Supabase in {}ms",
                start.elapsed().as_millis()
            ),
            Err(e) => log::error!("[STORE] Error saving inspection to Supabase: {}", e),
        }
    }
}
