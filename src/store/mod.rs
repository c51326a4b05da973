//! Inspection persistence: best-effort logging of verdicts.
//!
//! Writes one row per completed analysis. Nothing in here may fail the
//! caller: `Record::record` returns `()` and errors stop at this module.

mod supabase;

pub use supabase::SupabaseStore;

use crate::llm::types::{ConfidenceScores, Verdict};
use serde::Serialize;
use std::future::Future;

/// Table every verdict is inserted into.
pub const INSPECTIONS_TABLE: &str = "inspections";

/// Connection settings for the Supabase REST endpoint.
#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    pub url: Option<String>,
    pub anon_key: Option<String>,
}

impl StoreConfig {
    pub fn new(url: Option<String>, anon_key: Option<String>) -> Self {
        Self {
            url: url.filter(|u| !u.is_empty()),
            anon_key: anon_key.filter(|k| !k.is_empty()),
        }
    }

    /// Both URL and key are required; either missing disables persistence.
    pub fn is_configured(&self) -> bool {
        self.url.is_some() && self.anon_key.is_some()
    }
}

/// Storage row for one verdict.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InspectionRecord {
    pub status: String,
    pub object_type: String,
    pub description: String,
    pub confidence_scores: Option<ConfidenceScores>,
}

impl From<&Verdict> for InspectionRecord {
    fn from(verdict: &Verdict) -> Self {
        Self {
            status: verdict.status().label().to_string(),
            object_type: verdict.object_type().to_string(),
            description: verdict.description().to_string(),
            confidence_scores: verdict.confidence_scores().copied(),
        }
    }
}

/// Why an insert failed. Logged, never returned past `Record::record`.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("persistence is not configured")]
    NotConfigured,
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Supabase returned {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Fire-and-forget sink for completed verdicts.
pub trait Record: Send + Sync + 'static {
    fn record(&self, verdict: &Verdict) -> impl Future<Output = ()> + Send;
}
