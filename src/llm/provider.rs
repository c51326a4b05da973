//! Inference provider seam and configuration.
//!
//! One client implementation, configured by an [`InferenceConfig`]: the
//! model identifier and where the credential came from are data, not
//! separate code paths.

use super::types::Verdict;
use crate::capture::EncodedImage;
use crate::error::InspectError;
use std::future::Future;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Where the AI credential was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Environment,
    Keychain,
    Missing,
}

/// Settings for the remote AI service.
#[derive(Debug, Clone)]
pub struct InferenceConfig {
    pub api_key: Option<String>,
    pub credential_source: CredentialSource,
    pub model: String,
    pub api_base: String,
}

impl InferenceConfig {
    pub fn new(api_key: Option<String>, credential_source: CredentialSource) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.is_empty()),
            credential_source,
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Turns one encoded image into one verdict.
///
/// Implementations make at most one remote attempt per call and must not
/// touch the network when they are unconfigured.
pub trait Classify: Send + Sync + 'static {
    fn classify(
        &self,
        image: &EncodedImage,
    ) -> impl Future<Output = Result<Verdict, InspectError>> + Send;
}
