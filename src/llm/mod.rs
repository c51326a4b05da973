//! LLM domain: image classification through Gemini.
//!
//! External code should only use the items exported here.
//!
//!   - gemini.rs   the `generateContent` client
//!   - prompts.rs  Thai instruction + response schema
//!   - response.rs envelope extraction and verdict validation
//!   - provider.rs `Classify` seam + `InferenceConfig`
//!   - types.rs    `Verdict`, `InspectionStatus`, `ConfidenceScores`

mod gemini;
pub mod prompts;
pub mod provider;
pub mod response;
pub mod types;

pub use gemini::GeminiClient;
pub use provider::{Classify, CredentialSource, InferenceConfig};
pub use types::{ConfidenceScores, InspectionStatus, Verdict};
