//! Error taxonomy for the inspection pipeline.
//!
//! Every failure on the path file → encoder → inference client is one of
//! these variants. The orchestrator flattens them into a single message
//! string; persistence has its own error type that never leaves `store`.

/// Failure of one analysis request.
#[derive(Debug, thiserror::Error)]
pub enum InspectError {
    /// A required external setting (the AI credential) is absent.
    #[error("{0}")]
    Configuration(String),

    /// The local image could not be read or produced no data.
    #[error("Could not read file data: {0}")]
    InputRead(String),

    /// The AI service answered with no content to parse.
    #[error("Failed to analyze image: No response text received from Gemini.")]
    EmptyResponse,

    /// Transport, remote-side or response-shape failure during inference.
    #[error("Failed to analyze image: {0}")]
    AnalysisFailed(String),
}

impl InspectError {
    pub fn missing_api_key() -> Self {
        Self::Configuration(
            "Gemini API key is missing. Please configure GEMINI_API_KEY in your environment."
                .to_string(),
        )
    }
}
