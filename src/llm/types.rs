//! Verdict types returned by the inspection pipeline.
//!
//! The AI service answers with JSON that is validated into a [`Verdict`]
//! before anything else in the crate sees it. A `Verdict` can only be
//! built through constructors that uphold the confidence invariant, and
//! is read-only afterwards.

use crate::error::InspectError;
use serde::{Deserialize, Serialize, Serializer};

/// Condition of the inspected object.
///
/// Serialized with the Thai labels the AI service is instructed to use.
/// [`InspectionStatus::from_label`] also accepts the English variant names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InspectionStatus {
    Normal,
    Flashover,
    Broken,
    NotAnInsulator,
    Unknown,
}

impl Serialize for InspectionStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl InspectionStatus {
    pub const ALL: [InspectionStatus; 5] = [
        InspectionStatus::Normal,
        InspectionStatus::Flashover,
        InspectionStatus::Broken,
        InspectionStatus::NotAnInsulator,
        InspectionStatus::Unknown,
    ];

    /// Statuses the model may choose from. `Unknown` is ours, never the model's.
    pub const MODEL_CHOICES: [InspectionStatus; 4] = [
        InspectionStatus::Normal,
        InspectionStatus::Flashover,
        InspectionStatus::Broken,
        InspectionStatus::NotAnInsulator,
    ];

    /// Wire and display label.
    pub fn label(self) -> &'static str {
        match self {
            InspectionStatus::Normal => "ปกติ",
            InspectionStatus::Flashover => "Flashover",
            InspectionStatus::Broken => "แตกหัก",
            InspectionStatus::NotAnInsulator => "ไม่ใช่วัตถุลูกถ้วย",
            InspectionStatus::Unknown => "ไม่สามารถระบุได้",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            InspectionStatus::Normal => "Normal",
            InspectionStatus::Flashover => "Flashover",
            InspectionStatus::Broken => "Broken",
            InspectionStatus::NotAnInsulator => "NotAnInsulator",
            InspectionStatus::Unknown => "Unknown",
        }
    }

    /// Look up a status by wire label or English name.
    pub fn from_label(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|s| s.label() == raw || s.name() == raw)
    }

    /// True for the three insulator conditions that carry confidence scores.
    pub fn is_condition(self) -> bool {
        matches!(
            self,
            InspectionStatus::Normal | InspectionStatus::Flashover | InspectionStatus::Broken
        )
    }
}

/// Per-class confidence, each in [0, 100]. Not required to sum to 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceScores {
    pub normal: f64,
    pub flashover: f64,
    pub broken: f64,
}

impl ConfidenceScores {
    pub const MAX: f64 = 100.0;

    fn is_finite(&self) -> bool {
        self.normal.is_finite() && self.flashover.is_finite() && self.broken.is_finite()
    }

    fn clamped(self) -> Self {
        let clamp = |v: f64| v.clamp(0.0, Self::MAX);
        Self {
            normal: clamp(self.normal),
            flashover: clamp(self.flashover),
            broken: clamp(self.broken),
        }
    }

    /// (label, score) pairs in display order.
    pub fn entries(&self) -> [(InspectionStatus, f64); 3] {
        [
            (InspectionStatus::Normal, self.normal),
            (InspectionStatus::Flashover, self.flashover),
            (InspectionStatus::Broken, self.broken),
        ]
    }
}

/// The structured classification result for one inspected image.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    status: InspectionStatus,
    object_type: String,
    description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    confidence_scores: Option<ConfidenceScores>,
}

impl Verdict {
    pub const UNRECOGNIZED_OBJECT: &'static str = "Unknown";
    pub const UNRECOGNIZED_DESCRIPTION: &'static str = "AI returned an unrecognized status";

    /// Build a verdict, enforcing the confidence invariant.
    ///
    /// Condition statuses must carry finite scores, which are clamped into
    /// [0, 100]. Scores attached to `NotAnInsulator` or `Unknown` are dropped.
    pub fn new(
        status: InspectionStatus,
        object_type: impl Into<String>,
        description: impl Into<String>,
        confidence_scores: Option<ConfidenceScores>,
    ) -> Result<Self, InspectError> {
        let confidence_scores = if status.is_condition() {
            let scores = confidence_scores.ok_or_else(|| {
                InspectError::AnalysisFailed(format!(
                    "response omitted confidence scores for status {}",
                    status.name()
                ))
            })?;
            if !scores.is_finite() {
                return Err(InspectError::AnalysisFailed(
                    "response contained a non-numeric confidence score".to_string(),
                ));
            }
            let clamped = scores.clamped();
            if clamped != scores {
                log::warn!("[LLM] Confidence scores out of range, clamped: {:?}", scores);
            }
            Some(clamped)
        } else {
            if confidence_scores.is_some() {
                log::debug!(
                    "[LLM] Dropping confidence scores sent with status {}",
                    status.name()
                );
            }
            None
        };

        Ok(Self {
            status,
            object_type: object_type.into(),
            description: description.into(),
            confidence_scores,
        })
    }

    /// Fallback for a well-formed answer whose status is outside the enum.
    pub fn unrecognized() -> Self {
        Self {
            status: InspectionStatus::Unknown,
            object_type: Self::UNRECOGNIZED_OBJECT.to_string(),
            description: Self::UNRECOGNIZED_DESCRIPTION.to_string(),
            confidence_scores: None,
        }
    }

    pub fn status(&self) -> InspectionStatus {
        self.status
    }

    pub fn object_type(&self) -> &str {
        &self.object_type
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn confidence_scores(&self) -> Option<&ConfidenceScores> {
        self.confidence_scores.as_ref()
    }
}
