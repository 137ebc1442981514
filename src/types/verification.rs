//! Combined verification report

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::document::{DocumentFields, DocumentKind, OcrOutput};
use super::frame::{Frame, ObservedFrame};

/// Verdict of the external face-embedding model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceMatchVerdict {
    pub matched: bool,
    pub confidence: f64,
}

/// Overall outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverallResult {
    Passed,
    Failed,
}

impl std::fmt::Display for OverallResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OverallResult::Passed => write!(f, "PASSED"),
            OverallResult::Failed => write!(f, "FAILED"),
        }
    }
}

/// One stage of the combined verification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageOutcome {
    pub passed: bool,
    /// Stage confidence or score; None when the stage reports none
    pub score: Option<f64>,
}

/// Per-stage outcomes; a stage left out of the request is None
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageResults {
    pub face_verification: Option<StageOutcome>,
    pub liveness_detection: Option<StageOutcome>,
    pub document_ocr: Option<StageOutcome>,
    pub document_validation: Option<StageOutcome>,
}

/// Aggregated verification report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationReport {
    /// `ver_` + UTC `YYYYmmddHHMMSS`
    pub verification_id: String,
    pub overall_result: OverallResult,
    pub results: StageResults,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_data: Option<DocumentFields>,
    pub timestamp: DateTime<Utc>,
}

fn default_challenge() -> String {
    "blink".to_string()
}

/// Liveness frames as submitted by a caller that already ran the detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LivenessSubmission {
    /// Parsed on use so an unknown name is a typed error
    #[serde(default = "default_challenge")]
    pub challenge_type: String,
    #[serde(default)]
    pub frames: Vec<ObservedFrame>,
}

/// OCR engine output plus the caller's document kind
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentSubmission {
    #[serde(flatten)]
    pub ocr: OcrOutput,
    #[serde(default)]
    pub document_type: DocumentKind,
    /// Decoded document photo for the quality report
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<Frame>,
}

/// Stages to combine; any may be left out
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationRequest {
    pub face_match: Option<FaceMatchVerdict>,
    pub liveness: Option<LivenessSubmission>,
    pub document: Option<DocumentSubmission>,
}
