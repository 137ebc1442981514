//! VerifyX: liveness challenge engine and MRZ document parser
//!
//! Frames → SignalExtractor → ChallengeEvaluator + AntiSpoofHeuristic → LivenessResult
//! OCR text → MrzLocator → MrzParser (or FieldExtractor) → DocumentValidator

pub mod config;
pub mod core;
pub mod error;
pub mod types;

pub use error::{Result, VerifyError};

// =============================================================================
// SUBJECT COVERAGE
// =============================================================================

/// Fraction of frames that must contain a subject before any challenge is judged
pub const MIN_SUBJECT_COVERAGE: f64 = 0.4;

// =============================================================================
// CHALLENGE THRESHOLDS
// =============================================================================

/// EAR below this means the eye is closed
pub const EAR_BLINK_THRESHOLD: f64 = 0.21;
/// Minimum EAR swing across frames for a blink
pub const EAR_MIN_RANGE: f64 = 0.05;
/// EAR swing that maps to full blink confidence
pub const EAR_FULL_CONFIDENCE_RANGE: f64 = 0.12;

/// MAR above this means the subject is smiling
pub const MAR_SMILE_THRESHOLD: f64 = 0.15;
/// Minimum MAR swing across frames for a smile
pub const MAR_MIN_RANGE: f64 = 0.04;

/// Face-width swing used as the smile proxy on box detectors
pub const WIDTH_SMILE_THRESHOLD: f64 = 0.015;
pub const WIDTH_FULL_CONFIDENCE_RANGE: f64 = 0.03;

/// Nose-x shift / face width
pub const HEAD_TURN_THRESHOLD: f64 = 0.06;
/// Nose-y shift / face height
pub const NOD_THRESHOLD: f64 = 0.04;

// =============================================================================
// ANTI-SPOOFING
// =============================================================================

/// Positional variance below this is flat (landmark mesh signals)
pub const SPOOF_VAR_THRESHOLD_MESH: f64 = 0.001;
/// Positional variance below this is flat (bounding box signals)
pub const SPOOF_VAR_THRESHOLD_BOX: f64 = 0.0003;
/// Frames with a subject needed before variance means anything
pub const SPOOF_MIN_FRAMES: usize = 3;
/// Reported when there is no evidence either way
pub const SPOOF_NEUTRAL_CONFIDENCE: f64 = 0.95;

// =============================================================================
// LIVENESS COMPOSITE WEIGHTS
// =============================================================================

pub const LIVENESS_WEIGHT_CHALLENGE: f64 = 0.6;
pub const LIVENESS_WEIGHT_SPOOF: f64 = 0.4;
/// A failed challenge caps composite confidence at half its own score
pub const LIVENESS_FAILED_CHALLENGE_FACTOR: f64 = 0.5;

// =============================================================================
// DOCUMENT CONFIDENCE
// =============================================================================

/// Field confidence base when most MRZ checksums pass
pub const MRZ_CONFIDENCE_HIGH: f64 = 0.90;
/// Field confidence base otherwise
pub const MRZ_CONFIDENCE_LOW: f64 = 0.60;
/// Weight of the OCR engine's own confidence on MRZ fields
pub const MRZ_OCR_CONFIDENCE_WEIGHT: f64 = 0.1;
/// Used when the OCR engine reports no word confidences
pub const DEFAULT_OCR_CONFIDENCE: f64 = 0.5;

// =============================================================================
// DOCUMENT IMAGE QUALITY
// =============================================================================

/// Mean gray level below this is too dark
pub const QUALITY_MIN_BRIGHTNESS: f64 = 60.0;
/// Mean gray level above this is too bright
pub const QUALITY_MAX_BRIGHTNESS: f64 = 220.0;
/// Gray-level standard deviation below this is low contrast
pub const QUALITY_MIN_CONTRAST: f64 = 30.0;
/// Laplacian variance below this is blurry
pub const QUALITY_MIN_SHARPNESS: f64 = 200.0;
pub const QUALITY_MIN_WIDTH: u32 = 400;
pub const QUALITY_MIN_HEIGHT: u32 = 300;
/// Score lost per issue found
pub const QUALITY_ISSUE_PENALTY: f64 = 0.2;

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "1.0.0";
