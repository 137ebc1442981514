//! Anti-Spoofing Heuristic: positional variance across frames
//!
//! A live subject jitters; a held photo or replayed screen does not. A passed
//! challenge already proves motion, so flatness only counts against a failed one.

use crate::core::challenge::required_subject_frames;
use crate::core::stats::{mean, unit_confidence, variance};
use crate::types::{FrameSignal, SpoofAssessment, SpoofKind, SpoofReason};
use crate::{SPOOF_MIN_FRAMES, SPOOF_NEUTRAL_CONFIDENCE, SPOOF_VAR_THRESHOLD_BOX, SPOOF_VAR_THRESHOLD_MESH};

/// Keeps variance normalization finite on degenerate extents
const NORMALIZER_EPSILON: f64 = 1e-9;

/// Flatness scorer for a frame sequence
#[derive(Debug, Default, Clone, Copy)]
pub struct AntiSpoofHeuristic;

impl AntiSpoofHeuristic {
    pub fn new() -> Self {
        Self
    }

    /// Score `signals`; `challenge_passed` suppresses the flatness flag
    pub fn assess(&self, signals: &[FrameSignal], challenge_passed: bool) -> SpoofAssessment {
        let present: Vec<&FrameSignal> = signals.iter().filter(|s| s.subject_present).collect();

        if present.len() < required_subject_frames(signals.len()) {
            return SpoofAssessment {
                is_real_face: false,
                confidence: 0.0,
                spoof_kind: Some(SpoofKind::NoSubject),
                reason: SpoofReason::S005_INSUFFICIENT_COVERAGE,
                total_variance: None,
            };
        }

        let neutral = SpoofAssessment {
            is_real_face: true,
            confidence: SPOOF_NEUTRAL_CONFIDENCE,
            spoof_kind: None,
            reason: SpoofReason::S004_TOO_FEW_FRAMES,
            total_variance: None,
        };

        let xs: Vec<f64> = present.iter().filter_map(|s| s.center_x).collect();
        let ys: Vec<f64> = present.iter().filter_map(|s| s.center_y).collect();
        if xs.len() < SPOOF_MIN_FRAMES || ys.len() < SPOOF_MIN_FRAMES {
            return neutral;
        }

        let landmark = present.iter().any(|s| s.is_landmark());
        let (total_var, threshold) = if landmark {
            let widths: Vec<f64> = present.iter().filter_map(|s| s.width_norm).collect();
            let heights: Vec<f64> = present.iter().filter_map(|s| s.height_norm).collect();
            let fw = mean(&widths).unwrap_or(1.0);
            let fh = mean(&heights).unwrap_or(1.0);
            let var_x = variance(&xs).unwrap_or(0.0) / (fw * fw + NORMALIZER_EPSILON);
            let var_y = variance(&ys).unwrap_or(0.0) / (fh * fh + NORMALIZER_EPSILON);
            (var_x + var_y, SPOOF_VAR_THRESHOLD_MESH)
        } else {
            let var = variance(&xs).unwrap_or(0.0) + variance(&ys).unwrap_or(0.0);
            (var, SPOOF_VAR_THRESHOLD_BOX)
        };

        if total_var >= threshold {
            return SpoofAssessment {
                reason: SpoofReason::S001_MOTION_OBSERVED,
                total_variance: Some(total_var),
                ..neutral
            };
        }

        if challenge_passed {
            return SpoofAssessment {
                reason: SpoofReason::S002_FLAT_CHALLENGE_PASSED,
                total_variance: Some(total_var),
                ..neutral
            };
        }

        SpoofAssessment {
            is_real_face: false,
            confidence: unit_confidence(1.0 - total_var / threshold),
            spoof_kind: Some(SpoofKind::PhotoOrScreen),
            reason: SpoofReason::S003_FLAT_PHOTO_OR_SCREEN,
            total_variance: Some(total_var),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
