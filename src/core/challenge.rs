//! Challenge Evaluator: frame signals → per-challenge verdict
//!
//! Each challenge is a threshold test over the frames that contain a subject.
//! The evaluator branches on which signal fields are populated, never on the
//! detector that produced them.

use crate::core::stats::{mean, min_max, range, round_to, unit_confidence};
use crate::types::{ChallengeDiagnostics, ChallengeResult, ChallengeType, FrameSignal, LivenessReason};
use crate::{
    EAR_BLINK_THRESHOLD, EAR_FULL_CONFIDENCE_RANGE, EAR_MIN_RANGE, HEAD_TURN_THRESHOLD,
    MAR_MIN_RANGE, MAR_SMILE_THRESHOLD, MIN_SUBJECT_COVERAGE, NOD_THRESHOLD,
    WIDTH_FULL_CONFIDENCE_RANGE, WIDTH_SMILE_THRESHOLD,
};

/// Subject frames needed out of `total`: max(1, ceil(0.4 × total))
pub fn required_subject_frames(total: usize) -> usize {
    // Shave an epsilon so exact products like 0.4 × 5 do not round up
    let needed = (total as f64 * MIN_SUBJECT_COVERAGE - 1e-9).ceil();
    (needed.max(0.0) as usize).max(1)
}

/// Columns of the subject-present frames
#[derive(Debug, Default)]
struct SignalSeries {
    ear: Vec<f64>,
    mar: Vec<f64>,
    eyes_open: Vec<bool>,
    center_x: Vec<f64>,
    center_y: Vec<f64>,
    width: Vec<f64>,
    height: Vec<f64>,
}

impl SignalSeries {
    fn collect(signals: &[FrameSignal]) -> Self {
        let mut series = Self::default();
        for s in signals.iter().filter(|s| s.subject_present) {
            series.ear.extend(s.eye_aspect_ratio);
            series.mar.extend(s.mouth_aspect_ratio);
            series.eyes_open.extend(s.eyes_open);
            series.center_x.extend(s.center_x);
            series.center_y.extend(s.center_y);
            series.width.extend(s.width_norm);
            series.height.extend(s.height_norm);
        }
        series
    }

    /// Positional range over mean extent
    fn shift(positions: &[f64], extents: &[f64]) -> Option<f64> {
        let spread = range(positions)?;
        let extent = mean(extents).filter(|m| *m > 0.0)?;
        Some(spread / extent)
    }

    fn shift_x(&self) -> Option<f64> {
        Self::shift(&self.center_x, &self.width)
    }

    fn shift_y(&self) -> Option<f64> {
        Self::shift(&self.center_y, &self.height)
    }

    fn open_ratio(&self) -> Option<f64> {
        if self.eyes_open.is_empty() {
            return None;
        }
        let open = self.eyes_open.iter().filter(|o| **o).count();
        Some(open as f64 / self.eyes_open.len() as f64)
    }

    fn diagnostics(&self) -> ChallengeDiagnostics {
        let r4 = |v: f64| round_to(v, 4);
        let ear = min_max(&self.ear);
        ChallengeDiagnostics {
            ear_min: ear.map(|(lo, _)| r4(lo)),
            ear_max: ear.map(|(_, hi)| r4(hi)),
            mar_max: min_max(&self.mar).map(|(_, hi)| r4(hi)),
            nose_x_range: self.shift_x().map(r4),
            nose_y_range: self.shift_y().map(r4),
            eyes_open_ratio: self.open_ratio().map(r4),
            width_range: range(&self.width).map(r4),
        }
    }
}

/// Threshold tests per challenge type
#[derive(Debug, Default, Clone, Copy)]
pub struct ChallengeEvaluator;

impl ChallengeEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// Judge `challenge` over a full frame sequence (absent frames included)
    pub fn evaluate(&self, signals: &[FrameSignal], challenge: ChallengeType) -> ChallengeResult {
        let total = signals.len();
        let with_subject = signals.iter().filter(|s| s.subject_present).count();

        if with_subject < required_subject_frames(total) {
            return ChallengeResult::insufficient(challenge, total, with_subject);
        }

        let series = SignalSeries::collect(signals);
        let verdict = match challenge {
            ChallengeType::Blink => blink(&series),
            ChallengeType::HeadLeft | ChallengeType::HeadRight => series
                .shift_x()
                .map(|shift| (shift > HEAD_TURN_THRESHOLD, shift / (HEAD_TURN_THRESHOLD * 2.0))),
            ChallengeType::Nod => series
                .shift_y()
                .map(|shift| (shift > NOD_THRESHOLD, shift / (NOD_THRESHOLD * 2.0))),
            ChallengeType::Smile => smile(&series),
        };

        let (passed, confidence, reason) = match verdict {
            Some((true, conf)) => (true, unit_confidence(conf), LivenessReason::L001_CHALLENGE_PASSED),
            Some((false, conf)) => (false, unit_confidence(conf), LivenessReason::L002_CHALLENGE_FAILED),
            None => (false, 0.0, LivenessReason::L004_SIGNAL_UNAVAILABLE),
        };

        ChallengeResult {
            challenge_type: challenge,
            passed,
            confidence,
            reason,
            diagnostics: series.diagnostics(),
            frames_total: total,
            frames_with_subject: with_subject,
        }
    }
}

/// (passed, raw confidence) or None without an eye signal
fn blink(series: &SignalSeries) -> Option<(bool, f64)> {
    if let Some((min_ear, max_ear)) = min_max(&series.ear) {
        let ear_range = max_ear - min_ear;
        let passed = min_ear < EAR_BLINK_THRESHOLD && ear_range > EAR_MIN_RANGE;
        return Some((passed, ear_range / EAR_FULL_CONFIDENCE_RANGE));
    }

    let open_ratio = series.open_ratio()?;
    let saw_open = series.eyes_open.iter().any(|o| *o);
    let saw_closed = series.eyes_open.iter().any(|o| !*o);
    if saw_open && saw_closed {
        Some((true, (open_ratio - 0.5).abs() * 2.0 + 0.3))
    } else {
        Some((false, open_ratio * 0.3))
    }
}

/// Mouth ratio when present, face-width swing otherwise
fn smile(series: &SignalSeries) -> Option<(bool, f64)> {
    if let Some((min_mar, max_mar)) = min_max(&series.mar) {
        let passed = max_mar > MAR_SMILE_THRESHOLD || (max_mar - min_mar) > MAR_MIN_RANGE;
        return Some((passed, max_mar / MAR_SMILE_THRESHOLD));
    }

    let width_range = range(&series.width)?;
    Some((width_range > WIDTH_SMILE_THRESHOLD, width_range / WIDTH_FULL_CONFIDENCE_RANGE))
}

// =============================================================================
// TESTS
// =============================================================================
