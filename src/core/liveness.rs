//! Liveness Detector: frames → signals → challenge + anti-spoofing → LivenessResult
//!
//! Stateless: one call per request, nothing kept between calls.

use rayon::prelude::*;
use tracing::{debug, info};

use crate::config::VerifierConfig;
use crate::core::anti_spoof::AntiSpoofHeuristic;
use crate::core::challenge::ChallengeEvaluator;
use crate::core::signal_extractor::SignalExtractor;
use crate::core::stats::round_to;
use crate::error::{Result, VerifyError};
use crate::types::{
    ChallengeType, DetectorBackend, FaceDetector, Frame, FrameSignal, LivenessReason, LivenessResult,
    ObservedFrame,
};
use crate::{LIVENESS_FAILED_CHALLENGE_FACTOR, LIVENESS_WEIGHT_CHALLENGE, LIVENESS_WEIGHT_SPOOF};

/// Composes extraction, challenge evaluation and anti-spoofing
#[derive(Debug, Clone)]
pub struct LivenessDetector {
    extractor: SignalExtractor,
    evaluator: ChallengeEvaluator,
    anti_spoof: AntiSpoofHeuristic,
    parallel: bool,
}

impl LivenessDetector {
    /// Create a detector for observations from `backend`
    pub fn new(backend: DetectorBackend) -> Self {
        Self {
            extractor: SignalExtractor::new(backend),
            evaluator: ChallengeEvaluator::new(),
            anti_spoof: AntiSpoofHeuristic::new(),
            parallel: true,
        }
    }

    pub fn from_config(config: &VerifierConfig) -> Self {
        Self::new(config.backend).with_parallel(config.parallel_extraction)
    }

    /// Toggle rayon extraction
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn backend(&self) -> DetectorBackend {
        self.extractor.backend()
    }

    /// Run the detector over decoded frames and judge the challenge
    pub fn detect(
        &self,
        frames: &[Frame],
        challenge: ChallengeType,
        detector: &dyn FaceDetector,
    ) -> Result<LivenessResult> {
        if frames.is_empty() {
            return Err(VerifyError::EmptyFrameList);
        }

        let extract = |(index, frame): (usize, &Frame)| -> Result<FrameSignal> {
            self.extractor
                .extract(frame, detector)
                .map_err(|e| with_frame_index(e, index))
        };
        let signals: Vec<FrameSignal> = if self.parallel {
            frames.par_iter().enumerate().map(extract).collect::<Result<_>>()?
        } else {
            frames.iter().enumerate().map(extract).collect::<Result<_>>()?
        };

        Ok(self.evaluate_signals(&signals, challenge))
    }

    /// Judge the challenge from observations an external detector already produced
    pub fn detect_observed(&self, frames: &[ObservedFrame], challenge: ChallengeType) -> Result<LivenessResult> {
        if frames.is_empty() {
            return Err(VerifyError::EmptyFrameList);
        }

        let extract = |(index, frame): (usize, &ObservedFrame)| -> Result<FrameSignal> {
            self.extractor
                .extract_observed(frame.width, frame.height, &frame.observation)
                .map_err(|e| with_frame_index(e, index))
        };
        let signals: Vec<FrameSignal> = if self.parallel {
            frames.par_iter().enumerate().map(extract).collect::<Result<_>>()?
        } else {
            frames.iter().enumerate().map(extract).collect::<Result<_>>()?
        };

        Ok(self.evaluate_signals(&signals, challenge))
    }

    /// Combine challenge and anti-spoofing verdicts over a signal sequence
    pub fn evaluate_signals(&self, signals: &[FrameSignal], challenge: ChallengeType) -> LivenessResult {
        let verdict = self.evaluator.evaluate(signals, challenge);
        let anti_spoofing = self.anti_spoof.assess(signals, verdict.passed);

        let frames_analyzed = signals.len() as u32;
        let frames_with_subject = verdict.frames_with_subject as u32;

        if verdict.is_insufficient() {
            info!(
                challenge = %challenge,
                frames = frames_analyzed,
                with_subject = frames_with_subject,
                "subject coverage too low"
            );
            return LivenessResult {
                is_live: false,
                confidence: 0.0,
                challenge_completed: false,
                challenge_type: challenge,
                reason: LivenessReason::L003_INSUFFICIENT_COVERAGE,
                anti_spoofing,
                details: verdict.diagnostics,
                frames_analyzed,
                frames_with_subject,
            };
        }

        let confidence = if verdict.passed {
            LIVENESS_WEIGHT_CHALLENGE * verdict.confidence + LIVENESS_WEIGHT_SPOOF * anti_spoofing.confidence
        } else {
            verdict.confidence * LIVENESS_FAILED_CHALLENGE_FACTOR
        };
        // Flatness only counts against a failed challenge, so a passed one is live
        let is_live = verdict.passed && anti_spoofing.is_real_face;

        debug!(
            challenge = %challenge,
            passed = verdict.passed,
            challenge_confidence = verdict.confidence,
            spoof_reason = anti_spoofing.reason.code(),
            is_live,
            "liveness evaluated"
        );

        LivenessResult {
            is_live,
            confidence: round_to(confidence.clamp(0.0, 1.0), 4),
            challenge_completed: verdict.passed,
            challenge_type: challenge,
            reason: verdict.reason,
            anti_spoofing,
            details: verdict.diagnostics,
            frames_analyzed,
            frames_with_subject,
        }
    }
}

/// Attach the frame position to per-frame errors
fn with_frame_index(err: VerifyError, index: usize) -> VerifyError {
    match err {
        VerifyError::FrameDecode { reason, .. } => VerifyError::FrameDecode { index, reason },
        other => other,
    }
}

// =============================================================================
// TESTS
// =============================================================================
