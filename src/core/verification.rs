//! Verification Pipeline: face match + liveness + document in one report

use chrono::{DateTime, Utc};
use tracing::info;

use crate::config::VerifierConfig;
use crate::core::extraction::DocumentExtractor;
use crate::core::liveness::LivenessDetector;
use crate::core::validator::DocumentValidator;
use crate::error::Result;
use crate::types::{
    ChallengeType, OverallResult, StageOutcome, StageResults, VerificationReport, VerificationRequest,
};

/// Runs every submitted stage and aggregates the verdicts
#[derive(Debug, Clone)]
pub struct VerificationPipeline {
    liveness: LivenessDetector,
    extractor: DocumentExtractor,
    validator: DocumentValidator,
}

impl VerificationPipeline {
    pub fn new(liveness: LivenessDetector) -> Self {
        Self {
            liveness,
            extractor: DocumentExtractor::new(),
            validator: DocumentValidator::new(),
        }
    }

    pub fn from_config(config: &VerifierConfig) -> Self {
        Self::new(LivenessDetector::from_config(config))
    }

    pub fn complete(&self, request: &VerificationRequest) -> Result<VerificationReport> {
        self.complete_at(request, Utc::now())
    }

    /// Passes iff at least one stage ran and every stage that ran passed
    pub fn complete_at(&self, request: &VerificationRequest, now: DateTime<Utc>) -> Result<VerificationReport> {
        let today = now.date_naive();

        let face_verification = request.face_match.as_ref().map(|verdict| StageOutcome {
            passed: verdict.matched,
            score: Some(verdict.confidence),
        });

        let liveness_detection = match &request.liveness {
            Some(submission) => {
                let challenge: ChallengeType = submission.challenge_type.parse()?;
                let result = self.liveness.detect_observed(&submission.frames, challenge)?;
                Some(StageOutcome {
                    passed: result.is_live,
                    score: Some(result.confidence),
                })
            }
            None => None,
        };

        let mut extracted_data = None;
        let mut document_ocr = None;
        let mut document_validation = None;
        if let Some(submission) = &request.document {
            let extraction = self.extractor.extract_submission_at(submission, today)?;
            let validation = self.validator.validate_at(&extraction.extracted_data, today);

            document_ocr = Some(StageOutcome {
                passed: !extraction.extracted_data.is_empty(),
                score: Some(extraction.ocr_confidence),
            });
            document_validation = Some(StageOutcome {
                passed: validation.is_valid,
                score: Some(validation.authenticity_score),
            });
            extracted_data = Some(extraction.extracted_data);
        }

        let results = StageResults {
            face_verification,
            liveness_detection,
            document_ocr,
            document_validation,
        };
        let stages: Vec<&StageOutcome> = [
            &results.face_verification,
            &results.liveness_detection,
            &results.document_ocr,
            &results.document_validation,
        ]
        .into_iter()
        .flatten()
        .collect();

        let overall_result = if !stages.is_empty() && stages.iter().all(|s| s.passed) {
            OverallResult::Passed
        } else {
            OverallResult::Failed
        };

        let verification_id = format!("ver_{}", now.format("%Y%m%d%H%M%S"));
        info!(%verification_id, stages = stages.len(), result = %overall_result, "verification complete");

        Ok(VerificationReport {
            verification_id,
            overall_result,
            results,
            extracted_data,
            timestamp: now,
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
