//! Document Extractor: OCR output → MRZ or fallback fields with confidences

use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info};

use crate::core::fallback::FieldExtractor;
use crate::core::mrz_locator::{MrzLines, MrzLocator};
use crate::core::mrz_parser::MrzParser;
use crate::core::quality::QualityAssessor;
use crate::core::stats::round_to;
use crate::error::Result;
use crate::types::{DocumentFields, DocumentKind, DocumentSubmission, ExtractionResult, FieldSource, OcrOutput};
use crate::{DEFAULT_OCR_CONFIDENCE, MRZ_CONFIDENCE_HIGH, MRZ_CONFIDENCE_LOW, MRZ_OCR_CONFIDENCE_WEIGHT};

/// Combines the MRZ path with the regex fallback
#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentExtractor {
    locator: MrzLocator,
    parser: MrzParser,
    fallback: FieldExtractor,
    quality: QualityAssessor,
}

impl DocumentExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract fields, judging MRZ expiry against today's UTC date
    pub fn extract(&self, ocr: &OcrOutput, kind: DocumentKind) -> ExtractionResult {
        self.extract_at(ocr, kind, Utc::now().date_naive())
    }

    /// Extract a caller submission, with a quality report when it carries the image
    pub fn extract_submission(&self, submission: &DocumentSubmission) -> Result<ExtractionResult> {
        self.extract_submission_at(submission, Utc::now().date_naive())
    }

    pub fn extract_submission_at(
        &self,
        submission: &DocumentSubmission,
        today: NaiveDate,
    ) -> Result<ExtractionResult> {
        let mut result = self.extract_at(&submission.ocr, submission.document_type, today);
        if let Some(image) = &submission.image {
            result.quality = Some(self.quality.assess(image)?);
        }
        Ok(result)
    }

    pub fn extract_at(&self, ocr: &OcrOutput, kind: DocumentKind, today: NaiveDate) -> ExtractionResult {
        let avg = average_confidence(&ocr.word_confidences);

        match self.find_mrz(ocr) {
            Some(lines) => {
                let record = self.parser.parse_at(&lines.line1, &lines.line2, today);
                let fields = DocumentFields::from(&record);

                let base = if record.checks_passed.len() > record.checks_failed.len() {
                    MRZ_CONFIDENCE_HIGH
                } else {
                    MRZ_CONFIDENCE_LOW
                };
                let confidence_scores = score_fields(&fields, base + avg * MRZ_OCR_CONFIDENCE_WEIGHT);

                let document_type = match kind {
                    DocumentKind::Auto if lines.line1.starts_with('P') => DocumentKind::Passport,
                    DocumentKind::Auto => DocumentKind::IdCard,
                    explicit => explicit,
                };

                info!(
                    document_type = ?document_type,
                    checks_passed = record.checks_passed.len(),
                    checks_failed = record.checks_failed.len(),
                    "MRZ extracted"
                );

                ExtractionResult {
                    document_type,
                    extracted_data: fields,
                    confidence_scores,
                    mrz_found: true,
                    source: FieldSource::Mrz,
                    checks_passed: record.checks_passed,
                    checks_failed: record.checks_failed,
                    ocr_confidence: round_to(avg, 4),
                    quality: None,
                }
            }
            None => {
                let fields = self.fallback.extract(&ocr.raw_text);
                let confidence_scores = score_fields(&fields, avg);

                let document_type = match kind {
                    DocumentKind::Auto => DocumentKind::Unknown,
                    explicit => explicit,
                };

                info!(fields = confidence_scores.len(), "no MRZ, fallback extraction");

                ExtractionResult {
                    document_type,
                    extracted_data: fields,
                    confidence_scores,
                    mrz_found: false,
                    source: FieldSource::Fallback,
                    checks_passed: Default::default(),
                    checks_failed: Default::default(),
                    ocr_confidence: round_to(avg, 4),
                    quality: None,
                }
            }
        }
    }

    /// Whitelisted MRZ pass first, then general text
    fn find_mrz(&self, ocr: &OcrOutput) -> Option<MrzLines> {
        if let Some(lines) = ocr.mrz_text.as_deref().and_then(|text| self.locator.locate(text)) {
            debug!("MRZ found in dedicated pass");
            return Some(lines);
        }
        self.locator.locate(&ocr.raw_text)
    }
}

/// Mean of positive word confidences scaled to [0, 1]; 0.5 when none
pub fn average_confidence(word_confidences: &[i32]) -> f64 {
    let valid: Vec<f64> = word_confidences
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| c as f64)
        .collect();
    if valid.is_empty() {
        return DEFAULT_OCR_CONFIDENCE;
    }
    valid.iter().sum::<f64>() / valid.len() as f64 / 100.0
}

fn score_fields(fields: &DocumentFields, confidence: f64) -> BTreeMap<String, f64> {
    let score = round_to(confidence, 2);
    fields
        .present_fields()
        .into_iter()
        .map(|name| (name.to_string(), score))
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================
