//! Document extraction and validation records

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Named check recorded by the MRZ parser or document validator
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckName {
    // MRZ checksums
    DocumentNumberChecksum,
    DobChecksum,
    ExpiryChecksum,

    // Expiry
    ExpiryDateValid,
    ExpiryDateExpired,
    DocumentExpired,
    ExpiryDateInvalidFormat,

    // Name
    NamePresent,
    NameFormat,
    NameMissing,

    // Document number
    DocumentNumberPresent,
    DocumentNumberFormat,
    DocumentNumberMissing,

    // Date of birth
    DobValid,
    DobOutOfRange,
    DobInvalidFormat,
    DobMissing,
}

impl CheckName {
    pub fn code(&self) -> &'static str {
        match self {
            Self::DocumentNumberChecksum => "document_number_checksum",
            Self::DobChecksum => "dob_checksum",
            Self::ExpiryChecksum => "expiry_checksum",
            Self::ExpiryDateValid => "expiry_date_valid",
            Self::ExpiryDateExpired => "expiry_date_expired",
            Self::DocumentExpired => "document_expired",
            Self::ExpiryDateInvalidFormat => "expiry_date_invalid_format",
            Self::NamePresent => "name_present",
            Self::NameFormat => "name_format",
            Self::NameMissing => "name_missing",
            Self::DocumentNumberPresent => "document_number_present",
            Self::DocumentNumberFormat => "document_number_format",
            Self::DocumentNumberMissing => "document_number_missing",
            Self::DobValid => "dob_valid",
            Self::DobOutOfRange => "dob_out_of_range",
            Self::DobInvalidFormat => "dob_invalid_format",
            Self::DobMissing => "dob_missing",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::DocumentNumberChecksum => "Document number check digit",
            Self::DobChecksum => "Date of birth check digit",
            Self::ExpiryChecksum => "Expiry date check digit",
            Self::ExpiryDateValid => "Document not yet expired",
            Self::ExpiryDateExpired => "MRZ expiry date has passed",
            Self::DocumentExpired => "Document has expired",
            Self::ExpiryDateInvalidFormat => "Expiry date not YYYY-MM-DD",
            Self::NamePresent => "Name present",
            Self::NameFormat => "Name has plausible length",
            Self::NameMissing => "Name missing or too short",
            Self::DocumentNumberPresent => "Document number present",
            Self::DocumentNumberFormat => "Document number has expected shape",
            Self::DocumentNumberMissing => "Document number missing",
            Self::DobValid => "Date of birth plausible",
            Self::DobOutOfRange => "Age outside 0-150 years",
            Self::DobInvalidFormat => "Date of birth not YYYY-MM-DD",
            Self::DobMissing => "Date of birth missing",
        }
    }
}

impl std::fmt::Display for CheckName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.description())
    }
}

/// Non-fatal validation findings
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationWarning {
    NameContainsUnusualCharacters,
    DocumentNumberUnusualFormat,
}

/// Decoded TD3 machine-readable zone
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MrzRecord {
    pub document_type_code: Option<String>,
    pub issuing_country: Option<String>,
    pub surname: Option<String>,
    pub given_names: Option<String>,
    pub document_number: Option<String>,
    pub nationality: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub personal_number: Option<String>,
    pub mrz_line1: String,
    pub mrz_line2: String,
    /// Each checksum-protected field lands in exactly one of these
    pub checks_passed: BTreeSet<CheckName>,
    pub checks_failed: BTreeSet<CheckName>,
}

impl MrzRecord {
    /// "given surname", or None when neither is present
    pub fn full_name(&self) -> Option<String> {
        let joined = format!(
            "{} {}",
            self.given_names.as_deref().unwrap_or(""),
            self.surname.as_deref().unwrap_or("")
        );
        let joined = joined.trim();
        if joined.is_empty() {
            None
        } else {
            Some(joined.to_string())
        }
    }
}

/// Identity fields as exchanged with callers; dates are `YYYY-MM-DD` strings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_type_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuing_country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub given_names: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personal_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mrz_line1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mrz_line2: Option<String>,
}

impl DocumentFields {
    /// Names of populated identity fields (MRZ lines excluded)
    pub fn present_fields(&self) -> Vec<&'static str> {
        [
            ("document_type_code", &self.document_type_code),
            ("issuing_country", &self.issuing_country),
            ("surname", &self.surname),
            ("given_names", &self.given_names),
            ("full_name", &self.full_name),
            ("document_number", &self.document_number),
            ("nationality", &self.nationality),
            ("date_of_birth", &self.date_of_birth),
            ("gender", &self.gender),
            ("expiry_date", &self.expiry_date),
            ("personal_number", &self.personal_number),
        ]
        .into_iter()
        .filter(|(_, v)| v.is_some())
        .map(|(k, _)| k)
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.present_fields().is_empty()
    }

    /// `full_name`, else "given surname"
    pub fn display_name(&self) -> Option<String> {
        if let Some(name) = self.full_name.as_deref().filter(|n| !n.trim().is_empty()) {
            return Some(name.to_string());
        }
        let joined = format!(
            "{} {}",
            self.given_names.as_deref().unwrap_or(""),
            self.surname.as_deref().unwrap_or("")
        );
        let joined = joined.trim();
        if joined.is_empty() {
            None
        } else {
            Some(joined.to_string())
        }
    }
}

impl From<&MrzRecord> for DocumentFields {
    fn from(record: &MrzRecord) -> Self {
        Self {
            document_type_code: record.document_type_code.clone(),
            issuing_country: record.issuing_country.clone(),
            surname: record.surname.clone(),
            given_names: record.given_names.clone(),
            full_name: record.full_name(),
            document_number: record.document_number.clone(),
            nationality: record.nationality.clone(),
            date_of_birth: record.date_of_birth.map(|d| d.format("%Y-%m-%d").to_string()),
            gender: record.gender.clone(),
            expiry_date: record.expiry_date.map(|d| d.format("%Y-%m-%d").to_string()),
            personal_number: record.personal_number.clone(),
            mrz_line1: Some(record.mrz_line1.clone()),
            mrz_line2: Some(record.mrz_line2.clone()),
        }
    }
}

/// Kind of identity document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    #[default]
    Auto,
    Passport,
    IdCard,
    DrivingLicense,
    NationalId,
    Unknown,
}

/// Output of the external text-recognition engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrOutput {
    /// General text pass
    pub raw_text: String,
    /// Pass restricted to the MRZ alphabet, when the engine ran one
    pub mrz_text: Option<String>,
    /// Per-word confidences 0–100; non-positive entries mean "no estimate"
    pub word_confidences: Vec<i32>,
}

/// Problem found in a document image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityIssue {
    ImageTooDark,
    ImageTooBright,
    LowContrast,
    ImageBlurry,
    ResolutionTooLow,
}

impl QualityIssue {
    pub fn code(&self) -> &'static str {
        match self {
            Self::ImageTooDark => "image_too_dark",
            Self::ImageTooBright => "image_too_bright",
            Self::LowContrast => "low_contrast",
            Self::ImageBlurry => "image_blurry",
            Self::ResolutionTooLow => "resolution_too_low",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::ImageTooDark => "Mean brightness below 60",
            Self::ImageTooBright => "Mean brightness above 220",
            Self::LowContrast => "Brightness standard deviation below 30",
            Self::ImageBlurry => "Laplacian variance below 200",
            Self::ResolutionTooLow => "Smaller than 400x300",
        }
    }
}

impl std::fmt::Display for QualityIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.description())
    }
}

/// Image quality of a document photo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    /// 1.0 less a fixed penalty per issue, clamped to [0, 1]
    pub score: f64,
    pub issues: Vec<QualityIssue>,
    /// `WIDTHxHEIGHT`
    pub resolution: String,
    /// Mean gray level, 1 dp
    pub brightness: f64,
    /// Gray-level standard deviation, 1 dp
    pub contrast: f64,
    /// Variance of the offset Laplacian response, 1 dp
    pub blur_score: f64,
}

/// Where extracted fields came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldSource {
    Mrz,
    /// Pattern matching over free text; lower confidence
    Fallback,
}

/// Structured extraction from one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub document_type: DocumentKind,
    pub extracted_data: DocumentFields,
    pub confidence_scores: BTreeMap<String, f64>,
    pub mrz_found: bool,
    pub source: FieldSource,
    pub checks_passed: BTreeSet<CheckName>,
    pub checks_failed: BTreeSet<CheckName>,
    pub ocr_confidence: f64,
    /// Present when the caller supplied the document image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<QualityReport>,
}

/// Cross-field plausibility verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// True iff `checks_failed` is empty
    pub is_valid: bool,
    pub checks_passed: BTreeSet<CheckName>,
    pub checks_failed: BTreeSet<CheckName>,
    pub warnings: BTreeSet<ValidationWarning>,
    /// passed / (passed + failed), 0 when nothing ran
    pub authenticity_score: f64,
}
