//! Document Validator: per-field plausibility checks over extracted fields

use chrono::{NaiveDate, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;
use tracing::debug;

use crate::types::{CheckName, DocumentFields, ValidationResult, ValidationWarning};

lazy_static! {
    static ref RE_NAME: Regex = Regex::new(r"^[A-Za-z\s\-\.]+$").unwrap();
    static ref RE_DOCUMENT_NUMBER: Regex = Regex::new(r"^[A-Z0-9]+$").unwrap();
}

const MIN_NAME_LENGTH: usize = 2;
const MIN_DOCUMENT_NUMBER_LENGTH: usize = 5;
const MAX_AGE_YEARS: f64 = 150.0;
const DAYS_PER_YEAR: f64 = 365.25;

/// Stateless validator; the same fields and date always give the same result
#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentValidator;

#[derive(Default)]
struct Tally {
    passed: BTreeSet<CheckName>,
    failed: BTreeSet<CheckName>,
    warnings: BTreeSet<ValidationWarning>,
}

impl DocumentValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate against today's UTC date
    pub fn validate(&self, fields: &DocumentFields) -> ValidationResult {
        self.validate_at(fields, Utc::now().date_naive())
    }

    /// Validate with dates judged against `today`
    pub fn validate_at(&self, fields: &DocumentFields, today: NaiveDate) -> ValidationResult {
        let mut tally = Tally::default();

        check_name(fields, &mut tally);
        check_document_number(fields, &mut tally);
        check_date_of_birth(fields, today, &mut tally);
        check_expiry(fields, today, &mut tally);

        let total = tally.passed.len() + tally.failed.len();
        let authenticity_score = if total == 0 {
            0.0
        } else {
            tally.passed.len() as f64 / total as f64
        };

        debug!(
            passed = tally.passed.len(),
            failed = tally.failed.len(),
            warnings = tally.warnings.len(),
            "document validated"
        );

        ValidationResult {
            is_valid: tally.failed.is_empty(),
            checks_passed: tally.passed,
            checks_failed: tally.failed,
            warnings: tally.warnings,
            authenticity_score,
        }
    }
}

fn check_name(fields: &DocumentFields, tally: &mut Tally) {
    match fields.display_name() {
        Some(name) if name.chars().count() >= MIN_NAME_LENGTH => {
            tally.passed.insert(CheckName::NamePresent);
            if RE_NAME.is_match(&name) {
                tally.passed.insert(CheckName::NameFormat);
            } else {
                tally.warnings.insert(ValidationWarning::NameContainsUnusualCharacters);
            }
        }
        _ => {
            tally.failed.insert(CheckName::NameMissing);
        }
    }
}

fn check_document_number(fields: &DocumentFields, tally: &mut Tally) {
    match fields.document_number.as_deref() {
        Some(number) if number.chars().count() >= MIN_DOCUMENT_NUMBER_LENGTH => {
            tally.passed.insert(CheckName::DocumentNumberPresent);
            if RE_DOCUMENT_NUMBER.is_match(number) {
                tally.passed.insert(CheckName::DocumentNumberFormat);
            } else {
                tally.warnings.insert(ValidationWarning::DocumentNumberUnusualFormat);
            }
        }
        _ => {
            tally.failed.insert(CheckName::DocumentNumberMissing);
        }
    }
}

fn check_date_of_birth(fields: &DocumentFields, today: NaiveDate, tally: &mut Tally) {
    let Some(raw) = fields.date_of_birth.as_deref().filter(|s| !s.is_empty()) else {
        tally.failed.insert(CheckName::DobMissing);
        return;
    };

    match parse_iso_date(raw) {
        Some(dob) => {
            let age = (today - dob).num_days() as f64 / DAYS_PER_YEAR;
            if age > 0.0 && age < MAX_AGE_YEARS {
                tally.passed.insert(CheckName::DobValid);
            } else {
                tally.failed.insert(CheckName::DobOutOfRange);
            }
        }
        None => {
            tally.failed.insert(CheckName::DobInvalidFormat);
        }
    }
}

/// Missing expiry records nothing
fn check_expiry(fields: &DocumentFields, today: NaiveDate, tally: &mut Tally) {
    let Some(raw) = fields.expiry_date.as_deref().filter(|s| !s.is_empty()) else {
        return;
    };

    match parse_iso_date(raw) {
        Some(expiry) if expiry > today => {
            tally.passed.insert(CheckName::ExpiryDateValid);
        }
        Some(_) => {
            tally.failed.insert(CheckName::DocumentExpired);
        }
        None => {
            tally.failed.insert(CheckName::ExpiryDateInvalidFormat);
        }
    }
}

/// Strict `YYYY-MM-DD` with a four-digit year
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    let year = value.split('-').next()?;
    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()
    }

    fn complete_fields() -> DocumentFields {
        DocumentFields {
            full_name: Some("Anna Maria Eriksson".to_string()),
            document_number: Some("L898902C3".to_string()),
            date_of_birth: Some("1974-08-12".to_string()),
            expiry_date: Some("2034-12-31".to_string()),
            ..DocumentFields::default()
        }
    }

    #[test]
    fn test_complete_document_is_valid() {
        let result = DocumentValidator::new().validate_at(&complete_fields(), today());
        assert!(result.is_valid);
        assert_eq!(result.checks_passed.len(), 6);
        assert!(result.checks_failed.is_empty());
        assert!(result.warnings.is_empty());
        assert_eq!(result.authenticity_score, 1.0);
    }

    #[test]
    fn test_empty_fields() {
        let result = DocumentValidator::new().validate_at(&DocumentFields::default(), today());
        assert!(!result.is_valid);
        let failed: Vec<CheckName> = result.checks_failed.iter().copied().collect();
        assert_eq!(
            failed,
            vec![CheckName::NameMissing, CheckName::DocumentNumberMissing, CheckName::DobMissing]
        );
        assert_eq!(result.authenticity_score, 0.0);
    }

    #[test]
    fn test_expiry_boundary() {
        let validator = DocumentValidator::new();
        let mut fields = complete_fields();

        fields.expiry_date = Some("2026-05-31".to_string());
        let past = validator.validate_at(&fields, today());
        assert!(past.checks_failed.contains(&CheckName::DocumentExpired));

        fields.expiry_date = Some("2026-06-01".to_string());
        let same_day = validator.validate_at(&fields, today());
        assert!(same_day.checks_failed.contains(&CheckName::DocumentExpired));

        fields.expiry_date = Some("2026-06-02".to_string());
        let future = validator.validate_at(&fields, today());
        assert!(future.checks_passed.contains(&CheckName::ExpiryDateValid));
        assert!(future.is_valid);
    }

    #[test]
    fn test_unparsable_dates_are_distinct_failures() {
        let mut fields = complete_fields();
        fields.date_of_birth = Some("12/08/74".to_string());
        fields.expiry_date = Some("31/02/2031".to_string());

        let result = DocumentValidator::new().validate_at(&fields, today());
        assert!(result.checks_failed.contains(&CheckName::DobInvalidFormat));
        assert!(result.checks_failed.contains(&CheckName::ExpiryDateInvalidFormat));
        assert!(!result.checks_failed.contains(&CheckName::DobMissing));
    }

    #[test]
    fn test_dob_out_of_range() {
        let mut fields = complete_fields();
        fields.date_of_birth = Some("2030-01-01".to_string());
        let future = DocumentValidator::new().validate_at(&fields, today());
        assert!(future.checks_failed.contains(&CheckName::DobOutOfRange));

        fields.date_of_birth = Some("1850-01-01".to_string());
        let ancient = DocumentValidator::new().validate_at(&fields, today());
        assert!(ancient.checks_failed.contains(&CheckName::DobOutOfRange));
    }

    #[test]
    fn test_format_issues_are_warnings() {
        let mut fields = complete_fields();
        fields.full_name = Some("Anna_Maria 3".to_string());
        fields.document_number = Some("l8989-02".to_string());

        let result = DocumentValidator::new().validate_at(&fields, today());
        assert!(result.is_valid);
        assert!(result.warnings.contains(&ValidationWarning::NameContainsUnusualCharacters));
        assert!(result.warnings.contains(&ValidationWarning::DocumentNumberUnusualFormat));
        assert!(result.checks_passed.contains(&CheckName::NamePresent));
        assert!(!result.checks_passed.contains(&CheckName::NameFormat));
    }

    #[test]
    fn test_name_falls_back_to_parts() {
        let mut fields = complete_fields();
        fields.full_name = None;
        fields.surname = Some("ERIKSSON".to_string());
        fields.given_names = Some("ANNA".to_string());

        let result = DocumentValidator::new().validate_at(&fields, today());
        assert!(result.checks_passed.contains(&CheckName::NameFormat));
    }

    #[test]
    fn test_missing_expiry_records_nothing() {
        let mut fields = complete_fields();
        fields.expiry_date = None;
        let result = DocumentValidator::new().validate_at(&fields, today());
        assert_eq!(result.checks_passed.len(), 5);
        assert!(result.is_valid);
    }

    #[test]
    fn test_partial_score() {
        let mut fields = complete_fields();
        fields.document_number = None;
        let result = DocumentValidator::new().validate_at(&fields, today());
        // 4 passed, 1 failed
        assert_eq!(result.authenticity_score, 0.8);
    }

    #[test]
    fn test_idempotent() {
        let validator = DocumentValidator::new();
        let fields = complete_fields();
        assert_eq!(validator.validate_at(&fields, today()), validator.validate_at(&fields, today()));
    }
}
