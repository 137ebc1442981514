//! MRZ Parser: fixed-width TD3 decoding with ICAO check digits
//!
//! Line 1: type [0,2) | country [2,5) | name [5,44)
//! Line 2: number [0,9) + check [9] | nationality [10,13) | DOB [13,19) + check [19]
//!         | sex [20] | expiry [21,27) + check [27] | personal number [28,42)

use chrono::{NaiveDate, Utc};
use tracing::debug;

use crate::core::mrz_locator::{fit_to_td3, TD3_LINE_LENGTH};
use crate::types::{CheckName, MrzRecord};

/// Cyclic check-digit weights
const CHECK_WEIGHTS: [u32; 3] = [7, 3, 1];

/// DOB two-digit years above this are 19xx
const DOB_CENTURY_PIVOT: i32 = 29;

/// ICAO 9303 check value of `field`: weighted sum mod 10
///
/// Digits map to themselves, `A`–`Z` to 10–35; `<` and anything else count 0.
pub fn mrz_checksum(field: &str) -> u32 {
    field
        .chars()
        .enumerate()
        .map(|(i, c)| char_value(c) * CHECK_WEIGHTS[i % 3])
        .sum::<u32>()
        % 10
}

fn char_value(c: char) -> u32 {
    match c {
        '0'..='9' => c as u32 - '0' as u32,
        'A'..='Z' => c as u32 - 'A' as u32 + 10,
        _ => 0,
    }
}

/// TD3 decoder
#[derive(Debug, Default, Clone, Copy)]
pub struct MrzParser;

impl MrzParser {
    pub fn new() -> Self {
        Self
    }

    /// Decode both lines, judging expiry against today's UTC date
    pub fn parse(&self, line1: &str, line2: &str) -> MrzRecord {
        self.parse_at(line1, line2, Utc::now().date_naive())
    }

    /// Decode both lines, judging expiry against `today`
    ///
    /// Decoding is by character position over the lines fitted to 44
    /// characters of the MRZ alphabet, so stray OCR characters only blank
    /// the positions they occupy.
    pub fn parse_at(&self, line1: &str, line2: &str, today: NaiveDate) -> MrzRecord {
        let mut record = MrzRecord {
            mrz_line1: line1.to_string(),
            mrz_line2: line2.to_string(),
            ..MrzRecord::default()
        };

        let line1 = fit_to_td3(&line1.to_ascii_uppercase());
        let line2 = fit_to_td3(&line2.to_ascii_uppercase());
        parse_line1(&line1, &mut record);
        parse_line2(&line2, today, &mut record);

        debug!(
            passed = record.checks_passed.len(),
            failed = record.checks_failed.len(),
            "MRZ decoded"
        );
        record
    }
}

fn parse_line1(line: &str, record: &mut MrzRecord) {
    record.document_type_code = non_empty(&line[0..2].replace('<', ""));
    record.issuing_country = non_empty(&line[2..5].replace('<', ""));

    let name_field = &line[5..TD3_LINE_LENGTH];
    let (surname, given) = match name_field.split_once("<<") {
        Some((surname, given)) => (surname, given),
        None => (name_field, ""),
    };
    record.surname = non_empty(surname.replace('<', " ").trim());
    record.given_names = non_empty(given.replace('<', " ").trim());
}

fn parse_line2(line: &str, today: NaiveDate, record: &mut MrzRecord) {
    let number_field = &line[0..9];
    record.document_number = non_empty(&number_field.replace('<', ""));
    record_check(record, CheckName::DocumentNumberChecksum, number_field, &line[9..10]);

    record.nationality = non_empty(&line[10..13].replace('<', ""));

    let dob_field = &line[13..19];
    record.date_of_birth = parse_yymmdd(dob_field, |yy| if yy > DOB_CENTURY_PIVOT { 1900 + yy } else { 2000 + yy });
    record_check(record, CheckName::DobChecksum, dob_field, &line[19..20]);

    let sex = match &line[20..21] {
        "M" => "M",
        "F" => "F",
        _ => "X",
    };
    record.gender = Some(sex.to_string());

    let expiry_field = &line[21..27];
    record.expiry_date = parse_yymmdd(expiry_field, |yy| 2000 + yy);
    record_check(record, CheckName::ExpiryChecksum, expiry_field, &line[27..28]);

    if let Some(expiry) = record.expiry_date {
        if expiry > today {
            record.checks_passed.insert(CheckName::ExpiryDateValid);
        } else {
            record.checks_failed.insert(CheckName::ExpiryDateExpired);
        }
    }

    record.personal_number = non_empty(&line[28..42].replace('<', ""));
}

/// Passes iff `check` is a digit equal to the computed value of `field`
fn record_check(record: &mut MrzRecord, name: CheckName, field: &str, check: &str) {
    let expected = mrz_checksum(field);
    let passed = check
        .chars()
        .next()
        .and_then(|c| c.to_digit(10))
        .map_or(false, |digit| digit == expected);

    if passed {
        record.checks_passed.insert(name);
    } else {
        debug!(check = name.code(), field, expected, "MRZ check digit mismatch");
        record.checks_failed.insert(name);
    }
}

/// `YYMMDD` to a calendar date; None for non-digits or an impossible date
fn parse_yymmdd(field: &str, century: impl Fn(i32) -> i32) -> Option<NaiveDate> {
    if field.len() != 6 || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let yy: i32 = field[0..2].parse().ok()?;
    let mm: u32 = field[2..4].parse().ok()?;
    let dd: u32 = field[4..6].parse().ok()?;
    NaiveDate::from_ymd_opt(century(yy), mm, dd)
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn pad(line: &str) -> String {
        format!("{:<<44}", line)
    }

    fn line2(number: &str, dob: &str, expiry: &str, sex: char) -> String {
        format!(
            "{}{}UTO{}{}{}{}{}ZE184226B<<<<<10",
            number,
            mrz_checksum(number),
            dob,
            mrz_checksum(dob),
            sex,
            expiry,
            mrz_checksum(expiry),
        )
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()
    }

    #[test]
    fn test_checksum_known_values() {
        assert_eq!(mrz_checksum("L898902C3"), 6);
        assert_eq!(mrz_checksum("740812"), 2);
        assert_eq!(mrz_checksum("341231"), 8);
        assert_eq!(mrz_checksum("<<<<<<"), 0);
    }

    #[test]
    fn test_valid_pair_passes_all_checksums() {
        let l1 = pad("P<UTOERIKSSON<<ANNA<MARIA");
        let l2 = line2("L898902C3", "740812", "341231", 'F');
        assert_eq!(l2.len(), 44);

        let record = MrzParser::new().parse_at(&l1, &l2, today());
        assert!(record.checks_passed.contains(&CheckName::DocumentNumberChecksum));
        assert!(record.checks_passed.contains(&CheckName::DobChecksum));
        assert!(record.checks_passed.contains(&CheckName::ExpiryChecksum));
        assert!(record.checks_passed.contains(&CheckName::ExpiryDateValid));
        assert!(record.checks_failed.is_empty());

        assert_eq!(record.document_type_code.as_deref(), Some("P"));
        assert_eq!(record.issuing_country.as_deref(), Some("UTO"));
        assert_eq!(record.surname.as_deref(), Some("ERIKSSON"));
        assert_eq!(record.given_names.as_deref(), Some("ANNA MARIA"));
        assert_eq!(record.document_number.as_deref(), Some("L898902C3"));
        assert_eq!(record.nationality.as_deref(), Some("UTO"));
        assert_eq!(record.date_of_birth, NaiveDate::from_ymd_opt(1974, 8, 12));
        assert_eq!(record.expiry_date, NaiveDate::from_ymd_opt(2034, 12, 31));
        assert_eq!(record.gender.as_deref(), Some("F"));
        assert_eq!(record.personal_number.as_deref(), Some("ZE184226B"));
        assert_eq!(record.full_name().as_deref(), Some("ANNA MARIA ERIKSSON"));
    }

    #[test]
    fn test_wrong_check_digit_fails_only_that_field() {
        let l1 = pad("P<UTOERIKSSON<<ANNA<MARIA");
        let mut l2 = line2("L898902C3", "740812", "341231", 'F');
        l2.replace_range(9..10, "7");

        let record = MrzParser::new().parse_at(&l1, &l2, today());
        assert!(record.checks_failed.contains(&CheckName::DocumentNumberChecksum));
        assert!(record.checks_passed.contains(&CheckName::DobChecksum));
        assert!(record.checks_passed.contains(&CheckName::ExpiryChecksum));
    }

    #[test]
    fn test_filler_check_digit_fails() {
        let l1 = pad("P<UTOERIKSSON<<ANNA");
        let mut l2 = line2("L898902C3", "740812", "341231", 'F');
        l2.replace_range(19..20, "<");

        let record = MrzParser::new().parse_at(&l1, &l2, today());
        assert!(record.checks_failed.contains(&CheckName::DobChecksum));
    }

    #[test]
    fn test_dob_century_pivot() {
        let l1 = pad("P<UTOX<<Y");
        let young = MrzParser::new().parse_at(&l1, &line2("AB1234567", "290101", "341231", 'M'), today());
        let old = MrzParser::new().parse_at(&l1, &line2("AB1234567", "300101", "341231", 'M'), today());
        assert_eq!(young.date_of_birth, NaiveDate::from_ymd_opt(2029, 1, 1));
        assert_eq!(old.date_of_birth, NaiveDate::from_ymd_opt(1930, 1, 1));
    }

    #[test]
    fn test_expiry_boundary() {
        let l1 = pad("P<UTOX<<Y");
        let parser = MrzParser::new();
        let expiry = NaiveDate::from_ymd_opt(2030, 5, 15).unwrap();
        let l2 = line2("AB1234567", "800101", "300515", 'M');

        let day_before = parser.parse_at(&l1, &l2, expiry.pred_opt().unwrap());
        assert!(day_before.checks_passed.contains(&CheckName::ExpiryDateValid));

        let same_day = parser.parse_at(&l1, &l2, expiry);
        assert!(same_day.checks_failed.contains(&CheckName::ExpiryDateExpired));

        let day_after = parser.parse_at(&l1, &l2, expiry.succ_opt().unwrap());
        assert!(day_after.checks_failed.contains(&CheckName::ExpiryDateExpired));
    }

    #[test]
    fn test_malformed_dates_do_not_abort() {
        let l1 = pad("P<UTOERIKSSON<<ANNA");
        let l2 = line2("L898902C3", "74AB12", "341331", 'Q');

        let record = MrzParser::new().parse_at(&l1, &l2, today());
        assert_eq!(record.date_of_birth, None);
        assert_eq!(record.expiry_date, None);
        assert_eq!(record.gender.as_deref(), Some("X"));
        assert_eq!(record.document_number.as_deref(), Some("L898902C3"));
        // Checksums still computed over the raw characters
        assert!(record.checks_passed.contains(&CheckName::DobChecksum));
        assert!(!record.checks_passed.contains(&CheckName::ExpiryDateValid));
        assert!(!record.checks_failed.contains(&CheckName::ExpiryDateExpired));
    }

    #[test]
    fn test_short_line_decoded_by_position() {
        let l1 = pad("P<UTOERIKSSON<<ANNA");
        let record = MrzParser::new().parse_at(&l1, "L898902C36UTO", today());
        assert_eq!(record.surname.as_deref(), Some("ERIKSSON"));
        assert_eq!(record.document_number.as_deref(), Some("L898902C3"));
        assert_eq!(record.nationality.as_deref(), Some("UTO"));
        assert_eq!(record.date_of_birth, None);
        assert!(record.checks_passed.contains(&CheckName::DocumentNumberChecksum));
        // Padded fields carry no check digit
        assert!(record.checks_failed.contains(&CheckName::DobChecksum));
        assert!(record.checks_failed.contains(&CheckName::ExpiryChecksum));
    }

    #[test]
    fn test_stray_character_keeps_other_fields() {
        let l1 = pad("P<UTOERIKSSON<<ANNA<MARIA");
        let l2 = line2("L898902C3", "740812", "341231", 'F').replacen("B<<<<<", "B<<\u{ab}<<", 1);
        assert!(!l2.is_ascii());

        let record = MrzParser::new().parse_at(&l1, &l2, today());
        assert_eq!(record.document_number.as_deref(), Some("L898902C3"));
        assert_eq!(record.date_of_birth, NaiveDate::from_ymd_opt(1974, 8, 12));
        assert_eq!(record.personal_number.as_deref(), Some("ZE184226B"));
        assert!(record.checks_passed.contains(&CheckName::DocumentNumberChecksum));
        assert!(record.checks_passed.contains(&CheckName::DobChecksum));
        assert!(record.checks_passed.contains(&CheckName::ExpiryChecksum));
        assert!(record.checks_failed.is_empty());
        assert_eq!(record.mrz_line2, l2);
    }

    #[test]
    fn test_every_checksum_field_recorded_once() {
        let l1 = pad("P<UTOX<<Y");
        let inputs = ["", "<<<", "L898902C3", "L898902C36UTO74\u{e9}8122F"];
        for l2 in inputs {
            let record = MrzParser::new().parse_at(&l1, l2, today());
            for check in [CheckName::DocumentNumberChecksum, CheckName::DobChecksum, CheckName::ExpiryChecksum] {
                let passed = record.checks_passed.contains(&check);
                let failed = record.checks_failed.contains(&check);
                assert!(passed != failed, "{:?} on {:?}", check, l2);
            }
        }
    }
}
