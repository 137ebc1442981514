//! Fallback Field Extractor: regex scraping of free OCR text
//!
//! Runs only when no MRZ is found. Low precision; results are scored below
//! MRZ-derived fields.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

use crate::types::DocumentFields;

lazy_static! {
    static ref RE_DATE: Regex = Regex::new(
        r"(\d{1,2}[/\-\.]\d{1,2}[/\-\.]\d{2,4}|\d{4}[/\-\.]\d{1,2}[/\-\.]\d{1,2})"
    ).unwrap();

    /// One or two letters then 6–10 digits
    static ref RE_DOCUMENT_NUMBER: Regex = Regex::new(r"\b([A-Z]{1,2}\d{6,10})\b").unwrap();

    static ref RE_NAME_LINE: Regex = Regex::new(r"^[A-Za-z\s\-]{3,50}$").unwrap();

    static ref RE_GENDER: Regex = Regex::new(r"\b(MALE|FEMALE|M|F)\b").unwrap();

    static ref RE_NATIONALITY: Regex = Regex::new(r"\b([A-Z]{3})\b").unwrap();
}

/// Two-digit years below this are 20xx
const TWO_DIGIT_YEAR_PIVOT: i32 = 69;

/// Best-effort extractor over raw text
#[derive(Debug, Default, Clone, Copy)]
pub struct FieldExtractor;

impl FieldExtractor {
    pub fn new() -> Self {
        Self
    }

    /// First two dates become DOB then expiry; other fields take the first match
    pub fn extract(&self, text: &str) -> DocumentFields {
        let upper = text.to_uppercase();
        let mut fields = DocumentFields::default();

        let mut dates = RE_DATE.find_iter(text).map(|m| normalize_date(m.as_str()));
        fields.date_of_birth = dates.next();
        fields.expiry_date = dates.next();

        fields.document_number = RE_DOCUMENT_NUMBER
            .captures(&upper)
            .map(|caps| caps[1].to_string());

        fields.full_name = text
            .lines()
            .map(str::trim)
            .find(|line| line.chars().count() > 3 && RE_NAME_LINE.is_match(line))
            .map(title_case);

        fields.gender = RE_GENDER.captures(&upper).map(|caps| {
            match &caps[1] {
                "MALE" | "M" => "M",
                _ => "F",
            }
            .to_string()
        });

        fields.nationality = RE_NATIONALITY
            .captures(&upper)
            .map(|caps| caps[1].to_string());

        fields
    }
}

/// `YYYY-MM-DD` when the token fits a known layout, else the token unchanged
pub fn normalize_date(token: &str) -> String {
    match parse_loose_date(token) {
        Some(date) => date.format("%Y-%m-%d").to_string(),
        None => token.to_string(),
    }
}

/// Day-first with `/ - .` and a 4- or 2-digit year, or year-first with `- /`
fn parse_loose_date(token: &str) -> Option<NaiveDate> {
    let sep = token.chars().find(|c| !c.is_ascii_digit())?;
    let parts: Vec<&str> = token.split(sep).collect();
    if parts.len() != 3 || parts.iter().any(|p| p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit())) {
        return None;
    }

    let num = |s: &str| s.parse::<u32>().ok();
    let (first, second, third) = (parts[0], parts[1], parts[2]);

    if first.len() <= 2 && second.len() <= 2 {
        let day = num(first)?;
        let month = num(second)?;
        let year = match third.len() {
            4 => third.parse::<i32>().ok()?,
            2 => {
                let yy = third.parse::<i32>().ok()?;
                if yy < TWO_DIGIT_YEAR_PIVOT {
                    2000 + yy
                } else {
                    1900 + yy
                }
            }
            _ => return None,
        };
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if first.len() == 4 && (sep == '-' || sep == '/') && second.len() <= 2 && third.len() <= 2 {
        return NaiveDate::from_ymd_opt(first.parse().ok()?, num(second)?, num(third)?);
    }

    None
}

/// Capitalise each letter run, lower-case the rest
fn title_case(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut in_word = false;
    for c in line.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

// =============================================================================
// TESTS
// =============================================================================
