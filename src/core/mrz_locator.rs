//! MRZ Line Locator: finds the two TD3 lines in raw OCR text
//!
//! The confusable substitution (O→0, I→1, S→5, B→8) runs on every candidate
//! line, names included. It recovers digits on line 2 at the cost of
//! corrupting letters on line 1; callers get the lossy text as-is.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

lazy_static! {
    /// Start of a line drawn from the MRZ alphabet
    static ref RE_MRZ_LINE: Regex = Regex::new(r"^[A-Z0-9<]{30,50}").unwrap();
}

/// Characters per TD3 line
pub const TD3_LINE_LENGTH: usize = 44;

/// Minimum cleaned length for a candidate line
const MIN_CANDIDATE_LENGTH: usize = 30;

/// The two lines of a TD3 zone, each exactly 44 characters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MrzLines {
    pub line1: String,
    pub line2: String,
}

/// Scans OCR text for MRZ candidates
#[derive(Debug, Default, Clone, Copy)]
pub struct MrzLocator;

impl MrzLocator {
    pub fn new() -> Self {
        Self
    }

    /// Two longest candidate lines, padded to 44 and ordered with the `P` line first
    pub fn locate(&self, raw_text: &str) -> Option<MrzLines> {
        let mut candidates: Vec<String> = raw_text
            .lines()
            .map(normalize_line)
            .filter(|line| line.len() >= MIN_CANDIDATE_LENGTH && RE_MRZ_LINE.is_match(line))
            .collect();

        debug!(candidates = candidates.len(), "MRZ candidate lines");
        if candidates.len() < 2 {
            return None;
        }

        // Stable: equal lengths keep text order
        candidates.sort_by(|a, b| b.len().cmp(&a.len()));
        let mut line1 = fit_to_td3(&candidates[0]);
        let mut line2 = fit_to_td3(&candidates[1]);

        if line2.starts_with('P') && !line1.starts_with('P') {
            std::mem::swap(&mut line1, &mut line2);
        }

        Some(MrzLines { line1, line2 })
    }
}

/// Upper-case, drop whitespace, replace OCR-confusable letters with digits
pub fn normalize_line(line: &str) -> String {
    line.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .map(|c| match c {
            'O' => '0',
            'I' => '1',
            'S' => '5',
            'B' => '8',
            other => other,
        })
        .collect()
}

/// Exactly 44 characters of the MRZ alphabet: truncate, right-pad with `<`,
/// and turn anything outside `[A-Z0-9<]` into `<`
pub fn fit_to_td3(line: &str) -> String {
    let mut fitted: String = line
        .chars()
        .take(TD3_LINE_LENGTH)
        .map(|c| match c {
            'A'..='Z' | '0'..='9' | '<' => c,
            _ => '<',
        })
        .collect();
    while fitted.len() < TD3_LINE_LENGTH {
        fitted.push('<');
    }
    fitted
}

// =============================================================================
// TESTS
// =============================================================================
