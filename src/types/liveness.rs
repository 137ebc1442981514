//! Liveness challenge and anti-spoofing records

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::VerifyError;

/// Physical action the subject is asked to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeType {
    Blink,
    HeadLeft,
    HeadRight,
    Smile,
    Nod,
}

impl ChallengeType {
    pub const ALL: [ChallengeType; 5] = [
        ChallengeType::Blink,
        ChallengeType::HeadLeft,
        ChallengeType::HeadRight,
        ChallengeType::Smile,
        ChallengeType::Nod,
    ];

    /// Wire name
    pub fn code(&self) -> &'static str {
        match self {
            Self::Blink => "blink",
            Self::HeadLeft => "head_left",
            Self::HeadRight => "head_right",
            Self::Smile => "smile",
            Self::Nod => "nod",
        }
    }

    /// Instruction shown to the subject
    pub fn instruction(&self) -> &'static str {
        match self {
            Self::Blink => "Please blink your eyes twice",
            Self::HeadLeft => "Slowly turn your head to the left",
            Self::HeadRight => "Slowly turn your head to the right",
            Self::Smile => "Please smile",
            Self::Nod => "Nod your head up and down",
        }
    }

    /// Deterministic pick from the catalogue
    pub fn pick(seed: u64) -> Self {
        Self::ALL[(seed % Self::ALL.len() as u64) as usize]
    }
}

impl FromStr for ChallengeType {
    type Err = VerifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.code() == s.trim().to_ascii_lowercase())
            .ok_or_else(|| VerifyError::UnknownChallenge(s.to_string()))
    }
}

impl std::fmt::Display for ChallengeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Reason codes for challenge and liveness outcomes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum LivenessReason {
    /// Challenge threshold met
    L001_CHALLENGE_PASSED,
    /// Challenge threshold not met
    L002_CHALLENGE_FAILED,
    /// Subject found in too few frames to judge
    L003_INSUFFICIENT_COVERAGE,
    /// Detector never produced the signal this challenge needs
    L004_SIGNAL_UNAVAILABLE,
}

impl LivenessReason {
    pub fn code(&self) -> &'static str {
        match self {
            Self::L001_CHALLENGE_PASSED => "L001_CHALLENGE_PASSED",
            Self::L002_CHALLENGE_FAILED => "L002_CHALLENGE_FAILED",
            Self::L003_INSUFFICIENT_COVERAGE => "L003_INSUFFICIENT_COVERAGE",
            Self::L004_SIGNAL_UNAVAILABLE => "L004_SIGNAL_UNAVAILABLE",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::L001_CHALLENGE_PASSED => "Challenge completed",
            Self::L002_CHALLENGE_FAILED => "Challenge not completed",
            Self::L003_INSUFFICIENT_COVERAGE => "Face not detected in enough frames",
            Self::L004_SIGNAL_UNAVAILABLE => "Detector does not provide the required signal",
        }
    }
}

impl std::fmt::Display for LivenessReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.description())
    }
}

/// Per-challenge diagnostic metrics, rounded to 4 dp
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChallengeDiagnostics {
    pub ear_min: Option<f64>,
    pub ear_max: Option<f64>,
    pub mar_max: Option<f64>,
    /// Horizontal shift over mean face width
    pub nose_x_range: Option<f64>,
    /// Vertical shift over mean face height
    pub nose_y_range: Option<f64>,
    pub eyes_open_ratio: Option<f64>,
    pub width_range: Option<f64>,
}

/// Verdict of the challenge evaluator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeResult {
    pub challenge_type: ChallengeType,
    pub passed: bool,
    /// In [0, 1], rounded to 4 dp
    pub confidence: f64,
    pub reason: LivenessReason,
    pub diagnostics: ChallengeDiagnostics,
    pub frames_total: usize,
    pub frames_with_subject: usize,
}

impl ChallengeResult {
    /// Fail-fast outcome when too few frames show a subject
    pub fn insufficient(challenge_type: ChallengeType, frames_total: usize, frames_with_subject: usize) -> Self {
        Self {
            challenge_type,
            passed: false,
            confidence: 0.0,
            reason: LivenessReason::L003_INSUFFICIENT_COVERAGE,
            diagnostics: ChallengeDiagnostics::default(),
            frames_total,
            frames_with_subject,
        }
    }

    pub fn is_insufficient(&self) -> bool {
        self.reason == LivenessReason::L003_INSUFFICIENT_COVERAGE
    }
}

/// Presentation attack detected by the variance heuristic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpoofKind {
    PhotoOrScreen,
    #[serde(rename = "no_face")]
    NoSubject,
}

/// Reason codes for the anti-spoofing heuristic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum SpoofReason {
    /// Positional jitter consistent with a live subject
    S001_MOTION_OBSERVED,
    /// Flat but the challenge proved motion
    S002_FLAT_CHALLENGE_PASSED,
    /// Flat and the challenge failed
    S003_FLAT_PHOTO_OR_SCREEN,
    /// Fewer than three subject frames, no evidence either way
    S004_TOO_FEW_FRAMES,
    /// Subject found in too few frames to judge
    S005_INSUFFICIENT_COVERAGE,
}

impl SpoofReason {
    pub fn code(&self) -> &'static str {
        match self {
            Self::S001_MOTION_OBSERVED => "S001_MOTION_OBSERVED",
            Self::S002_FLAT_CHALLENGE_PASSED => "S002_FLAT_CHALLENGE_PASSED",
            Self::S003_FLAT_PHOTO_OR_SCREEN => "S003_FLAT_PHOTO_OR_SCREEN",
            Self::S004_TOO_FEW_FRAMES => "S004_TOO_FEW_FRAMES",
            Self::S005_INSUFFICIENT_COVERAGE => "S005_INSUFFICIENT_COVERAGE",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::S001_MOTION_OBSERVED => "Natural positional jitter",
            Self::S002_FLAT_CHALLENGE_PASSED => "Little motion, but the challenge was completed",
            Self::S003_FLAT_PHOTO_OR_SCREEN => "No motion, likely a photo or screen",
            Self::S004_TOO_FEW_FRAMES => "Too few frames to measure motion",
            Self::S005_INSUFFICIENT_COVERAGE => "Face not detected in enough frames",
        }
    }
}

impl std::fmt::Display for SpoofReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.description())
    }
}

/// Anti-spoofing verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpoofAssessment {
    pub is_real_face: bool,
    pub confidence: f64,
    #[serde(rename = "spoof_type_detected")]
    pub spoof_kind: Option<SpoofKind>,
    pub reason: SpoofReason,
    /// Normalized positional variance, when computed
    pub total_variance: Option<f64>,
}

/// Combined liveness outcome for one evaluation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LivenessResult {
    pub is_live: bool,
    pub confidence: f64,
    pub challenge_completed: bool,
    pub challenge_type: ChallengeType,
    pub reason: LivenessReason,
    pub anti_spoofing: SpoofAssessment,
    pub details: ChallengeDiagnostics,
    pub frames_analyzed: u32,
    pub frames_with_subject: u32,
}
