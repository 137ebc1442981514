//! Error types for malformed input and configuration
//!
//! Negative verification outcomes are never errors; they are result values.

use thiserror::Error;

use crate::types::DetectorBackend;

/// Errors surfaced immediately to the caller, never retried
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VerifyError {
    /// Liveness needs at least one frame
    #[error("At least one frame is required")]
    EmptyFrameList,

    /// Challenge name outside blink/head_left/head_right/smile/nod
    #[error("Unknown challenge type: {0}")]
    UnknownChallenge(String),

    /// Frame pixel data is structurally corrupt
    #[error("Frame {index} is not a decodable image: {reason}")]
    FrameDecode { index: usize, reason: String },

    /// Observation produced by a detector other than the configured one
    #[error("Observation from {found} backend, but {expected} backend is configured")]
    BackendMismatch {
        expected: DetectorBackend,
        found: DetectorBackend,
    },

    /// Config file unreadable or invalid
    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, VerifyError>;
