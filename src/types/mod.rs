//! Value types for VerifyX

mod document;
mod frame;
mod liveness;
mod signals;
mod verification;

pub use document::{
    CheckName, DocumentFields, DocumentKind, ExtractionResult, FieldSource, MrzRecord, OcrOutput, QualityIssue,
    QualityReport, ValidationResult, ValidationWarning,
};
pub use frame::{DetectorBackend, FaceDetector, Frame, Landmark, Observation, ObservedFrame, PixelBox};
pub use liveness::{
    ChallengeDiagnostics, ChallengeResult, ChallengeType, LivenessReason, LivenessResult, SpoofAssessment,
    SpoofKind, SpoofReason,
};
pub use signals::FrameSignal;
pub use verification::{
    DocumentSubmission, FaceMatchVerdict, LivenessSubmission, OverallResult, StageOutcome, StageResults,
    VerificationReport, VerificationRequest,
};
