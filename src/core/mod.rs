//! Core engines for VerifyX

pub mod stats;
pub mod signal_extractor;
pub mod challenge;
pub mod anti_spoof;
pub mod liveness;
pub mod mrz_locator;
pub mod mrz_parser;
pub mod fallback;
pub mod validator;
pub mod quality;
pub mod extraction;
pub mod verification;
pub mod api;

pub use signal_extractor::SignalExtractor;
pub use challenge::ChallengeEvaluator;
pub use anti_spoof::AntiSpoofHeuristic;
pub use liveness::LivenessDetector;
pub use mrz_locator::{MrzLines, MrzLocator};
pub use mrz_parser::{mrz_checksum, MrzParser};
pub use fallback::FieldExtractor;
pub use validator::DocumentValidator;
pub use quality::QualityAssessor;
pub use extraction::DocumentExtractor;
pub use verification::VerificationPipeline;
pub use api::{create_router, run_server};
