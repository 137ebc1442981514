//! Integration tests for the liveness path
//!
//! Frames → detector → signals → challenge + anti-spoofing

use pretty_assertions::assert_eq;

use verifyx::core::LivenessDetector;
use verifyx::types::{
    ChallengeType, DetectorBackend, FaceDetector, Frame, Landmark, LivenessReason, Observation, SpoofKind,
    SpoofReason,
};
use verifyx::VerifyError;

// Face mesh indices used by the extractor
const LEFT_EYE_TOP: usize = 159;
const LEFT_EYE_BOTTOM: usize = 145;
const LEFT_EYE_INNER: usize = 133;
const LEFT_EYE_OUTER: usize = 33;
const RIGHT_EYE_TOP: usize = 386;
const RIGHT_EYE_BOTTOM: usize = 374;
const RIGHT_EYE_INNER: usize = 362;
const RIGHT_EYE_OUTER: usize = 263;
const UPPER_LIP: usize = 13;
const LOWER_LIP: usize = 14;
const LEFT_MOUTH: usize = 61;
const RIGHT_MOUTH: usize = 291;
const NOSE_TIP: usize = 1;
const LEFT_CHEEK: usize = 234;
const RIGHT_CHEEK: usize = 454;
const FOREHEAD: usize = 10;
const CHIN: usize = 152;

/// Mesh with eye aspect ratio `ear` and the nose at `nose_x`
///
/// Eye corners sit 0.10 apart, so the lid gap is `ear * 0.10`.
fn mesh(ear: f64, nose_x: f64) -> Observation {
    let mut landmarks = vec![Landmark { x: 0.5, y: 0.5 }; 468];
    let mut set = |idx: usize, x: f64, y: f64| landmarks[idx] = Landmark { x, y };

    set(LEFT_EYE_OUTER, 0.30, 0.40);
    set(LEFT_EYE_INNER, 0.40, 0.40);
    set(LEFT_EYE_TOP, 0.35, 0.40);
    set(LEFT_EYE_BOTTOM, 0.35, 0.40 + ear * 0.10);
    set(RIGHT_EYE_INNER, 0.60, 0.40);
    set(RIGHT_EYE_OUTER, 0.70, 0.40);
    set(RIGHT_EYE_TOP, 0.65, 0.40);
    set(RIGHT_EYE_BOTTOM, 0.65, 0.40 + ear * 0.10);
    set(LEFT_MOUTH, 0.40, 0.70);
    set(RIGHT_MOUTH, 0.60, 0.70);
    set(UPPER_LIP, 0.50, 0.70);
    set(LOWER_LIP, 0.50, 0.71);
    set(NOSE_TIP, nose_x, 0.55);
    set(LEFT_CHEEK, 0.25, 0.55);
    set(RIGHT_CHEEK, 0.75, 0.55);
    set(FOREHEAD, 0.50, 0.20);
    set(CHIN, 0.50, 0.90);

    Observation::Mesh { landmarks }
}

/// Replays a fixed observation per frame; the first pixel selects which
struct ScriptedDetector {
    backend: DetectorBackend,
    script: Vec<Observation>,
}

impl FaceDetector for ScriptedDetector {
    fn backend(&self) -> DetectorBackend {
        self.backend
    }

    fn observe(&self, frame: &Frame) -> Observation {
        self.script[frame.data[0] as usize].clone()
    }
}

fn scripted(script: Vec<Observation>) -> (ScriptedDetector, Vec<Frame>) {
    let frames = (0..script.len())
        .map(|i| Frame::new(2, 2, 1, vec![i as u8; 4]))
        .collect();
    let detector = ScriptedDetector {
        backend: DetectorBackend::LandmarkMesh,
        script,
    };
    (detector, frames)
}

#[test]
fn test_head_turn_with_jitter_is_live() {
    let (detector, frames) = scripted(vec![
        mesh(0.30, 0.45),
        mesh(0.30, 0.50),
        mesh(0.30, 0.55),
        mesh(0.30, 0.60),
    ]);
    let liveness = LivenessDetector::new(DetectorBackend::LandmarkMesh);
    let result = liveness.detect(&frames, ChallengeType::HeadLeft, &detector).unwrap();

    assert!(result.is_live);
    assert!(result.challenge_completed);
    assert_eq!(result.reason, LivenessReason::L001_CHALLENGE_PASSED);
    assert_eq!(result.anti_spoofing.reason, SpoofReason::S001_MOTION_OBSERVED);
    // 0.6 * 1.0 + 0.4 * 0.95
    assert_eq!(result.confidence, 0.98);
    assert_eq!(result.details.nose_x_range, Some(0.3));
}

#[test]
fn test_blink_through_mesh() {
    let (detector, frames) = scripted(vec![mesh(0.30, 0.50), mesh(0.15, 0.50), mesh(0.31, 0.50)]);
    let liveness = LivenessDetector::new(DetectorBackend::LandmarkMesh);
    let result = liveness.detect(&frames, ChallengeType::Blink, &detector).unwrap();

    assert!(result.challenge_completed);
    assert_eq!(result.details.ear_min, Some(0.15));
    assert_eq!(result.details.ear_max, Some(0.31));
}

#[test]
fn test_static_photo_fails_blink() {
    let (detector, frames) = scripted(vec![mesh(0.30, 0.50); 5]);
    let liveness = LivenessDetector::new(DetectorBackend::LandmarkMesh);
    let result = liveness.detect(&frames, ChallengeType::Blink, &detector).unwrap();

    assert!(!result.is_live);
    assert!(!result.challenge_completed);
    assert_eq!(result.confidence, 0.0);
    assert!(!result.anti_spoofing.is_real_face);
    assert_eq!(result.anti_spoofing.spoof_kind, Some(SpoofKind::PhotoOrScreen));
    assert_eq!(result.reason, LivenessReason::L002_CHALLENGE_FAILED);
    assert_eq!(
        result.anti_spoofing.reason.to_string(),
        "S003_FLAT_PHOTO_OR_SCREEN: No motion, likely a photo or screen"
    );
}

#[test]
fn test_no_subject_anywhere() {
    let (detector, frames) = scripted(vec![Observation::NoSubject; 4]);
    let liveness = LivenessDetector::new(DetectorBackend::LandmarkMesh);
    let result = liveness.detect(&frames, ChallengeType::Smile, &detector).unwrap();

    assert!(!result.is_live);
    assert_eq!(result.confidence, 0.0);
    assert_eq!(result.reason, LivenessReason::L003_INSUFFICIENT_COVERAGE);
    assert_eq!(result.frames_analyzed, 4);
    assert_eq!(result.frames_with_subject, 0);

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["anti_spoofing"]["spoof_type_detected"], "no_face");
    assert_eq!(json["anti_spoofing"]["confidence"], 0.0);
}

#[test]
fn test_parallel_and_sequential_agree() {
    let script: Vec<Observation> = (0..12)
        .map(|i| mesh(if i == 6 { 0.12 } else { 0.29 }, 0.48 + (i % 3) as f64 * 0.01))
        .collect();
    let (detector, frames) = scripted(script);

    let parallel = LivenessDetector::new(DetectorBackend::LandmarkMesh).with_parallel(true);
    let sequential = LivenessDetector::new(DetectorBackend::LandmarkMesh).with_parallel(false);

    assert_eq!(
        parallel.detect(&frames, ChallengeType::Blink, &detector).unwrap(),
        sequential.detect(&frames, ChallengeType::Blink, &detector).unwrap()
    );
}

#[test]
fn test_wrong_backend_rejected() {
    let (detector, frames) = scripted(vec![mesh(0.30, 0.50); 3]);
    let liveness = LivenessDetector::new(DetectorBackend::BoundingBox);
    let err = liveness.detect(&frames, ChallengeType::Blink, &detector).unwrap_err();

    assert_eq!(
        err,
        VerifyError::BackendMismatch {
            expected: DetectorBackend::BoundingBox,
            found: DetectorBackend::LandmarkMesh,
        }
    );
}

#[test]
fn test_corrupt_frame_reports_index() {
    let (detector, mut frames) = scripted(vec![mesh(0.30, 0.50); 3]);
    frames[1].data.truncate(3);

    let liveness = LivenessDetector::new(DetectorBackend::LandmarkMesh);
    let err = liveness.detect(&frames, ChallengeType::Blink, &detector).unwrap_err();
    assert!(matches!(err, VerifyError::FrameDecode { index: 1, .. }));
}

#[test]
fn test_empty_frame_list() {
    let (detector, _) = scripted(vec![]);
    let liveness = LivenessDetector::new(DetectorBackend::LandmarkMesh);
    let err = liveness.detect(&[], ChallengeType::Nod, &detector).unwrap_err();
    assert_eq!(err, VerifyError::EmptyFrameList);
}
