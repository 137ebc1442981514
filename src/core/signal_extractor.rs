//! Signal Extractor: detector observation → normalized FrameSignal
//!
//! Mesh observations use the 468-point face mesh indices; box observations
//! pick the widest face and count eye regions in its upper half.

use tracing::warn;

use crate::error::{Result, VerifyError};
use crate::types::{DetectorBackend, FaceDetector, Frame, FrameSignal, Landmark, Observation, PixelBox};

// Face mesh landmark indices
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

/// Smallest mesh that contains every index above
pub const MIN_MESH_LANDMARKS: usize = RIGHT_CHEEK + 1;

/// Eye regions needed to call the eyes open
const MIN_OPEN_EYE_REGIONS: usize = 2;

/// Guards against zero-length denominators
const EPSILON: f64 = 1e-6;

/// Maps one detector observation to a FrameSignal
#[derive(Debug, Clone, Copy)]
pub struct SignalExtractor {
    backend: DetectorBackend,
}

impl SignalExtractor {
    /// Create an extractor that accepts observations from `backend` only
    pub fn new(backend: DetectorBackend) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> DetectorBackend {
        self.backend
    }

    /// Run the detector on a frame and extract its signal
    pub fn extract(&self, frame: &Frame, detector: &dyn FaceDetector) -> Result<FrameSignal> {
        frame
            .check()
            .map_err(|reason| VerifyError::FrameDecode { index: 0, reason })?;
        if detector.backend() != self.backend {
            return Err(VerifyError::BackendMismatch {
                expected: self.backend,
                found: detector.backend(),
            });
        }
        let observation = detector.observe(frame);
        self.extract_observed(frame.width, frame.height, &observation)
    }

    /// Extract from an observation already produced for a `width`×`height` frame
    pub fn extract_observed(&self, width: u32, height: u32, observation: &Observation) -> Result<FrameSignal> {
        if width == 0 || height == 0 {
            return Err(VerifyError::FrameDecode {
                index: 0,
                reason: format!("empty dimensions {}x{}", width, height),
            });
        }
        if let Some(found) = observation.backend() {
            if found != self.backend {
                return Err(VerifyError::BackendMismatch {
                    expected: self.backend,
                    found,
                });
            }
        }

        let (w, h) = (width as f64, height as f64);
        let signal = match observation {
            Observation::NoSubject => FrameSignal::absent(),
            Observation::Mesh { landmarks } => mesh_signal(landmarks, w, h),
            Observation::Boxes { faces, eyes } => box_signal(faces, eyes, w, h),
        };
        Ok(signal)
    }
}

fn mesh_signal(landmarks: &[Landmark], w: f64, h: f64) -> FrameSignal {
    if landmarks.len() < MIN_MESH_LANDMARKS {
        warn!(
            landmarks = landmarks.len(),
            required = MIN_MESH_LANDMARKS,
            "mesh observation too small, treating frame as no subject"
        );
        return FrameSignal::absent();
    }

    let px = |idx: usize| (landmarks[idx].x * w, landmarks[idx].y * h);

    let left_ear = dist(px(LEFT_EYE_TOP), px(LEFT_EYE_BOTTOM))
        / dist(px(LEFT_EYE_INNER), px(LEFT_EYE_OUTER)).max(EPSILON);
    let right_ear = dist(px(RIGHT_EYE_TOP), px(RIGHT_EYE_BOTTOM))
        / dist(px(RIGHT_EYE_INNER), px(RIGHT_EYE_OUTER)).max(EPSILON);
    let mar = dist(px(UPPER_LIP), px(LOWER_LIP)) / dist(px(LEFT_MOUTH), px(RIGHT_MOUTH)).max(EPSILON);

    let nose = landmarks[NOSE_TIP];
    let face_width = (landmarks[RIGHT_CHEEK].x - landmarks[LEFT_CHEEK].x).abs();
    let face_height = (landmarks[CHIN].y - landmarks[FOREHEAD].y).abs();

    FrameSignal {
        subject_present: true,
        eye_aspect_ratio: Some((left_ear + right_ear) / 2.0),
        mouth_aspect_ratio: Some(mar),
        eyes_open: None,
        center_x: Some(nose.x),
        center_y: Some(nose.y),
        width_norm: Some(face_width),
        height_norm: Some(face_height),
    }
}

fn box_signal(faces: &[PixelBox], eyes: &[PixelBox], w: f64, h: f64) -> FrameSignal {
    let face = match largest_face(faces) {
        Some(face) => face,
        None => return FrameSignal::absent(),
    };

    let eye_count = eyes.iter().filter(|eye| in_upper_half(face, eye)).count();
    let (cx, cy) = face.center();

    FrameSignal {
        subject_present: true,
        eye_aspect_ratio: None,
        mouth_aspect_ratio: None,
        eyes_open: Some(eye_count >= MIN_OPEN_EYE_REGIONS),
        center_x: Some(cx / w),
        center_y: Some(cy / h),
        width_norm: Some(face.width / w),
        height_norm: Some(face.height / h),
    }
}

/// Widest box, ties broken by larger area; first wins a full tie
fn largest_face(faces: &[PixelBox]) -> Option<&PixelBox> {
    faces
        .iter()
        .filter(|f| f.width > 0.0 && f.height > 0.0)
        .fold(None, |best: Option<&PixelBox>, f| match best {
            Some(b) if (b.width, b.area()) >= (f.width, f.area()) => Some(b),
            _ => Some(f),
        })
}

fn in_upper_half(face: &PixelBox, eye: &PixelBox) -> bool {
    let (ex, ey) = eye.center();
    ex >= face.x && ex <= face.x + face.width && ey >= face.y && ey <= face.y + face.height / 2.0
}

fn dist(a: (f64, f64), b: (f64, f64)) -> f64 {
    (a.0 - b.0).hypot(a.1 - b.1)
}

// =============================================================================
// TESTS
// =============================================================================
