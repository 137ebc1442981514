//! Per-frame geometric signals

use serde::{Deserialize, Serialize};

/// Geometry of one frame, normalized to frame size.
///
/// Which fields are populated depends on detector capability: mesh detectors
/// fill the aspect ratios, box detectors fill `eyes_open` instead and never a
/// mouth signal. With no subject every optional field is `None`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FrameSignal {
    pub subject_present: bool,
    /// Mean over both eyes; lower = more closed
    pub eye_aspect_ratio: Option<f64>,
    /// Higher = wider / more open mouth
    pub mouth_aspect_ratio: Option<f64>,
    /// Box detectors: two or more eye regions found
    pub eyes_open: Option<bool>,
    pub center_x: Option<f64>,
    pub center_y: Option<f64>,
    pub width_norm: Option<f64>,
    pub height_norm: Option<f64>,
}

impl FrameSignal {
    /// Signal for a frame without a subject
    pub fn absent() -> Self {
        Self::default()
    }

    /// Carries continuous landmark ratios rather than box approximations
    pub fn is_landmark(&self) -> bool {
        self.eye_aspect_ratio.is_some() || self.mouth_aspect_ratio.is_some()
    }
}
