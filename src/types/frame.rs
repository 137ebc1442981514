//! Frames and raw detector observations

use serde::{Deserialize, Serialize};

/// Detector family that produces frame observations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum DetectorBackend {
    /// 468-point face mesh
    LandmarkMesh,
    /// Face box plus eye sub-regions
    BoundingBox,
}

impl std::fmt::Display for DetectorBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DetectorBackend::LandmarkMesh => "landmark_mesh",
            DetectorBackend::BoundingBox => "bounding_box",
        };
        write!(f, "{}", name)
    }
}

/// Already-decoded pixel data, row-major, interleaved channels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    pub data: Vec<u8>,
}

impl Frame {
    /// Create a frame; call `check` before trusting it
    pub fn new(width: u32, height: u32, channels: u8, data: Vec<u8>) -> Self {
        Self { width, height, channels, data }
    }

    /// Structural validity: non-empty, 1/3/4 channels, buffer matches dimensions
    pub fn check(&self) -> Result<(), String> {
        if self.width == 0 || self.height == 0 {
            return Err(format!("empty dimensions {}x{}", self.width, self.height));
        }
        if !matches!(self.channels, 1 | 3 | 4) {
            return Err(format!("unsupported channel count {}", self.channels));
        }
        let expected = self.width as usize * self.height as usize * self.channels as usize;
        if self.data.len() != expected {
            return Err(format!(
                "buffer holds {} bytes, {}x{}x{} needs {}",
                self.data.len(),
                self.width,
                self.height,
                self.channels,
                expected
            ));
        }
        Ok(())
    }
}

/// Landmark position normalized to the frame, x and y in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
}

/// Axis-aligned box in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelBox {
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// What a detector saw in one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Observation {
    /// Nothing detected
    NoSubject,
    /// Face-mesh landmarks for the first face
    Mesh { landmarks: Vec<Landmark> },
    /// Every face box plus every eye region found in the frame
    Boxes {
        faces: Vec<PixelBox>,
        #[serde(default)]
        eyes: Vec<PixelBox>,
    },
}

impl Observation {
    /// Backend that produced this observation, if it says
    pub fn backend(&self) -> Option<DetectorBackend> {
        match self {
            Observation::NoSubject => None,
            Observation::Mesh { .. } => Some(DetectorBackend::LandmarkMesh),
            Observation::Boxes { .. } => Some(DetectorBackend::BoundingBox),
        }
    }
}

/// Observation already computed by an external detector, with frame size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservedFrame {
    pub width: u32,
    pub height: u32,
    pub observation: Observation,
}

/// Face detector collaborator.
///
/// Built once at process start and passed by reference into extraction.
pub trait FaceDetector: Send + Sync {
    /// Which observation shape `observe` returns
    fn backend(&self) -> DetectorBackend;

    /// Run detection on one decoded frame
    fn observe(&self, frame: &Frame) -> Observation;
}
