//! Quality Assessor: brightness, contrast, sharpness and size of a document photo
//!
//! Runs on the decoded image before OCR. Sharpness is the variance of a 3x3
//! Laplacian response offset by 128 and clamped to a byte; border pixels keep
//! their gray level.

use tracing::debug;

use crate::core::stats::{mean, round_to, variance};
use crate::error::{Result, VerifyError};
use crate::types::{Frame, QualityIssue, QualityReport};
use crate::{
    QUALITY_ISSUE_PENALTY, QUALITY_MAX_BRIGHTNESS, QUALITY_MIN_BRIGHTNESS, QUALITY_MIN_CONTRAST, QUALITY_MIN_HEIGHT,
    QUALITY_MIN_SHARPNESS, QUALITY_MIN_WIDTH,
};

const LAPLACIAN_OFFSET: f64 = 128.0;

/// Scores a document image
#[derive(Debug, Default, Clone, Copy)]
pub struct QualityAssessor;

impl QualityAssessor {
    pub fn new() -> Self {
        Self
    }

    pub fn assess(&self, frame: &Frame) -> Result<QualityReport> {
        frame
            .check()
            .map_err(|reason| VerifyError::FrameDecode { index: 0, reason })?;

        let gray = gray_levels(frame);
        let levels: Vec<f64> = gray.iter().map(|&g| g as f64).collect();
        let brightness = mean(&levels).unwrap_or(0.0);
        let contrast = variance(&levels).unwrap_or(0.0).sqrt();

        let response = laplacian(&gray, frame.width as usize, frame.height as usize);
        let blur_score = variance(&response).unwrap_or(0.0);

        let mut issues = Vec::new();
        if brightness < QUALITY_MIN_BRIGHTNESS {
            issues.push(QualityIssue::ImageTooDark);
        } else if brightness > QUALITY_MAX_BRIGHTNESS {
            issues.push(QualityIssue::ImageTooBright);
        }
        if contrast < QUALITY_MIN_CONTRAST {
            issues.push(QualityIssue::LowContrast);
        }
        if blur_score < QUALITY_MIN_SHARPNESS {
            issues.push(QualityIssue::ImageBlurry);
        }
        if frame.width < QUALITY_MIN_WIDTH || frame.height < QUALITY_MIN_HEIGHT {
            issues.push(QualityIssue::ResolutionTooLow);
        }

        let score = (1.0 - issues.len() as f64 * QUALITY_ISSUE_PENALTY).clamp(0.0, 1.0);
        debug!(score, issues = issues.len(), brightness, contrast, blur_score, "document image quality");

        Ok(QualityReport {
            score: round_to(score, 2),
            issues,
            resolution: format!("{}x{}", frame.width, frame.height),
            brightness: round_to(brightness, 1),
            contrast: round_to(contrast, 1),
            blur_score: round_to(blur_score, 1),
        })
    }
}

/// One gray byte per pixel; ITU-R 601-2 luma in 16-bit fixed point, alpha ignored
pub fn gray_levels(frame: &Frame) -> Vec<u8> {
    let channels = frame.channels as usize;
    frame
        .data
        .chunks_exact(channels)
        .map(|px| {
            if channels < 3 {
                return px[0];
            }
            let luma = px[0] as u32 * 19595 + px[1] as u32 * 38470 + px[2] as u32 * 7471 + 0x8000;
            (luma >> 16) as u8
        })
        .collect()
}

/// Offset 3x3 Laplacian (8 centre, -1 around), clamped to [0, 255]
fn laplacian(gray: &[u8], width: usize, height: usize) -> Vec<f64> {
    let mut out: Vec<f64> = gray.iter().map(|&g| g as f64).collect();
    if width < 3 || height < 3 {
        return out;
    }

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let mut neighbours = 0.0;
            for dy in [y - 1, y, y + 1] {
                for dx in [x - 1, x, x + 1] {
                    if dy != y || dx != x {
                        neighbours += gray[dy * width + dx] as f64;
                    }
                }
            }
            let centre = gray[y * width + x] as f64;
            out[y * width + x] = (8.0 * centre - neighbours + LAPLACIAN_OFFSET).clamp(0.0, 255.0);
        }
    }
    out
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(width: u32, height: u32, channels: u8, value: u8) -> Frame {
        let len = (width * height) as usize * channels as usize;
        Frame::new(width, height, channels, vec![value; len])
    }

    fn checkerboard(width: u32, height: u32) -> Frame {
        let data = (0..height)
            .flat_map(|y| (0..width).map(move |x| if (x + y) % 2 == 0 { 255 } else { 0 }))
            .collect();
        Frame::new(width, height, 1, data)
    }

    #[test]
    fn test_gray_levels() {
        let rgb = Frame::new(3, 1, 3, vec![255, 255, 255, 0, 0, 0, 255, 0, 0]);
        assert_eq!(gray_levels(&rgb), vec![255, 0, 76]);

        let rgba = Frame::new(1, 1, 4, vec![0, 255, 0, 10]);
        assert_eq!(gray_levels(&rgba), vec![150]);
    }

    #[test]
    fn test_flat_mid_gray_is_blurry_and_low_contrast() {
        let report = QualityAssessor::new().assess(&uniform(500, 400, 1, 128)).unwrap();
        assert_eq!(report.issues, vec![QualityIssue::LowContrast, QualityIssue::ImageBlurry]);
        assert_eq!(report.score, 0.6);
        assert_eq!(report.brightness, 128.0);
        assert_eq!(report.contrast, 0.0);
        assert_eq!(report.blur_score, 0.0);
        assert_eq!(report.resolution, "500x400");
    }

    #[test]
    fn test_dark_and_bright() {
        let dark = QualityAssessor::new().assess(&uniform(400, 300, 3, 10)).unwrap();
        assert_eq!(dark.issues[0], QualityIssue::ImageTooDark);
        assert_eq!(dark.score, 0.4);

        let bright = QualityAssessor::new().assess(&uniform(400, 300, 3, 250)).unwrap();
        assert_eq!(bright.issues[0], QualityIssue::ImageTooBright);
        // 400x300 is the smallest acceptable size
        assert!(!bright.issues.contains(&QualityIssue::ResolutionTooLow));
    }

    #[test]
    fn test_sharp_small_image() {
        let report = QualityAssessor::new().assess(&checkerboard(20, 20)).unwrap();
        assert_eq!(report.issues, vec![QualityIssue::ResolutionTooLow]);
        assert_eq!(report.score, 0.8);
        assert_eq!(report.brightness, 127.5);
        assert_eq!(report.contrast, 127.5);
        assert!(report.blur_score > QUALITY_MIN_SHARPNESS);
    }

    #[test]
    fn test_tiny_black_image_has_every_issue() {
        // Too small for the Laplacian, so the response is the flat image itself
        let report = QualityAssessor::new().assess(&uniform(2, 2, 1, 0)).unwrap();
        assert_eq!(
            report.issues,
            vec![
                QualityIssue::ImageTooDark,
                QualityIssue::LowContrast,
                QualityIssue::ImageBlurry,
                QualityIssue::ResolutionTooLow,
            ]
        );
        assert_eq!(report.score, 0.2);
    }

    #[test]
    fn test_corrupt_image_rejected() {
        let mut frame = uniform(4, 4, 1, 0);
        frame.data.pop();
        let err = QualityAssessor::new().assess(&frame).unwrap_err();
        assert!(matches!(err, VerifyError::FrameDecode { index: 0, .. }));
    }

    #[test]
    fn test_issue_codes_serialize() {
        let report = QualityAssessor::new().assess(&uniform(500, 400, 1, 128)).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["issues"], serde_json::json!(["low_contrast", "image_blurry"]));
    }
}
