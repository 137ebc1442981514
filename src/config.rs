//! Runtime configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VerifyError};
use crate::types::DetectorBackend;

/// Process-wide settings, loaded once at start
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VerifierConfig {
    /// Which detector produces frame observations
    pub backend: DetectorBackend,
    /// HTTP listen address
    pub addr: String,
    /// Fallback tracing filter when RUST_LOG is unset
    pub log_filter: String,
    /// Extract frame signals on the rayon pool
    pub parallel_extraction: bool,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            backend: DetectorBackend::LandmarkMesh,
            addr: "127.0.0.1:8000".to_string(),
            log_filter: "info".to_string(),
            parallel_extraction: true,
        }
    }
}

impl VerifierConfig {
    /// Load from a JSON file; missing keys take defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| VerifyError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&content)
    }

    /// Parse from a JSON string
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| VerifyError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_takes_defaults() {
        let config = VerifierConfig::from_json(r#"{"backend": "bounding_box"}"#).unwrap();
        assert_eq!(config.backend, DetectorBackend::BoundingBox);
        assert_eq!(config.addr, "127.0.0.1:8000");
        assert!(config.parallel_extraction);
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let err = VerifierConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, VerifyError::Config(_)));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = VerifierConfig::load("/nonexistent/verifyx.json").unwrap_err();
        assert!(matches!(err, VerifyError::Config(_)));
    }
}
