//! HTTP API for VerifyX
//!
//! Endpoints:
//! - GET  /health                      - Health check
//! - GET  /api/v1/liveness/challenge   - Random challenge for the subject
//! - POST /api/v1/liveness/detect      - Judge a challenge from observed frames
//! - POST /api/v1/ocr/extract          - Fields from OCR output
//! - POST /api/v1/ocr/validate         - Plausibility checks on extracted fields
//! - POST /api/v1/verify/complete      - Combined verification report

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::VerifierConfig;
use crate::core::{DocumentExtractor, DocumentValidator, LivenessDetector, VerificationPipeline};
use crate::error::VerifyError;
use crate::types::{
    ChallengeType, DetectorBackend, DocumentFields, DocumentSubmission, ExtractionResult, LivenessResult,
    LivenessSubmission, ValidationResult, VerificationReport, VerificationRequest,
};

/// Seconds the subject has to perform a challenge
const CHALLENGE_TIMEOUT_SECONDS: u32 = 10;

/// Shared engines, built once at start
pub struct AppState {
    pub liveness: LivenessDetector,
    pub extractor: DocumentExtractor,
    pub validator: DocumentValidator,
    pub pipeline: VerificationPipeline,
}

impl AppState {
    pub fn from_config(config: &VerifierConfig) -> Self {
        Self {
            liveness: LivenessDetector::from_config(config),
            extractor: DocumentExtractor::new(),
            validator: DocumentValidator::new(),
            pipeline: VerificationPipeline::from_config(config),
        }
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub backend: DetectorBackend,
    pub timestamp: DateTime<Utc>,
}

/// One challenge from the catalogue
#[derive(Debug, Serialize)]
pub struct ChallengeSpec {
    #[serde(rename = "type")]
    pub challenge_type: ChallengeType,
    pub instruction: String,
}

/// Challenge response
#[derive(Debug, Serialize)]
pub struct ChallengeResponse {
    pub success: bool,
    pub challenge: ChallengeSpec,
    pub timeout_seconds: u32,
    pub timestamp: DateTime<Utc>,
}

/// Liveness response
#[derive(Debug, Serialize)]
pub struct LivenessResponse {
    pub success: bool,
    pub liveness: LivenessResult,
    pub timestamp: DateTime<Utc>,
}

/// Extraction response
#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub success: bool,
    #[serde(flatten)]
    pub extraction: ExtractionResult,
    pub timestamp: DateTime<Utc>,
}

/// Validate request
#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub extracted_data: DocumentFields,
}

/// Validate response
#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub success: bool,
    pub validation: ValidationResult,
    pub timestamp: DateTime<Utc>,
}

/// Combined verification response
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub success: bool,
    #[serde(flatten)]
    pub report: VerificationReport,
}

/// Error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

/// Malformed input, reported as 400
#[derive(Debug)]
pub struct ApiError(VerifyError);

impl From<VerifyError> for ApiError {
    fn from(err: VerifyError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        warn!(error = %self.0, "rejected request");
        let body = ErrorResponse {
            success: false,
            error: self.0.to_string(),
        };
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

/// Create the API router
pub fn create_router(config: &VerifierConfig) -> Router {
    let state = Arc::new(AppState::from_config(config));

    Router::new()
        .route("/health", get(health))
        .route("/api/v1/liveness/challenge", get(liveness_challenge))
        .route("/api/v1/liveness/detect", post(liveness_detect))
        .route("/api/v1/ocr/extract", post(ocr_extract))
        .route("/api/v1/ocr/validate", post(ocr_validate))
        .route("/api/v1/verify/complete", post(verify_complete))
        .with_state(state)
}

/// Health check endpoint
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: crate::VERSION.to_string(),
        backend: state.liveness.backend(),
        timestamp: Utc::now(),
    })
}

/// Random challenge, seeded from the clock
async fn liveness_challenge() -> Json<ChallengeResponse> {
    let now = Utc::now();
    let challenge = ChallengeType::pick(now.timestamp_subsec_nanos() as u64);
    Json(ChallengeResponse {
        success: true,
        challenge: ChallengeSpec {
            challenge_type: challenge,
            instruction: challenge.instruction().to_string(),
        },
        timeout_seconds: CHALLENGE_TIMEOUT_SECONDS,
        timestamp: now,
    })
}

async fn liveness_detect(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LivenessSubmission>,
) -> Result<Json<LivenessResponse>, ApiError> {
    let challenge: ChallengeType = req.challenge_type.parse()?;
    let liveness = state.liveness.detect_observed(&req.frames, challenge)?;
    info!(challenge = %challenge, is_live = liveness.is_live, "liveness request");

    Ok(Json(LivenessResponse {
        success: true,
        liveness,
        timestamp: Utc::now(),
    }))
}

async fn ocr_extract(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DocumentSubmission>,
) -> Result<Json<ExtractResponse>, ApiError> {
    let extraction = state.extractor.extract_submission(&req)?;
    Ok(Json(ExtractResponse {
        success: true,
        extraction,
        timestamp: Utc::now(),
    }))
}

async fn ocr_validate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ValidateRequest>,
) -> Json<ValidateResponse> {
    Json(ValidateResponse {
        success: true,
        validation: state.validator.validate(&req.extracted_data),
        timestamp: Utc::now(),
    })
}

async fn verify_complete(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VerificationRequest>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let report = state.pipeline.complete(&req)?;
    Ok(Json(VerifyResponse { success: true, report }))
}

/// Run the API server
pub async fn run_server(config: &VerifierConfig) -> Result<(), Box<dyn std::error::Error>> {
    let router = create_router(config);
    let listener = tokio::net::TcpListener::bind(&config.addr).await?;
    info!(addr = %config.addr, backend = %config.backend, "VerifyX API listening");
    axum::serve(listener, router).await?;
    Ok(())
}
