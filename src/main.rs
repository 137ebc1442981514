//! VerifyX CLI
//!
//! Usage:
//!   verifyx --liveness frames.json --challenge blink   # Judge a liveness challenge
//!   verifyx --ocr text.txt [--mrz-text mrz.txt]        # Extract document fields
//!           [--confidences conf.json] [--image frame.json]
//!   verifyx --validate fields.json                     # Validate extracted fields
//!   verifyx --verify request.json                      # Combined verification
//!   verifyx --serve [--addr 127.0.0.1:8000]            # HTTP API server
//!   verifyx ... --json                                 # JSON output

use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use verifyx::config::VerifierConfig;
use verifyx::core::{run_server, DocumentExtractor, DocumentValidator, LivenessDetector, VerificationPipeline};
use verifyx::types::{
    ChallengeType, DetectorBackend, DocumentFields, DocumentKind, DocumentSubmission, ExtractionResult, Frame,
    LivenessResult, ObservedFrame, OcrOutput, OverallResult, ValidationResult, VerificationReport,
    VerificationRequest,
};
use verifyx::VERSION;

#[derive(Parser, Debug)]
#[command(
    name = "verifyx",
    version = VERSION,
    about = "VerifyX - Liveness challenges and identity document checks",
    long_about = "VerifyX judges liveness challenges from face-detector observations\n\
                  and extracts and validates identity document fields from OCR text.\n\n\
                  Modes:\n  \
                  --liveness  Judge a challenge from observed frames (JSON array)\n  \
                  --ocr       Extract fields from OCR text (MRZ first, then fallback)\n  \
                  --validate  Validate extracted fields (JSON object)\n  \
                  --verify    Combined verification request (JSON object)\n  \
                  --serve     HTTP API server mode"
)]
struct Args {
    /// Observed frames to judge (JSON array of observations)
    #[arg(long, value_name = "FILE")]
    liveness: Option<PathBuf>,

    /// Challenge the subject was given
    #[arg(long, default_value = "blink")]
    challenge: String,

    /// OCR text of a document
    #[arg(long, value_name = "FILE")]
    ocr: Option<PathBuf>,

    /// Output of an MRZ-restricted OCR pass
    #[arg(long, value_name = "FILE", requires = "ocr")]
    mrz_text: Option<PathBuf>,

    /// Per-word OCR confidences for --ocr (JSON array, 0-100, -1 for none)
    #[arg(long, value_name = "FILE", requires = "ocr")]
    confidences: Option<PathBuf>,

    /// Decoded document photo for --ocr quality checks (JSON frame)
    #[arg(long, value_name = "FILE", requires = "ocr")]
    image: Option<PathBuf>,

    /// Document kind for --ocr
    #[arg(long, value_enum, default_value_t = DocumentKind::Auto)]
    document_type: DocumentKind,

    /// Extracted fields to validate (JSON object)
    #[arg(long, value_name = "FILE")]
    validate: Option<PathBuf>,

    /// Combined verification request (JSON object)
    #[arg(long, value_name = "FILE")]
    verify: Option<PathBuf>,

    /// Run as HTTP API server
    #[arg(short, long)]
    serve: bool,

    /// Server address (overrides config)
    #[arg(long)]
    addr: Option<String>,

    /// Config file (JSON)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Detector backend (overrides config)
    #[arg(long, value_enum)]
    backend: Option<DetectorBackend>,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("verifyx: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if args.no_color {
        colored::control::set_override(false);
    }

    let outcome = if args.serve {
        run_server(&config).await
    } else {
        run_command(&args, &config)
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("verifyx: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Config file first, then CLI overrides
fn load_config(args: &Args) -> Result<VerifierConfig, Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => VerifierConfig::load(path)?,
        None => VerifierConfig::default(),
    };
    if let Some(backend) = args.backend {
        config.backend = backend;
    }
    if let Some(addr) = &args.addr {
        config.addr = addr.clone();
    }
    Ok(config)
}

fn run_command(args: &Args, config: &VerifierConfig) -> Result<(), Box<dyn Error>> {
    if let Some(path) = &args.liveness {
        let frames: Vec<ObservedFrame> = serde_json::from_str(&std::fs::read_to_string(path)?)?;
        let challenge: ChallengeType = args.challenge.parse()?;
        let result = LivenessDetector::from_config(config).detect_observed(&frames, challenge)?;
        return emit(&result, args.json, print_liveness);
    }

    if let Some(path) = &args.ocr {
        let submission = ocr_submission(path, args)?;
        let result = DocumentExtractor::new().extract_submission(&submission)?;
        return emit(&result, args.json, print_extraction);
    }

    if let Some(path) = &args.validate {
        let fields: DocumentFields = serde_json::from_str(&std::fs::read_to_string(path)?)?;
        let result = DocumentValidator::new().validate(&fields);
        return emit(&result, args.json, print_validation);
    }

    if let Some(path) = &args.verify {
        let request: VerificationRequest = serde_json::from_str(&std::fs::read_to_string(path)?)?;
        let report = VerificationPipeline::from_config(config).complete(&request)?;
        return emit(&report, args.json, print_report);
    }

    Err("no mode given; try --help".into())
}

/// OCR text plus the optional MRZ pass, confidences and image named on the command line
fn ocr_submission(path: &Path, args: &Args) -> Result<DocumentSubmission, Box<dyn Error>> {
    let mrz_text = match &args.mrz_text {
        Some(mrz_path) => Some(std::fs::read_to_string(mrz_path)?),
        None => None,
    };
    let word_confidences: Vec<i32> = match &args.confidences {
        Some(conf_path) => serde_json::from_str(&std::fs::read_to_string(conf_path)?)?,
        None => Vec::new(),
    };
    let image: Option<Frame> = match &args.image {
        Some(image_path) => Some(serde_json::from_str(&std::fs::read_to_string(image_path)?)?),
        None => None,
    };
    Ok(DocumentSubmission {
        ocr: OcrOutput {
            raw_text: std::fs::read_to_string(path)?,
            mrz_text,
            word_confidences,
        },
        document_type: args.document_type,
        image,
    })
}

fn emit<T: serde::Serialize>(value: &T, json: bool, print: fn(&T)) -> Result<(), Box<dyn Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print(value);
    }
    Ok(())
}

fn verdict(passed: bool) -> colored::ColoredString {
    if passed {
        "PASS".green().bold()
    } else {
        "FAIL".red().bold()
    }
}

fn print_header(title: &str) {
    println!("{}", format!("VerifyX v{} - {}", VERSION, title).bold());
    println!("{}", "=".repeat(40).dimmed());
}

fn print_liveness(result: &LivenessResult) {
    print_header("Liveness");
    println!("  Result:      {}", verdict(result.is_live));
    println!("  Challenge:   {} ({})", result.challenge_type, verdict(result.challenge_completed));
    println!("  Confidence:  {:.4}", result.confidence);
    println!("  Reason:      {} - {}", result.reason.code(), result.reason.description());
    println!(
        "  Anti-spoof:  {} {:.4} ({})",
        verdict(result.anti_spoofing.is_real_face),
        result.anti_spoofing.confidence,
        result.anti_spoofing.reason.code()
    );
    println!("  Frames:      {}/{} with subject", result.frames_with_subject, result.frames_analyzed);
}

fn print_extraction(result: &ExtractionResult) {
    print_header("Document OCR");
    let source = if result.mrz_found { "MRZ" } else { "fallback" };
    println!("  Type:        {:?} ({})", result.document_type, source);
    println!("  OCR conf:    {:.4}", result.ocr_confidence);
    for (field, confidence) in &result.confidence_scores {
        println!("  {:<20} {:.2}", field, confidence);
    }
    for check in &result.checks_passed {
        println!("  {} {}", verdict(true), check);
    }
    for check in &result.checks_failed {
        println!("  {} {}", verdict(false), check);
    }
    if let Some(quality) = &result.quality {
        println!("  Quality:     {:.2} ({})", quality.score, quality.resolution);
        for issue in &quality.issues {
            println!("  {} {}", "WARN".yellow().bold(), issue);
        }
    }
}

fn print_validation(result: &ValidationResult) {
    print_header("Document Validation");
    println!("  Result:      {}", verdict(result.is_valid));
    println!("  Score:       {:.2}", result.authenticity_score);
    for check in &result.checks_passed {
        println!("  {} {}", verdict(true), check);
    }
    for check in &result.checks_failed {
        println!("  {} {}", verdict(false), check);
    }
    for warning in &result.warnings {
        println!("  {} {:?}", "WARN".yellow().bold(), warning);
    }
}

fn print_report(report: &VerificationReport) {
    print_header("Verification");
    println!("  Id:          {}", report.verification_id);
    println!("  Overall:     {}", verdict(report.overall_result == OverallResult::Passed));
    let stages = [
        ("face", &report.results.face_verification),
        ("liveness", &report.results.liveness_detection),
        ("document_ocr", &report.results.document_ocr),
        ("validation", &report.results.document_validation),
    ];
    for (name, stage) in stages {
        if let Some(stage) = stage {
            let score = stage.score.map(|s| format!("{:.4}", s)).unwrap_or_default();
            println!("  {:<12} {} {}", name, verdict(stage.passed), score);
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
