//! Posture Diagnosis
//!
//! Runs one image (or one video frame) through the whole chain:
//! coordinate mapping, analysis, rendering and report assembly. Each call
//! builds its own object graph, so a [`Pipeline`] can be shared across
//! worker threads without locking.
//!
//! Persistence sits behind the [`ReportStore`] trait; the core never
//! touches storage itself.

pub mod pipeline;
pub mod settings;
pub mod store;

pub use pipeline::{Diagnosis, DiagnosisRequest, Frame, Pipeline};
pub use settings::PipelineConfig;
pub use store::{export_jsonl, MemoryReportStore, ReportStore};

use pose_model::PoseError;
use posture_analysis::AnalysisError;
use report_pdf::ReportError;
use thiserror::Error;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;
use uuid::Uuid;
use visualizer::RenderError;

/// Pipeline error types
#[derive(Error, Debug)]
pub enum DiagnosisError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid pose input: {0}")]
    Pose(#[from] PoseError),

    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

/// Report store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store lock poisoned: {0}")]
    Lock(String),
    #[error("Report {0} already stored")]
    Duplicate(Uuid),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Initialize tracing/logging
pub fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::warn!("Tracing subscriber already installed");
    }
}
