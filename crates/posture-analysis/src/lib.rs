//! Posture Analysis
//!
//! Turns a mapped skeleton into a postural diagnosis:
//! - Posture type (front / side / back) classification with confidence
//! - Per-region alignment scores (0-100)
//! - Severity-ranked problems with localized description and impact text
//! - Muscle-group guidance and improvement suggestions
//! - Report entity and history summaries

pub mod catalog;
pub mod config;
pub mod history;
pub mod metrics;
pub mod posture;
pub mod problems;
pub mod recommendations;
pub mod region;
pub mod report;
pub mod scoring;

pub use catalog::Locale;
pub use config::{
    AnalysisConfig, ClassifierConfig, RegionScoring, ScoringConfig, SeverityThresholds,
};
pub use history::{HistorySummary, Trend};
pub use metrics::BodyMetrics;
pub use posture::{PostureAssessment, PostureClassifier, PostureHint, PostureSource, PostureType};
pub use problems::{Problem, Severity};
pub use recommendations::{Classification, MuscleGroup, Recommendation};
pub use region::Region;
pub use report::{ImageKind, ImageRef, Report, Subject};
pub use scoring::{AlignmentScore, RegionSet, ScoringEngine};

use chrono::Utc;
use pose_model::{PoseError, Skeleton};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Invalid analysis configuration: {0}")]
    Config(String),

    #[error("Invalid pose input: {0}")]
    Pose(#[from] PoseError),
}

/// Everything derived from one skeleton
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub posture: PostureAssessment,
    pub region_set: RegionSet,
    pub scores: Vec<AlignmentScore>,
    pub problems: Vec<Problem>,
    pub recommendations: Vec<Recommendation>,
    pub suggestions: Vec<String>,
    pub metrics: BodyMetrics,
    pub overall_score: Option<f64>,
}

impl Analysis {
    /// Freeze into a report for `subject`
    pub fn into_report(self, subject: Subject) -> Report {
        Report {
            id: Uuid::new_v4(),
            subject,
            created_at: Utc::now(),
            posture: self.posture,
            overall_score: self.overall_score,
            scores: self.scores,
            problems: self.problems,
            recommendations: self.recommendations,
            suggestions: self.suggestions,
            metrics: self.metrics,
            images: Vec::new(),
        }
    }
}

/// Classifier, scoring engine, problem detector and recommendation generator
/// wired together under one configuration. Holds no per-request state.
#[derive(Debug, Clone)]
pub struct Analyzer {
    config: AnalysisConfig,
    classifier: PostureClassifier,
    engine: ScoringEngine,
}

impl Analyzer {
    pub fn new(config: AnalysisConfig) -> Result<Self, AnalysisError> {
        config.validate()?;
        let classifier = PostureClassifier::new(config.classifier, config.visibility_threshold);
        let engine = ScoringEngine::new(config.scoring.clone(), config.visibility_threshold);
        Ok(Self {
            config,
            classifier,
            engine,
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn analyze(&self, skeleton: &Skeleton, hint: PostureHint) -> Analysis {
        let locale = self.config.locale;

        let posture = self.classifier.resolve(skeleton, hint);
        let region_set = RegionSet::select(&posture, self.config.classifier.orientation_confidence);
        debug!(
            "Posture {:?} (confidence {:.2}, {:?}), scoring {:?} regions",
            posture.posture_type, posture.confidence, posture.source, region_set
        );

        let scores = self.engine.score(skeleton, region_set);
        let problems = problems::detect(&scores, &self.config.severity, locale);
        let recommendations = recommendations::recommend(&problems, locale);
        let suggestions = recommendations::suggest(&problems, locale);
        let metrics = BodyMetrics::measure(skeleton, self.config.visibility_threshold);
        let overall_score = report::overall_score(&scores, &problems);

        info!(
            "Analysis complete: {} regions scored, {} problems, overall {:?}",
            scores.len(),
            problems.len(),
            overall_score
        );

        Analysis {
            posture,
            region_set,
            scores,
            problems,
            recommendations,
            suggestions,
            metrics,
            overall_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pose_model::{Keypoint, Landmark};

    fn front_skeleton() -> Skeleton {
        let kp = |id, x, y| Keypoint::new(id, x, y, 0.9);
        Skeleton::new(vec![
            kp(Landmark::Nose, 320.0, 80.0),
            kp(Landmark::LeftEye, 330.0, 70.0),
            kp(Landmark::RightEye, 310.0, 70.0),
            kp(Landmark::LeftShoulder, 380.0, 200.0),
            kp(Landmark::RightShoulder, 260.0, 200.0),
            kp(Landmark::LeftHip, 370.0, 400.0),
            kp(Landmark::RightHip, 270.0, 400.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = AnalysisConfig {
            visibility_threshold: 1.5,
            ..Default::default()
        };
        assert!(matches!(Analyzer::new(config), Err(AnalysisError::Config(_))));
    }

    #[test]
    fn test_healthy_posture() {
        let analyzer = Analyzer::new(AnalysisConfig::default()).unwrap();
        let analysis = analyzer.analyze(&front_skeleton(), PostureHint::Auto);
        assert_eq!(analysis.posture.posture_type, PostureType::Front);
        assert_eq!(analysis.region_set, RegionSet::Frontal);
        assert!(analysis.problems.is_empty());
        assert!(analysis.recommendations.is_empty());
        assert_eq!(analysis.suggestions.len(), 3);
        assert_eq!(analysis.overall_score, Some(100.0));

        let report = analysis.into_report(Subject::new("u-1"));
        assert_eq!(report.subject.id, "u-1");
        assert!(report.images.is_empty());
    }

    #[test]
    fn test_empty_skeleton_yields_partial_result() {
        let analyzer = Analyzer::new(AnalysisConfig::default()).unwrap();
        let analysis = analyzer.analyze(&Skeleton::default(), PostureHint::Auto);
        assert_eq!(analysis.posture.source, PostureSource::Insufficient);
        assert_eq!(analysis.region_set, RegionSet::Generic);
        assert!(analysis.scores.is_empty());
        assert_eq!(analysis.overall_score, None);
    }
}
