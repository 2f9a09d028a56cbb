//! Diagnosis report entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::metrics::BodyMetrics;
use crate::posture::PostureAssessment;
use crate::problems::Problem;
use crate::recommendations::Recommendation;
use crate::scoring::AlignmentScore;

/// Identity of the person diagnosed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Subject {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageKind {
    /// Skeleton and keypoints only
    Visualization,
    /// Skeleton plus alignment lines, score panel and badge
    AnnotatedReport,
}

/// Reference to a rendered image belonging to a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub kind: ImageKind,
    pub width: u32,
    pub height: u32,
    /// Where the caller stored the image, if anywhere
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

/// Mean region score less per-problem penalties, `None` with no scores
pub fn overall_score(scores: &[AlignmentScore], problems: &[Problem]) -> Option<f64> {
    if scores.is_empty() {
        return None;
    }
    let mean = scores.iter().map(|s| s.score).sum::<f64>() / scores.len() as f64;
    let penalty: f64 = problems.iter().map(|p| p.severity.penalty()).sum();
    let overall = (mean - penalty).clamp(0.0, 100.0);
    Some((overall * 10.0).round() / 10.0)
}

/// Complete result of one diagnosis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: Uuid,
    pub subject: Subject,
    pub created_at: DateTime<Utc>,
    pub posture: PostureAssessment,
    pub overall_score: Option<f64>,
    pub scores: Vec<AlignmentScore>,
    pub problems: Vec<Problem>,
    pub recommendations: Vec<Recommendation>,
    pub suggestions: Vec<String>,
    pub metrics: BodyMetrics,
    #[serde(default)]
    pub images: Vec<ImageRef>,
}

impl Report {
    /// Attach a rendered image reference
    pub fn with_image(mut self, image: ImageRef) -> Self {
        self.images.push(image);
        self
    }

    /// Record where the caller stored the image of `kind`
    pub fn with_image_uri(mut self, kind: ImageKind, uri: impl Into<String>) -> Self {
        let uri = uri.into();
        for image in self.images.iter_mut().filter(|i| i.kind == kind) {
            image.uri = Some(uri.clone());
        }
        self
    }

    pub fn image(&self, kind: ImageKind) -> Option<&ImageRef> {
        self.images.iter().find(|i| i.kind == kind)
    }

    pub fn score_for(&self, region: crate::region::Region) -> Option<f64> {
        self.scores.iter().find(|s| s.region == region).map(|s| s.score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problems::Severity;
    use crate::region::Region;

    fn score(region: Region, score: f64) -> AlignmentScore {
        AlignmentScore {
            region,
            score,
            deviation: 0.0,
            side: None,
        }
    }

    fn problem(region: Region, severity: Severity) -> Problem {
        Problem {
            region,
            severity,
            score: 0.0,
            side: None,
            description: String::new(),
            impact: String::new(),
        }
    }

    #[test]
    fn test_overall_score() {
        assert_eq!(overall_score(&[], &[]), None);
        let scores = [score(Region::ShoulderLevel, 100.0), score(Region::HipLevel, 80.0)];
        assert_eq!(overall_score(&scores, &[]), Some(90.0));
        assert_eq!(
            overall_score(&scores, &[problem(Region::HipLevel, Severity::Low)]),
            Some(85.0)
        );
    }

    #[test]
    fn test_overall_score_clamped() {
        let scores = [score(Region::HipLevel, 10.0)];
        let problems = [
            problem(Region::HipLevel, Severity::High),
            problem(Region::KneeAlignment, Severity::High),
        ];
        assert_eq!(overall_score(&scores, &problems), Some(0.0));
    }

    #[test]
    fn test_subject_builder() {
        let subject = Subject::new("u-1").with_name("Aki");
        assert_eq!(subject.id, "u-1");
        assert_eq!(subject.name.as_deref(), Some("Aki"));
    }
}
