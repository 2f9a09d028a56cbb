//! Posture type (viewing orientation) classification
//!
//! The policy is an ordered rule table. Each rule is a conjunction of
//! threshold conditions over [`OrientationFeatures`]. A condition's margin is
//! its normalized distance past the threshold (negative when violated), and a
//! rule's margin is its worst condition margin.
//!
//! - Exactly one rule fires: that type, confidence growing with its margin.
//! - No rule or several rules fire: the rule with the largest margin (the one
//!   closest to, or furthest past, its thresholds) wins, with confidence
//!   scaled by its lead over the runner-up. Near-ties give low confidence.
//!
//! Confidence never drops below the configured floor.

use pose_model::{Landmark, Skeleton};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::catalog::Locale;
use crate::config::ClassifierConfig;
use crate::metrics::Torso;

/// Viewing orientation of the subject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostureType {
    Front,
    Side,
    Back,
}

impl PostureType {
    pub fn label(self, locale: Locale) -> &'static str {
        match (self, locale) {
            (PostureType::Front, Locale::English) => "Standing (front)",
            (PostureType::Side, Locale::English) => "Standing (side)",
            (PostureType::Back, Locale::English) => "Standing (back)",
            (PostureType::Front, Locale::Japanese) => "立位（正面）",
            (PostureType::Side, Locale::Japanese) => "立位（横向き）",
            (PostureType::Back, Locale::Japanese) => "立位（背面）",
        }
    }
}

/// Caller-supplied orientation hint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostureHint {
    /// Classify from keypoint geometry
    #[default]
    Auto,
    #[serde(alias = "standing_front")]
    Front,
    #[serde(alias = "standing_side")]
    Side,
    #[serde(alias = "standing_back")]
    Back,
}

impl PostureHint {
    pub fn explicit(self) -> Option<PostureType> {
        match self {
            PostureHint::Auto => None,
            PostureHint::Front => Some(PostureType::Front),
            PostureHint::Side => Some(PostureType::Side),
            PostureHint::Back => Some(PostureType::Back),
        }
    }
}

impl std::str::FromStr for PostureHint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "auto" => Ok(PostureHint::Auto),
            "front" | "standing_front" => Ok(PostureHint::Front),
            "side" | "standing_side" => Ok(PostureHint::Side),
            "back" | "standing_back" => Ok(PostureHint::Back),
            other => Err(format!("unknown posture type {other:?}")),
        }
    }
}

/// How a posture type was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostureSource {
    /// Supplied by the caller, classification bypassed
    Explicit,
    /// Exactly one rule fired
    Classified,
    /// Closest-boundary tie-break
    Ambiguous,
    /// Torso landmarks missing, default type at floor confidence
    Insufficient,
}

/// Classified posture type with confidence in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PostureAssessment {
    pub posture_type: PostureType,
    pub confidence: f64,
    pub source: PostureSource,
}

impl PostureAssessment {
    pub fn explicit(posture_type: PostureType) -> Self {
        Self {
            posture_type,
            confidence: 1.0,
            source: PostureSource::Explicit,
        }
    }
}

/// Geometry the rules are evaluated on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientationFeatures {
    /// Shoulder horizontal span / torso height
    pub shoulder_span_ratio: f64,
    /// Hip horizontal span / torso height
    pub hip_span_ratio: f64,
    /// Torso bounding box width / height
    pub aspect_ratio: f64,
    /// Number of facial landmarks above the face threshold
    pub face_landmarks: usize,
    /// Worst shoulder/hip line inclination (degrees)
    pub line_tilt: f64,
}

impl OrientationFeatures {
    pub fn extract(skeleton: &Skeleton, visibility: f32, face_threshold: f32) -> Option<Self> {
        let torso = Torso::from_skeleton(skeleton, visibility)?;
        let height = torso.height();
        let face_landmarks = Landmark::FACE
            .iter()
            .filter(|&&lm| skeleton.get(lm).confidence > face_threshold)
            .count();

        Some(Self {
            shoulder_span_ratio: torso.shoulder_span() / height,
            hip_span_ratio: torso.hip_span() / height,
            aspect_ratio: torso.aspect_ratio(),
            face_landmarks,
            line_tilt: torso.max_line_tilt(),
        })
    }

    fn value(&self, measure: Measure) -> f64 {
        match measure {
            Measure::ShoulderSpan => self.shoulder_span_ratio,
            Measure::HipSpan => self.hip_span_ratio,
            Measure::AspectRatio => self.aspect_ratio,
            Measure::FaceLandmarks => self.face_landmarks as f64,
            Measure::LineTilt => self.line_tilt,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Measure {
    ShoulderSpan,
    HipSpan,
    AspectRatio,
    FaceLandmarks,
    LineTilt,
}

#[derive(Debug, Clone, Copy)]
enum Bound {
    Above(f64),
    Below(f64),
}

/// One threshold test. `scale` is the distance that counts as one unit of margin.
#[derive(Debug, Clone, Copy)]
struct Condition {
    measure: Measure,
    bound: Bound,
    scale: f64,
}

impl Condition {
    const fn above(measure: Measure, threshold: f64, scale: f64) -> Self {
        Self { measure, bound: Bound::Above(threshold), scale }
    }

    const fn below(measure: Measure, threshold: f64, scale: f64) -> Self {
        Self { measure, bound: Bound::Below(threshold), scale }
    }

    fn margin(&self, features: &OrientationFeatures) -> f64 {
        let value = features.value(self.measure);
        match self.bound {
            Bound::Above(t) => (value - t) / self.scale,
            Bound::Below(t) => (t - value) / self.scale,
        }
    }
}

/// A declarative classification rule
#[derive(Debug, Clone, Copy)]
pub struct PostureRule {
    posture_type: PostureType,
    conditions: &'static [Condition],
}

impl PostureRule {
    pub fn posture_type(&self) -> PostureType {
        self.posture_type
    }

    /// Worst condition margin; positive means the rule fires
    pub fn margin(&self, features: &OrientationFeatures) -> f64 {
        self.conditions
            .iter()
            .map(|c| c.margin(features))
            .fold(f64::INFINITY, f64::min)
    }

    pub fn fires(&self, features: &OrientationFeatures) -> bool {
        self.margin(features) > 0.0
    }
}

/// Rules in priority order
pub const RULES: [PostureRule; 3] = [
    // Wide shoulders and hips, face visible, broad torso box
    PostureRule {
        posture_type: PostureType::Front,
        conditions: &[
            Condition::above(Measure::ShoulderSpan, 0.3, 0.1),
            Condition::above(Measure::HipSpan, 0.3, 0.1),
            Condition::above(Measure::FaceLandmarks, 1.5, 1.0),
            Condition::above(Measure::AspectRatio, 0.4, 0.1),
        ],
    },
    // Narrow spans, tall torso box, at most a partial face
    PostureRule {
        posture_type: PostureType::Side,
        conditions: &[
            Condition::below(Measure::ShoulderSpan, 0.2, 0.1),
            Condition::below(Measure::HipSpan, 0.2, 0.1),
            Condition::below(Measure::AspectRatio, 0.3, 0.1),
            Condition::below(Measure::FaceLandmarks, 1.5, 1.0),
        ],
    },
    // No face, shoulder and hip lines still wide and roughly horizontal.
    // A face-free view saturates the face term, so confidence follows the
    // span and tilt margins.
    PostureRule {
        posture_type: PostureType::Back,
        conditions: &[
            Condition::below(Measure::FaceLandmarks, 0.5, 0.5),
            Condition::above(Measure::ShoulderSpan, 0.25, 0.1),
            Condition::above(Measure::HipSpan, 0.25, 0.1),
            Condition::below(Measure::LineTilt, 15.0, 5.0),
        ],
    },
];

/// Rule-based orientation classifier
#[derive(Debug, Clone)]
pub struct PostureClassifier {
    config: ClassifierConfig,
    visibility_threshold: f32,
}

impl PostureClassifier {
    pub fn new(config: ClassifierConfig, visibility_threshold: f32) -> Self {
        Self {
            config,
            visibility_threshold,
        }
    }

    /// Resolve a hint: explicit types bypass classification
    pub fn resolve(&self, skeleton: &Skeleton, hint: PostureHint) -> PostureAssessment {
        match hint.explicit() {
            Some(posture_type) => {
                debug!("Using caller-supplied posture type {:?}", posture_type);
                PostureAssessment::explicit(posture_type)
            }
            None => self.classify(skeleton),
        }
    }

    /// Classify orientation from keypoint geometry
    pub fn classify(&self, skeleton: &Skeleton) -> PostureAssessment {
        let floor = self.config.confidence_floor;

        let Some(features) = OrientationFeatures::extract(
            skeleton,
            self.visibility_threshold,
            self.config.face_threshold,
        ) else {
            warn!("Torso landmarks not visible, defaulting posture type to front");
            return PostureAssessment {
                posture_type: PostureType::Front,
                confidence: floor,
                source: PostureSource::Insufficient,
            };
        };
        self.assess(&features)
    }

    fn assess(&self, features: &OrientationFeatures) -> PostureAssessment {
        let floor = self.config.confidence_floor;
        let margins: Vec<(PostureType, f64)> = RULES
            .iter()
            .map(|rule| (rule.posture_type(), rule.margin(features)))
            .collect();
        debug!("Orientation features {:?}, rule margins {:?}", features, margins);

        let fired: Vec<&(PostureType, f64)> = margins.iter().filter(|(_, m)| *m > 0.0).collect();

        if fired.len() == 1 {
            let (posture_type, margin) = *fired[0];
            let confidence = floor + (1.0 - floor) * margin.clamp(0.0, 1.0);
            return PostureAssessment {
                posture_type,
                confidence,
                source: PostureSource::Classified,
            };
        }

        // Zero or several rules fired: closest-boundary tie-break. Stable
        // ordering keeps the earlier rule on equal margins.
        let mut ranked = margins.clone();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        let (posture_type, best) = ranked[0];
        let runner_up = ranked.get(1).map(|r| r.1).unwrap_or(f64::NEG_INFINITY);
        let lead = (best - runner_up).clamp(0.0, 1.0);
        let ceiling = self.config.ambiguous_ceiling;
        let confidence = floor + (ceiling - floor) * lead;

        debug!(
            "No unambiguous posture rule ({} fired), choosing {:?} with lead {:.3}",
            fired.len(),
            posture_type,
            lead
        );

        PostureAssessment {
            posture_type,
            confidence,
            source: PostureSource::Ambiguous,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pose_model::Keypoint;

    fn skeleton(points: &[(Landmark, f32, f32, f32)]) -> Skeleton {
        Skeleton::new(
            points
                .iter()
                .map(|&(lm, x, y, c)| Keypoint::new(lm, x, y, c))
                .collect(),
        )
        .unwrap()
    }

    fn classifier() -> PostureClassifier {
        PostureClassifier::new(ClassifierConfig::default(), 0.3)
    }

    fn torso(shoulder_half: f32, hip_half: f32) -> Vec<(Landmark, f32, f32, f32)> {
        vec![
            (Landmark::LeftShoulder, 320.0 + shoulder_half, 200.0, 0.9),
            (Landmark::RightShoulder, 320.0 - shoulder_half, 200.0, 0.9),
            (Landmark::LeftHip, 320.0 + hip_half, 320.0, 0.9),
            (Landmark::RightHip, 320.0 - hip_half, 320.0, 0.9),
        ]
    }

    #[test]
    fn test_front_view() {
        let mut points = torso(60.0, 30.0);
        points.push((Landmark::Nose, 320.0, 100.0, 0.9));
        points.push((Landmark::LeftEye, 330.0, 90.0, 0.9));
        points.push((Landmark::RightEye, 310.0, 90.0, 0.9));

        let result = classifier().classify(&skeleton(&points));
        assert_eq!(result.posture_type, PostureType::Front);
        assert_eq!(result.source, PostureSource::Classified);
        assert!(result.confidence > 0.2 && result.confidence <= 1.0);
    }

    #[test]
    fn test_back_view_without_face() {
        let mut points = torso(60.0, 30.0);
        points.push((Landmark::Nose, 320.0, 100.0, 0.0));
        points.push((Landmark::LeftEye, 330.0, 90.0, 0.0));
        points.push((Landmark::RightEye, 310.0, 90.0, 0.0));

        let result = classifier().classify(&skeleton(&points));
        assert_eq!(result.posture_type, PostureType::Back);
        assert!(result.confidence > ClassifierConfig::default().confidence_floor);
    }

    #[test]
    fn test_side_view() {
        let mut points = torso(5.0, 4.0);
        points.push((Landmark::Nose, 350.0, 100.0, 0.8));

        let result = classifier().classify(&skeleton(&points));
        assert_eq!(result.posture_type, PostureType::Side);
    }

    #[test]
    fn test_ambiguous_falls_back_with_reduced_confidence() {
        // Medium spans with one facial landmark: no rule fires cleanly
        let mut points = torso(15.0, 15.0);
        points.push((Landmark::Nose, 320.0, 100.0, 0.9));

        let result = classifier().classify(&skeleton(&points));
        assert_eq!(result.source, PostureSource::Ambiguous);
        let config = ClassifierConfig::default();
        assert!(result.confidence >= config.confidence_floor);
        assert!(result.confidence <= config.ambiguous_ceiling);
    }

    #[test]
    fn test_insufficient_data_never_null() {
        let result = classifier().classify(&skeleton(&[(Landmark::Nose, 1.0, 1.0, 0.9)]));
        assert_eq!(result.posture_type, PostureType::Front);
        assert_eq!(result.source, PostureSource::Insufficient);
        assert_eq!(result.confidence, ClassifierConfig::default().confidence_floor);
    }

    #[test]
    fn test_explicit_hint_bypasses_classification() {
        let result = classifier().resolve(&Skeleton::default(), PostureHint::Side);
        assert_eq!(result, PostureAssessment::explicit(PostureType::Side));
    }

    #[test]
    fn test_hint_parsing() {
        assert_eq!("auto".parse::<PostureHint>(), Ok(PostureHint::Auto));
        assert_eq!("standing_back".parse::<PostureHint>(), Ok(PostureHint::Back));
        assert!("sitting".parse::<PostureHint>().is_err());
        let hint: PostureHint = serde_json::from_str("\"standing_side\"").unwrap();
        assert_eq!(hint, PostureHint::Side);
    }

    #[test]
    fn test_rule_margins_independent() {
        let features = OrientationFeatures {
            shoulder_span_ratio: 1.0,
            hip_span_ratio: 0.5,
            aspect_ratio: 1.0,
            face_landmarks: 3,
            line_tilt: 0.0,
        };
        assert!(RULES[0].fires(&features));
        assert!(!RULES[1].fires(&features));
        assert!(!RULES[2].fires(&features));
        assert!((RULES[0].margin(&features) - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_back_confidence_grows_with_span() {
        let back = |half: f32| classifier().classify(&skeleton(&torso(half, half)));

        let narrow = back(18.0);
        let wide = back(36.0);
        let widest = back(60.0);
        for result in [narrow, wide, widest] {
            assert_eq!(result.posture_type, PostureType::Back);
            assert_eq!(result.source, PostureSource::Classified);
        }
        assert!(narrow.confidence < wide.confidence);
        assert!(wide.confidence <= widest.confidence);
        assert!((widest.confidence - 1.0).abs() < 1e-9);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn front_features(shoulder_span_ratio: f64) -> OrientationFeatures {
            OrientationFeatures {
                shoulder_span_ratio,
                hip_span_ratio: 0.5,
                aspect_ratio: 1.0,
                face_landmarks: 3,
                line_tilt: 0.0,
            }
        }

        proptest! {
            #[test]
            fn prop_front_confidence_shrinks_toward_threshold(
                near in 0.31f64..0.6,
                extra in 0.0f64..0.5,
            ) {
                let classifier = classifier();
                let close = classifier.assess(&front_features(near));
                let far = classifier.assess(&front_features(near + extra));

                prop_assert_eq!(close.posture_type, PostureType::Front);
                prop_assert_eq!(close.source, PostureSource::Classified);
                prop_assert_eq!(far.source, PostureSource::Classified);
                prop_assert!(close.confidence <= far.confidence);
            }

            #[test]
            fn prop_ambiguous_confidence_shrinks_with_lead(
                near in 0.21f64..0.3,
                extra in 0.0f64..0.1,
            ) {
                // One facial landmark: no rule fires, front leads back by a
                // margin that narrows as the spans shrink
                let features = |span: f64| OrientationFeatures {
                    shoulder_span_ratio: span,
                    hip_span_ratio: span,
                    aspect_ratio: 1.0,
                    face_landmarks: 1,
                    line_tilt: 0.0,
                };
                let classifier = classifier();
                let close = classifier.assess(&features(near));
                let far = classifier.assess(&features((near + extra).min(0.3)));

                prop_assert_eq!(close.source, PostureSource::Ambiguous);
                prop_assert_eq!(close.posture_type, PostureType::Front);
                prop_assert_eq!(far.source, PostureSource::Ambiguous);
                prop_assert!(close.confidence <= far.confidence);

                let config = ClassifierConfig::default();
                prop_assert!(close.confidence >= config.confidence_floor);
                prop_assert!(far.confidence <= config.ambiguous_ceiling);
            }
        }
    }
}
