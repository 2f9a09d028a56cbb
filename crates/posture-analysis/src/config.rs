//! Analysis configuration

use serde::{Deserialize, Serialize};

use crate::catalog::Locale;
use crate::region::Region;
use crate::AnalysisError;

/// Deviation-to-score mapping for one region.
///
/// `score = clamp(ceiling - slope * deviation, 0, 100)`. Deviations are
/// normalized: offsets as a fraction of torso height (or shoulder width for
/// head position in frontal views), angles as a fraction of a right angle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionScoring {
    /// Score at zero deviation
    pub ceiling: f64,
    /// Points lost per unit of normalized deviation
    pub slope: f64,
}

impl RegionScoring {
    pub const fn new(ceiling: f64, slope: f64) -> Self {
        Self { ceiling, slope }
    }

    /// Map a deviation to a score in [0, 100], rounded to one decimal
    pub fn score(&self, deviation: f64) -> f64 {
        let raw = self.ceiling - self.slope * deviation.abs();
        let clamped = if raw.is_finite() { raw.clamp(0.0, 100.0) } else { 0.0 };
        (clamped * 10.0).round() / 10.0
    }
}

/// Per-region scoring constants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub shoulder_level: RegionScoring,
    pub hip_level: RegionScoring,
    pub head_position: RegionScoring,
    pub spine_alignment: RegionScoring,
    pub spine_curvature: RegionScoring,
    pub knee_alignment: RegionScoring,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            shoulder_level: RegionScoring::new(100.0, 300.0),
            hip_level: RegionScoring::new(100.0, 400.0),
            head_position: RegionScoring::new(100.0, 250.0),
            spine_alignment: RegionScoring::new(100.0, 300.0),
            spine_curvature: RegionScoring::new(100.0, 400.0),
            knee_alignment: RegionScoring::new(100.0, 400.0),
        }
    }
}

impl ScoringConfig {
    pub fn for_region(&self, region: Region) -> RegionScoring {
        match region {
            Region::ShoulderLevel => self.shoulder_level,
            Region::HipLevel => self.hip_level,
            Region::HeadPosition => self.head_position,
            Region::SpineAlignment => self.spine_alignment,
            Region::SpineCurvature => self.spine_curvature,
            Region::KneeAlignment => self.knee_alignment,
        }
    }
}

/// Severity bands. A score below `high_below` is high severity, below
/// `medium_below` medium, below `low_below` low, otherwise no problem.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityThresholds {
    pub high_below: f64,
    pub medium_below: f64,
    pub low_below: f64,
}

impl Default for SeverityThresholds {
    fn default() -> Self {
        Self {
            high_below: 50.0,
            medium_below: 70.0,
            low_below: 85.0,
        }
    }
}

impl SeverityThresholds {
    /// Report problems earlier
    pub fn strict() -> Self {
        Self {
            high_below: 60.0,
            medium_below: 80.0,
            low_below: 92.0,
        }
    }

    /// Only report pronounced deviations
    pub fn lenient() -> Self {
        Self {
            high_below: 40.0,
            medium_below: 60.0,
            low_below: 75.0,
        }
    }
}

/// Posture type classifier settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Confidence a facial landmark needs to count as present
    pub face_threshold: f32,
    /// Lowest confidence ever reported
    pub confidence_floor: f64,
    /// Highest confidence reported when no rule fires unambiguously
    pub ambiguous_ceiling: f64,
    /// Below this confidence, scoring uses the orientation-independent region set
    pub orientation_confidence: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            face_threshold: 0.3,
            confidence_floor: 0.2,
            ambiguous_ceiling: 0.6,
            orientation_confidence: 0.5,
        }
    }
}

/// Complete analysis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Keypoints below this confidence are treated as absent for geometry
    pub visibility_threshold: f32,
    pub classifier: ClassifierConfig,
    pub scoring: ScoringConfig,
    pub severity: SeverityThresholds,
    /// Language of descriptions, notes and suggestions
    pub locale: Locale,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            visibility_threshold: 0.3,
            classifier: ClassifierConfig::default(),
            scoring: ScoringConfig::default(),
            severity: SeverityThresholds::default(),
            locale: Locale::default(),
        }
    }
}

impl AnalysisConfig {
    /// Check invariants the analysis relies on
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if !(0.0..=1.0).contains(&self.visibility_threshold) {
            return Err(AnalysisError::Config(format!(
                "visibility_threshold {} outside [0, 1]",
                self.visibility_threshold
            )));
        }

        let c = &self.classifier;
        if !(c.confidence_floor > 0.0
            && c.confidence_floor <= c.ambiguous_ceiling
            && c.ambiguous_ceiling <= 1.0)
        {
            return Err(AnalysisError::Config(format!(
                "classifier confidences must satisfy 0 < floor ({}) <= ambiguous_ceiling ({}) <= 1",
                c.confidence_floor, c.ambiguous_ceiling
            )));
        }

        let s = &self.severity;
        if !(s.high_below <= s.medium_below
            && s.medium_below <= s.low_below
            && s.low_below <= 100.0)
        {
            return Err(AnalysisError::Config(format!(
                "severity thresholds must be ordered: high {} <= medium {} <= low {} <= 100",
                s.high_below, s.medium_below, s.low_below
            )));
        }

        for region in Region::ALL {
            let rs = self.scoring.for_region(region);
            if !(rs.slope > 0.0 && (0.0..=100.0).contains(&rs.ceiling)) {
                return Err(AnalysisError::Config(format!(
                    "{} scoring needs slope > 0 and ceiling in [0, 100]",
                    region.id()
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_config_valid() {
        assert!(AnalysisConfig::default().validate().is_ok());
    }

    #[test]
    fn test_presets_valid() {
        for severity in [SeverityThresholds::strict(), SeverityThresholds::lenient()] {
            let config = AnalysisConfig {
                severity,
                ..Default::default()
            };
            assert!(config.validate().is_ok());
        }
    }

    #[test]
    fn test_unordered_thresholds_rejected() {
        let config = AnalysisConfig {
            severity: SeverityThresholds {
                high_below: 80.0,
                medium_below: 70.0,
                low_below: 85.0,
            },
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(AnalysisError::Config(_))));
    }

    #[test]
    fn test_zero_deviation_scores_ceiling() {
        assert_eq!(RegionScoring::new(100.0, 300.0).score(0.0), 100.0);
        assert_eq!(RegionScoring::new(90.0, 300.0).score(0.0), 90.0);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let json = r#"{"visibility_threshold": 0.5, "severity": {"low_below": 90.0}}"#;
        let config: AnalysisConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.visibility_threshold, 0.5);
        assert_eq!(config.severity.low_below, 90.0);
        assert_eq!(config.severity.high_below, 50.0);
        assert_eq!(config.scoring.hip_level.slope, 400.0);
    }

    proptest! {
        #[test]
        fn prop_score_clamped(
            ceiling in 0.0f64..=100.0,
            slope in 0.01f64..10_000.0,
            dev in -1.0e6f64..1.0e6,
        ) {
            let s = RegionScoring::new(ceiling, slope).score(dev);
            prop_assert!((0.0..=100.0).contains(&s));
        }

        #[test]
        fn prop_score_monotonic(slope in 0.01f64..1000.0, a in 0.0f64..10.0, b in 0.0f64..10.0) {
            let scoring = RegionScoring::new(100.0, slope);
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(scoring.score(lo) >= scoring.score(hi));
        }
    }
}
