//! Problem detection from alignment scores

use std::cmp::Ordering;

use pose_model::BodySide;
use serde::{Deserialize, Serialize};

use crate::catalog::{problem_text, Locale};
use crate::config::SeverityThresholds;
use crate::region::Region;
use crate::scoring::AlignmentScore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn label(self, locale: Locale) -> &'static str {
        match (self, locale) {
            (Severity::Low, Locale::English) => "Low",
            (Severity::Medium, Locale::English) => "Medium",
            (Severity::High, Locale::English) => "High",
            (Severity::Low, Locale::Japanese) => "軽度",
            (Severity::Medium, Locale::Japanese) => "中程度",
            (Severity::High, Locale::Japanese) => "重度",
        }
    }

    /// Points subtracted from the overall score per problem
    pub fn penalty(self) -> f64 {
        match self {
            Severity::Low => 5.0,
            Severity::Medium => 10.0,
            Severity::High => 15.0,
        }
    }
}

impl SeverityThresholds {
    /// Severity band of a score, `None` when the score is not a problem
    pub fn classify(&self, score: f64) -> Option<Severity> {
        if score < self.high_below {
            Some(Severity::High)
        } else if score < self.medium_below {
            Some(Severity::Medium)
        } else if score < self.low_below {
            Some(Severity::Low)
        } else {
            None
        }
    }
}

/// A detected postural problem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    pub region: Region,
    pub severity: Severity,
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<BodySide>,
    pub description: String,
    pub impact: String,
}

/// Most severe first, then lowest score, then region order
fn rank(a: &Problem, b: &Problem) -> Ordering {
    b.severity
        .cmp(&a.severity)
        .then_with(|| a.score.total_cmp(&b.score))
        .then_with(|| a.region.cmp(&b.region))
}

/// Threshold scores into a ranked problem list
pub fn detect(
    scores: &[AlignmentScore],
    thresholds: &SeverityThresholds,
    locale: Locale,
) -> Vec<Problem> {
    let mut problems: Vec<Problem> = scores
        .iter()
        .filter_map(|s| {
            let severity = thresholds.classify(s.score)?;
            let (description, impact) = problem_text(s.region, locale);
            Some(Problem {
                region: s.region,
                severity,
                score: s.score,
                side: s.side,
                description: description.to_string(),
                impact: impact.to_string(),
            })
        })
        .collect();

    problems.sort_by(rank);
    problems
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn score(region: Region, score: f64) -> AlignmentScore {
        AlignmentScore {
            region,
            score,
            deviation: 0.0,
            side: None,
        }
    }

    #[test]
    fn test_severity_bands() {
        let t = SeverityThresholds::default();
        assert_eq!(t.classify(10.0), Some(Severity::High));
        assert_eq!(t.classify(50.0), Some(Severity::Medium));
        assert_eq!(t.classify(69.9), Some(Severity::Medium));
        assert_eq!(t.classify(70.0), Some(Severity::Low));
        assert_eq!(t.classify(85.0), None);
        assert_eq!(t.classify(100.0), None);
    }

    #[test]
    fn test_detect_orders_and_filters() {
        let scores = [
            score(Region::ShoulderLevel, 80.0),
            score(Region::HipLevel, 40.0),
            score(Region::HeadPosition, 95.0),
            score(Region::KneeAlignment, 30.0),
            score(Region::SpineAlignment, 60.0),
        ];
        let problems = detect(&scores, &SeverityThresholds::default(), Locale::English);
        let order: Vec<(Region, Severity)> =
            problems.iter().map(|p| (p.region, p.severity)).collect();
        assert_eq!(
            order,
            vec![
                (Region::KneeAlignment, Severity::High),
                (Region::HipLevel, Severity::High),
                (Region::SpineAlignment, Severity::Medium),
                (Region::ShoulderLevel, Severity::Low),
            ]
        );
        assert_eq!(problems[1].description, "The pelvis is tilted");
    }

    #[test]
    fn test_localized_text() {
        let problems = detect(
            &[score(Region::HipLevel, 40.0)],
            &SeverityThresholds::default(),
            Locale::Japanese,
        );
        assert_eq!(problems[0].description, "骨盤が傾いています");
    }

    proptest! {
        #[test]
        fn prop_problems_sorted(values in proptest::collection::vec(0.0f64..=100.0, 6)) {
            let scores: Vec<AlignmentScore> = Region::ALL
                .iter()
                .zip(values)
                .map(|(&r, v)| score(r, v))
                .collect();
            let thresholds = SeverityThresholds::default();
            let problems = detect(&scores, &thresholds, Locale::English);

            for pair in problems.windows(2) {
                prop_assert!(pair[0].severity >= pair[1].severity);
                if pair[0].severity == pair[1].severity {
                    prop_assert!(pair[0].score <= pair[1].score);
                }
            }
            for p in &problems {
                prop_assert!(p.score < thresholds.low_below);
            }
            let expected = scores.iter().filter(|s| s.score < thresholds.low_below).count();
            prop_assert_eq!(problems.len(), expected);
        }
    }
}
