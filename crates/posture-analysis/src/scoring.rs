//! Alignment scoring engine
//!
//! Each region reduces to one normalized deviation which is mapped to a
//! 0-100 score through the region's [`RegionScoring`]. Regions whose
//! landmarks are not visible are left out of the result; they are "not
//! assessable", never zero.

use pose_model::{BodySide, Keypoint, Landmark, Skeleton};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{RegionScoring, ScoringConfig};
use crate::metrics::{joint_angle, SideChain, Torso};
use crate::posture::{PostureAssessment, PostureType};
use crate::region::Region;

/// Score for one region
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignmentScore {
    pub region: Region,
    /// 0-100, one decimal
    pub score: f64,
    /// Normalized deviation the score was derived from
    pub deviation: f64,
    /// Lowered (or more deviating) side, when the region is lateral
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<BodySide>,
}

/// Which regions are assessed for a view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionSet {
    /// Front or back view
    Frontal,
    /// Side view
    Profile,
    /// Orientation too uncertain for view-specific regions
    Generic,
}

impl RegionSet {
    pub fn select(assessment: &PostureAssessment, orientation_confidence: f64) -> Self {
        if assessment.confidence < orientation_confidence {
            return RegionSet::Generic;
        }
        match assessment.posture_type {
            PostureType::Front | PostureType::Back => RegionSet::Frontal,
            PostureType::Side => RegionSet::Profile,
        }
    }

    pub fn regions(self) -> &'static [Region] {
        match self {
            RegionSet::Frontal => &[
                Region::ShoulderLevel,
                Region::HipLevel,
                Region::HeadPosition,
                Region::SpineAlignment,
                Region::KneeAlignment,
            ],
            RegionSet::Profile => &[
                Region::SpineCurvature,
                Region::HeadPosition,
                Region::KneeAlignment,
            ],
            RegionSet::Generic => &[
                Region::ShoulderLevel,
                Region::HipLevel,
                Region::HeadPosition,
                Region::KneeAlignment,
            ],
        }
    }
}

/// A measured deviation before it is mapped to a score
#[derive(Debug, Clone, Copy)]
struct Deviation {
    value: f64,
    side: Option<BodySide>,
}

impl Deviation {
    fn centered(value: f64) -> Self {
        Self { value, side: None }
    }
}

/// Side whose landmark sits lower in the image (larger y)
fn lowered_side(left: &Keypoint, right: &Keypoint) -> Option<BodySide> {
    if left.y > right.y {
        Some(BodySide::Left)
    } else if right.y > left.y {
        Some(BodySide::Right)
    } else {
        None
    }
}

#[derive(Debug, Clone)]
pub struct ScoringEngine {
    config: ScoringConfig,
    visibility_threshold: f32,
}

impl ScoringEngine {
    pub fn new(config: ScoringConfig, visibility_threshold: f32) -> Self {
        Self {
            config,
            visibility_threshold,
        }
    }

    /// Score every assessable region of `set`, in the set's order
    pub fn score(&self, skeleton: &Skeleton, set: RegionSet) -> Vec<AlignmentScore> {
        let mut scores = Vec::with_capacity(set.regions().len());

        for &region in set.regions() {
            let measured = match (region, set) {
                (Region::HeadPosition, RegionSet::Profile) => self.forward_head(skeleton),
                (Region::HeadPosition, _) => self.head_offset(skeleton),
                (Region::ShoulderLevel, _) => self.level(
                    skeleton,
                    Landmark::LeftShoulder,
                    Landmark::RightShoulder,
                ),
                (Region::HipLevel, _) => {
                    self.level(skeleton, Landmark::LeftHip, Landmark::RightHip)
                }
                (Region::SpineAlignment, _) => self.spine_offset(skeleton),
                (Region::SpineCurvature, _) => self.trunk_lean(skeleton),
                (Region::KneeAlignment, _) => self.knee_deviation(skeleton),
            };

            match measured {
                Some(deviation) => {
                    let scoring: RegionScoring = self.config.for_region(region);
                    scores.push(AlignmentScore {
                        region,
                        score: scoring.score(deviation.value),
                        deviation: deviation.value,
                        side: deviation.side,
                    });
                }
                None => debug!("Region {} not assessable, landmarks not visible", region),
            }
        }

        scores
    }

    fn torso(&self, skeleton: &Skeleton) -> Option<Torso> {
        Torso::from_skeleton(skeleton, self.visibility_threshold)
    }

    /// Vertical offset of a left/right pair as a fraction of torso height,
    /// or of shoulder width when the hips are not visible
    fn level(&self, skeleton: &Skeleton, left: Landmark, right: Landmark) -> Option<Deviation> {
        let threshold = self.visibility_threshold;
        let (l, r) = skeleton.visible_pair(left, right, threshold)?;
        let reference = match self.torso(skeleton) {
            Some(torso) => torso.height(),
            None => {
                let (ls, rs) = skeleton.visible_pair(
                    Landmark::LeftShoulder,
                    Landmark::RightShoulder,
                    threshold,
                )?;
                (ls.x - rs.x).abs().max(1.0) as f64
            }
        };
        Some(Deviation {
            value: (l.y - r.y).abs() as f64 / reference,
            side: lowered_side(l, r),
        })
    }

    /// Horizontal head offset from the shoulder center as a fraction of shoulder width
    fn head_offset(&self, skeleton: &Skeleton) -> Option<Deviation> {
        let threshold = self.visibility_threshold;
        let (ls, rs) =
            skeleton.visible_pair(Landmark::LeftShoulder, Landmark::RightShoulder, threshold)?;

        let head_x = match skeleton.visible(Landmark::Nose, threshold) {
            Some(nose) => nose.x as f64,
            None => {
                let (le, re) =
                    skeleton.visible_pair(Landmark::LeftEar, Landmark::RightEar, threshold)?;
                le.midpoint(re).0 as f64
            }
        };

        let center_x = ls.midpoint(rs).0 as f64;
        let width = (ls.x - rs.x).abs().max(1.0) as f64;
        Some(Deviation::centered((head_x - center_x).abs() / width))
    }

    /// Ear ahead of the shoulder in a profile view, as a fraction of torso height
    fn forward_head(&self, skeleton: &Skeleton) -> Option<Deviation> {
        let chain = SideChain::from_skeleton(skeleton, self.visibility_threshold)?;
        let ear = chain.ear?;
        Some(Deviation {
            value: (ear.x - chain.shoulder.x).abs() as f64 / chain.height(),
            side: Some(chain.side),
        })
    }

    /// Lateral offset of the shoulder center over the hip center
    fn spine_offset(&self, skeleton: &Skeleton) -> Option<Deviation> {
        let torso = self.torso(skeleton)?;
        let (sx, _) = torso.shoulder_center();
        let (hx, _) = torso.hip_center();
        Some(Deviation::centered((sx - hx).abs() / torso.height()))
    }

    /// Trunk lean from vertical in a profile view, as a fraction of a right angle
    fn trunk_lean(&self, skeleton: &Skeleton) -> Option<Deviation> {
        let chain = SideChain::from_skeleton(skeleton, self.visibility_threshold)?;
        let dx = (chain.shoulder.x - chain.hip.x).abs() as f64;
        let dy = (chain.shoulder.y - chain.hip.y).abs() as f64;
        let lean = dx.atan2(dy).to_degrees();
        Some(Deviation {
            value: lean / 90.0,
            side: Some(chain.side),
        })
    }

    /// Worst hip-knee-ankle bend across visible legs, as a fraction of a right angle
    fn knee_deviation(&self, skeleton: &Skeleton) -> Option<Deviation> {
        let threshold = self.visibility_threshold;
        let leg = |side: BodySide, hip: Landmark, knee: Landmark, ankle: Landmark| {
            let (h, k) = skeleton.visible_pair(hip, knee, threshold)?;
            let a = skeleton.visible(ankle, threshold)?;
            Some(Deviation {
                value: (180.0 - joint_angle(h, k, a)) / 90.0,
                side: Some(side),
            })
        };

        let left = leg(BodySide::Left, Landmark::LeftHip, Landmark::LeftKnee, Landmark::LeftAnkle);
        let right = leg(
            BodySide::Right,
            Landmark::RightHip,
            Landmark::RightKnee,
            Landmark::RightAnkle,
        );

        match (left, right) {
            (Some(l), Some(r)) => Some(if r.value > l.value { r } else { l }),
            (l, r) => l.or(r),
        }
    }
}
