//! Skeletons and bone definitions

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::keypoint::{Keypoint, Landmark};
use crate::PoseError;

/// Pair of landmarks connected for drawing and measurement
pub type Bone = (Landmark, Landmark);

/// Bone definitions (start landmark, end landmark)
pub const BONES: [Bone; 16] = [
    // Head
    (Landmark::Nose, Landmark::LeftEye),
    (Landmark::Nose, Landmark::RightEye),
    (Landmark::LeftEye, Landmark::LeftEar),
    (Landmark::RightEye, Landmark::RightEar),
    // Upper body
    (Landmark::LeftShoulder, Landmark::RightShoulder),
    (Landmark::LeftShoulder, Landmark::LeftElbow),
    (Landmark::LeftElbow, Landmark::LeftWrist),
    (Landmark::RightShoulder, Landmark::RightElbow),
    (Landmark::RightElbow, Landmark::RightWrist),
    // Torso
    (Landmark::LeftShoulder, Landmark::LeftHip),
    (Landmark::RightShoulder, Landmark::RightHip),
    (Landmark::LeftHip, Landmark::RightHip),
    // Lower body
    (Landmark::LeftHip, Landmark::LeftKnee),
    (Landmark::LeftKnee, Landmark::LeftAnkle),
    (Landmark::RightHip, Landmark::RightKnee),
    (Landmark::RightKnee, Landmark::RightAnkle),
];

/// Full ordered set of keypoints for one detected subject.
///
/// Always holds exactly one keypoint per [`Landmark`], in schema order.
/// Landmarks the detector did not report carry confidence 0 and are never
/// visible. Skeletons are immutable: transformations produce new values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Keypoint>", into = "Vec<Keypoint>")]
pub struct Skeleton {
    keypoints: [Keypoint; Landmark::COUNT],
}

impl Skeleton {
    /// Build a skeleton from detector output.
    ///
    /// Missing landmarks are filled in as absent. Duplicates, non-finite
    /// coordinates and confidences outside [0, 1] are rejected.
    pub fn new(keypoints: Vec<Keypoint>) -> Result<Self, PoseError> {
        let mut slots: [Option<Keypoint>; Landmark::COUNT] = [None; Landmark::COUNT];

        for kp in keypoints {
            if !kp.x.is_finite() || !kp.y.is_finite() {
                return Err(PoseError::NonFiniteCoordinate { landmark: kp.id });
            }
            if !(0.0..=1.0).contains(&kp.confidence) {
                return Err(PoseError::ConfidenceOutOfRange {
                    landmark: kp.id,
                    confidence: kp.confidence,
                });
            }
            let slot = &mut slots[kp.id.index()];
            if slot.is_some() {
                return Err(PoseError::DuplicateLandmark(kp.id));
            }
            *slot = Some(kp);
        }

        let missing = slots.iter().filter(|s| s.is_none()).count();
        if missing > 0 {
            debug!("Skeleton missing {} landmarks, treating them as absent", missing);
        }

        let keypoints = std::array::from_fn(|i| {
            slots[i].unwrap_or_else(|| Keypoint::absent(Landmark::ALL[i]))
        });
        Ok(Self { keypoints })
    }

    /// Get keypoint for a landmark, regardless of confidence
    pub fn get(&self, landmark: Landmark) -> &Keypoint {
        &self.keypoints[landmark.index()]
    }

    /// Get keypoint only if it reaches the visibility threshold
    pub fn visible(&self, landmark: Landmark, threshold: f32) -> Option<&Keypoint> {
        let kp = self.get(landmark);
        kp.is_visible(threshold).then_some(kp)
    }

    /// Get a pair of keypoints only if both are visible
    pub fn visible_pair(
        &self,
        a: Landmark,
        b: Landmark,
        threshold: f32,
    ) -> Option<(&Keypoint, &Keypoint)> {
        Some((self.visible(a, threshold)?, self.visible(b, threshold)?))
    }

    /// All keypoints in schema order
    pub fn keypoints(&self) -> &[Keypoint] {
        &self.keypoints
    }

    /// Number of keypoints at or above the visibility threshold
    pub fn visible_count(&self, threshold: f32) -> usize {
        self.keypoints
            .iter()
            .filter(|kp| kp.is_visible(threshold))
            .count()
    }

    /// Bones whose two endpoints are both visible
    pub fn visible_bones(&self, threshold: f32) -> impl Iterator<Item = (&Keypoint, &Keypoint)> {
        BONES
            .iter()
            .filter_map(move |&(a, b)| self.visible_pair(a, b, threshold))
    }

    /// Produce a new skeleton with every position transformed
    pub fn map_positions<F>(&self, mut f: F) -> Skeleton
    where
        F: FnMut(f32, f32) -> (f32, f32),
    {
        let keypoints = self.keypoints.map(|kp| {
            let (x, y) = f(kp.x, kp.y);
            Keypoint { x, y, ..kp }
        });
        Skeleton { keypoints }
    }
}

impl Default for Skeleton {
    fn default() -> Self {
        Self {
            keypoints: Landmark::ALL.map(Keypoint::absent),
        }
    }
}

impl TryFrom<Vec<Keypoint>> for Skeleton {
    type Error = PoseError;

    fn try_from(keypoints: Vec<Keypoint>) -> Result<Self, Self::Error> {
        Skeleton::new(keypoints)
    }
}

impl From<Skeleton> for Vec<Keypoint> {
    fn from(skeleton: Skeleton) -> Self {
        skeleton.keypoints.to_vec()
    }
}
