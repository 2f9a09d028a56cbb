//! Geometric measurements on skeletons

use pose_model::{BodySide, Keypoint, Landmark, Skeleton};
use serde::{Deserialize, Serialize};

/// Minimum torso height used as a divisor (pixels)
const MIN_TORSO_HEIGHT: f64 = 1.0;

/// Inclination of the line a-b from horizontal, in degrees (0-90)
pub fn tilt_degrees(a: &Keypoint, b: &Keypoint) -> f64 {
    let dx = (b.x - a.x).abs() as f64;
    let dy = (b.y - a.y).abs() as f64;
    dy.atan2(dx).to_degrees()
}

/// Interior angle at `vertex` formed by `a` and `c`, in degrees (0-180)
pub fn joint_angle(a: &Keypoint, vertex: &Keypoint, c: &Keypoint) -> f64 {
    let v1 = ((a.x - vertex.x) as f64, (a.y - vertex.y) as f64);
    let v2 = ((c.x - vertex.x) as f64, (c.y - vertex.y) as f64);
    let dot = v1.0 * v2.0 + v1.1 * v2.1;
    let det = v1.0 * v2.1 - v1.1 * v2.0;
    det.atan2(dot).to_degrees().abs()
}

fn center(a: &Keypoint, b: &Keypoint) -> (f64, f64) {
    let (x, y) = a.midpoint(b);
    (x as f64, y as f64)
}

/// The four torso landmarks, all visible
#[derive(Debug, Clone, Copy)]
pub struct Torso {
    pub left_shoulder: Keypoint,
    pub right_shoulder: Keypoint,
    pub left_hip: Keypoint,
    pub right_hip: Keypoint,
}

impl Torso {
    pub fn from_skeleton(skeleton: &Skeleton, threshold: f32) -> Option<Self> {
        Some(Self {
            left_shoulder: *skeleton.visible(Landmark::LeftShoulder, threshold)?,
            right_shoulder: *skeleton.visible(Landmark::RightShoulder, threshold)?,
            left_hip: *skeleton.visible(Landmark::LeftHip, threshold)?,
            right_hip: *skeleton.visible(Landmark::RightHip, threshold)?,
        })
    }

    pub fn shoulder_center(&self) -> (f64, f64) {
        center(&self.left_shoulder, &self.right_shoulder)
    }

    pub fn hip_center(&self) -> (f64, f64) {
        center(&self.left_hip, &self.right_hip)
    }

    /// Vertical shoulder-to-hip distance, never below one pixel
    pub fn height(&self) -> f64 {
        (self.hip_center().1 - self.shoulder_center().1)
            .abs()
            .max(MIN_TORSO_HEIGHT)
    }

    pub fn shoulder_span(&self) -> f64 {
        (self.right_shoulder.x - self.left_shoulder.x).abs() as f64
    }

    pub fn hip_span(&self) -> f64 {
        (self.right_hip.x - self.left_hip.x).abs() as f64
    }

    /// Width/height of the box enclosing the four torso landmarks
    pub fn aspect_ratio(&self) -> f64 {
        let points = [
            &self.left_shoulder,
            &self.right_shoulder,
            &self.left_hip,
            &self.right_hip,
        ];
        let (mut min_x, mut max_x) = (f64::MAX, f64::MIN);
        let (mut min_y, mut max_y) = (f64::MAX, f64::MIN);
        for p in points {
            min_x = min_x.min(p.x as f64);
            max_x = max_x.max(p.x as f64);
            min_y = min_y.min(p.y as f64);
            max_y = max_y.max(p.y as f64);
        }
        (max_x - min_x) / (max_y - min_y).max(MIN_TORSO_HEIGHT)
    }

    /// Worst of the shoulder-line and hip-line inclinations
    pub fn max_line_tilt(&self) -> f64 {
        tilt_degrees(&self.left_shoulder, &self.right_shoulder)
            .max(tilt_degrees(&self.left_hip, &self.right_hip))
    }
}

/// Landmarks along one side of the body, as seen in a profile view
#[derive(Debug, Clone, Copy)]
pub struct SideChain {
    pub side: BodySide,
    pub shoulder: Keypoint,
    pub hip: Keypoint,
    pub ear: Option<Keypoint>,
    pub knee: Option<Keypoint>,
    pub ankle: Option<Keypoint>,
}

impl SideChain {
    /// Pick the side whose shoulder and hip are most confidently detected
    pub fn from_skeleton(skeleton: &Skeleton, threshold: f32) -> Option<Self> {
        let chain = |side: BodySide| -> Option<SideChain> {
            let (shoulder, hip, ear, knee, ankle) = match side {
                BodySide::Left => (
                    Landmark::LeftShoulder,
                    Landmark::LeftHip,
                    Landmark::LeftEar,
                    Landmark::LeftKnee,
                    Landmark::LeftAnkle,
                ),
                BodySide::Right => (
                    Landmark::RightShoulder,
                    Landmark::RightHip,
                    Landmark::RightEar,
                    Landmark::RightKnee,
                    Landmark::RightAnkle,
                ),
            };
            Some(SideChain {
                side,
                shoulder: *skeleton.visible(shoulder, threshold)?,
                hip: *skeleton.visible(hip, threshold)?,
                ear: skeleton.visible(ear, threshold).copied(),
                knee: skeleton.visible(knee, threshold).copied(),
                ankle: skeleton.visible(ankle, threshold).copied(),
            })
        };

        match (chain(BodySide::Left), chain(BodySide::Right)) {
            (Some(l), Some(r)) => {
                if l.confidence() >= r.confidence() {
                    Some(l)
                } else {
                    Some(r)
                }
            }
            (l, r) => l.or(r),
        }
    }

    fn confidence(&self) -> f32 {
        self.shoulder.confidence + self.hip.confidence
    }

    pub fn height(&self) -> f64 {
        (self.hip.y - self.shoulder.y).abs().max(MIN_TORSO_HEIGHT as f32) as f64
    }
}

/// Supplementary measurements attached to a report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BodyMetrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shoulder_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hip_width: Option<f64>,
    /// Shoulder line inclination from horizontal (degrees)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shoulder_tilt: Option<f64>,
    /// Hip line inclination from horizontal (degrees)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hip_tilt: Option<f64>,
    /// Shoulder-center to hip-center line from horizontal (degrees, 90 = upright)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spine_angle: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_knee_angle: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_knee_angle: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_hip_angle: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_hip_angle: Option<f64>,
}

impl BodyMetrics {
    /// Measure everything the visible keypoints allow
    pub fn measure(skeleton: &Skeleton, threshold: f32) -> Self {
        let pair = |a, b| skeleton.visible_pair(a, b, threshold);
        let triple = |a, b, c| {
            let (ka, kb) = skeleton.visible_pair(a, b, threshold)?;
            let kc = skeleton.visible(c, threshold)?;
            Some(joint_angle(ka, kb, kc))
        };

        let shoulders = pair(Landmark::LeftShoulder, Landmark::RightShoulder);
        let hips = pair(Landmark::LeftHip, Landmark::RightHip);

        let spine_angle = Torso::from_skeleton(skeleton, threshold).map(|torso| {
            let (sx, sy) = torso.shoulder_center();
            let (hx, hy) = torso.hip_center();
            (hy - sy).atan2((hx - sx).abs()).to_degrees()
        });

        Self {
            shoulder_width: shoulders.map(|(l, r)| l.distance(r) as f64),
            hip_width: hips.map(|(l, r)| l.distance(r) as f64),
            shoulder_tilt: shoulders.map(|(l, r)| tilt_degrees(l, r)),
            hip_tilt: hips.map(|(l, r)| tilt_degrees(l, r)),
            spine_angle,
            left_knee_angle: triple(Landmark::LeftHip, Landmark::LeftKnee, Landmark::LeftAnkle),
            right_knee_angle: triple(Landmark::RightHip, Landmark::RightKnee, Landmark::RightAnkle),
            left_hip_angle: triple(Landmark::LeftShoulder, Landmark::LeftHip, Landmark::LeftKnee),
            right_hip_angle: triple(
                Landmark::RightShoulder,
                Landmark::RightHip,
                Landmark::RightKnee,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kp(id: Landmark, x: f32, y: f32) -> Keypoint {
        Keypoint::new(id, x, y, 0.9)
    }

    #[test]
    fn test_tilt() {
        let a = kp(Landmark::LeftShoulder, 0.0, 0.0);
        assert!(tilt_degrees(&a, &kp(Landmark::RightShoulder, 10.0, 0.0)).abs() < 1e-9);
        assert!((tilt_degrees(&a, &kp(Landmark::RightShoulder, 10.0, 10.0)) - 45.0).abs() < 1e-9);
        assert!((tilt_degrees(&a, &kp(Landmark::RightShoulder, 0.0, 10.0)) - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_joint_angle_straight_and_right() {
        let hip = kp(Landmark::LeftHip, 0.0, 0.0);
        let knee = kp(Landmark::LeftKnee, 0.0, 10.0);
        let ankle = kp(Landmark::LeftAnkle, 0.0, 20.0);
        assert!((joint_angle(&hip, &knee, &ankle) - 180.0).abs() < 1e-9);

        let bent = kp(Landmark::LeftAnkle, 10.0, 10.0);
        assert!((joint_angle(&hip, &knee, &bent) - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_torso_measurements() {
        let skeleton = Skeleton::new(vec![
            kp(Landmark::LeftShoulder, 100.0, 100.0),
            kp(Landmark::RightShoulder, 200.0, 100.0),
            kp(Landmark::LeftHip, 120.0, 300.0),
            kp(Landmark::RightHip, 180.0, 300.0),
        ])
        .unwrap();
        let torso = Torso::from_skeleton(&skeleton, 0.3).unwrap();
        assert_eq!(torso.height(), 200.0);
        assert_eq!(torso.shoulder_span(), 100.0);
        assert_eq!(torso.hip_span(), 60.0);
        assert_eq!(torso.aspect_ratio(), 0.5);
        assert_eq!(torso.max_line_tilt(), 0.0);
    }

    #[test]
    fn test_torso_requires_all_four() {
        let skeleton = Skeleton::new(vec![
            kp(Landmark::LeftShoulder, 100.0, 100.0),
            kp(Landmark::RightShoulder, 200.0, 100.0),
            kp(Landmark::LeftHip, 120.0, 300.0),
        ])
        .unwrap();
        assert!(Torso::from_skeleton(&skeleton, 0.3).is_none());
    }

    #[test]
    fn test_side_chain_prefers_confident_side() {
        let skeleton = Skeleton::new(vec![
            Keypoint::new(Landmark::LeftShoulder, 100.0, 100.0, 0.4),
            Keypoint::new(Landmark::LeftHip, 100.0, 300.0, 0.4),
            Keypoint::new(Landmark::RightShoulder, 110.0, 100.0, 0.9),
            Keypoint::new(Landmark::RightHip, 110.0, 300.0, 0.9),
        ])
        .unwrap();
        let chain = SideChain::from_skeleton(&skeleton, 0.3).unwrap();
        assert_eq!(chain.side, BodySide::Right);
        assert!(chain.ear.is_none());
        assert_eq!(chain.height(), 200.0);
    }

    #[test]
    fn test_metrics_partial() {
        let skeleton = Skeleton::new(vec![
            kp(Landmark::LeftShoulder, 0.0, 0.0),
            kp(Landmark::RightShoulder, 30.0, 40.0),
        ])
        .unwrap();
        let metrics = BodyMetrics::measure(&skeleton, 0.3);
        assert_eq!(metrics.shoulder_width, Some(50.0));
        assert!(metrics.hip_width.is_none());
        assert!(metrics.spine_angle.is_none());
        assert!(metrics.left_knee_angle.is_none());
    }
}
