//! Landmark schema and single keypoints

use serde::{Deserialize, Serialize};

/// The 17 body landmarks emitted by COCO-style pose models, in output order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(usize)]
pub enum Landmark {
    Nose = 0,
    LeftEye = 1,
    RightEye = 2,
    LeftEar = 3,
    RightEar = 4,
    LeftShoulder = 5,
    RightShoulder = 6,
    LeftElbow = 7,
    RightElbow = 8,
    LeftWrist = 9,
    RightWrist = 10,
    LeftHip = 11,
    RightHip = 12,
    LeftKnee = 13,
    RightKnee = 14,
    LeftAnkle = 15,
    RightAnkle = 16,
}

impl Landmark {
    pub const COUNT: usize = 17;

    pub const ALL: [Landmark; Landmark::COUNT] = [
        Landmark::Nose,
        Landmark::LeftEye,
        Landmark::RightEye,
        Landmark::LeftEar,
        Landmark::RightEar,
        Landmark::LeftShoulder,
        Landmark::RightShoulder,
        Landmark::LeftElbow,
        Landmark::RightElbow,
        Landmark::LeftWrist,
        Landmark::RightWrist,
        Landmark::LeftHip,
        Landmark::RightHip,
        Landmark::LeftKnee,
        Landmark::RightKnee,
        Landmark::LeftAnkle,
        Landmark::RightAnkle,
    ];

    /// Facial landmarks used for orientation decisions
    pub const FACE: [Landmark; 3] = [Landmark::Nose, Landmark::LeftEye, Landmark::RightEye];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Snake-case identifier, matching the serialized form
    pub fn name(self) -> &'static str {
        match self {
            Landmark::Nose => "nose",
            Landmark::LeftEye => "left_eye",
            Landmark::RightEye => "right_eye",
            Landmark::LeftEar => "left_ear",
            Landmark::RightEar => "right_ear",
            Landmark::LeftShoulder => "left_shoulder",
            Landmark::RightShoulder => "right_shoulder",
            Landmark::LeftElbow => "left_elbow",
            Landmark::RightElbow => "right_elbow",
            Landmark::LeftWrist => "left_wrist",
            Landmark::RightWrist => "right_wrist",
            Landmark::LeftHip => "left_hip",
            Landmark::RightHip => "right_hip",
            Landmark::LeftKnee => "left_knee",
            Landmark::RightKnee => "right_knee",
            Landmark::LeftAnkle => "left_ankle",
            Landmark::RightAnkle => "right_ankle",
        }
    }

    pub fn side(self) -> Option<BodySide> {
        match self {
            Landmark::Nose => None,
            Landmark::LeftEye
            | Landmark::LeftEar
            | Landmark::LeftShoulder
            | Landmark::LeftElbow
            | Landmark::LeftWrist
            | Landmark::LeftHip
            | Landmark::LeftKnee
            | Landmark::LeftAnkle => Some(BodySide::Left),
            _ => Some(BodySide::Right),
        }
    }

    pub fn body_part(self) -> BodyPart {
        match self {
            Landmark::Nose
            | Landmark::LeftEye
            | Landmark::RightEye
            | Landmark::LeftEar
            | Landmark::RightEar => BodyPart::Head,
            Landmark::LeftShoulder | Landmark::RightShoulder => BodyPart::Shoulder,
            Landmark::LeftElbow | Landmark::RightElbow => BodyPart::Elbow,
            Landmark::LeftWrist | Landmark::RightWrist => BodyPart::Wrist,
            Landmark::LeftHip | Landmark::RightHip => BodyPart::Hip,
            Landmark::LeftKnee | Landmark::RightKnee => BodyPart::Knee,
            Landmark::LeftAnkle | Landmark::RightAnkle => BodyPart::Ankle,
        }
    }
}

impl std::fmt::Display for Landmark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Left or right half of the body, from the subject's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodySide {
    Left,
    Right,
}

impl BodySide {
    pub fn opposite(self) -> Self {
        match self {
            BodySide::Left => BodySide::Right,
            BodySide::Right => BodySide::Left,
        }
    }
}

/// Coarse body part grouping, used for colouring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyPart {
    Head,
    Shoulder,
    Elbow,
    Wrist,
    Hip,
    Knee,
    Ankle,
}

/// Single detected landmark
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    /// Landmark identifier
    pub id: Landmark,
    /// Horizontal pixel coordinate
    pub x: f32,
    /// Vertical pixel coordinate (grows downwards)
    pub y: f32,
    /// Detection confidence (0.0-1.0)
    pub confidence: f32,
}

impl Keypoint {
    pub fn new(id: Landmark, x: f32, y: f32, confidence: f32) -> Self {
        Self { id, x, y, confidence }
    }

    /// Placeholder for a landmark the detector did not report
    pub fn absent(id: Landmark) -> Self {
        Self {
            id,
            x: 0.0,
            y: 0.0,
            confidence: 0.0,
        }
    }

    /// Whether confidence reaches the visibility threshold
    pub fn is_visible(&self, threshold: f32) -> bool {
        self.confidence >= threshold && self.confidence > 0.0
    }

    pub fn distance(&self, other: &Keypoint) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn midpoint(&self, other: &Keypoint) -> (f32, f32) {
        ((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}
