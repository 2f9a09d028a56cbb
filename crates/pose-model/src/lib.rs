//! Pose Model
//!
//! Normalized representation of a detected body skeleton:
//! - 17-landmark keypoint schema (COCO / YOLO-pose order)
//! - Immutable skeletons with visibility filtering
//! - Bone definitions used for drawing and measurement
//! - Coordinate mapping from model resolution to image resolution

pub mod keypoint;
pub mod mapper;
pub mod skeleton;

pub use keypoint::{BodyPart, BodySide, Keypoint, Landmark};
pub use mapper::CoordinateMapper;
pub use skeleton::{Bone, Skeleton, BONES};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pose model error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PoseError {
    #[error("Invalid resolution {width}x{height}: both dimensions must be non-zero")]
    InvalidResolution { width: u32, height: u32 },

    #[error("Duplicate keypoint for landmark {0}")]
    DuplicateLandmark(Landmark),

    #[error("Keypoint {landmark} has non-finite coordinates")]
    NonFiniteCoordinate { landmark: Landmark },

    #[error("Keypoint {landmark} confidence {confidence} is outside [0, 1]")]
    ConfidenceOutOfRange { landmark: Landmark, confidence: f32 },
}

/// Pixel resolution of an image or of a model's processing canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Whether either dimension is zero
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Reject zero-sized resolutions
    pub fn validate(&self) -> Result<(), PoseError> {
        if self.is_empty() {
            Err(PoseError::InvalidResolution {
                width: self.width,
                height: self.height,
            })
        } else {
            Ok(())
        }
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl std::str::FromStr for Resolution {
    type Err = String;

    /// Parse `WIDTHxHEIGHT`, e.g. `640x640`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {s:?}"))?;
        let width = w.trim().parse::<u32>().map_err(|e| e.to_string())?;
        let height = h.trim().parse::<u32>().map_err(|e| e.to_string())?;
        Ok(Self { width, height })
    }
}

/// Output of the external pose-estimation model for one image or frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    /// Keypoints in the model's processing coordinates
    pub skeleton: Skeleton,
    /// Resolution the model processed the image at
    pub processing: Resolution,
}
