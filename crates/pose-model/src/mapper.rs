//! Coordinate mapping between model and image resolutions

use tracing::debug;

use crate::skeleton::Skeleton;
use crate::{PoseError, Resolution};

/// Rescales keypoints from the pose model's processing resolution to the
/// resolution of the image being annotated.
///
/// Output coordinates are clamped to `[0, width-1] x [0, height-1]`, so
/// out-of-range detections never produce positions outside the image.
#[derive(Debug, Clone, Copy)]
pub struct CoordinateMapper {
    processing: Resolution,
    target: Resolution,
    scale_x: f32,
    scale_y: f32,
}

impl CoordinateMapper {
    /// Create a mapper. Zero-sized resolutions are rejected.
    pub fn new(processing: Resolution, target: Resolution) -> Result<Self, PoseError> {
        processing.validate()?;
        target.validate()?;

        Ok(Self {
            processing,
            target,
            scale_x: target.width as f32 / processing.width as f32,
            scale_y: target.height as f32 / processing.height as f32,
        })
    }

    /// Whether the mapping is a pure clamp (no rescaling)
    pub fn is_identity_scale(&self) -> bool {
        self.processing == self.target
    }

    /// Map a single point into target coordinates
    pub fn map_point(&self, x: f32, y: f32) -> (f32, f32) {
        let max_x = (self.target.width - 1) as f32;
        let max_y = (self.target.height - 1) as f32;
        (
            (x * self.scale_x).clamp(0.0, max_x),
            (y * self.scale_y).clamp(0.0, max_y),
        )
    }

    /// Map every keypoint of a skeleton into target coordinates
    pub fn map(&self, skeleton: &Skeleton) -> Skeleton {
        debug!(
            "Mapping skeleton {} -> {} (scale {:.3}, {:.3})",
            self.processing, self.target, self.scale_x, self.scale_y
        );
        skeleton.map_positions(|x, y| self.map_point(x, y))
    }
}
