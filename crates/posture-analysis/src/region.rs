//! Body regions assessed by the scoring engine

use serde::{Deserialize, Serialize};

use crate::catalog::Locale;

/// Assessed body region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    /// Left/right shoulder height difference
    ShoulderLevel,
    /// Left/right hip (pelvis) height difference
    HipLevel,
    /// Head offset from the shoulder midline (frontal) or forward head (side)
    HeadPosition,
    /// Lateral offset of the shoulder midpoint over the hip midpoint
    SpineAlignment,
    /// Trunk lean away from vertical, side view only
    SpineCurvature,
    /// Hip-knee-ankle deviation from a straight line
    KneeAlignment,
}

impl Region {
    pub const ALL: [Region; 6] = [
        Region::ShoulderLevel,
        Region::HipLevel,
        Region::HeadPosition,
        Region::SpineAlignment,
        Region::SpineCurvature,
        Region::KneeAlignment,
    ];

    /// Stable snake-case identifier
    pub fn id(self) -> &'static str {
        match self {
            Region::ShoulderLevel => "shoulder_level",
            Region::HipLevel => "hip_level",
            Region::HeadPosition => "head_position",
            Region::SpineAlignment => "spine_alignment",
            Region::SpineCurvature => "spine_curvature",
            Region::KneeAlignment => "knee_alignment",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.id() == id)
    }

    /// Human-readable label
    pub fn label(self, locale: Locale) -> &'static str {
        match (self, locale) {
            (Region::ShoulderLevel, Locale::English) => "Shoulder level",
            (Region::HipLevel, Locale::English) => "Hip level",
            (Region::HeadPosition, Locale::English) => "Head position",
            (Region::SpineAlignment, Locale::English) => "Spine alignment",
            (Region::SpineCurvature, Locale::English) => "Spine curvature",
            (Region::KneeAlignment, Locale::English) => "Knee alignment",
            (Region::ShoulderLevel, Locale::Japanese) => "肩の水平度",
            (Region::HipLevel, Locale::Japanese) => "骨盤の水平度",
            (Region::HeadPosition, Locale::Japanese) => "頭部の位置",
            (Region::SpineAlignment, Locale::Japanese) => "背骨の整列",
            (Region::SpineCurvature, Locale::Japanese) => "背骨の弯曲",
            (Region::KneeAlignment, Locale::Japanese) => "膝の位置",
        }
    }

    /// Reverse lookup of [`Region::label`]
    pub fn from_label(label: &str, locale: Locale) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.label(locale) == label)
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_roundtrip() {
        for region in Region::ALL {
            assert_eq!(Region::from_id(region.id()), Some(region));
        }
        assert_eq!(Region::from_id("elbow"), None);
    }

    #[test]
    fn test_label_roundtrip() {
        for locale in [Locale::English, Locale::Japanese] {
            for region in Region::ALL {
                assert_eq!(Region::from_label(region.label(locale), locale), Some(region));
            }
        }
    }
}
