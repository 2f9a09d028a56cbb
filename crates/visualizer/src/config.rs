//! Renderer configuration

use posture_analysis::Locale;
use serde::{Deserialize, Serialize};

/// Known system font locations, probed in order
pub const DEFAULT_FONT_PATHS: [&str; 8] = [
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/google-noto-cjk/NotoSansCJK-Regular.ttc",
    "/System/Library/Fonts/ヒラギノ角ゴシック W3.ttc",
    "/System/Library/Fonts/Hiragino Sans GB.ttc",
    "C:\\Windows\\Fonts\\msgothic.ttc",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
];

/// Renderer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Keypoint marker radius (pixels)
    pub keypoint_radius: i32,

    /// Draw a white ring around each keypoint
    pub keypoint_outline: bool,

    /// Bone line thickness (pixels)
    pub bone_thickness: u32,

    /// Alignment reference line thickness (pixels)
    pub alignment_thickness: u32,

    /// Keypoints below this confidence are drawn muted, bones skipped.
    /// The diagnosis pipeline replaces it with the analysis threshold.
    pub visibility_threshold: f32,

    /// Draw title, score panel and badge text
    pub draw_text: bool,

    /// Draw shoulder, hip, spine and head reference lines
    pub draw_alignment_lines: bool,

    /// Overlay text height (pixels)
    pub font_size: f32,

    /// Font files to probe, first usable one wins
    pub font_paths: Vec<String>,

    /// Language of overlay captions, replaced by the analysis locale in
    /// the diagnosis pipeline
    pub locale: Locale,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            keypoint_radius: 6,
            keypoint_outline: true,
            bone_thickness: 3,
            alignment_thickness: 2,
            visibility_threshold: 0.3,
            draw_text: true,
            draw_alignment_lines: true,
            font_size: 18.0,
            font_paths: DEFAULT_FONT_PATHS.iter().map(|p| p.to_string()).collect(),
            locale: Locale::default(),
        }
    }
}

impl RenderConfig {
    /// Same drawing settings with the threshold and locale of the analysis
    /// the overlay belongs to
    pub fn shared_with(self, visibility_threshold: f32, locale: Locale) -> Self {
        Self {
            visibility_threshold,
            locale,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_with_keeps_drawing_settings() {
        let config = RenderConfig {
            bone_thickness: 7,
            ..Default::default()
        }
        .shared_with(0.6, Locale::Japanese);

        assert_eq!(config.visibility_threshold, 0.6);
        assert_eq!(config.locale, Locale::Japanese);
        assert_eq!(config.bone_thickness, 7);
    }
}
