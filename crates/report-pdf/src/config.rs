//! Report compiler configuration

use serde::{Deserialize, Serialize};

/// One centimetre in PDF points
pub const CM: f32 = 72.0 / 2.54;

/// Report compiler configuration. Lengths are PDF points.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Page size (A4 by default)
    pub page_width: f32,
    pub page_height: f32,

    /// Margin on every edge
    pub margin: f32,

    /// Largest image box; images are scaled down to fit, never up
    pub image_max_width: f32,
    pub image_max_height: f32,

    /// JPEG quality of embedded images (1-100)
    pub jpeg_quality: u8,

    pub title: String,
    pub title_size: f32,
    pub heading_size: f32,
    pub body_size: f32,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            page_width: 21.0 * CM,
            page_height: 29.7 * CM,
            margin: 2.0 * CM,
            image_max_width: 16.0 * CM,
            image_max_height: 20.0 * CM,
            jpeg_quality: 85,
            title: "Posture Diagnosis Report".to_string(),
            title_size: 20.0,
            heading_size: 14.0,
            body_size: 10.0,
        }
    }
}

impl CompilerConfig {
    pub fn content_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin
    }

    pub fn content_height(&self) -> f32 {
        self.page_height - 2.0 * self.margin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_a4_defaults() {
        let config = CompilerConfig::default();
        assert!((config.page_width - 595.28).abs() < 0.01);
        assert!((config.page_height - 841.89).abs() < 0.01);
        assert!(config.image_max_width <= config.content_width());
    }
}
