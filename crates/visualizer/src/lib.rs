//! Visualization Renderer
//!
//! Draws detections and diagnosis results onto source images:
//! - Bones and keypoints coloured by body part
//! - Alignment reference lines coloured by region score
//! - Localized title, score panel and overall score badge
//!
//! Text needs a TrueType font found on the host. When none is usable the
//! drawing still completes and the output carries a [`RenderWarning`].

pub mod config;
pub mod draw;
pub mod font;
pub mod palette;
pub mod renderer;

pub use config::{RenderConfig, DEFAULT_FONT_PATHS};
pub use font::FontHandle;
pub use renderer::Renderer;

use image::RgbImage;
use posture_analysis::Locale;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Renderer error types
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Invalid render configuration: {0}")]
    Config(String),
}

/// Non-fatal degradation of a rendered image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum RenderWarning {
    /// No probed font covers the locale; text overlay was skipped
    FontUnavailable { locale: Locale },
}

impl std::fmt::Display for RenderWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderWarning::FontUnavailable { locale } => {
                write!(f, "no font available for {:?}, text overlay skipped", locale)
            }
        }
    }
}

/// Rendered image and any degradation that occurred
#[derive(Debug, Clone)]
pub struct Rendered {
    pub image: RgbImage,
    pub warnings: Vec<RenderWarning>,
}

impl Rendered {
    pub fn clean(image: RgbImage) -> Self {
        Self {
            image,
            warnings: Vec::new(),
        }
    }
}
