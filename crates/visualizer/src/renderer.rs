//! Skeleton and report overlay rendering

use ab_glyph::{FontVec, PxScale};
use image::RgbImage;
use imageproc::drawing::{draw_filled_circle_mut, draw_text_mut, text_size};
use pose_model::{Keypoint, Landmark, Skeleton};
use posture_analysis::catalog::captions;
use posture_analysis::{Region, Report};
use tracing::{debug, info};

use crate::config::RenderConfig;
use crate::draw::{marker, ring, shade_rect, thick_line};
use crate::font::FontHandle;
use crate::palette::{bone_color, part_color, score_color, severity_color, BLACK, MUTED, WHITE};
use crate::{RenderError, RenderWarning, Rendered};

/// Problems listed in the bottom panel
const PANEL_PROBLEMS: usize = 3;

/// Bottom panel opacity
const PANEL_ALPHA: f32 = 0.7;

/// Draws detections and diagnosis overlays onto images.
///
/// Each renderer owns its font handle; the font is loaded on the first text
/// draw and released with the renderer.
#[derive(Debug)]
pub struct Renderer {
    config: RenderConfig,
    font: FontHandle,
}

impl Renderer {
    pub fn new(config: RenderConfig) -> Result<Self, RenderError> {
        let font = FontHandle::new(config.font_paths.clone(), config.locale);
        Self::with_font(config, font)
    }

    fn with_font(config: RenderConfig, font: FontHandle) -> Result<Self, RenderError> {
        if config.keypoint_radius <= 0 {
            return Err(RenderError::Config(format!(
                "keypoint_radius must be positive, got {}",
                config.keypoint_radius
            )));
        }
        if config.bone_thickness == 0 || config.alignment_thickness == 0 {
            return Err(RenderError::Config("line thickness must be positive".into()));
        }
        if !(config.font_size.is_finite() && config.font_size > 0.0) {
            return Err(RenderError::Config(format!(
                "font_size must be positive, got {}",
                config.font_size
            )));
        }
        Ok(Self { config, font })
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Raw visualization: bones and keypoints only
    pub fn render_skeleton(&self, image: &RgbImage, skeleton: &Skeleton) -> Rendered {
        let mut canvas = image.clone();
        if canvas.width() == 0 || canvas.height() == 0 {
            debug!("Empty image, nothing to draw");
            return Rendered::clean(canvas);
        }

        self.draw_skeleton(&mut canvas, skeleton);
        Rendered::clean(canvas)
    }

    /// Skeleton plus alignment lines, score badge and (when enabled) the
    /// localized title and score panel
    pub fn render_annotated(
        &self,
        image: &RgbImage,
        skeleton: &Skeleton,
        report: &Report,
    ) -> Rendered {
        let mut canvas = image.clone();
        if canvas.width() == 0 || canvas.height() == 0 {
            debug!("Empty image, nothing to draw");
            return Rendered::clean(canvas);
        }

        let mut warnings = Vec::new();

        if self.config.draw_alignment_lines {
            self.draw_alignment_lines(&mut canvas, skeleton, report);
        }
        self.draw_skeleton(&mut canvas, skeleton);

        if let Some(overall) = report.overall_score {
            self.draw_badge(&mut canvas, overall);
        }

        if self.config.draw_text {
            match self.font.get() {
                Some(font) => self.draw_text_overlay(&mut canvas, font, report),
                None => warnings.push(RenderWarning::FontUnavailable {
                    locale: self.config.locale,
                }),
            }
        }

        info!(
            "Rendered annotated image {}x{} ({} warnings)",
            canvas.width(),
            canvas.height(),
            warnings.len()
        );
        Rendered {
            image: canvas,
            warnings,
        }
    }

    fn draw_skeleton(&self, canvas: &mut RgbImage, skeleton: &Skeleton) {
        let threshold = self.config.visibility_threshold;

        for (ka, kb) in skeleton.visible_bones(threshold) {
            thick_line(
                canvas,
                (ka.x, ka.y),
                (kb.x, kb.y),
                self.config.bone_thickness,
                bone_color(ka.id, kb.id),
            );
        }

        let outline = self.config.keypoint_outline.then_some(WHITE);
        for kp in skeleton.keypoints() {
            // Undetected landmarks carry no position
            if kp.confidence <= 0.0 {
                continue;
            }
            let color = if kp.is_visible(threshold) {
                part_color(kp.id.body_part())
            } else {
                MUTED
            };
            marker(canvas, (kp.x, kp.y), self.config.keypoint_radius, color, outline);
        }
    }

    fn draw_alignment_lines(&self, canvas: &mut RgbImage, skeleton: &Skeleton, report: &Report) {
        let threshold = self.config.visibility_threshold;
        let thickness = self.config.alignment_thickness;
        let region_color = |region: Region| report.score_for(region).map(score_color);

        let shoulders =
            skeleton.visible_pair(Landmark::LeftShoulder, Landmark::RightShoulder, threshold);
        let hips = skeleton.visible_pair(Landmark::LeftHip, Landmark::RightHip, threshold);

        for (pair, region) in [(shoulders, Region::ShoulderLevel), (hips, Region::HipLevel)] {
            if let (Some((l, r)), Some(color)) = (pair, region_color(region)) {
                let (from, to) = extended(l, r, 0.5);
                thick_line(canvas, from, to, thickness, color);
            }
        }

        let spine_color = region_color(Region::SpineAlignment)
            .or_else(|| region_color(Region::SpineCurvature));
        if let (Some((ls, rs)), Some((lh, rh)), Some(color)) = (shoulders, hips, spine_color) {
            thick_line(canvas, ls.midpoint(rs), lh.midpoint(rh), thickness, color);
        }

        if let (Some((ls, rs)), Some(color)) = (shoulders, region_color(Region::HeadPosition)) {
            let head = skeleton
                .visible(Landmark::Nose, threshold)
                .map(|n| (n.x, n.y))
                .or_else(|| {
                    skeleton
                        .visible_pair(Landmark::LeftEar, Landmark::RightEar, threshold)
                        .map(|(l, r)| l.midpoint(r))
                });
            if let Some(head) = head {
                thick_line(canvas, ls.midpoint(rs), head, thickness.div_ceil(2), color);
            }
        }
    }

    fn badge_geometry(&self, canvas: &RgbImage) -> Option<((i32, i32), i32)> {
        let radius = (canvas.width().min(canvas.height()) / 8).min(40) as i32;
        if radius < 8 {
            return None;
        }
        let center = (canvas.width() as i32 - radius - 20, radius + 20);
        Some((center, radius))
    }

    fn draw_badge(&self, canvas: &mut RgbImage, overall: f64) {
        if let Some((center, radius)) = self.badge_geometry(canvas) {
            draw_filled_circle_mut(canvas, center, radius, BLACK);
            ring(canvas, center, radius, 3, score_color(overall));
        }
    }

    fn draw_text_overlay(&self, canvas: &mut RgbImage, font: &FontVec, report: &Report) {
        let locale = self.config.locale;
        let text = captions(locale);
        let size = self.config.font_size;
        let scale = PxScale::from(size);
        let line = (size * 1.4).ceil() as i32;

        // Title
        let title = format!("{} - {}", text.title, report.posture.posture_type.label(locale));
        let (tw, _) = text_size(scale, font, &title);
        shade_rect(canvas, 0, 0, tw + 20, line as u32 + 10, BLACK, PANEL_ALPHA);
        draw_text_mut(canvas, WHITE, 10, 5, scale, font, &title);

        // Badge score
        let badge = self.badge_geometry(canvas);
        if let (Some(overall), Some((center, radius))) = (report.overall_score, badge) {
            let label = format!("{:.0}", overall);
            let badge_scale = PxScale::from(radius as f32);
            let (w, h) = text_size(badge_scale, font, &label);
            draw_text_mut(
                canvas,
                score_color(overall),
                center.0 - w as i32 / 2,
                center.1 - h as i32 / 2,
                badge_scale,
                font,
                &label,
            );
        }

        // Bottom panel: scores on the left, problems on the right
        let left_rows = 2 + report.scores.len();
        let right_rows = 1 + report.problems.len().clamp(1, PANEL_PROBLEMS);
        let rows = left_rows.max(right_rows) as i32;
        let panel_height = (rows * line + 20).min(canvas.height() as i32);
        let top = canvas.height() as i32 - panel_height;
        shade_rect(canvas, 0, top as u32, canvas.width(), panel_height as u32, BLACK, PANEL_ALPHA);

        let mut y = top + 10;
        if let Some(overall) = report.overall_score {
            let label = format!("{}: {:.1}", text.overall_score, overall);
            draw_text_mut(canvas, score_color(overall), 10, y, scale, font, &label);
        }
        y += line;
        draw_text_mut(canvas, WHITE, 10, y, scale, font, text.alignment_scores);
        for score in &report.scores {
            y += line;
            let label = format!("  {}: {:.1}", score.region.label(locale), score.score);
            draw_text_mut(canvas, score_color(score.score), 10, y, scale, font, &label);
        }

        let right = canvas.width() as i32 / 2;
        let mut y = top + 10;
        draw_text_mut(canvas, WHITE, right, y, scale, font, text.problems);
        if report.problems.is_empty() {
            y += line;
            draw_text_mut(canvas, WHITE, right, y, scale, font, text.no_problems);
        }
        for problem in report.problems.iter().take(PANEL_PROBLEMS) {
            y += line;
            let label = format!(
                "- {} ({})",
                problem.region.label(locale),
                problem.severity.label(locale)
            );
            draw_text_mut(canvas, severity_color(problem.severity), right, y, scale, font, &label);
        }
    }
}

/// Segment a-b extended on both ends by `factor` of its length
fn extended(a: &Keypoint, b: &Keypoint, factor: f32) -> ((f32, f32), (f32, f32)) {
    let (dx, dy) = ((b.x - a.x) * factor, (b.y - a.y) * factor);
    ((a.x - dx, a.y - dy), (b.x + dx, b.y + dy))
}
