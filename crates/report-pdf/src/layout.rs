//! Page layout model
//!
//! Positions are PDF points measured from the top-left corner of the page;
//! text `y` is the baseline. The writer flips them into PDF space.

use chrono::{DateTime, Utc};
use image::{imageops, RgbImage};
use posture_analysis::catalog::captions;
use posture_analysis::recommendations::{recommend, suggest};
use posture_analysis::{catalog, Classification, Locale, Report, Severity};
use tracing::debug;

use crate::config::CompilerConfig;

/// Every compiled document is English: the standard PDF fonts cover Latin only
pub(crate) const LOCALE: Locale = Locale::English;

pub(crate) const TABLE_REGION: &str = "Region";
pub(crate) const TABLE_SCORE: &str = "Score";

/// Space kept free above the bottom margin for the footer
const FOOTER_SPACE: f32 = 16.0;

/// Line height as a multiple of font size
const LEADING: f32 = 1.4;

/// Average Helvetica glyph advance as a fraction of font size
const AVG_ADVANCE: f32 = 0.5;

/// Embedded images carry at most this many pixels per point
const MAX_PIXELS_PER_POINT: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }
}

pub const HEADER: Color = Color::rgb(0x1e, 0x40, 0xaf);
pub const BODY: Color = Color::rgb(0x1f, 0x29, 0x37);
pub const MUTED: Color = Color::rgb(0x6b, 0x72, 0x80);
pub const RULE: Color = Color::rgb(0xd1, 0xd5, 0xdb);

pub fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::High => Color::rgb(0xef, 0x44, 0x44),
        Severity::Medium => Color::rgb(0xf5, 0x9e, 0x0b),
        Severity::Low => Color::rgb(0x3b, 0x82, 0xf6),
    }
}

pub fn score_color(score: f64) -> Color {
    if score >= 80.0 {
        Color::rgb(0x10, 0xb9, 0x81)
    } else if score >= 60.0 {
        Color::rgb(0xf5, 0x9e, 0x0b)
    } else {
        Color::rgb(0xef, 0x44, 0x44)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Regular,
    Bold,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Text {
        x: f32,
        y: f32,
        size: f32,
        style: FontStyle,
        color: Color,
        text: String,
    },
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Color,
    },
    Image {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        /// Index into [`Layout::images`]
        index: usize,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub elements: Vec<Element>,
}

/// A laid-out document, ready to be written
#[derive(Debug, Clone)]
pub struct Layout {
    pub pages: Vec<Page>,
    pub images: Vec<RgbImage>,
}

impl Layout {
    /// Text runs in reading order
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().flat_map(|p| &p.elements).filter_map(|e| match e {
            Element::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// Rendered images available to the report
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportImages<'a> {
    pub annotated: Option<&'a RgbImage>,
    pub visualization: Option<&'a RgbImage>,
}

impl<'a> ReportImages<'a> {
    /// The fully annotated image when present, otherwise the raw visualization
    pub fn preferred(&self) -> Option<(&'static str, &'a RgbImage)> {
        let non_empty = |img: &&RgbImage| img.width() > 0 && img.height() > 0;
        self.annotated
            .filter(non_empty)
            .map(|img| ("Diagnosis Image", img))
            .or_else(|| self.visualization.filter(non_empty).map(|img| ("Pose Visualization", img)))
    }
}

/// Greedy word wrap on an average glyph width
fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(8);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let needed =
            current.chars().count() + word.chars().count() + usize::from(!current.is_empty());
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

struct Builder<'c> {
    config: &'c CompilerConfig,
    pages: Vec<Page>,
    current: Page,
    /// Top of the next free line
    y: f32,
    images: Vec<RgbImage>,
}

impl<'c> Builder<'c> {
    fn new(config: &'c CompilerConfig) -> Self {
        Self {
            config,
            pages: Vec::new(),
            current: Page::default(),
            y: config.margin,
            images: Vec::new(),
        }
    }

    fn bottom(&self) -> f32 {
        self.config.page_height - self.config.margin - FOOTER_SPACE
    }

    fn break_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.current));
        self.y = self.config.margin;
    }

    /// Start a new page unless `height` still fits
    fn ensure(&mut self, height: f32) {
        if self.y + height > self.bottom() && !self.current.elements.is_empty() {
            self.break_page();
        }
    }

    fn gap(&mut self, height: f32) {
        self.y += height;
    }

    fn text_at(&mut self, x: f32, text: &str, size: f32, style: FontStyle, color: Color) {
        self.current.elements.push(Element::Text {
            x: self.config.margin + x,
            y: self.y + size,
            size,
            style,
            color,
            text: text.to_string(),
        });
    }

    fn line(&mut self, text: &str, size: f32, style: FontStyle, color: Color, indent: f32) {
        self.ensure(size * LEADING);
        self.text_at(indent, text, size, style, color);
        self.y += size * LEADING;
    }

    fn paragraph(&mut self, text: &str, size: f32, style: FontStyle, color: Color, indent: f32) {
        let width = self.config.content_width() - indent;
        let max_chars = (width / (size * AVG_ADVANCE)) as usize;
        for line in wrap(text, max_chars) {
            self.line(&line, size, style, color, indent);
        }
    }

    fn heading(&mut self, text: &str) {
        let size = self.config.heading_size;
        // Keep a heading together with at least two body lines
        self.ensure(size * LEADING + 2.0 * self.config.body_size * LEADING);
        self.gap(size * 0.6);
        self.line(text, size, FontStyle::Bold, HEADER, 0.0);
    }

    fn rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color) {
        self.current.elements.push(Element::Rect {
            x: self.config.margin + x,
            y,
            width,
            height,
            color,
        });
    }

    fn image(&mut self, image: &RgbImage) {
        let (w, h) = (image.width() as f32, image.height() as f32);
        let scale = (self.config.image_max_width / w)
            .min(self.config.image_max_height / h)
            .min(1.0);
        let (width, height) = (w * scale, h * scale);

        self.ensure(height);
        let x = self.config.margin + (self.config.content_width() - width) / 2.0;

        let max_px = (width * MAX_PIXELS_PER_POINT).ceil() as u32;
        let embedded = if image.width() > max_px {
            let target_h = ((h * max_px as f32 / w).round() as u32).max(1);
            debug!(
                "Downsampling report image {}x{} to {}x{}",
                image.width(),
                image.height(),
                max_px,
                target_h
            );
            imageops::resize(image, max_px, target_h, imageops::FilterType::Triangle)
        } else {
            image.clone()
        };

        self.images.push(embedded);
        self.current.elements.push(Element::Image {
            x,
            y: self.y,
            width,
            height,
            index: self.images.len() - 1,
        });
        self.y += height;
    }

    fn finish(mut self, generated_at: DateTime<Utc>) -> Layout {
        if !self.current.elements.is_empty() || self.pages.is_empty() {
            self.pages.push(std::mem::take(&mut self.current));
        }

        let total = self.pages.len();
        let footer_y = self.config.page_height - self.config.margin / 2.0;
        for (i, page) in self.pages.iter_mut().enumerate() {
            page.elements.push(Element::Text {
                x: self.config.margin,
                y: footer_y,
                size: 8.0,
                style: FontStyle::Regular,
                color: MUTED,
                text: format!(
                    "Generated at {} - Page {} of {}",
                    generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
                    i + 1,
                    total
                ),
            });
        }

        Layout {
            pages: self.pages,
            images: self.images,
        }
    }
}

/// Lay out a report as pages of positioned elements
pub fn layout(
    report: &Report,
    images: ReportImages<'_>,
    config: &CompilerConfig,
    generated_at: DateTime<Utc>,
) -> Layout {
    let text = captions(LOCALE);
    let body = config.body_size;
    let mut b = Builder::new(config);

    // Header
    b.line(&config.title, config.title_size, FontStyle::Bold, HEADER, 0.0);
    b.gap(body);
    let subject = match &report.subject.name {
        Some(name) => format!("Subject: {} ({})", name, report.subject.id),
        None => format!("Subject: {}", report.subject.id),
    };
    b.line(&subject, body, FontStyle::Regular, BODY, 0.0);
    b.line(
        &format!("Date: {}", report.created_at.format("%Y-%m-%d %H:%M:%S UTC")),
        body,
        FontStyle::Regular,
        BODY,
        0.0,
    );
    b.line(
        &format!(
            "Posture type: {} (confidence {:.2})",
            report.posture.posture_type.label(LOCALE),
            report.posture.confidence
        ),
        body,
        FontStyle::Regular,
        BODY,
        0.0,
    );
    b.gap(body * 0.5);
    match report.overall_score {
        Some(score) => b.line(
            &format!("{}: {:.1}", text.overall_score, score),
            config.heading_size,
            FontStyle::Bold,
            score_color(score),
            0.0,
        ),
        None => b.line(
            &format!("{}: not assessable", text.overall_score),
            config.heading_size,
            FontStyle::Bold,
            MUTED,
            0.0,
        ),
    }

    // Image
    if let Some((caption, image)) = images.preferred() {
        b.heading(caption);
        b.image(image);
    }

    // Score table
    b.heading(text.alignment_scores);
    let score_column = config.content_width() * 0.6;
    b.ensure(body * LEADING * 2.0);
    b.text_at(0.0, TABLE_REGION, body, FontStyle::Bold, BODY);
    b.text_at(score_column, TABLE_SCORE, body, FontStyle::Bold, BODY);
    b.y += body * LEADING;
    let rule_y = b.y - body * 0.3;
    b.rect(0.0, rule_y, config.content_width(), 0.5, RULE);
    if report.scores.is_empty() {
        b.line("No region could be assessed", body, FontStyle::Regular, MUTED, 0.0);
    }
    for score in &report.scores {
        b.ensure(body * LEADING);
        b.text_at(0.0, score.region.label(LOCALE), body, FontStyle::Regular, BODY);
        // Exact value, the table is read back
        b.text_at(
            score_column,
            &format!("{}", score.score),
            body,
            FontStyle::Bold,
            score_color(score.score),
        );
        b.y += body * LEADING;
    }

    // Problems
    b.heading(text.problems);
    if report.problems.is_empty() {
        b.line(text.no_problems, body, FontStyle::Regular, BODY, 0.0);
    }
    for problem in &report.problems {
        let color = severity_color(problem.severity);
        let (description, impact) = catalog::problem_text(problem.region, LOCALE);
        b.ensure(body * LEADING * 3.0);
        b.rect(0.0, b.y + 1.0, 4.0, body * LEADING * 2.0, color);
        b.line(
            &format!(
                "[{}] {} (score {:.1})",
                problem.severity.label(LOCALE),
                problem.region.label(LOCALE),
                problem.score
            ),
            body,
            FontStyle::Bold,
            color,
            10.0,
        );
        b.paragraph(description, body, FontStyle::Regular, BODY, 10.0);
        b.paragraph(&format!("Impact: {}", impact), body, FontStyle::Regular, MUTED, 10.0);
        b.gap(body * 0.4);
    }

    // Muscle guidance, regenerated in the document language
    let recommendations = recommend(&report.problems, LOCALE);
    if !recommendations.is_empty() {
        b.heading(text.recommendations);
        for classification in [
            Classification::Tight,
            Classification::NeedsStretch,
            Classification::NeedsStrengthen,
        ] {
            let group: Vec<_> = recommendations
                .iter()
                .filter(|r| r.classification == classification)
                .collect();
            if group.is_empty() {
                continue;
            }
            b.ensure(body * LEADING * 2.0);
            b.line(classification.label(LOCALE), body + 1.0, FontStyle::Bold, BODY, 0.0);
            for rec in group {
                let side = match rec.side {
                    Some(pose_side) => format!(" ({:?} side)", pose_side).to_lowercase(),
                    None => String::new(),
                };
                b.paragraph(
                    &format!("- {}{}: {}", rec.muscle_group.label(LOCALE), side, rec.note),
                    body,
                    FontStyle::Regular,
                    BODY,
                    10.0,
                );
            }
        }
    }

    // Suggestions
    b.heading("Improvement Suggestions");
    for suggestion in suggest(&report.problems, LOCALE) {
        b.paragraph(&format!("- {}", suggestion), body, FontStyle::Regular, BODY, 10.0);
    }

    b.finish(generated_at)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap() {
        assert_eq!(wrap("", 20), vec![String::new()]);
        assert_eq!(wrap("one two three", 100), vec!["one two three".to_string()]);
        let lines = wrap("aaaa bbbb cccc dddd", 9);
        assert_eq!(lines, vec!["aaaa bbbb", "cccc dddd"]);
    }

    #[test]
    fn test_preferred_image() {
        let annotated = RgbImage::new(10, 10);
        let raw = RgbImage::new(20, 20);
        let empty = RgbImage::new(0, 0);

        let both = ReportImages {
            annotated: Some(&annotated),
            visualization: Some(&raw),
        };
        assert_eq!(both.preferred().unwrap().1.width(), 10);

        let fallback = ReportImages {
            annotated: Some(&empty),
            visualization: Some(&raw),
        };
        assert_eq!(fallback.preferred().unwrap().1.width(), 20);
        assert!(ReportImages::default().preferred().is_none());
    }
}
