//! Report Compiler
//!
//! Lays a diagnosis report out on A4 pages (header, image, score table,
//! problems, muscle guidance, suggestions) and writes it as PDF using the
//! standard Helvetica fonts. The score table can be parsed back out of the
//! produced bytes with [`read_score_table`].

pub mod config;
pub mod layout;
pub mod pdf;

pub use config::CompilerConfig;
pub use layout::{Element, Layout, Page, ReportImages};
pub use pdf::{extract_text, read_score_table};

use chrono::Utc;
use posture_analysis::Report;
use thiserror::Error;
use tracing::info;

/// Report compiler error types
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid compiler configuration: {0}")]
    Config(String),

    #[error("Score table not found in document")]
    ScoreTableMissing,

    #[error("Malformed score table: {0}")]
    MalformedTable(String),
}

/// Compiles reports into paginated documents
#[derive(Debug, Clone)]
pub struct ReportCompiler {
    config: CompilerConfig,
}

impl ReportCompiler {
    pub fn new(config: CompilerConfig) -> Result<Self, ReportError> {
        if config.content_width() <= 0.0 || config.content_height() <= 0.0 {
            return Err(ReportError::Config(format!(
                "margin {} leaves no room on a {}x{} page",
                config.margin, config.page_width, config.page_height
            )));
        }
        if config.image_max_width <= 0.0 || config.image_max_height <= 0.0 {
            return Err(ReportError::Config("image box must be positive".into()));
        }
        if config.body_size <= 0.0 || config.heading_size <= 0.0 || config.title_size <= 0.0 {
            return Err(ReportError::Config("font sizes must be positive".into()));
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Page layout without serializing it
    pub fn layout(&self, report: &Report, images: ReportImages<'_>) -> Layout {
        layout::layout(report, images, &self.config, Utc::now())
    }

    /// Compile a report to PDF bytes
    pub fn compile(
        &self,
        report: &Report,
        images: ReportImages<'_>,
    ) -> Result<Vec<u8>, ReportError> {
        let layout = self.layout(report, images);
        let bytes = pdf::write(&layout, &self.config, &self.config.title)?;
        info!(
            "Compiled report {} into {} pages ({} bytes)",
            report.id,
            layout.pages.len(),
            bytes.len()
        );
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pose_model::BodySide;
    use posture_analysis::{
        AlignmentScore, BodyMetrics, PostureAssessment, PostureType, Problem, Region, Severity,
        Subject,
    };
    use uuid::Uuid;

    fn report(scores: &[(Region, f64)], problems: usize) -> Report {
        let problems = (0..problems)
            .map(|i| Problem {
                region: Region::ALL[i % Region::ALL.len()],
                severity: Severity::High,
                score: 30.0,
                side: Some(BodySide::Left),
                description: String::new(),
                impact: String::new(),
            })
            .collect();
        Report {
            id: Uuid::new_v4(),
            subject: Subject::new("u-42").with_name("Test Subject"),
            created_at: Utc::now(),
            posture: PostureAssessment::explicit(PostureType::Front),
            overall_score: Some(72.5),
            scores: scores
                .iter()
                .map(|&(region, score)| AlignmentScore {
                    region,
                    score,
                    deviation: 0.0,
                    side: None,
                })
                .collect(),
            problems,
            recommendations: Vec::new(),
            suggestions: Vec::new(),
            metrics: BodyMetrics::default(),
            images: Vec::new(),
        }
    }

    fn compiler() -> ReportCompiler {
        ReportCompiler::new(CompilerConfig::default()).unwrap()
    }

    #[test]
    fn test_invalid_margins_rejected() {
        let config = CompilerConfig {
            margin: 400.0,
            ..Default::default()
        };
        assert!(matches!(ReportCompiler::new(config), Err(ReportError::Config(_))));
    }

    #[test]
    fn test_layout_sections_in_order() {
        let sample = report(&[(Region::HipLevel, 61.3)], 1);
        let layout = compiler().layout(&sample, ReportImages::default());
        let texts: Vec<&str> = layout.texts().collect();
        let pos = |needle: &str| texts.iter().position(|t| *t == needle).unwrap();
        assert!(pos("Posture Diagnosis Report") < pos("Alignment Scores"));
        assert!(pos("Alignment Scores") < pos("Problems Detected"));
        assert!(pos("Problems Detected") < pos("Recommendations"));
        assert!(texts.contains(&"61.3"));
    }

    #[test]
    fn test_long_reports_paginate() {
        let sample = report(&[(Region::HipLevel, 40.0)], 30);
        let layout = compiler().layout(&sample, ReportImages::default());
        assert!(layout.pages.len() > 1);
        let config = CompilerConfig::default();
        for page in &layout.pages {
            for element in &page.elements {
                if let Element::Text { y, .. } = element {
                    assert!(*y <= config.page_height);
                }
            }
        }
    }

    #[test]
    fn test_image_scaled_to_box() {
        let big = image::RgbImage::new(2000, 1000);
        let images = ReportImages {
            annotated: Some(&big),
            visualization: None,
        };
        let config = CompilerConfig::default();
        let layout = compiler().layout(&report(&[], 0), images);
        let (width, height) = layout
            .pages
            .iter()
            .flat_map(|p| &p.elements)
            .find_map(|e| match e {
                Element::Image { width, height, .. } => Some((*width, *height)),
                _ => None,
            })
            .unwrap();
        assert!((width - config.image_max_width).abs() < 0.01);
        assert!((width / height - 2.0).abs() < 0.01);
        // Embedded pixels are capped relative to the printed size
        assert!(layout.images[0].width() < 2000);
    }

    #[test]
    fn test_pdf_score_table_round_trip() {
        let scores = [
            (Region::ShoulderLevel, 100.0),
            (Region::HipLevel, 80.5),
            (Region::HeadPosition, 33.3),
            (Region::KneeAlignment, 0.1),
        ];
        let bytes = compiler().compile(&report(&scores, 2), ReportImages::default()).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
        let table = read_score_table(&bytes).unwrap();
        assert_eq!(table, scores.to_vec());
        for ((_, a), (_, b)) in table.iter().zip(scores.iter()) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }
}
