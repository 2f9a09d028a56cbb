//! Diagnosis pipeline orchestration

use image::RgbImage;
use pose_model::{CoordinateMapper, Detection, Resolution};
use posture_analysis::{Analyzer, ImageKind, ImageRef, PostureHint, Report, Subject};
use report_pdf::{ReportCompiler, ReportImages};
use tracing::{debug, info, warn};
use visualizer::{RenderConfig, RenderWarning, Renderer};

use crate::settings::PipelineConfig;
use crate::DiagnosisError;

/// One image to diagnose
#[derive(Debug, Clone)]
pub struct DiagnosisRequest {
    pub subject: Subject,
    pub image: RgbImage,
    pub detection: Detection,
    pub hint: PostureHint,
}

/// One video frame and its detection
#[derive(Debug, Clone)]
pub struct Frame {
    pub image: RgbImage,
    pub detection: Detection,
}

/// Result of one diagnosis run
#[derive(Debug, Clone)]
pub struct Diagnosis {
    pub report: Report,
    /// Skeleton and keypoints only
    pub visualization: RgbImage,
    /// Skeleton, alignment lines and score overlays
    pub annotated: RgbImage,
    /// Render degradations, deduplicated
    pub warnings: Vec<RenderWarning>,
}

impl Diagnosis {
    pub fn images(&self) -> ReportImages<'_> {
        ReportImages {
            annotated: Some(&self.annotated),
            visualization: Some(&self.visualization),
        }
    }
}

/// The full diagnosis chain under one configuration
#[derive(Debug, Clone)]
pub struct Pipeline {
    analyzer: Analyzer,
    render: RenderConfig,
    compiler: ReportCompiler,
}

impl Pipeline {
    /// Validate every stage's configuration up front.
    ///
    /// The renderer takes its visibility threshold and locale from the
    /// analysis section, so overlay and report agree on which landmarks are
    /// absent and on the caption language.
    pub fn new(config: PipelineConfig) -> Result<Self, DiagnosisError> {
        let render = config
            .render
            .shared_with(config.analysis.visibility_threshold, config.analysis.locale);
        let analyzer = Analyzer::new(config.analysis)?;
        Renderer::new(render.clone())?;
        let compiler = ReportCompiler::new(config.report)?;

        Ok(Self {
            analyzer,
            render,
            compiler,
        })
    }

    /// Diagnose one image
    pub fn diagnose(&self, request: DiagnosisRequest) -> Result<Diagnosis, DiagnosisError> {
        let DiagnosisRequest {
            subject,
            image,
            detection,
            hint,
        } = request;

        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(DiagnosisError::InvalidInput(format!(
                "image is empty ({}x{})",
                width, height
            )));
        }
        info!("Diagnosing {}x{} image for subject {}", width, height, subject.id);

        let mapper = CoordinateMapper::new(detection.processing, Resolution::new(width, height))?;
        let skeleton = mapper.map(&detection.skeleton);
        debug!(
            "{} landmarks visible (rescaled: {})",
            skeleton.visible_count(self.render.visibility_threshold),
            !mapper.is_identity_scale()
        );
        let analysis = self.analyzer.analyze(&skeleton, hint);

        // Fresh renderer per call, so the font is loaded and dropped with this request
        let renderer = Renderer::new(self.render.clone())?;
        let visualization = renderer.render_skeleton(&image, &skeleton);

        let report = analysis.into_report(subject).with_image(ImageRef {
            kind: ImageKind::Visualization,
            width,
            height,
            uri: None,
        });
        let annotated = renderer.render_annotated(&image, &skeleton, &report);
        let report = report.with_image(ImageRef {
            kind: ImageKind::AnnotatedReport,
            width,
            height,
            uri: None,
        });

        let mut warnings = visualization.warnings;
        for warning in annotated.warnings {
            if !warnings.contains(&warning) {
                warnings.push(warning);
            }
        }
        for warning in &warnings {
            warn!("Rendering degraded: {}", warning);
        }

        info!(
            "Diagnosis {} complete: {:?}, overall {:?}, {} problems",
            report.id,
            report.posture.posture_type,
            report.overall_score,
            report.problems.len()
        );

        Ok(Diagnosis {
            report,
            visualization: visualization.image,
            annotated: annotated.image,
            warnings,
        })
    }

    /// Diagnose video frames one after another. Frames share nothing; an
    /// invalid frame yields an error in its slot without stopping the rest.
    pub fn diagnose_frames<I>(
        &self,
        subject: &Subject,
        hint: PostureHint,
        frames: I,
    ) -> Vec<Result<Diagnosis, DiagnosisError>>
    where
        I: IntoIterator<Item = Frame>,
    {
        frames
            .into_iter()
            .enumerate()
            .map(|(index, frame)| {
                debug!("Frame {}", index);
                self.diagnose(DiagnosisRequest {
                    subject: subject.clone(),
                    image: frame.image,
                    detection: frame.detection,
                    hint,
                })
            })
            .collect()
    }

    /// Compile the PDF document of a diagnosis
    pub fn compile_pdf(&self, diagnosis: &Diagnosis) -> Result<Vec<u8>, DiagnosisError> {
        Ok(self.compiler.compile(&diagnosis.report, diagnosis.images())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use pose_model::{Keypoint, Landmark, Skeleton};
    use posture_analysis::{AnalysisConfig, Locale, Region};

    fn detection() -> Detection {
        let kp = |id, x, y| Keypoint::new(id, x, y, 0.9);
        Detection {
            skeleton: Skeleton::new(vec![
                kp(Landmark::Nose, 160.0, 40.0),
                kp(Landmark::LeftShoulder, 190.0, 100.0),
                kp(Landmark::RightShoulder, 130.0, 100.0),
                kp(Landmark::LeftHip, 185.0, 200.0),
                kp(Landmark::RightHip, 135.0, 200.0),
            ])
            .unwrap(),
            processing: Resolution::new(320, 320),
        }
    }

    fn request(image: RgbImage) -> DiagnosisRequest {
        DiagnosisRequest {
            subject: Subject::new("u-1"),
            image,
            detection: detection(),
            hint: PostureHint::Front,
        }
    }

    #[test]
    fn test_empty_image_rejected() {
        let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
        let result = pipeline.diagnose(request(RgbImage::new(0, 0)));
        assert!(matches!(result, Err(DiagnosisError::InvalidInput(_))));
    }

    #[test]
    fn test_invalid_processing_resolution_rejected() {
        let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
        let mut req = request(RgbImage::new(64, 64));
        req.detection.processing = Resolution::new(0, 320);
        assert!(matches!(pipeline.diagnose(req), Err(DiagnosisError::Pose(_))));
    }

    #[test]
    fn test_images_attached_to_report() {
        let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
        let diagnosis = pipeline.diagnose(request(RgbImage::new(640, 640))).unwrap();

        assert_eq!(diagnosis.visualization.dimensions(), (640, 640));
        assert_eq!(diagnosis.annotated.dimensions(), (640, 640));
        let annotated = diagnosis.report.image(ImageKind::AnnotatedReport).unwrap();
        assert_eq!((annotated.width, annotated.height), (640, 640));
        assert!(diagnosis.report.image(ImageKind::Visualization).is_some());
    }

    #[test]
    fn test_frames_are_independent() {
        let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
        let frames = vec![
            Frame {
                image: RgbImage::new(320, 320),
                detection: detection(),
            },
            Frame {
                image: RgbImage::new(0, 0),
                detection: detection(),
            },
            Frame {
                image: RgbImage::new(320, 320),
                detection: detection(),
            },
        ];
        let results = pipeline.diagnose_frames(&Subject::new("u-1"), PostureHint::Auto, frames);

        assert_eq!(results.len(), 3);
        assert!(results[1].is_err());
        let first = results[0].as_ref().unwrap();
        let last = results[2].as_ref().unwrap();
        assert_ne!(first.report.id, last.report.id);
        assert_eq!(first.report.scores, last.report.scores);
    }

    #[test]
    fn test_invalid_render_config_rejected() {
        let config = PipelineConfig {
            render: RenderConfig {
                keypoint_radius: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(Pipeline::new(config), Err(DiagnosisError::Render(_))));
    }

    #[test]
    fn test_renderer_follows_analysis_threshold_and_locale() {
        let config = PipelineConfig {
            analysis: AnalysisConfig {
                visibility_threshold: 0.5,
                locale: Locale::Japanese,
                ..Default::default()
            },
            render: RenderConfig {
                visibility_threshold: 0.1,
                locale: Locale::English,
                draw_text: false,
                ..Default::default()
            },
            ..Default::default()
        };
        let pipeline = Pipeline::new(config).unwrap();
        assert_eq!(pipeline.render.visibility_threshold, 0.5);
        assert_eq!(pipeline.render.locale, Locale::Japanese);

        // Hips below the analysis threshold but above the render default
        let kp = |id, x, y, c| Keypoint::new(id, x, y, c);
        let background = Rgb([200, 200, 200]);
        let diagnosis = pipeline
            .diagnose(DiagnosisRequest {
                subject: Subject::new("u-1"),
                image: RgbImage::from_pixel(320, 320, background),
                detection: Detection {
                    skeleton: Skeleton::new(vec![
                        kp(Landmark::Nose, 160.0, 40.0, 0.9),
                        kp(Landmark::LeftShoulder, 190.0, 100.0, 0.9),
                        kp(Landmark::RightShoulder, 130.0, 100.0, 0.9),
                        kp(Landmark::LeftHip, 200.0, 200.0, 0.4),
                        kp(Landmark::RightHip, 120.0, 200.0, 0.4),
                    ])
                    .unwrap(),
                    processing: Resolution::new(320, 320),
                },
                hint: PostureHint::Front,
            })
            .unwrap();

        assert!(diagnosis.report.score_for(Region::HipLevel).is_none());
        // Hip bone midpoint stays untouched in both images
        assert_eq!(*diagnosis.annotated.get_pixel(160, 200), background);
        assert_eq!(*diagnosis.visualization.get_pixel(160, 200), background);
    }
}
