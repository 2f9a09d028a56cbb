//! Posture Diagnosis - Command Line Entry Point
//!
//! ```text
//! posture-diagnose <image> <keypoints.json> [output_dir]
//!     [--config <file>] [--subject <id>] [--posture <hint>] [--processing <WxH>]
//!     [--batch <image:keypoints>]...
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Utc};
use diagnosis::{
    export_jsonl, init_logging, DiagnosisRequest, MemoryReportStore, Pipeline, PipelineConfig,
    ReportStore,
};
use pose_model::{Detection, Keypoint, Resolution, Skeleton};
use posture_analysis::{HistorySummary, ImageKind, PostureHint, Subject};
use serde::Deserialize;
use tracing::{error, info};

const USAGE: &str = "usage: posture-diagnose <image> <keypoints.json> [output_dir] \
[--config <file>] [--subject <id>] [--posture auto|front|side|back] [--processing <WxH>] \
[--batch <image:keypoints>]...";

#[derive(Debug, Default)]
struct Args {
    inputs: Vec<(PathBuf, PathBuf)>,
    output_dir: PathBuf,
    config: Option<PathBuf>,
    subject: String,
    hint: PostureHint,
    processing: Option<Resolution>,
}

fn parse_args(raw: impl IntoIterator<Item = String>) -> Result<Args> {
    let mut args = Args {
        output_dir: PathBuf::from("."),
        subject: "anonymous".to_string(),
        ..Default::default()
    };
    let mut positional = Vec::new();
    let mut iter = raw.into_iter();

    while let Some(arg) = iter.next() {
        let mut value = |name: &str| iter.next().ok_or_else(|| anyhow!("{} needs a value", name));
        match arg.as_str() {
            "--config" => args.config = Some(PathBuf::from(value("--config")?)),
            "--subject" => args.subject = value("--subject")?,
            "--posture" => {
                args.hint = value("--posture")?
                    .parse()
                    .map_err(|e: String| anyhow!(e))?
            }
            "--processing" => {
                args.processing = Some(
                    value("--processing")?
                        .parse()
                        .map_err(|e: String| anyhow!("--processing: {}", e))?,
                )
            }
            "--batch" => {
                let pair = value("--batch")?;
                let (image, keypoints) = pair
                    .rsplit_once(':')
                    .ok_or_else(|| anyhow!("--batch expects image:keypoints, got {}", pair))?;
                args.inputs.push((PathBuf::from(image), PathBuf::from(keypoints)));
            }
            "-h" | "--help" => bail!(USAGE),
            flag if flag.starts_with("--") => bail!("unknown option {}\n{}", flag, USAGE),
            _ => positional.push(arg.clone()),
        }
    }

    match positional.len() {
        0 => {}
        2 | 3 => {
            args.inputs
                .insert(0, (PathBuf::from(&positional[0]), PathBuf::from(&positional[1])));
            if let Some(dir) = positional.get(2) {
                args.output_dir = PathBuf::from(dir);
            }
        }
        _ => bail!(USAGE),
    }
    if args.inputs.is_empty() {
        bail!(USAGE);
    }
    Ok(args)
}

/// Detection object as written to disk, validated after parsing
#[derive(Deserialize)]
struct DetectionFile {
    skeleton: Vec<Keypoint>,
    processing: Resolution,
}

/// Either a full detection or a bare keypoint array
enum KeypointFile {
    Detection(Detection),
    Keypoints(Skeleton),
}

impl KeypointFile {
    /// Parse either form; skeleton validation errors come back as [`PoseError`]
    fn parse(text: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        if value.is_array() {
            let keypoints: Vec<Keypoint> = serde_json::from_value(value).context("keypoint array")?;
            Ok(KeypointFile::Keypoints(Skeleton::new(keypoints)?))
        } else {
            let file: DetectionFile = serde_json::from_value(value).context("detection object")?;
            Ok(KeypointFile::Detection(Detection {
                skeleton: Skeleton::new(file.skeleton)?,
                processing: file.processing,
            }))
        }
    }
}

fn load_request(image_path: &Path, keypoints_path: &Path, args: &Args) -> Result<DiagnosisRequest> {
    let image = image::open(image_path)
        .with_context(|| format!("reading image {}", image_path.display()))?
        .to_rgb8();

    let text = std::fs::read_to_string(keypoints_path)
        .with_context(|| format!("reading keypoints {}", keypoints_path.display()))?;
    let detection = match KeypointFile::parse(&text)
        .with_context(|| format!("parsing keypoints {}", keypoints_path.display()))?
    {
        KeypointFile::Detection(detection) => Detection {
            processing: args.processing.unwrap_or(detection.processing),
            ..detection
        },
        KeypointFile::Keypoints(skeleton) => Detection {
            skeleton,
            // Keypoints already in image coordinates unless told otherwise
            processing: args
                .processing
                .unwrap_or_else(|| Resolution::new(image.width(), image.height())),
        },
    };

    Ok(DiagnosisRequest {
        subject: Subject::new(&args.subject),
        image,
        detection,
        hint: args.hint,
    })
}

fn run_one(
    pipeline: &Pipeline,
    request: DiagnosisRequest,
    out_dir: &Path,
) -> Result<posture_analysis::Report> {
    let diagnosis = pipeline.diagnose(request)?;
    std::fs::create_dir_all(out_dir).with_context(|| format!("creating {}", out_dir.display()))?;

    let visualization = out_dir.join("visualization.png");
    let annotated = out_dir.join("annotated.png");
    diagnosis
        .visualization
        .save(&visualization)
        .with_context(|| format!("writing {}", visualization.display()))?;
    diagnosis
        .annotated
        .save(&annotated)
        .with_context(|| format!("writing {}", annotated.display()))?;

    let pdf = pipeline.compile_pdf(&diagnosis)?;
    std::fs::write(out_dir.join("report.pdf"), pdf).context("writing report.pdf")?;

    let report = diagnosis
        .report
        .with_image_uri(ImageKind::Visualization, visualization.display().to_string())
        .with_image_uri(ImageKind::AnnotatedReport, annotated.display().to_string());
    std::fs::write(out_dir.join("report.json"), serde_json::to_vec_pretty(&report)?)
        .context("writing report.json")?;

    for warning in &diagnosis.warnings {
        info!("Warning: {}", warning);
    }
    info!(
        "Wrote report {} to {} (overall score {:?})",
        report.id,
        out_dir.display(),
        report.overall_score
    );
    Ok(report)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    info!("=== Posture Diagnosis v{} ===", env!("CARGO_PKG_VERSION"));

    let args = parse_args(std::env::args().skip(1))?;
    let config = PipelineConfig::load(args.config.as_deref()).context("loading configuration")?;
    let pipeline = Arc::new(Pipeline::new(config)?);
    let args = Arc::new(args);
    let started: DateTime<Utc> = Utc::now();

    let single = args.inputs.len() == 1;
    let mut tasks = Vec::with_capacity(args.inputs.len());
    for (index, (image, keypoints)) in args.inputs.iter().cloned().enumerate() {
        let pipeline = Arc::clone(&pipeline);
        let args = Arc::clone(&args);
        let out_dir = if single {
            args.output_dir.clone()
        } else {
            args.output_dir.join(format!("{:03}", index))
        };
        tasks.push(tokio::task::spawn_blocking(move || {
            let request = load_request(&image, &keypoints, &args)?;
            run_one(&pipeline, request, &out_dir)
        }));
    }

    let store = MemoryReportStore::new();
    let mut failures = 0usize;
    for task in tasks {
        match task.await.context("diagnosis task panicked")? {
            Ok(report) => store.save(report)?,
            Err(e) => {
                error!("Diagnosis failed: {:#}", e);
                failures += 1;
            }
        }
    }

    if !single {
        let reports = store.all()?;
        let path = args.output_dir.join("reports.jsonl");
        let file = std::fs::File::create(&path)
            .with_context(|| format!("creating {}", path.display()))?;
        export_jsonl(&reports, std::io::BufWriter::new(file))?;

        let history = store.list_for_subject(&args.subject)?;
        let since = history.first().map(|r| r.created_at).unwrap_or(started);
        let summary = HistorySummary::from_reports(&history, since);
        info!(
            "Batch summary: {} reports, average {:?}, trend {:?}",
            summary.report_count, summary.average_score, summary.trend
        );
    }

    if failures > 0 {
        bail!("{} of {} diagnoses failed", failures, args.inputs.len());
    }
    Ok(())
}
