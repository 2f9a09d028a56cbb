use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pose_model::{Keypoint, Landmark, Skeleton};
use posture_analysis::{AnalysisConfig, Analyzer, PostureClassifier, PostureHint};

fn standing_skeleton() -> Skeleton {
    let kp = |id, x, y| Keypoint::new(id, x, y, 0.9);
    Skeleton::new(vec![
        kp(Landmark::Nose, 322.0, 80.0),
        kp(Landmark::LeftEye, 332.0, 70.0),
        kp(Landmark::RightEye, 312.0, 70.0),
        kp(Landmark::LeftEar, 345.0, 78.0),
        kp(Landmark::RightEar, 298.0, 78.0),
        kp(Landmark::LeftShoulder, 382.0, 204.0),
        kp(Landmark::RightShoulder, 260.0, 198.0),
        kp(Landmark::LeftElbow, 398.0, 300.0),
        kp(Landmark::RightElbow, 244.0, 300.0),
        kp(Landmark::LeftWrist, 402.0, 390.0),
        kp(Landmark::RightWrist, 240.0, 392.0),
        kp(Landmark::LeftHip, 368.0, 412.0),
        kp(Landmark::RightHip, 272.0, 400.0),
        kp(Landmark::LeftKnee, 362.0, 560.0),
        kp(Landmark::RightKnee, 280.0, 552.0),
        kp(Landmark::LeftAnkle, 360.0, 700.0),
        kp(Landmark::RightAnkle, 282.0, 698.0),
    ])
    .unwrap()
}

fn bench_classify(c: &mut Criterion) {
    let config = AnalysisConfig::default();
    let classifier = PostureClassifier::new(config.classifier, config.visibility_threshold);
    let skeleton = standing_skeleton();

    c.bench_function("posture_classify", |b| {
        b.iter(|| classifier.classify(black_box(&skeleton)));
    });
}

fn bench_analyze(c: &mut Criterion) {
    let analyzer = Analyzer::new(AnalysisConfig::default()).unwrap();
    let skeleton = standing_skeleton();

    c.bench_function("full_analysis", |b| {
        b.iter(|| analyzer.analyze(black_box(&skeleton), PostureHint::Auto));
    });
}

criterion_group!(benches, bench_classify, bench_analyze);
criterion_main!(benches);
