//! Overlay colours

use image::Rgb;
use pose_model::{BodyPart, Landmark};
use posture_analysis::Severity;

pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
/// Keypoints detected below the visibility threshold
pub const MUTED: Rgb<u8> = Rgb([128, 128, 128]);

pub const GOOD: Rgb<u8> = Rgb([0, 255, 0]);
pub const FAIR: Rgb<u8> = Rgb([255, 165, 0]);
pub const POOR: Rgb<u8> = Rgb([255, 0, 0]);

pub fn part_color(part: BodyPart) -> Rgb<u8> {
    match part {
        BodyPart::Head => Rgb([0, 200, 255]),
        BodyPart::Shoulder => Rgb([0, 255, 0]),
        BodyPart::Elbow => Rgb([255, 0, 255]),
        BodyPart::Wrist => Rgb([255, 255, 0]),
        BodyPart::Hip => Rgb([0, 0, 255]),
        BodyPart::Knee => Rgb([255, 165, 0]),
        BodyPart::Ankle => Rgb([128, 0, 128]),
    }
}

/// Bones take the colour of their distal landmark
pub fn bone_color(_from: Landmark, to: Landmark) -> Rgb<u8> {
    part_color(to.body_part())
}

/// Green at 80 and above, orange at 60 and above, red below
pub fn score_color(score: f64) -> Rgb<u8> {
    if score >= 80.0 {
        GOOD
    } else if score >= 60.0 {
        FAIR
    } else {
        POOR
    }
}

pub fn severity_color(severity: Severity) -> Rgb<u8> {
    match severity {
        Severity::High => POOR,
        Severity::Medium => FAIR,
        Severity::Low => Rgb([0, 255, 255]),
    }
}
