//! Pre-authored, localized text tables

use serde::{Deserialize, Serialize};

use crate::region::Region;

/// Output language
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locale {
    #[default]
    English,
    Japanese,
}

/// Description and impact text for a problem in a region
pub fn problem_text(region: Region, locale: Locale) -> (&'static str, &'static str) {
    match locale {
        Locale::English => match region {
            Region::ShoulderLevel => (
                "Left and right shoulders are at different heights",
                "May cause neck and shoulder pain",
            ),
            Region::HipLevel => (
                "The pelvis is tilted",
                "May cause lower back pain and poor posture",
            ),
            Region::HeadPosition => (
                "The head is offset from the shoulders (possible forward head posture)",
                "Increases the load on the neck and shoulders and may cause headaches",
            ),
            Region::SpineAlignment => (
                "The spine is not in a straight line",
                "May cause poor posture and back pain",
            ),
            Region::SpineCurvature => (
                "The trunk leans away from vertical (rounded or sway back tendency)",
                "May cause lower back pain as well as neck and shoulder pain",
            ),
            Region::KneeAlignment => (
                "Hip, knee and ankle are not in a straight line",
                "Increases stress on the knee joints",
            ),
        },
        Locale::Japanese => match region {
            Region::ShoulderLevel => (
                "左右の肩の高さが異なります",
                "首や肩の痛みの原因になる可能性があります",
            ),
            Region::HipLevel => (
                "骨盤が傾いています",
                "腰痛や姿勢不良の原因になる可能性があります",
            ),
            Region::HeadPosition => (
                "頭部が中心からずれています（ストレートネックの可能性）",
                "首や肩の負担が増加し、頭痛の原因になる可能性があります",
            ),
            Region::SpineAlignment => (
                "背骨が一直線上にありません",
                "姿勢不良や痛みの原因になる可能性があります",
            ),
            Region::SpineCurvature => (
                "体幹が垂直から傾いています（猫背・反り腰の傾向）",
                "腰痛や首・肩の痛みの原因になる可能性があります",
            ),
            Region::KneeAlignment => (
                "股関節・膝・足首が一直線上にありません",
                "膝関節への負担が増加する可能性があります",
            ),
        },
    }
}

/// Free-text improvement suggestions for a problem region
pub fn suggestions(region: Region, locale: Locale) -> &'static [&'static str] {
    match locale {
        Locale::English => match region {
            Region::ShoulderLevel => &[
                "Do exercises that balance the left and right shoulders",
                "Avoid carrying loads on one side only",
                "Mobilize the shoulder blades daily",
            ],
            Region::HipLevel => &[
                "Stretch to correct pelvic tilt",
                "Practice single-leg balance exercises",
                "Improve hip joint flexibility",
            ],
            Region::HeadPosition => &[
                "Stretch the neck and shoulders every day",
                "Tuck the chin back regularly during desk work",
                "Open the chest with pectoral stretches",
            ],
            Region::SpineAlignment => &[
                "Stretch to improve spinal flexibility",
                "Strengthen the core",
                "Build the habit of checking your posture",
            ],
            Region::SpineCurvature => &[
                "Balance abdominal and back muscle strength",
                "Train the pelvic floor muscles",
                "Strengthen the muscles that support the lower back",
            ],
            Region::KneeAlignment => &[
                "Strengthen the hip stabilizers",
                "Practice slow squats with the knees tracking over the toes",
            ],
        },
        Locale::Japanese => match region {
            Region::ShoulderLevel => &[
                "左右の肩のバランスを整えるエクササイズを行いましょう",
                "片側だけに負担をかけないよう注意しましょう",
                "肩甲骨を動かすエクササイズを推奨します",
            ],
            Region::HipLevel => &[
                "骨盤の歪みを改善するストレッチを行いましょう",
                "片足立ちのバランスエクササイズを推奨します",
                "股関節の柔軟性を高めるストレッチを行いましょう",
            ],
            Region::HeadPosition => &[
                "首と肩のストレッチを毎日行いましょう",
                "デスクワーク中は定期的に顎を引く運動をしましょう",
                "胸を開くストレッチ（胸筋ストレッチ）を推奨します",
            ],
            Region::SpineAlignment => &[
                "背骨の柔軟性を高めるストレッチを行いましょう",
                "体幹を強化するエクササイズを推奨します",
                "正しい姿勢を意識する習慣をつけましょう",
            ],
            Region::SpineCurvature => &[
                "腹筋と背筋のバランスを整えましょう",
                "骨盤底筋を鍛えるエクササイズを推奨します",
                "腰を支える筋肉を強化しましょう",
            ],
            Region::KneeAlignment => &[
                "股関節の安定筋を強化しましょう",
                "膝がつま先の方向を向くようにゆっくりスクワットを行いましょう",
            ],
        },
    }
}

/// Suggestions returned when no problem was detected
pub fn maintenance_suggestions(locale: Locale) -> &'static [&'static str] {
    match locale {
        Locale::English => &[
            "Your posture is in good shape. Keep it up",
            "Continue regular stretching and exercise",
            "Avoid holding the same position for long periods",
        ],
        Locale::Japanese => &[
            "現在の姿勢は良好です。この状態を維持しましょう",
            "定期的なストレッチとエクササイズを継続してください",
            "長時間同じ姿勢を取らないよう注意しましょう",
        ],
    }
}

/// Fixed captions used by renderers and documents
#[derive(Debug, Clone, Copy)]
pub struct Captions {
    pub title: &'static str,
    pub overall_score: &'static str,
    pub alignment_scores: &'static str,
    pub problems: &'static str,
    pub recommendations: &'static str,
    pub no_problems: &'static str,
}

pub fn captions(locale: Locale) -> Captions {
    match locale {
        Locale::English => Captions {
            title: "Posture Diagnosis",
            overall_score: "Overall Score",
            alignment_scores: "Alignment Scores",
            problems: "Problems Detected",
            recommendations: "Recommendations",
            no_problems: "No problems detected",
        },
        Locale::Japanese => Captions {
            title: "姿勢診断結果",
            overall_score: "総合姿勢スコア",
            alignment_scores: "整列スコア",
            problems: "検出された問題",
            recommendations: "改善提案",
            no_problems: "問題は検出されませんでした",
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_region_has_text() {
        for locale in [Locale::English, Locale::Japanese] {
            for region in Region::ALL {
                let (description, impact) = problem_text(region, locale);
                assert!(!description.is_empty());
                assert!(!impact.is_empty());
                assert!(!suggestions(region, locale).is_empty());
            }
            assert_eq!(maintenance_suggestions(locale).len(), 3);
        }
    }
}
