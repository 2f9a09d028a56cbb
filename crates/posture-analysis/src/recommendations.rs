//! Muscle guidance and improvement suggestions derived from problems

use pose_model::BodySide;
use serde::{Deserialize, Serialize};

use crate::catalog::{maintenance_suggestions, suggestions, Locale};
use crate::problems::Problem;
use crate::region::Region;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MuscleGroup {
    UpperTrapezius,
    LevatorScapulae,
    Pectorals,
    DeepNeckFlexors,
    QuadratusLumborum,
    /// Gluteus medius and minimus
    HipStabilizers,
    HipFlexors,
    Gluteals,
    ErectorSpinae,
    CoreStabilizers,
    Adductors,
    Hamstrings,
}

impl MuscleGroup {
    pub fn label(self, locale: Locale) -> &'static str {
        match locale {
            Locale::English => match self {
                MuscleGroup::UpperTrapezius => "Upper trapezius",
                MuscleGroup::LevatorScapulae => "Levator scapulae",
                MuscleGroup::Pectorals => "Pectorals",
                MuscleGroup::DeepNeckFlexors => "Deep neck flexors",
                MuscleGroup::QuadratusLumborum => "Quadratus lumborum",
                MuscleGroup::HipStabilizers => "Hip stabilizers (gluteus medius)",
                MuscleGroup::HipFlexors => "Hip flexors (iliopsoas)",
                MuscleGroup::Gluteals => "Gluteus maximus",
                MuscleGroup::ErectorSpinae => "Erector spinae",
                MuscleGroup::CoreStabilizers => "Core stabilizers",
                MuscleGroup::Adductors => "Hip adductors",
                MuscleGroup::Hamstrings => "Hamstrings",
            },
            Locale::Japanese => match self {
                MuscleGroup::UpperTrapezius => "僧帽筋上部",
                MuscleGroup::LevatorScapulae => "肩甲挙筋",
                MuscleGroup::Pectorals => "大胸筋・小胸筋",
                MuscleGroup::DeepNeckFlexors => "深層頸部屈筋",
                MuscleGroup::QuadratusLumborum => "腰方形筋",
                MuscleGroup::HipStabilizers => "股関節安定筋（中殿筋）",
                MuscleGroup::HipFlexors => "股関節屈筋（腸腰筋）",
                MuscleGroup::Gluteals => "大殿筋",
                MuscleGroup::ErectorSpinae => "脊柱起立筋",
                MuscleGroup::CoreStabilizers => "体幹深層筋",
                MuscleGroup::Adductors => "内転筋群",
                MuscleGroup::Hamstrings => "ハムストリングス",
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Tight,
    NeedsStretch,
    NeedsStrengthen,
}

impl Classification {
    /// Precedence when one muscle is flagged by several problems
    fn rank(self) -> u8 {
        match self {
            Classification::Tight => 3,
            Classification::NeedsStrengthen => 2,
            Classification::NeedsStretch => 1,
        }
    }

    pub fn label(self, locale: Locale) -> &'static str {
        match (self, locale) {
            (Classification::Tight, Locale::English) => "Tight",
            (Classification::NeedsStretch, Locale::English) => "Needs stretch",
            (Classification::NeedsStrengthen, Locale::English) => "Needs strengthening",
            (Classification::Tight, Locale::Japanese) => "緊張している筋肉",
            (Classification::NeedsStretch, Locale::Japanese) => "ストレッチが必要な筋肉",
            (Classification::NeedsStrengthen, Locale::Japanese) => "強化が必要な筋肉",
        }
    }
}

/// Which side of the body the guidance applies to, relative to the problem side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SideRelation {
    Same,
    Opposite,
    Both,
}

struct Guidance {
    muscle: MuscleGroup,
    classification: Classification,
    relation: SideRelation,
    note_en: &'static str,
    note_ja: &'static str,
}

const fn guidance(
    muscle: MuscleGroup,
    classification: Classification,
    relation: SideRelation,
    note_en: &'static str,
    note_ja: &'static str,
) -> Guidance {
    Guidance {
        muscle,
        classification,
        relation,
        note_en,
        note_ja,
    }
}

use Classification::{NeedsStrengthen, NeedsStretch, Tight};
use MuscleGroup::*;
use SideRelation::{Both, Opposite, Same};

const SHOULDER_LEVEL: &[Guidance] = &[
    guidance(
        UpperTrapezius,
        Tight,
        Opposite,
        "Raised shoulder is held by an overactive trapezius",
        "挙上した肩の僧帽筋が過緊張しています",
    ),
    guidance(
        LevatorScapulae,
        NeedsStretch,
        Opposite,
        "Stretch the neck side of the raised shoulder",
        "挙上した肩側の首をストレッチしましょう",
    ),
];

const HIP_LEVEL: &[Guidance] = &[
    guidance(
        HipStabilizers,
        NeedsStrengthen,
        Same,
        "Weak stabilizers let the pelvis drop on this side",
        "安定筋の弱さにより骨盤が下がっています",
    ),
    guidance(
        QuadratusLumborum,
        Tight,
        Opposite,
        "Hitches the pelvis up on the raised side",
        "挙上側の骨盤を引き上げています",
    ),
];

const HEAD_POSITION: &[Guidance] = &[
    guidance(
        Pectorals,
        Tight,
        Both,
        "Pulls the shoulders forward",
        "肩を前方に引き込んでいます",
    ),
    guidance(
        DeepNeckFlexors,
        NeedsStrengthen,
        Both,
        "Chin tucks restore head carriage",
        "顎引き運動で頭部位置を改善しましょう",
    ),
    guidance(
        UpperTrapezius,
        NeedsStretch,
        Both,
        "Relieve load from the forward head",
        "前方頭位による負担を和らげましょう",
    ),
];

const SPINE_ALIGNMENT: &[Guidance] = &[
    guidance(
        CoreStabilizers,
        NeedsStrengthen,
        Both,
        "Supports a neutral trunk",
        "体幹を中間位に保ちます",
    ),
    guidance(
        ErectorSpinae,
        NeedsStretch,
        Both,
        "Asymmetric tone shifts the trunk sideways",
        "左右差により体幹が側方へ偏位しています",
    ),
];

const SPINE_CURVATURE: &[Guidance] = &[
    guidance(
        HipFlexors,
        Tight,
        Both,
        "Tilts the pelvis forward",
        "骨盤を前傾させています",
    ),
    guidance(
        CoreStabilizers,
        NeedsStrengthen,
        Both,
        "Controls pelvic tilt",
        "骨盤の傾きを制御します",
    ),
    guidance(
        Gluteals,
        NeedsStrengthen,
        Both,
        "Extends the hip against anterior tilt",
        "骨盤前傾に対して股関節を伸展させます",
    ),
];

const KNEE_ALIGNMENT: &[Guidance] = &[
    guidance(
        HipStabilizers,
        NeedsStrengthen,
        Same,
        "Keeps the knee tracking over the foot",
        "膝がつま先の方向を向くよう保ちます",
    ),
    guidance(
        Adductors,
        Tight,
        Same,
        "Draws the knee inward",
        "膝を内側に引き込んでいます",
    ),
    guidance(
        Hamstrings,
        NeedsStretch,
        Same,
        "Restricts knee extension",
        "膝の伸展を制限しています",
    ),
];

fn table(region: Region) -> &'static [Guidance] {
    match region {
        Region::ShoulderLevel => SHOULDER_LEVEL,
        Region::HipLevel => HIP_LEVEL,
        Region::HeadPosition => HEAD_POSITION,
        Region::SpineAlignment => SPINE_ALIGNMENT,
        Region::SpineCurvature => SPINE_CURVATURE,
        Region::KneeAlignment => KNEE_ALIGNMENT,
    }
}

/// Muscle-group guidance entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub muscle_group: MuscleGroup,
    /// Side of the body, `None` for both sides
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<BodySide>,
    pub classification: Classification,
    pub note: String,
    /// Region of the problem that produced this entry
    pub region: Region,
}

/// Map ranked problems to deduplicated muscle guidance.
///
/// A muscle group appears once, at the position of its first (most severe)
/// problem, with the strongest classification any problem gave it. When
/// problems flag it on different sides it applies to both.
pub fn recommend(problems: &[Problem], locale: Locale) -> Vec<Recommendation> {
    let mut out: Vec<Recommendation> = Vec::new();

    for problem in problems {
        for entry in table(problem.region) {
            let side = match entry.relation {
                SideRelation::Same => problem.side,
                SideRelation::Opposite => problem.side.map(BodySide::opposite),
                SideRelation::Both => None,
            };
            let note = match locale {
                Locale::English => entry.note_en,
                Locale::Japanese => entry.note_ja,
            };

            match out.iter_mut().find(|r| r.muscle_group == entry.muscle) {
                Some(existing) => {
                    if existing.side != side {
                        existing.side = None;
                    }
                    if entry.classification.rank() > existing.classification.rank() {
                        existing.classification = entry.classification;
                        existing.note = note.to_string();
                        existing.region = problem.region;
                    }
                }
                None => out.push(Recommendation {
                    muscle_group: entry.muscle,
                    side,
                    classification: entry.classification,
                    note: note.to_string(),
                    region: problem.region,
                }),
            }
        }
    }

    out
}

/// Free-text suggestions, deduplicated in problem order
pub fn suggest(problems: &[Problem], locale: Locale) -> Vec<String> {
    if problems.is_empty() {
        return maintenance_suggestions(locale).iter().map(|s| s.to_string()).collect();
    }

    let mut out: Vec<String> = Vec::new();
    for problem in problems {
        for text in suggestions(problem.region, locale) {
            if !out.iter().any(|s| s == text) {
                out.push(text.to_string());
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problems::Severity;
    use proptest::prelude::*;

    fn problem(region: Region, severity: Severity, side: Option<BodySide>) -> Problem {
        Problem {
            region,
            severity,
            score: 50.0,
            side,
            description: String::new(),
            impact: String::new(),
        }
    }

    #[test]
    fn test_hip_drop_strengthens_lowered_side() {
        let recs = recommend(
            &[problem(Region::HipLevel, Severity::Low, Some(BodySide::Left))],
            Locale::English,
        );
        assert_eq!(recs[0].muscle_group, MuscleGroup::HipStabilizers);
        assert_eq!(recs[0].classification, Classification::NeedsStrengthen);
        assert_eq!(recs[0].side, Some(BodySide::Left));
        assert_eq!(recs[1].muscle_group, MuscleGroup::QuadratusLumborum);
        assert_eq!(recs[1].side, Some(BodySide::Right));
    }

    #[test]
    fn test_shared_muscle_keeps_strongest_classification() {
        // Upper trapezius is needs-stretch for head position, tight for shoulders
        let recs = recommend(
            &[
                problem(Region::HeadPosition, Severity::High, None),
                problem(Region::ShoulderLevel, Severity::Medium, None),
            ],
            Locale::English,
        );
        let traps: Vec<&Recommendation> = recs
            .iter()
            .filter(|r| r.muscle_group == MuscleGroup::UpperTrapezius)
            .collect();
        assert_eq!(traps.len(), 1);
        assert_eq!(traps[0].classification, Classification::Tight);
        // Position follows the first (most severe) problem
        assert_eq!(recs[2].muscle_group, MuscleGroup::UpperTrapezius);
    }

    #[test]
    fn test_conflicting_sides_merge_to_both() {
        let recs = recommend(
            &[
                problem(Region::HipLevel, Severity::High, Some(BodySide::Left)),
                problem(Region::KneeAlignment, Severity::Medium, Some(BodySide::Right)),
            ],
            Locale::English,
        );
        let stabilizers: Vec<&Recommendation> = recs
            .iter()
            .filter(|r| r.muscle_group == MuscleGroup::HipStabilizers)
            .collect();
        assert_eq!(stabilizers.len(), 1);
        assert_eq!(stabilizers[0].side, None);
    }

    #[test]
    fn test_suggestions() {
        assert_eq!(suggest(&[], Locale::English).len(), 3);
        let s = suggest(
            &[
                problem(Region::HipLevel, Severity::High, None),
                problem(Region::HipLevel, Severity::Low, None),
            ],
            Locale::English,
        );
        assert_eq!(s.len(), 3);
    }

    fn any_problem() -> impl Strategy<Value = Problem> {
        (
            prop::sample::select(Region::ALL.to_vec()),
            prop::sample::select(vec![Severity::Low, Severity::Medium, Severity::High]),
            prop::sample::select(vec![None, Some(BodySide::Left), Some(BodySide::Right)]),
        )
            .prop_map(|(region, severity, side)| problem(region, severity, side))
    }

    proptest! {
        #[test]
        fn prop_no_duplicate_muscles(problems in proptest::collection::vec(any_problem(), 0..8)) {
            let recs = recommend(&problems, Locale::English);
            for (i, a) in recs.iter().enumerate() {
                for b in &recs[i + 1..] {
                    prop_assert_ne!(a.muscle_group, b.muscle_group);
                }
            }
        }
    }
}
