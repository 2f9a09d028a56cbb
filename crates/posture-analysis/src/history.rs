//! Summary statistics over a subject's past reports

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::region::Region;
use crate::report::Report;

/// Change in overall score (points) that counts as a trend
const TREND_DELTA: f64 = 10.0;

/// Number of problem regions listed in a summary
const TOP_PROBLEMS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improving,
    Stable,
    Declining,
    InsufficientData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionFrequency {
    pub region: Region,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySummary {
    pub report_count: usize,
    pub average_score: Option<f64>,
    pub common_problems: Vec<RegionFrequency>,
    pub trend: Trend,
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

impl HistorySummary {
    /// Summarize reports created at or after `since`
    pub fn from_reports(reports: &[Report], since: DateTime<Utc>) -> Self {
        let mut period: Vec<&Report> = reports.iter().filter(|r| r.created_at >= since).collect();
        period.sort_by_key(|r| r.created_at);

        let scores: Vec<f64> = period.iter().filter_map(|r| r.overall_score).collect();
        let average_score = mean(&scores).map(|m| (m * 10.0).round() / 10.0);

        let mut counts: HashMap<Region, usize> = HashMap::new();
        for report in &period {
            for problem in &report.problems {
                *counts.entry(problem.region).or_default() += 1;
            }
        }
        let mut common_problems: Vec<RegionFrequency> = counts
            .into_iter()
            .map(|(region, count)| RegionFrequency { region, count })
            .collect();
        common_problems.sort_by(|a, b| b.count.cmp(&a.count).then(a.region.cmp(&b.region)));
        common_problems.truncate(TOP_PROBLEMS);

        Self {
            report_count: period.len(),
            average_score,
            common_problems,
            trend: trend(&scores),
        }
    }
}

/// Compare the first and last thirds of chronologically ordered scores
fn trend(scores: &[f64]) -> Trend {
    if scores.len() < 2 {
        return Trend::InsufficientData;
    }
    let third = (scores.len() / 3).max(1);
    let (Some(early), Some(late)) = (
        mean(&scores[..third]),
        mean(&scores[scores.len() - third..]),
    ) else {
        return Trend::InsufficientData;
    };

    let delta = late - early;
    if delta > TREND_DELTA {
        Trend::Improving
    } else if delta < -TREND_DELTA {
        Trend::Declining
    } else {
        Trend::Stable
    }
}
