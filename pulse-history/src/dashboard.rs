//! Aggregations over the history shown by the dashboard.
use crate::HistoryEntry;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

const TREND_POINTS: usize = 10;
const TOP_THEMES: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: DateTime<Utc>,
    pub score: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThemeCount {
    pub theme: String,
    pub count: usize,
}

/// Praise versus complaint points across the whole history.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeedbackBreakdown {
    pub positive: usize,
    pub negative: usize,
    pub positive_percent: f64,
    pub negative_percent: f64,
}

impl FeedbackBreakdown {
    pub fn total(&self) -> usize {
        self.positive + self.negative
    }
}

/// Scores of the ten newest entries, oldest first. Expects newest-first input.
pub fn score_trend(entries: &[HistoryEntry]) -> Vec<TrendPoint> {
    entries
        .iter()
        .take(TREND_POINTS)
        .rev()
        .map(|e| TrendPoint {
            date: e.date,
            score: e.analysis.overall_score,
        })
        .collect()
}

/// Most frequent positive themes; ties keep the order they were first seen in.
pub fn top_themes(entries: &[HistoryEntry]) -> Vec<ThemeCount> {
    let mut counts: Vec<ThemeCount> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for theme in entries
        .iter()
        .flat_map(|e| e.analysis.positive_feedback.common_themes.iter())
    {
        match index.get(theme.as_str()) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(theme.as_str(), counts.len());
                counts.push(ThemeCount {
                    theme: theme.clone(),
                    count: 1,
                });
            }
        }
    }

    // stable sort
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(TOP_THEMES);
    counts
}

pub fn feedback_breakdown(entries: &[HistoryEntry]) -> FeedbackBreakdown {
    let positive: usize = entries
        .iter()
        .map(|e| e.analysis.positive_feedback.what_customers_love.len())
        .sum();
    let negative: usize = entries
        .iter()
        .map(|e| e.analysis.negative_feedback.key_areas_of_dissatisfaction.len())
        .sum();

    let total = positive + negative;
    if total == 0 {
        return FeedbackBreakdown::default();
    }
    FeedbackBreakdown {
        positive,
        negative,
        positive_percent: positive as f64 / total as f64 * 100.0,
        negative_percent: negative as f64 / total as f64 * 100.0,
    }
}
