//! Plain-text rendering for terminal output.
use pulse_analysis::{AnalysisResult, Suggestion};
use pulse_history::HistoryEntry;
use pulse_history::dashboard::{feedback_breakdown, score_trend, top_themes};
use pulse_llm::traits::GroundingChunk;

pub const EMPTY_DASHBOARD: &str = "Your dashboard is ready.\nAnalyze a post or business review, and your performance data will appear here.";

fn score_band(score: u8) -> &'static str {
    match score {
        75.. => "good",
        50..=74 => "fair",
        _ => "poor",
    }
}

fn bullets(out: &mut String, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    out.push_str(&format!("  {title}:\n"));
    for item in items {
        out.push_str(&format!("    - {item}\n"));
    }
}

pub fn analysis(result: &AnalysisResult, sources: &[GroundingChunk]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Overall score: {}/100 ({})\n",
        result.overall_score,
        score_band(result.overall_score)
    ));

    out.push_str("\nPositive feedback\n");
    bullets(&mut out, "Common themes", &result.positive_feedback.common_themes);
    bullets(&mut out, "What customers love", &result.positive_feedback.what_customers_love);

    out.push_str("\nNegative feedback\n");
    bullets(&mut out, "Common themes", &result.negative_feedback.common_themes);
    bullets(
        &mut out,
        "Key areas of dissatisfaction",
        &result.negative_feedback.key_areas_of_dissatisfaction,
    );

    if !result.suggested_improvements.is_empty() {
        out.push_str("\nSuggested improvements\n");
        for s in &result.suggested_improvements {
            match s {
                Suggestion::Text(text) => out.push_str(&format!("  - {text}\n")),
                Suggestion::Structured(s) => {
                    out.push_str(&format!("  - [{}] {}\n", s.area, s.suggestion))
                }
            }
        }
    }

    if let Some(competitors) = result.competitor_comparison.as_deref().filter(|c| !c.is_empty()) {
        out.push_str("\nCompetitor comparison\n");
        for c in competitors {
            out.push_str(&format!("  - {}: {}\n", c.name, c.analysis));
        }
    }

    if let Some(history) = &result.historical_analysis {
        out.push_str("\nHistorical analysis\n");
        bullets(&mut out, "Content evolution", &history.content_evolution);
        bullets(&mut out, "Engagement trends", &history.engagement_trends);
        bullets(&mut out, "Key milestones", &history.key_milestones);
    }

    if !sources.is_empty() {
        out.push_str("\nSources\n");
        for source in sources {
            if let Some(web) = &source.web {
                let label = if web.title.is_empty() { &web.uri } else { &web.title };
                out.push_str(&format!("  - {label} <{}>\n", web.uri));
            } else if let Some(maps) = &source.maps {
                let label = if maps.title.is_empty() {
                    "Google Maps Source"
                } else {
                    maps.title.as_str()
                };
                out.push_str(&format!("  - {label} <{}>\n", maps.uri));
                let snippets = maps
                    .place_answer_sources
                    .as_ref()
                    .map(|p| p.review_snippets.as_slice())
                    .unwrap_or_default();
                for snippet in snippets {
                    out.push_str(&format!(
                        "      Review by {} <{}>: \"{}\"\n",
                        snippet.author, snippet.uri, snippet.text
                    ));
                }
            }
        }
    }

    out
}

pub fn history(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return "No analyses recorded yet.\n".to_string();
    }
    let mut out = String::new();
    for e in entries {
        out.push_str(&format!(
            "{}  {:<14} {:>3}  {}\n",
            e.date.format("%Y-%m-%d %H:%M"),
            e.platform.label(),
            e.analysis.overall_score,
            e.post
        ));
    }
    out
}

pub fn dashboard(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return format!("{EMPTY_DASHBOARD}\n");
    }

    let mut out = String::new();
    out.push_str("Performance score trend\n");
    for point in score_trend(entries) {
        let bar = "#".repeat(usize::from(point.score) / 5);
        out.push_str(&format!(
            "  {}  {:>3} {bar}\n",
            point.date.format("%b %d"),
            point.score
        ));
    }

    out.push_str("\nTop positive themes\n");
    let themes = top_themes(entries);
    if themes.is_empty() {
        out.push_str("  No positive themes identified yet.\n");
    }
    for (rank, t) in themes.iter().enumerate() {
        out.push_str(&format!("  {}. {} ({})\n", rank + 1, t.theme, t.count));
    }

    out.push_str("\nFeedback breakdown\n");
    let b = feedback_breakdown(entries);
    if b.total() == 0 {
        out.push_str("  No feedback points recorded yet.\n");
    } else {
        out.push_str(&format!(
            "  Positive: {} points ({}%)\n",
            b.positive,
            b.positive_percent.round()
        ));
        out.push_str(&format!(
            "  Negative: {} points ({}%)\n",
            b.negative,
            b.negative_percent.round()
        ));
    }
    out
}
