use std::fmt::Write;

use chrono::NaiveDateTime;

use crate::benchmark::{self, BenchmarkAxes, ReferenceTable};
use crate::models::{
    BenchmarkComparison, ComparativeAnalysis, Insight, JournalEntry, Response, ScoreRecord,
    TrendSummary,
};
use crate::{insights, journal, scoring, trend};

pub struct ReportContext<'a> {
    pub username: &'a str,
    pub profession: Option<&'a str>,
    pub lookback_days: i64,
    pub now: NaiveDateTime,
    pub history: &'a [ScoreRecord],
    pub responses: &'a [Response],
    pub journal: &'a [JournalEntry],
    pub references: Option<&'a ReferenceTable>,
}

/// Signed percentage, or "N/A" when it cannot be computed.
pub fn signed_percentage(value: Option<f64>) -> String {
    match value {
        Some(value) => format!("{value:+.1}%"),
        None => "N/A".to_string(),
    }
}

pub fn format_timestamp(value: Option<NaiveDateTime>) -> String {
    value
        .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

/// Benchmarks the latest attempt, using its age to pick the age group.
pub fn latest_benchmarks(
    history: &[ScoreRecord],
    references: &ReferenceTable,
    profession: Option<&str>,
) -> Vec<BenchmarkComparison> {
    let Some(latest) = history.last() else {
        return Vec::new();
    };
    let group = scoring::age_group(latest.age);
    let axes = BenchmarkAxes {
        age_group: (group != "unknown").then_some(group),
        profession,
    };
    benchmark::compare(latest.total_score as f64, references, axes)
}

pub fn write_trend(output: &mut String, summary: &TrendSummary) {
    let _ = writeln!(output, "- Total attempts: {}", summary.total_attempts);
    let _ = writeln!(output, "- First score: {}", summary.first_score);
    let _ = writeln!(output, "- Latest score: {}", summary.last_score);
    let _ = writeln!(output, "- Average score: {:.1}", summary.average_score);
    let _ = writeln!(output, "- Highest score: {}", summary.max_score);
    let _ = writeln!(output, "- Lowest score: {}", summary.min_score);
    let _ = writeln!(output, "- Standard deviation: {:.2}", summary.std_dev);
    let _ = writeln!(
        output,
        "- Total improvement: {:+} points ({})",
        summary.total_improvement,
        signed_percentage(summary.improvement_percentage)
    );
    let _ = writeln!(output, "- Trend direction: {}", summary.trend_direction.label());
    let _ = writeln!(
        output,
        "- First attempt: {}",
        format_timestamp(summary.first_attempt_at)
    );
    let _ = writeln!(
        output,
        "- Latest attempt: {}",
        format_timestamp(summary.last_attempt_at)
    );
}

pub fn write_comparative(output: &mut String, analysis: &ComparativeAnalysis) {
    if let Some(historical) = &analysis.historical {
        let _ = writeln!(
            output,
            "- Historical: average {:.1} over {} attempts",
            historical.average_score, historical.attempts
        );
    }
    if let Some(recent) = &analysis.recent {
        let _ = writeln!(
            output,
            "- Last {} days: average {:.1} over {} attempts",
            analysis.lookback_days, recent.average_score, recent.attempts
        );
    }
    if let Some(change) = analysis.performance_change {
        let _ = writeln!(
            output,
            "- Performance change: {change:+.1} ({})",
            signed_percentage(analysis.performance_change_percentage)
        );
    }
    if analysis.historical.is_none() && analysis.recent.is_none() {
        let _ = writeln!(output, "No attempts recorded.");
    }
}

pub fn write_benchmarks(output: &mut String, comparisons: &[BenchmarkComparison]) {
    for comparison in comparisons {
        let _ = writeln!(
            output,
            "- {} ({}): average {:.1}, difference {:+.1}, percentile {} (n = {})",
            comparison.axis.label(),
            comparison.reference_key,
            comparison.avg_score,
            comparison.difference,
            comparison.percentile,
            comparison.sample_size
        );
    }
}

pub fn write_insights(output: &mut String, insights: &[Insight]) {
    for insight in insights {
        let _ = writeln!(output, "- {}", insight.message);
    }
}

pub fn build_report(context: &ReportContext<'_>) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# EQ Insights Report");
    let _ = writeln!(
        output,
        "Generated for {} on {}",
        context.username,
        context.now.format("%Y-%m-%d")
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Score History");

    match trend::summarize(context.history) {
        Some(summary) => write_trend(&mut output, &summary),
        None => {
            let _ = writeln!(output, "No assessments recorded yet.");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent vs Historical");
    let analysis = trend::compare_periods(context.history, context.now, context.lookback_days);
    write_comparative(&mut output, &analysis);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Benchmarks");
    let comparisons = context
        .references
        .map(|references| latest_benchmarks(context.history, references, context.profession))
        .unwrap_or_default();
    if comparisons.is_empty() {
        let _ = writeln!(output, "No benchmark comparison available.");
    } else {
        write_benchmarks(&mut output, &comparisons);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Response Patterns");
    match trend::response_patterns(context.responses) {
        Some(patterns) => {
            let _ = writeln!(output, "- Total responses: {}", patterns.total_responses);
            let _ = writeln!(output, "- Questions answered: {}", patterns.unique_questions);
            let _ = writeln!(output, "- Average answer: {:.2}", patterns.average_response);
            let _ = writeln!(output, "- Consistency (std dev): {:.2}", patterns.response_std_dev);
        }
        None => {
            let _ = writeln!(output, "No responses recorded.");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Journal");
    match journal::summarize(context.journal) {
        Some(summary) => {
            let _ = writeln!(output, "- Entries: {}", summary.entries);
            let _ = writeln!(output, "- Average sentiment: {:.1}", summary.average_sentiment);
            let _ = writeln!(output, "- Most positive: {:.1}", summary.most_positive);
            for pattern in &summary.top_patterns {
                let _ = writeln!(
                    output,
                    "- {}: {} times ({:.1}%)",
                    pattern.pattern, pattern.count, pattern.share
                );
            }
        }
        None => {
            let _ = writeln!(output, "No journal entries recorded.");
        }
    }

    let scores: Vec<i64> = context.history.iter().map(|r| r.total_score).collect();
    let generated = insights::generate(
        &scores,
        &journal::sentiments(context.journal),
        context.references.map(|references| &references.global),
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Insights");
    write_insights(&mut output, &generated);

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReferenceDistribution;
    use chrono::{Duration, NaiveDate};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn record(id: i64, total_score: i64, days_before: i64) -> ScoreRecord {
        ScoreRecord {
            id,
            username: "riley".to_string(),
            age: Some(31),
            total_score,
            timestamp: Some(now() - Duration::days(days_before)),
        }
    }

    fn references() -> ReferenceTable {
        let distribution = |key: &str, avg_score: f64| ReferenceDistribution {
            key: key.to_string(),
            avg_score,
            std_dev: 6.0,
            sample_size: 250,
        };
        ReferenceTable {
            global: distribution("global", 34.0),
            age_groups: vec![distribution("adult", 28.0)],
            professions: vec![],
        }
    }

    #[test]
    fn signed_percentage_renders_missing_as_na() {
        assert_eq!(signed_percentage(Some(12.345)), "+12.3%");
        assert_eq!(signed_percentage(Some(-4.0)), "-4.0%");
        assert_eq!(signed_percentage(None), "N/A");
    }

    #[test]
    fn latest_benchmarks_use_age_group_of_latest_attempt() {
        let history = vec![record(1, 20, 60), record(2, 28, 2)];
        let comparisons = latest_benchmarks(&history, &references(), Some("nurse"));
        assert_eq!(comparisons.len(), 2);
        assert_eq!(comparisons[0].percentile, 16.0);
        assert_eq!(comparisons[0].difference, -6.0);
        assert_eq!(comparisons[1].reference_key, "adult");
        assert_eq!(comparisons[1].percentile, 50.0);
    }

    #[test]
    fn report_covers_every_section() {
        let history = vec![record(1, 20, 90), record(2, 25, 45), record(3, 28, 2)];
        let references = references();
        let context = ReportContext {
            username: "riley",
            profession: None,
            lookback_days: 30,
            now: now(),
            history: &history,
            responses: &[],
            journal: &[],
            references: Some(&references),
        };
        let report = build_report(&context);

        assert!(report.starts_with("# EQ Insights Report\nGenerated for riley on 2026-03-01"));
        assert!(report.contains("- Trend direction: stable"));
        assert!(report.contains("- Total improvement: +8 points (+40.0%)"));
        assert!(report.contains("- Historical: average 22.5 over 2 attempts"));
        assert!(report.contains("- Last 30 days: average 28.0 over 1 attempts"));
        assert!(report.contains("- global (global): average 34.0, difference -6.0, percentile 16"));
        assert!(report.contains("No responses recorded."));
        assert!(report.contains("No journal entries recorded."));
        assert!(report.contains("- Great progress! Your EQ improved by 40.0%"));
    }

    #[test]
    fn empty_report_still_renders() {
        let context = ReportContext {
            username: "new-user",
            profession: None,
            lookback_days: 30,
            now: now(),
            history: &[],
            responses: &[],
            journal: &[],
            references: None,
        };
        let report = build_report(&context);
        assert!(report.contains("No assessments recorded yet."));
        assert!(report.contains("No attempts recorded."));
        assert!(report.contains("No benchmark comparison available."));
        assert!(report.contains(insights::FALLBACK_MESSAGE));
    }
}
