use std::collections::HashMap;

use crate::models::{JournalEntry, JournalSummary, PatternCount};
use crate::trend::mean;

const TOP_PATTERNS: usize = 3;
const PATTERN_SEPARATOR: &str = "; ";

pub fn sentiments(entries: &[JournalEntry]) -> Vec<f64> {
    entries.iter().map(|entry| entry.sentiment_score).collect()
}

pub fn summarize(entries: &[JournalEntry]) -> Option<JournalSummary> {
    if entries.is_empty() {
        return None;
    }

    let scores = sentiments(entries);
    let most_positive = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for entry in entries {
        let Some(patterns) = entry.emotional_patterns.as_deref() else {
            continue;
        };
        for pattern in patterns.split(PATTERN_SEPARATOR) {
            let pattern = pattern.trim();
            if !pattern.is_empty() {
                *counts.entry(pattern).or_insert(0) += 1;
            }
        }
    }

    let mut top_patterns: Vec<PatternCount> = counts
        .into_iter()
        .map(|(pattern, count)| PatternCount {
            pattern: pattern.to_string(),
            count,
            share: 100.0 * count as f64 / entries.len() as f64,
        })
        .collect();
    top_patterns.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.pattern.cmp(&b.pattern)));
    top_patterns.truncate(TOP_PATTERNS);

    Some(JournalSummary {
        entries: entries.len(),
        average_sentiment: mean(&scores),
        most_positive,
        top_patterns,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(sentiment_score: f64, patterns: Option<&str>) -> JournalEntry {
        JournalEntry {
            sentiment_score,
            emotional_patterns: patterns.map(str::to_string),
        }
    }

    #[test]
    fn summary_counts_patterns_per_entry() {
        let entries = vec![
            entry(30.0, Some("gratitude; calm")),
            entry(-10.0, Some("stress; calm")),
            entry(10.0, Some("calm; stress; focus")),
            entry(-5.0, None),
        ];
        let summary = summarize(&entries).unwrap();
        assert_eq!(summary.entries, 4);
        assert_eq!(summary.average_sentiment, 6.25);
        assert_eq!(summary.most_positive, 30.0);

        let top: Vec<(&str, usize)> = summary
            .top_patterns
            .iter()
            .map(|p| (p.pattern.as_str(), p.count))
            .collect();
        assert_eq!(top, vec![("calm", 3), ("stress", 2), ("focus", 1)]);
        assert_eq!(summary.top_patterns[0].share, 75.0);
    }

    #[test]
    fn no_entries_no_summary() {
        assert!(summarize(&[]).is_none());
    }
}
