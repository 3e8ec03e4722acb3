use crate::models::{Insight, ReferenceDistribution, Tone};
use crate::trend::{improvement_percentage, mean};

pub const FALLBACK_MESSAGE: &str = "Complete more assessments and journal entries for insights!";

fn insight(tone: Tone, message: impl Into<String>) -> Insight {
    Insight {
        message: message.into(),
        tone,
    }
}

fn progress_insight(scores: &[i64]) -> Option<Insight> {
    let (first, last) = match scores {
        [first, .., last] => (*first, *last),
        _ => return None,
    };

    let message = match improvement_percentage(first, last) {
        Some(pct) if pct > 10.0 => insight(
            Tone::Positive,
            format!("Great progress! Your EQ improved by {pct:.1}%"),
        ),
        Some(pct) if pct > 0.0 => insight(
            Tone::Positive,
            format!("Steady progress with {pct:.1}% EQ improvement"),
        ),
        _ => insight(
            Tone::Concern,
            "Focus on emotional awareness to boost EQ scores",
        ),
    };
    Some(message)
}

fn sentiment_insight(sentiments: &[f64]) -> Option<Insight> {
    if sentiments.is_empty() {
        return None;
    }

    let average = mean(sentiments);
    let result = if average > 20.0 {
        insight(
            Tone::Positive,
            "Your journal shows a positive emotional tone - keep it up!",
        )
    } else if average < -20.0 {
        insight(
            Tone::Concern,
            "Consider stress management techniques for better emotional balance",
        )
    } else {
        insight(
            Tone::Neutral,
            "You maintain a balanced emotional tone in your reflections",
        )
    };
    Some(result)
}

fn benchmark_insight(scores: &[i64], global: Option<&ReferenceDistribution>) -> Option<Insight> {
    let latest = *scores.last()?;
    let global = global?;

    let result = if latest as f64 > global.avg_score {
        insight(
            Tone::Positive,
            format!("You are above the global average ({:.1})!", global.avg_score),
        )
    } else {
        insight(
            Tone::Neutral,
            format!("The global average is {:.1}. Keep practicing!", global.avg_score),
        )
    };
    Some(result)
}

/// Every matching rule contributes, in rule order; the fallback only
/// appears when nothing else did.
pub fn generate(
    scores: &[i64],
    sentiments: &[f64],
    global: Option<&ReferenceDistribution>,
) -> Vec<Insight> {
    let mut insights: Vec<Insight> = [
        progress_insight(scores),
        sentiment_insight(sentiments),
        benchmark_insight(scores, global),
    ]
    .into_iter()
    .flatten()
    .collect();

    if insights.is_empty() {
        insights.push(insight(Tone::Neutral, FALLBACK_MESSAGE));
    }

    insights
}

#[cfg(test)]
mod tests {
    use super::*;

    fn global(avg_score: f64) -> ReferenceDistribution {
        ReferenceDistribution {
            key: "global".to_string(),
            avg_score,
            std_dev: 6.0,
            sample_size: 1000,
        }
    }

    #[test]
    fn fallback_when_nothing_is_known() {
        let insights = generate(&[], &[], None);
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].message, FALLBACK_MESSAGE);
    }

    #[test]
    fn rules_are_emitted_in_order() {
        let reference = global(30.0);
        let insights = generate(&[20, 25, 28], &[25.0, 30.0], Some(&reference));
        assert_eq!(insights.len(), 3);
        assert_eq!(insights[0].message, "Great progress! Your EQ improved by 40.0%");
        assert_eq!(insights[0].tone, Tone::Positive);
        assert!(insights[1].message.contains("positive emotional tone"));
        assert_eq!(insights[2].message, "The global average is 30.0. Keep practicing!");
        assert!(insights.iter().all(|i| i.message != FALLBACK_MESSAGE));
    }

    #[test]
    fn progress_bands() {
        let steady = generate(&[20, 21], &[], None);
        assert_eq!(steady[0].message, "Steady progress with 5.0% EQ improvement");

        let flat = generate(&[20, 18], &[], None);
        assert_eq!(flat[0].tone, Tone::Concern);
        assert!(flat[0].message.starts_with("Focus on emotional awareness"));
    }

    #[test]
    fn undefined_improvement_asks_for_focus() {
        let insights = generate(&[0, 15], &[], None);
        assert_eq!(insights.len(), 1);
        assert!(insights[0].message.starts_with("Focus on emotional awareness"));
    }

    #[test]
    fn single_score_skips_progress_rule() {
        let reference = global(30.0);
        let insights = generate(&[35], &[], Some(&reference));
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].message, "You are above the global average (30.0)!");
    }

    #[test]
    fn sentiment_tone_bands() {
        assert_eq!(generate(&[], &[-30.0, -25.0], None)[0].tone, Tone::Concern);
        assert_eq!(generate(&[], &[5.0, -5.0], None)[0].tone, Tone::Neutral);
        assert_eq!(generate(&[], &[21.0], None)[0].tone, Tone::Positive);
    }

    #[test]
    fn benchmark_without_history_falls_back() {
        let reference = global(30.0);
        let insights = generate(&[], &[], Some(&reference));
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].message, FALLBACK_MESSAGE);
    }
}
