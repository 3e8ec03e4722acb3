use std::collections::HashSet;

use chrono::{Duration, NaiveDateTime};

use crate::models::{
    ComparativeAnalysis, PeriodSummary, Response, ResponsePatterns, ScoreRecord, TrendDirection,
    TrendSummary,
};

const TREND_WINDOW: usize = 3;

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let avg = mean(values);
    let variance = values.iter().map(|value| (value - avg).powi(2)).sum::<f64>()
        / values.len() as f64;
    variance.sqrt()
}

pub fn trend_direction(scores: &[i64]) -> TrendDirection {
    if scores.len() < TREND_WINDOW {
        return TrendDirection::InsufficientData;
    }

    let as_f64: Vec<f64> = scores.iter().map(|score| *score as f64).collect();
    let early = mean(&as_f64[..TREND_WINDOW]);
    let recent = mean(&as_f64[as_f64.len() - TREND_WINDOW..]);
    let recent_trend = recent - early;

    if recent_trend > 5.0 {
        TrendDirection::StrongUpward
    } else if recent_trend > 0.0 {
        TrendDirection::Upward
    } else if recent_trend < -5.0 {
        TrendDirection::Declining
    } else if recent_trend < 0.0 {
        TrendDirection::SlightDecline
    } else {
        TrendDirection::Stable
    }
}

pub fn improvement_percentage(first_score: i64, last_score: i64) -> Option<f64> {
    if first_score == 0 {
        return None;
    }
    Some(100.0 * (last_score - first_score) as f64 / first_score as f64)
}

/// Statistics over a chronologically ordered history; `None` when it is empty.
pub fn summarize(history: &[ScoreRecord]) -> Option<TrendSummary> {
    let first = history.first()?;
    let last = history.last()?;

    let scores: Vec<i64> = history.iter().map(|record| record.total_score).collect();
    let as_f64: Vec<f64> = scores.iter().map(|score| *score as f64).collect();

    Some(TrendSummary {
        total_attempts: history.len(),
        first_score: first.total_score,
        last_score: last.total_score,
        average_score: mean(&as_f64),
        max_score: scores.iter().copied().max().unwrap_or(first.total_score),
        min_score: scores.iter().copied().min().unwrap_or(first.total_score),
        std_dev: std_dev(&as_f64),
        total_improvement: last.total_score - first.total_score,
        improvement_percentage: improvement_percentage(first.total_score, last.total_score),
        trend_direction: trend_direction(&scores),
        first_attempt_at: history.iter().find_map(|record| record.timestamp),
        last_attempt_at: history.iter().rev().find_map(|record| record.timestamp),
    })
}

pub fn lookback_cutoff(now: NaiveDateTime, lookback_days: i64) -> NaiveDateTime {
    now - Duration::days(lookback_days.max(1))
}

fn period(scores: &[f64]) -> Option<PeriodSummary> {
    if scores.is_empty() {
        return None;
    }
    Some(PeriodSummary {
        average_score: mean(scores),
        attempts: scores.len(),
    })
}

/// Splits history into the lookback window and everything before it.
/// Undated records count as historical.
pub fn compare_periods(
    history: &[ScoreRecord],
    now: NaiveDateTime,
    lookback_days: i64,
) -> ComparativeAnalysis {
    let cutoff = lookback_cutoff(now, lookback_days);
    let (recent, historical): (Vec<&ScoreRecord>, Vec<&ScoreRecord>) = history
        .iter()
        .partition(|record| record.timestamp.is_some_and(|at| at >= cutoff));

    let recent = period(
        &recent
            .iter()
            .map(|record| record.total_score as f64)
            .collect::<Vec<_>>(),
    );
    let historical = period(
        &historical
            .iter()
            .map(|record| record.total_score as f64)
            .collect::<Vec<_>>(),
    );

    let (performance_change, performance_change_percentage) = match (&recent, &historical) {
        (Some(recent), Some(historical)) => {
            let change = recent.average_score - historical.average_score;
            let pct = if historical.average_score == 0.0 {
                None
            } else {
                Some(100.0 * change / historical.average_score)
            };
            (Some(change), pct)
        }
        _ => (None, None),
    };

    ComparativeAnalysis {
        lookback_days: lookback_days.max(1),
        recent,
        historical,
        performance_change,
        performance_change_percentage,
    }
}

pub fn response_patterns(responses: &[Response]) -> Option<ResponsePatterns> {
    if responses.is_empty() {
        return None;
    }

    let values: Vec<f64> = responses
        .iter()
        .map(|response| f64::from(response.value))
        .collect();
    let unique_questions = responses
        .iter()
        .map(|response| response.question_id)
        .collect::<HashSet<_>>()
        .len();

    Some(ResponsePatterns {
        total_responses: responses.len(),
        unique_questions,
        average_response: mean(&values),
        response_std_dev: std_dev(&values),
    })
}
