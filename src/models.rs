use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub question_id: i64,
    pub value: u8,
    pub timestamp: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreRecord {
    pub id: i64,
    pub username: String,
    pub age: Option<i64>,
    pub total_score: i64,
    pub timestamp: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JournalEntry {
    pub sentiment_score: f64,
    pub emotional_patterns: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceDistribution {
    pub key: String,
    pub avg_score: f64,
    pub std_dev: f64,
    pub sample_size: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BenchmarkAxis {
    Global,
    AgeGroup,
    Profession,
}

impl BenchmarkAxis {
    pub fn label(self) -> &'static str {
        match self {
            BenchmarkAxis::Global => "global",
            BenchmarkAxis::AgeGroup => "age group",
            BenchmarkAxis::Profession => "profession",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkComparison {
    pub axis: BenchmarkAxis,
    pub reference_key: String,
    pub avg_score: f64,
    pub difference: f64,
    pub percentile: f64,
    pub sample_size: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendDirection {
    StrongUpward,
    Upward,
    Stable,
    SlightDecline,
    Declining,
    InsufficientData,
}

impl TrendDirection {
    pub fn label(self) -> &'static str {
        match self {
            TrendDirection::StrongUpward => "strong upward",
            TrendDirection::Upward => "upward",
            TrendDirection::Stable => "stable",
            TrendDirection::SlightDecline => "slight decline",
            TrendDirection::Declining => "declining",
            TrendDirection::InsufficientData => "insufficient data",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrendSummary {
    pub total_attempts: usize,
    pub first_score: i64,
    pub last_score: i64,
    pub average_score: f64,
    pub max_score: i64,
    pub min_score: i64,
    pub std_dev: f64,
    pub total_improvement: i64,
    /// `None` when the first score is zero.
    pub improvement_percentage: Option<f64>,
    pub trend_direction: TrendDirection,
    pub first_attempt_at: Option<NaiveDateTime>,
    pub last_attempt_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PeriodSummary {
    pub average_score: f64,
    pub attempts: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparativeAnalysis {
    pub lookback_days: i64,
    pub recent: Option<PeriodSummary>,
    pub historical: Option<PeriodSummary>,
    pub performance_change: Option<f64>,
    pub performance_change_percentage: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResponsePatterns {
    pub total_responses: usize,
    pub unique_questions: usize,
    pub average_response: f64,
    pub response_std_dev: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Positive,
    Neutral,
    Concern,
}

impl Tone {
    pub fn label(self) -> &'static str {
        match self {
            Tone::Positive => "positive",
            Tone::Neutral => "neutral",
            Tone::Concern => "concern",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Insight {
    pub message: String,
    pub tone: Tone,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PatternCount {
    pub pattern: String,
    pub count: usize,
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JournalSummary {
    pub entries: usize,
    pub average_sentiment: f64,
    pub most_positive: f64,
    pub top_patterns: Vec<PatternCount>,
}
