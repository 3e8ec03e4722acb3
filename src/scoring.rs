use std::collections::HashSet;

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::models::Response;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikertScale {
    max: u8,
}

impl LikertScale {
    pub const FOUR_POINT: LikertScale = LikertScale { max: 4 };
    pub const FIVE_POINT: LikertScale = LikertScale { max: 5 };

    pub fn from_max(max: u8) -> Option<Self> {
        match max {
            4 => Some(Self::FOUR_POINT),
            5 => Some(Self::FIVE_POINT),
            _ => None,
        }
    }

    pub fn max(self) -> u8 {
        self.max
    }

    pub fn contains(self, value: u8) -> bool {
        (1..=self.max).contains(&value)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResponseError {
    #[error("answer {value} to question {question_id} is outside the 1-{max} scale")]
    OutOfRange { question_id: i64, value: u8, max: u8 },
    #[error("question {0} has already been answered")]
    AlreadyAnswered(i64),
}

/// Collects one answer per question in submission order.
#[derive(Debug)]
pub struct ResponseRecorder {
    scale: LikertScale,
    answered: HashSet<i64>,
    responses: Vec<Response>,
}

impl ResponseRecorder {
    pub fn new(scale: LikertScale) -> Self {
        Self {
            scale,
            answered: HashSet::new(),
            responses: Vec::new(),
        }
    }

    pub fn record(
        &mut self,
        question_id: i64,
        value: u8,
        timestamp: Option<NaiveDateTime>,
    ) -> Result<(), ResponseError> {
        if !self.scale.contains(value) {
            return Err(ResponseError::OutOfRange {
                question_id,
                value,
                max: self.scale.max(),
            });
        }
        if !self.answered.insert(question_id) {
            return Err(ResponseError::AlreadyAnswered(question_id));
        }

        self.responses.push(Response {
            question_id,
            value,
            timestamp,
        });
        Ok(())
    }

    pub fn responses(&self) -> &[Response] {
        &self.responses
    }

    pub fn values(&self) -> Vec<u8> {
        self.responses.iter().map(|response| response.value).collect()
    }

    pub fn summary(&self) -> ScoreSummary {
        aggregate(&self.values(), self.scale.max())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreSummary {
    pub total_score: i64,
    pub max_score: i64,
    pub percentage: f64,
}

pub fn aggregate(values: &[u8], scale_max: u8) -> ScoreSummary {
    let total_score: i64 = values.iter().map(|value| i64::from(*value)).sum();
    let max_score = values.len() as i64 * i64::from(scale_max);
    let percentage = if max_score == 0 {
        0.0
    } else {
        100.0 * total_score as f64 / max_score as f64
    };

    ScoreSummary {
        total_score,
        max_score,
        percentage,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpretation {
    Excellent,
    Good,
    Growth,
}

impl Interpretation {
    pub fn message(self) -> &'static str {
        match self {
            Interpretation::Excellent => "Excellent emotional awareness and regulation skills!",
            Interpretation::Good => "Good emotional intelligence with a solid foundation!",
            Interpretation::Growth => "Great opportunity for emotional intelligence growth!",
        }
    }
}

/// Bands the average answer value; an empty attempt lands in the growth band.
pub fn interpret(summary: &ScoreSummary, question_count: usize) -> Interpretation {
    if question_count == 0 {
        return Interpretation::Growth;
    }
    let average = summary.total_score as f64 / question_count as f64;
    if average >= 4.0 {
        Interpretation::Excellent
    } else if average >= 3.0 {
        Interpretation::Good
    } else {
        Interpretation::Growth
    }
}

pub fn age_group(age: Option<i64>) -> &'static str {
    match age {
        Some(age) if age < 0 => "unknown",
        Some(0..=12) => "child",
        Some(13..=19) => "teen",
        Some(20..=64) => "adult",
        Some(_) => "senior",
        None => "unknown",
    }
}
