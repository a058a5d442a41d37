use std::fmt;

use serde::{Deserialize, Serialize};

use crate::assessment::TestId;
use crate::question::QuestionOptions;

pub type ResultId = i64;

/// A row of `GET /candidates/results`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ResultSummary {
    pub id: ResultId,

    pub name: String,
    pub email: String,
    pub test_code: String,
    #[serde(default)]
    pub score: String,
    #[serde(default)]
    pub score_percentage: f64,
    #[serde(default)]
    pub time_taken_formatted: String,
    #[serde(default)]
    pub created_at: String,
}

/// Response of `GET /candidates/result/{id}`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ResultDetail {
    pub candidate: CandidateResult,
    #[serde(default)]
    pub responses: Vec<QuestionBreakdown>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CandidateResult {
    pub id: ResultId,

    pub name: String,
    pub email: String,
    pub test_id: TestId,
    pub test_code: String,
    #[serde(default)]
    pub test_name: Option<String>,
    pub time_taken: u64,
    #[serde(default)]
    pub time_taken_formatted: String,
    pub total_questions: u32,
    pub correct_answers: u32,
    pub score: f64,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct QuestionBreakdown {
    pub question_id: String,

    pub question_text: String,
    #[serde(default)]
    pub selected_option: String,
    pub correct_option: String,
    pub is_correct: bool,
    #[serde(default)]
    pub options: QuestionOptions,
    #[serde(default)]
    pub difficulty: String,
    #[serde(default)]
    pub category_name: String,
}

impl ResultDetail {
    /// Responses grouped by category, categories in first-seen order.
    #[must_use]
    pub fn responses_by_category(&self) -> Vec<(&str, Vec<&QuestionBreakdown>)> {
        let mut groups: Vec<(&str, Vec<&QuestionBreakdown>)> = Vec::new();

        for response in &self.responses {
            match groups
                .iter()
                .position(|(name, _)| *name == response.category_name)
            {
                Some(index) => groups[index].1.push(response),
                None => groups.push((response.category_name.as_str(), vec![response])),
            }
        }

        groups
    }
}

/// Verdict shown next to a score percentage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScoreBand {
    Excellent,
    Good,
    Average,
    Poor,
}

impl ScoreBand {
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            ScoreBand::Excellent
        } else if score >= 60.0 {
            ScoreBand::Good
        } else if score >= 40.0 {
            ScoreBand::Average
        } else {
            ScoreBand::Poor
        }
    }
}

impl fmt::Display for ScoreBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ScoreBand::Excellent => "Excellent",
            ScoreBand::Good => "Good",
            ScoreBand::Average => "Average",
            ScoreBand::Poor => "Poor",
        };

        f.write_str(label)
    }
}
