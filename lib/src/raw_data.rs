//! Wire shapes of the candidate and auth endpoints.

use serde::{Deserialize, Serialize};

use crate::question::{Difficulty, QuestionId, QuestionOptions};
use crate::session::{SessionQuestion, Submission};

/// Response of `GET /candidates/test/{code}`.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct RawPublicTest {
    pub test_name: String,
    #[serde(default)]
    pub questions: Vec<RawPublicQuestion>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct RawPublicQuestion {
    pub question_id: QuestionId,

    pub question: String,
    #[serde(default)]
    pub options: QuestionOptions,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub category_name: String,
}

impl From<RawPublicQuestion> for SessionQuestion {
    fn from(raw: RawPublicQuestion) -> Self {
        Self {
            id: raw.question_id,
            text: raw.question,
            options: raw.options,
            difficulty: raw.difficulty.unwrap_or_default(),
            category_name: raw.category_name,
        }
    }
}

/// Body of `POST /candidates/submit`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RawSubmission {
    pub test_id: String,
    pub name: String,
    pub email: String,
    pub time_taken: u64,
    pub answers: Vec<RawAnswer>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RawAnswer {
    pub question_id: String,
    pub selected: String,
}

impl From<Submission> for RawSubmission {
    fn from(submission: Submission) -> Self {
        let answers = submission
            .answers
            .into_iter()
            .map(|(question_id, selected)| RawAnswer {
                question_id: question_id.to_string(),
                selected,
            })
            .collect();

        Self {
            test_id: submission.test_code,
            name: submission.identity.name,
            email: submission.identity.email,
            time_taken: submission.time_taken,
            answers,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct RawLogin<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Deserialize, Debug)]
pub struct RawLoginResponse {
    #[serde(alias = "access_token")]
    pub token: String,
    #[serde(default)]
    pub user: Option<RawUser>,
}

#[derive(Deserialize, Debug)]
pub struct RawUser {
    #[serde(default)]
    pub role: Option<RawRole>,
}

#[derive(Deserialize, Debug)]
pub struct RawRole {
    pub role_name: String,
}

/// `{"error": "..."}` body the backend attaches to failures.
#[derive(Deserialize, Debug)]
pub struct RawErrorBody {
    pub error: String,
}
