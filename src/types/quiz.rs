use std::collections::BTreeSet;

use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use handle_errors::Error;

use crate::types::question::{CategoryId, Question, QuestionId, int_or_numeric_string};

/// Which questions a quiz draws from. On the wire, category id 0 means "all".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizCategory {
    All,
    ByCategory(CategoryId),
}

impl<'de> Deserialize<'de> for QuizCategory {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Wire {
            #[serde(deserialize_with = "int_or_numeric_string")]
            id: i32,
        }

        let wire = Wire::deserialize(deserializer)?;
        Ok(match wire.id {
            0 => QuizCategory::All,
            id => QuizCategory::ByCategory(CategoryId(id)),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuizRequest {
    pub quiz_category: QuizCategory,
    pub previous_questions: BTreeSet<QuestionId>,
}

impl QuizRequest {
    pub fn from_json(body: Value) -> Result<QuizRequest, Error> {
        #[derive(Deserialize)]
        struct Wire {
            quiz_category: Option<QuizCategory>,
            previous_questions: Option<Vec<QuestionId>>,
        }

        let wire: Wire =
            serde_json::from_value(body).map_err(|e| Error::InvalidRequest(e.to_string()))?;
        let quiz_category = wire
            .quiz_category
            .ok_or_else(|| Error::InvalidRequest("missing quiz_category".to_string()))?;

        Ok(QuizRequest {
            quiz_category,
            previous_questions: wire
                .previous_questions
                .unwrap_or_default()
                .into_iter()
                .collect(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum QuizResult {
    Finished,
    Question {
        question: Question,
        previous_questions: BTreeSet<QuestionId>,
    },
}

/// Picks the next quiz question uniformly among the candidates not served yet.
///
/// The quiz is over once the served set equals the candidate id set, or when
/// no unserved candidate is left. Served ids that are not candidates are kept
/// in the returned set untouched.
pub fn next_question<R>(
    candidates: &[Question],
    served: &BTreeSet<QuestionId>,
    rng: &mut R,
) -> QuizResult
where
    R: Rng + ?Sized,
{
    let candidate_ids: BTreeSet<QuestionId> = candidates.iter().map(|q| q.id).collect();
    if candidate_ids == *served {
        return QuizResult::Finished;
    }

    let eligible: Vec<&Question> = candidates
        .iter()
        .filter(|q| !served.contains(&q.id))
        .collect();

    match eligible.choose(rng) {
        Some(question) => {
            let mut previous_questions = served.clone();
            previous_questions.insert(question.id);
            QuizResult::Question {
                question: (*question).clone(),
                previous_questions,
            }
        }
        None => QuizResult::Finished,
    }
}

#[derive(Debug, Serialize)]
pub struct QuizResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<Question>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_questions: Option<Vec<QuestionId>>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub finished: bool,
}

impl From<QuizResult> for QuizResponse {
    fn from(result: QuizResult) -> Self {
        match result {
            QuizResult::Finished => QuizResponse {
                success: true,
                question: None,
                previous_questions: None,
                finished: true,
            },
            QuizResult::Question {
                question,
                previous_questions,
            } => QuizResponse {
                success: true,
                question: Some(question),
                previous_questions: Some(previous_questions.into_iter().collect()),
                finished: false,
            },
        }
    }
}
