use serde::Serialize;
use utoipa::ToSchema;

use crate::services::question_service::Question;

/// Question payload served by `GET /questions`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResponse {
    /// Shuffled subset of the target city's clues.
    pub clues: Vec<String>,
    /// Shuffled city names, exactly one of which is correct.
    pub options: Vec<String>,
    /// Country to send back with the guess.
    pub correct_country: String,
}

impl From<Question> for QuestionResponse {
    fn from(question: Question) -> Self {
        Self {
            clues: question.clues,
            options: question.options,
            correct_country: question.correct_country,
        }
    }
}
