use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::services::guess_service::GuessResult;

/// Fact returned when the guessed city is not in the catalog.
pub const UNKNOWN_CITY_FACT: &str = "City not found in our database.";

/// Guess submitted by a player.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct GuessRequest {
    /// City option the player selected.
    #[validate(length(min = 1, message = "city must not be empty"))]
    pub city: String,
    /// Country that makes the guess correct (the question's `correctCountry`).
    pub country: String,
}

/// Verdict for a guess.
#[derive(Debug, Serialize, ToSchema)]
pub struct GuessResponse {
    pub correct: bool,
    pub fact: String,
}

impl GuessResponse {
    pub fn unknown_city() -> Self {
        Self {
            correct: false,
            fact: UNKNOWN_CITY_FACT.to_owned(),
        }
    }
}

impl From<GuessResult> for GuessResponse {
    fn from(result: GuessResult) -> Self {
        Self {
            correct: result.correct,
            fact: result.fact,
        }
    }
}
