use axum::{Json, Router, extract::State, http::StatusCode, routing::post};

use crate::{
    dto::guess::{GuessRequest, GuessResponse},
    error::AppError,
    routes::extract::ValidJson,
    services::guess_service::{self, GuessVerdict},
    state::SharedState,
};

/// Check a selected city against the expected country.
#[utoipa::path(
    post,
    path = "/guesses",
    tag = "game",
    request_body = GuessRequest,
    responses(
        (status = 200, description = "Guess judged", body = GuessResponse),
        (status = 400, description = "Malformed body"),
        (status = 404, description = "City is not in the catalog", body = GuessResponse),
        (status = 503, description = "Storage unavailable")
    )
)]
pub async fn submit_guess(
    State(state): State<SharedState>,
    ValidJson(payload): ValidJson<GuessRequest>,
) -> Result<(StatusCode, Json<GuessResponse>), AppError> {
    let verdict = guess_service::evaluate(&state, &payload.city, &payload.country).await?;
    Ok(match verdict {
        GuessVerdict::Judged(result) => (StatusCode::OK, Json(result.into())),
        GuessVerdict::UnknownCity => (StatusCode::NOT_FOUND, Json(GuessResponse::unknown_city())),
    })
}

pub fn router() -> Router<SharedState> {
    Router::new().route("/guesses", post(submit_guess))
}
