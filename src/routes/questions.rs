use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::question::QuestionResponse, error::AppError, services::question_service,
    state::SharedState,
};

/// Draw a fresh multiple-choice question.
#[utoipa::path(
    get,
    path = "/questions",
    tag = "game",
    responses(
        (status = 200, description = "Next question", body = QuestionResponse),
        (status = 404, description = "Catalog is empty or too small"),
        (status = 503, description = "Storage unavailable")
    )
)]
pub async fn next_question(
    State(state): State<SharedState>,
) -> Result<Json<QuestionResponse>, AppError> {
    Ok(Json(question_service::next_question(&state).await?))
}

pub fn router() -> Router<SharedState> {
    Router::new().route("/questions", get(next_question))
}
