use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use crate::{
    dto::challenge::{
        ChallengeNotFoundResponse, ChallengeResponse, CreateChallengeRequest,
        CreateChallengeResponse,
    },
    error::{AppError, ServiceError},
    routes::extract::ValidJson,
    services::challenge_service,
    state::SharedState,
};

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/challenges", post(create_challenge))
        .route("/challenges/{code}", get(get_challenge))
}

/// Mint a shareable challenge from the inviter's best score.
#[utoipa::path(
    post,
    path = "/challenges",
    tag = "challenges",
    request_body = CreateChallengeRequest,
    responses(
        (status = 200, description = "Challenge created", body = CreateChallengeResponse),
        (status = 400, description = "Invalid username"),
        (status = 409, description = "No free challenge code found")
    )
)]
pub async fn create_challenge(
    State(state): State<SharedState>,
    ValidJson(payload): ValidJson<CreateChallengeRequest>,
) -> Result<Json<CreateChallengeResponse>, AppError> {
    let issued =
        challenge_service::create_challenge(&state, &payload.username, payload.score).await?;
    Ok(Json(issued.into()))
}

/// Resolve a challenge code into the inviter's frozen score and the target to beat.
#[utoipa::path(
    get,
    path = "/challenges/{code}",
    tag = "challenges",
    params(("code" = String, Path, description = "Challenge code (case-insensitive)")),
    responses(
        (status = 200, description = "Active challenge", body = ChallengeResponse),
        (status = 404, description = "Unknown or expired challenge", body = ChallengeNotFoundResponse)
    )
)]
pub async fn get_challenge(
    State(state): State<SharedState>,
    Path(code): Path<String>,
) -> Result<Response, AppError> {
    match challenge_service::resolve_challenge(&state, &code).await {
        Ok(resolved) => Ok(Json(ChallengeResponse::from(resolved)).into_response()),
        // Misses still carry `valid`.
        Err(ServiceError::NotFound(message)) => Ok((
            StatusCode::NOT_FOUND,
            Json(ChallengeNotFoundResponse::new(message)),
        )
            .into_response()),
        Err(err) => Err(err.into()),
    }
}
