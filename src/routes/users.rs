use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, put},
};

use crate::{
    dto::user::{
        CreateUserRequest, SetScoreRequest, UpdateUserRequest, UserLookupQuery,
        UserLookupResponse, UserResponse,
    },
    error::AppError,
    routes::extract::{QueryParams, ValidJson},
    services::score_service,
    state::SharedState,
};

/// Player registration, lookup and score updates.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route(
            "/users",
            get(get_user).put(update_user).post(register_user),
        )
        .route("/users/{username}/score", put(set_score))
}

/// Look a player up by username.
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    params(UserLookupQuery),
    responses(
        (status = 200, description = "Lookup result", body = UserLookupResponse),
        (status = 400, description = "Missing username")
    )
)]
pub async fn get_user(
    State(state): State<SharedState>,
    QueryParams(query): QueryParams<UserLookupQuery>,
) -> Result<Json<UserLookupResponse>, AppError> {
    let lookup = score_service::get_user(&state, query.username.as_deref()).await?;
    Ok(Json(lookup.into()))
}

/// Submit a session score; the stored score only ever goes up.
#[utoipa::path(
    put,
    path = "/users",
    tag = "users",
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Stored high score", body = UserResponse),
        (status = 400, description = "Invalid username")
    )
)]
pub async fn update_user(
    State(state): State<SharedState>,
    ValidJson(payload): ValidJson<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let user = score_service::update_user(
        &state,
        &payload.username,
        payload.score,
        payload.force_update,
    )
    .await?;
    Ok(Json(user.into()))
}

/// Register a new player; fails when the username is taken.
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "Player registered", body = UserResponse),
        (status = 400, description = "Invalid username"),
        (status = 409, description = "Username already taken")
    )
)]
pub async fn register_user(
    State(state): State<SharedState>,
    ValidJson(payload): ValidJson<CreateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let user = score_service::register_user(&state, &payload.username, payload.score).await?;
    Ok(Json(user.into()))
}

/// Overwrite a player's score, even with a lower value.
#[utoipa::path(
    put,
    path = "/users/{username}/score",
    tag = "users",
    params(("username" = String, Path, description = "Player to update")),
    request_body = SetScoreRequest,
    responses(
        (status = 200, description = "Score overwritten", body = UserResponse),
        (status = 400, description = "Invalid username or score")
    )
)]
pub async fn set_score(
    State(state): State<SharedState>,
    Path(username): Path<String>,
    ValidJson(payload): ValidJson<SetScoreRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let user = score_service::force_set_score(&state, &username, payload.score).await?;
    Ok(Json(user.into()))
}
