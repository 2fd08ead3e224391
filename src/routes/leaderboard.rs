use axum::{
    Json, Router,
    extract::State,
    routing::get,
};

use crate::{
    dto::leaderboard::{LeaderboardQuery, LeaderboardResponse},
    error::AppError,
    routes::extract::QueryParams,
    services::leaderboard_service,
    state::SharedState,
};

/// One page of the global ranking; pages past the end are empty.
#[utoipa::path(
    get,
    path = "/leaderboard",
    tag = "leaderboard",
    params(LeaderboardQuery),
    responses(
        (status = 200, description = "Ranked players", body = LeaderboardResponse),
        (status = 400, description = "Non-numeric paging parameters")
    )
)]
pub async fn get_leaderboard(
    State(state): State<SharedState>,
    QueryParams(query): QueryParams<LeaderboardQuery>,
) -> Result<Json<LeaderboardResponse>, AppError> {
    let page = leaderboard_service::rank(&state, query.page, query.limit).await?;
    Ok(Json(page.into()))
}

pub fn router() -> Router<SharedState> {
    Router::new().route("/leaderboard", get(get_leaderboard))
}
