use axum::{Json, Router, extract::State, routing::get};

use crate::{dto::settings::SettingsResponse, state::SharedState};

/// Gameplay parameters: countdown, question shape and challenge margin.
#[utoipa::path(
    get,
    path = "/settings",
    tag = "game",
    responses((status = 200, description = "Current gameplay settings", body = SettingsResponse))
)]
pub async fn get_settings(State(state): State<SharedState>) -> Json<SettingsResponse> {
    Json(state.config().into())
}

pub fn router() -> Router<SharedState> {
    Router::new().route("/settings", get(get_settings))
}
