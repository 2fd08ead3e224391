use axum::Router;

use crate::state::SharedState;

pub mod challenges;
pub mod docs;
pub mod extract;
pub mod guesses;
pub mod health;
pub mod leaderboard;
pub mod questions;
pub mod settings;
pub mod users;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    health::router()
        .merge(settings::router())
        .merge(questions::router())
        .merge(guesses::router())
        .merge(users::router())
        .merge(challenges::router())
        .merge(leaderboard::router())
        .merge(docs::router())
        .with_state(state)
}
