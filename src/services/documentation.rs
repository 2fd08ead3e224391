use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI document for Globetrotter Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::settings::get_settings,
        crate::routes::questions::next_question,
        crate::routes::guesses::submit_guess,
        crate::routes::users::get_user,
        crate::routes::users::update_user,
        crate::routes::users::register_user,
        crate::routes::users::set_score,
        crate::routes::challenges::create_challenge,
        crate::routes::challenges::get_challenge,
        crate::routes::leaderboard::get_leaderboard,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::health::HealthStatus,
            crate::dto::settings::SettingsResponse,
            crate::dto::question::QuestionResponse,
            crate::dto::guess::GuessRequest,
            crate::dto::guess::GuessResponse,
            crate::dto::user::UpdateUserRequest,
            crate::dto::user::CreateUserRequest,
            crate::dto::user::SetScoreRequest,
            crate::dto::user::UserResponse,
            crate::dto::user::UserLookupResponse,
            crate::dto::challenge::CreateChallengeRequest,
            crate::dto::challenge::CreateChallengeResponse,
            crate::dto::challenge::ChallengeResponse,
            crate::dto::challenge::ChallengeNotFoundResponse,
            crate::dto::leaderboard::LeaderboardEntry,
            crate::dto::leaderboard::PaginationInfo,
            crate::dto::leaderboard::LeaderboardResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "game", description = "Questions, guesses and gameplay settings"),
        (name = "users", description = "Players and their high scores"),
        (name = "challenges", description = "Shareable score challenges"),
        (name = "leaderboard", description = "Global ranking"),
    )
)]
pub struct ApiDoc;
