use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    dao::models::UserEntity,
    dto::validation::{lenient_score, lenient_username},
    services::score_service::UserLookup,
};

/// Score submission from a session (`PUT /users`).
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(default, deserialize_with = "lenient_username")]
    #[validate(custom(function = "crate::dto::validation::validate_username"))]
    pub username: String,
    /// Candidate score; only stored when higher than the current one. Non-numbers count as 0.
    #[serde(default, deserialize_with = "lenient_score")]
    pub score: u32,
    /// Accepted for compatibility; scores always go through the keep-the-higher update.
    #[serde(default)]
    pub force_update: bool,
}

/// Strict registration payload (`POST /users`).
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateUserRequest {
    #[serde(default, deserialize_with = "lenient_username")]
    #[validate(custom(function = "crate::dto::validation::validate_username"))]
    pub username: String,
    #[serde(default, deserialize_with = "lenient_score")]
    pub score: u32,
}

/// Explicit overwrite payload (`PUT /users/{username}/score`).
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SetScoreRequest {
    pub score: u32,
}

/// Stored user record.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub username: String,
    pub score: u32,
}

impl From<UserEntity> for UserResponse {
    fn from(user: UserEntity) -> Self {
        Self {
            username: user.username,
            score: user.score,
        }
    }
}

/// Query string for `GET /users`.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserLookupQuery {
    /// Username to look up.
    pub username: Option<String>,
}

/// Result of a user lookup; missing users are reported with `exists: false`.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserLookupResponse {
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
}

impl From<UserLookup> for UserLookupResponse {
    fn from(lookup: UserLookup) -> Self {
        match lookup {
            UserLookup::Found(user) => Self {
                exists: true,
                username: Some(user.username),
                score: Some(user.score),
            },
            UserLookup::Missing => Self {
                exists: false,
                username: None,
                score: None,
            },
        }
    }
}
