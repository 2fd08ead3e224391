use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dto::{
        format_system_time,
        validation::{lenient_optional_score, lenient_username},
    },
    services::challenge_service::{IssuedChallenge, ResolvedChallenge},
};

/// Request to mint a challenge for the inviter.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateChallengeRequest {
    #[serde(default, deserialize_with = "lenient_username")]
    #[validate(custom(function = "crate::dto::validation::validate_username"))]
    pub username: String,
    /// Latest session score; merged into the stored best before the snapshot is taken.
    /// Non-numbers are ignored.
    #[serde(default, deserialize_with = "lenient_optional_score")]
    pub score: Option<u32>,
}

/// Body returned when a code is unknown or expired.
#[derive(Debug, Serialize, ToSchema)]
pub struct ChallengeNotFoundResponse {
    /// Always `false`.
    pub valid: bool,
    pub message: String,
}

impl ChallengeNotFoundResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: message.into(),
        }
    }
}

/// Freshly minted challenge.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateChallengeResponse {
    pub code: String,
    pub username: String,
    /// Inviter score captured in the challenge.
    pub score: u32,
    pub share_url: String,
    /// RFC 3339 expiry timestamp.
    pub expires_at: String,
}

impl From<IssuedChallenge> for CreateChallengeResponse {
    fn from(issued: IssuedChallenge) -> Self {
        Self {
            code: issued.challenge.code,
            username: issued.challenge.inviter_username,
            score: issued.challenge.inviter_score,
            share_url: issued.share_url,
            expires_at: format_system_time(issued.challenge.expires_at),
        }
    }
}

/// Active challenge as seen by a challenger.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeResponse {
    pub valid: bool,
    pub inviter_username: String,
    pub inviter_score: u32,
    /// Score the challenger has to reach to win.
    pub target_score: u32,
}

impl From<ResolvedChallenge> for ChallengeResponse {
    fn from(resolved: ResolvedChallenge) -> Self {
        Self {
            valid: true,
            inviter_username: resolved.inviter_username,
            inviter_score: resolved.inviter_score,
            target_score: resolved.target_score,
        }
    }
}
