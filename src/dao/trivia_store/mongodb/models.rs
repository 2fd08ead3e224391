use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};

use crate::dao::models::{ChallengeEntity, UserEntity};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoUserDocument {
    pub username: String,
    #[serde(default)]
    pub score: i64,
}

impl From<MongoUserDocument> for UserEntity {
    fn from(value: MongoUserDocument) -> Self {
        Self {
            username: value.username,
            score: u32::try_from(value.score.max(0)).unwrap_or(u32::MAX),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoChallengeDocument {
    pub code: String,
    pub inviter_username: String,
    pub inviter_score: i64,
    pub created_at: DateTime,
    /// Stored as a BSON date so the TTL index can expire it.
    pub expires_at: DateTime,
}

impl From<ChallengeEntity> for MongoChallengeDocument {
    fn from(value: ChallengeEntity) -> Self {
        Self {
            code: value.code,
            inviter_username: value.inviter_username,
            inviter_score: i64::from(value.inviter_score),
            created_at: DateTime::from_system_time(value.created_at),
            expires_at: DateTime::from_system_time(value.expires_at),
        }
    }
}

impl From<MongoChallengeDocument> for ChallengeEntity {
    fn from(value: MongoChallengeDocument) -> Self {
        Self {
            code: value.code,
            inviter_username: value.inviter_username,
            inviter_score: u32::try_from(value.inviter_score.max(0)).unwrap_or(u32::MAX),
            created_at: value.created_at.to_system_time(),
            expires_at: value.expires_at.to_system_time(),
        }
    }
}
