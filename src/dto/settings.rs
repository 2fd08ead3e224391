use serde::Serialize;
use utoipa::ToSchema;

use crate::config::AppConfig;

/// Gameplay parameters clients need to run a session.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SettingsResponse {
    /// Seconds allowed per question before it counts as a miss.
    pub round_time_limit_secs: u64,
    pub clue_count: usize,
    pub option_count: usize,
    /// Points added to an inviter's score to obtain the challenge target.
    pub challenge_target_margin: u32,
}

impl From<&AppConfig> for SettingsResponse {
    fn from(config: &AppConfig) -> Self {
        Self {
            round_time_limit_secs: config.round_time_limit.as_secs(),
            clue_count: config.clue_count,
            option_count: config.option_count,
            challenge_target_margin: config.challenge_target_margin,
        }
    }
}
