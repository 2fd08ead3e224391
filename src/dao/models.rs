use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Minimum number of entries required in each destination list (clues, facts, trivia).
pub const MIN_DESTINATION_ENTRIES: usize = 2;

/// Catalog record describing one guessable city.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DestinationEntity {
    /// Display name of the city, unique across the catalog.
    pub city: String,
    /// Country accepted as the correct answer for this city.
    pub country: String,
    /// Clues revealed to the player, in authoring order.
    pub clues: Vec<String>,
    /// Facts shown after a correct guess.
    #[serde(alias = "fun_fact")]
    pub fun_facts: Vec<String>,
    /// Trivia shown after an incorrect guess.
    pub trivia: Vec<String>,
}

impl DestinationEntity {
    /// Check the catalog invariants for a single record.
    pub fn check(&self) -> Result<(), String> {
        if self.city.trim().is_empty() {
            return Err("city must not be empty".into());
        }
        if self.country.trim().is_empty() {
            return Err(format!("country of `{}` must not be empty", self.city));
        }
        for (field, values) in [
            ("clues", &self.clues),
            ("fun_facts", &self.fun_facts),
            ("trivia", &self.trivia),
        ] {
            if values.len() < MIN_DESTINATION_ENTRIES {
                return Err(format!(
                    "`{}` needs at least {MIN_DESTINATION_ENTRIES} {field} (got {})",
                    self.city,
                    values.len()
                ));
            }
        }
        Ok(())
    }
}

/// Persisted player record keyed by username.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserEntity {
    /// Trimmed, case-sensitive username.
    pub username: String,
    /// Highest score ever recorded for the user.
    pub score: u32,
}

/// Persisted challenge invitation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChallengeEntity {
    /// Short random code shared with challengers.
    pub code: String,
    /// Username of the player who issued the challenge.
    pub inviter_username: String,
    /// Inviter score frozen at creation time.
    pub inviter_score: u32,
    /// Creation timestamp.
    pub created_at: SystemTime,
    /// Instant after which the challenge is treated as absent.
    pub expires_at: SystemTime,
}

impl ChallengeEntity {
    /// Whether the challenge can still be redeemed at `now`.
    pub fn is_active(&self, now: SystemTime) -> bool {
        self.expires_at > now
    }
}
