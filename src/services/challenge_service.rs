//! Challenge codes: minting with collision retry and resolution with expiry filtering.

use std::time::SystemTime;

use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::{debug, info, warn};

use crate::{
    config::AppConfig,
    dao::{models::ChallengeEntity, trivia_store::TriviaStore},
    error::ServiceError,
    services::score_service::{reconcile, username_or_invalid},
    state::SharedState,
};

/// Characters challenge codes are drawn from.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// A freshly stored challenge together with its share link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedChallenge {
    pub challenge: ChallengeEntity,
    pub share_url: String,
}

/// Active challenge as returned to a challenger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedChallenge {
    pub inviter_username: String,
    pub inviter_score: u32,
    /// Computed from the frozen inviter score and the configured margin.
    pub target_score: u32,
    pub expires_at: SystemTime,
}

/// Random code of `length` characters from [`CODE_ALPHABET`].
pub fn generate_code<R: Rng>(rng: &mut R, length: usize) -> String {
    (0..length)
        .map(|_| char::from(CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())]))
        .collect()
}

/// Reconcile the inviter's score, then store a challenge snapshotting the persisted value.
pub async fn create_challenge(
    state: &SharedState,
    username: &str,
    score: Option<u32>,
) -> Result<IssuedChallenge, ServiceError> {
    let username = username_or_invalid(username)?;
    let store = state.require_store().await?;
    let mut rng = StdRng::from_rng(&mut rand::rng());

    issue(
        store.as_ref(),
        state.config(),
        state.now(),
        username,
        score,
        &mut rng,
    )
    .await
}

pub(crate) async fn issue<R>(
    store: &dyn TriviaStore,
    config: &AppConfig,
    now: SystemTime,
    username: String,
    score: Option<u32>,
    rng: &mut R,
) -> Result<IssuedChallenge, ServiceError>
where
    R: Rng + Send,
{
    let inviter = reconcile(store, username, score.unwrap_or(0)).await?;

    for attempt in 1..=config.challenge_code_attempts {
        let challenge = ChallengeEntity {
            code: generate_code(rng, config.challenge_code_length),
            inviter_username: inviter.username.clone(),
            inviter_score: inviter.score,
            created_at: now,
            expires_at: now + config.challenge_ttl,
        };

        match store.insert_challenge(challenge.clone()).await {
            Ok(()) => {
                info!(
                    code = %challenge.code,
                    inviter = %challenge.inviter_username,
                    score = challenge.inviter_score,
                    "challenge created"
                );
                let share_url = config.share_url(&challenge.code);
                return Ok(IssuedChallenge {
                    challenge,
                    share_url,
                });
            }
            Err(err) if err.is_duplicate_key() => {
                debug!(attempt, code = %challenge.code, "challenge code collision; regenerating");
            }
            Err(err) => return Err(err.into()),
        }
    }

    warn!(
        attempts = config.challenge_code_attempts,
        "could not find a free challenge code"
    );
    Err(ServiceError::Conflict(
        "could not allocate a unique challenge code".into(),
    ))
}

/// Active challenge for `code`; expired and unknown codes are indistinguishable.
pub async fn resolve_challenge(
    state: &SharedState,
    code: &str,
) -> Result<ResolvedChallenge, ServiceError> {
    let code = code.trim().to_ascii_uppercase();
    let not_found = || ServiceError::NotFound("challenge not found or expired".into());
    if code.is_empty() {
        return Err(not_found());
    }

    let store = state.require_store().await?;
    let challenge = store
        .find_active_challenge(code, state.now())
        .await?
        .ok_or_else(not_found)?;

    Ok(ResolvedChallenge {
        target_score: state.config().challenge_target(challenge.inviter_score),
        inviter_username: challenge.inviter_username,
        inviter_score: challenge.inviter_score,
        expires_at: challenge.expires_at,
    })
}

#[cfg(test)]
mod tests {
    use std::{
        sync::Arc,
        time::{Duration, UNIX_EPOCH},
    };

    use super::*;
    use crate::{
        dao::trivia_store::memory::MemoryStore,
        services::score_service::submit_score,
        state::{AppState, clock::ManualClock},
    };

    fn start() -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(1_700_000_000)
    }

    async fn state_at(clock: Arc<ManualClock>) -> SharedState {
        AppState::with_store(AppConfig::default(), clock, Arc::new(MemoryStore::new())).await
    }

    #[test]
    fn codes_use_the_alphabet_and_length() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            let code = generate_code(&mut rng, 10);
            assert_eq!(code.len(), 10);
            assert!(code.bytes().all(|b| CODE_ALPHABET.contains(&b)), "{code}");
        }
    }

    #[tokio::test]
    async fn inviter_score_is_frozen_at_creation() {
        let clock = Arc::new(ManualClock::new(start()));
        let state = state_at(clock).await;

        submit_score(&state, "alice", 5).await.unwrap();
        let issued = create_challenge(&state, "alice", Some(0)).await.unwrap();
        assert_eq!(issued.challenge.inviter_score, 5);

        let resolved = resolve_challenge(&state, &issued.challenge.code)
            .await
            .unwrap();
        assert_eq!(resolved.inviter_score, 5);
        assert_eq!(resolved.target_score, 6);

        submit_score(&state, "alice", 9).await.unwrap();
        let again = resolve_challenge(&state, &issued.challenge.code)
            .await
            .unwrap();
        assert_eq!(again.inviter_username, "alice");
        assert_eq!(again.inviter_score, 5);
    }

    #[tokio::test]
    async fn creation_reconciles_the_submitted_score_first() {
        let clock = Arc::new(ManualClock::new(start()));
        let state = state_at(clock).await;

        submit_score(&state, "bob", 4).await.unwrap();
        let issued = create_challenge(&state, "bob", Some(11)).await.unwrap();
        assert_eq!(issued.challenge.inviter_score, 11);
        assert_eq!(
            issued.share_url,
            format!("http://localhost:3000/challenge/{}", issued.challenge.code)
        );
        assert_eq!(
            issued.challenge.expires_at,
            start() + Duration::from_secs(86_400)
        );
    }

    #[tokio::test]
    async fn challenge_expires_exactly_at_expiry() {
        let clock = Arc::new(ManualClock::new(start()));
        let state = state_at(clock.clone()).await;
        let issued = create_challenge(&state, "carol", Some(3)).await.unwrap();
        let expires_at = issued.challenge.expires_at;

        clock.set(expires_at - Duration::from_millis(1));
        assert!(resolve_challenge(&state, &issued.challenge.code).await.is_ok());

        clock.set(expires_at);
        let err = resolve_challenge(&state, &issued.challenge.code)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn codes_are_matched_case_insensitively() {
        let clock = Arc::new(ManualClock::new(start()));
        let state = state_at(clock).await;
        let issued = create_challenge(&state, "dave", None).await.unwrap();

        let lowered = format!(" {} ", issued.challenge.code.to_lowercase());
        let resolved = resolve_challenge(&state, &lowered).await.unwrap();
        assert_eq!(resolved.inviter_score, 0);
        assert_eq!(resolved.target_score, 1);
    }

    #[tokio::test]
    async fn unknown_code_is_not_found() {
        let clock = Arc::new(ManualClock::new(start()));
        let state = state_at(clock).await;
        assert!(matches!(
            resolve_challenge(&state, "NOPE000000").await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            resolve_challenge(&state, "  ").await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn collisions_are_regenerated_then_reported() {
        let store = MemoryStore::new();
        let config = AppConfig::default();
        let now = start();
        let rng = StdRng::seed_from_u64(42);

        let taken = generate_code(&mut rng.clone(), config.challenge_code_length);
        store
            .insert_challenge(ChallengeEntity {
                code: taken.clone(),
                inviter_username: "someone".into(),
                inviter_score: 1,
                created_at: now,
                expires_at: now + config.challenge_ttl,
            })
            .await
            .unwrap();

        let issued = issue(&store, &config, now, "erin".into(), Some(2), &mut rng.clone())
            .await
            .unwrap();
        assert_ne!(issued.challenge.code, taken);

        let single_attempt = AppConfig {
            challenge_code_attempts: 1,
            ..AppConfig::default()
        };
        let err = issue(&store, &single_attempt, now, "erin".into(), Some(2), &mut rng.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn invalid_inviter_name_is_rejected() {
        let clock = Arc::new(ManualClock::new(start()));
        let state = state_at(clock).await;
        assert!(matches!(
            create_challenge(&state, "x", Some(1)).await,
            Err(ServiceError::InvalidInput(_))
        ));
    }
}
