//! Per-user monotonic high score with an atomic max-update path, an explicit overwrite and a
//! strict registration path.

use tracing::{debug, info, warn};

use crate::{
    dao::{models::UserEntity, trivia_store::TriviaStore},
    dto::validation::normalize_username,
    error::ServiceError,
    state::SharedState,
};

/// Result of a user lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserLookup {
    Found(UserEntity),
    Missing,
}

/// Trim `raw` and reject names shorter than the minimum length.
pub fn username_or_invalid(raw: &str) -> Result<String, ServiceError> {
    normalize_username(raw).map_err(|err| {
        debug!(username = %raw, "rejected username");
        ServiceError::InvalidInput(err.to_string())
    })
}

/// Persist `max(stored, candidate)`, creating the user when missing.
pub async fn submit_score(
    state: &SharedState,
    username: &str,
    candidate: u32,
) -> Result<UserEntity, ServiceError> {
    let username = username_or_invalid(username)?;
    let store = state.require_store().await?;
    reconcile(store.as_ref(), username, candidate).await
}

/// Entry point for `PUT /users`: the legacy force flag no longer bypasses the max-update.
pub async fn update_user(
    state: &SharedState,
    username: &str,
    candidate: u32,
    force_update: bool,
) -> Result<UserEntity, ServiceError> {
    if force_update {
        warn!(
            username = %username.trim(),
            score = candidate,
            "forceUpdate requested; applying keep-the-higher update instead"
        );
    }
    submit_score(state, username, candidate).await
}

pub(crate) async fn reconcile(
    store: &dyn TriviaStore,
    username: String,
    candidate: u32,
) -> Result<UserEntity, ServiceError> {
    let user = store.upsert_max_score(username, candidate).await?;
    debug!(username = %user.username, candidate, stored = user.score, "score reconciled");
    Ok(user)
}

/// Overwrite the stored score regardless of history.
pub async fn force_set_score(
    state: &SharedState,
    username: &str,
    score: u32,
) -> Result<UserEntity, ServiceError> {
    let username = username_or_invalid(username)?;
    let store = state.require_store().await?;
    let user = store.overwrite_score(username, score).await?;
    info!(username = %user.username, score = user.score, "score overwritten");
    Ok(user)
}

/// Look a user up; a missing or blank username is invalid input.
pub async fn get_user(
    state: &SharedState,
    username: Option<&str>,
) -> Result<UserLookup, ServiceError> {
    let username = username.map(str::trim).unwrap_or_default();
    if username.is_empty() {
        return Err(ServiceError::InvalidInput(
            "username query parameter is required".into(),
        ));
    }

    let store = state.require_store().await?;
    Ok(match store.find_user(username.to_owned()).await? {
        Some(user) => UserLookup::Found(user),
        None => UserLookup::Missing,
    })
}

/// Strict create; an existing username is a conflict.
pub async fn register_user(
    state: &SharedState,
    username: &str,
    score: u32,
) -> Result<UserEntity, ServiceError> {
    let username = username_or_invalid(username)?;
    let store = state.require_store().await?;
    let user = UserEntity { username, score };

    match store.create_user(user.clone()).await {
        Ok(()) => {
            info!(username = %user.username, "registered user");
            Ok(user)
        }
        Err(err) if err.is_duplicate_key() => Err(ServiceError::Conflict(format!(
            "username `{}` is already taken",
            user.username
        ))),
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::trivia_store::memory::MemoryStore,
        state::{AppState, clock::SystemClock},
    };

    async fn state_with(store: MemoryStore) -> SharedState {
        AppState::with_store(AppConfig::default(), Arc::new(SystemClock), Arc::new(store)).await
    }

    #[tokio::test]
    async fn stored_score_is_the_max_in_either_order() {
        let state = state_with(MemoryStore::new()).await;

        submit_score(&state, "alice", 3).await.unwrap();
        assert_eq!(submit_score(&state, "alice", 7).await.unwrap().score, 7);

        submit_score(&state, "bob", 7).await.unwrap();
        assert_eq!(submit_score(&state, "bob", 3).await.unwrap().score, 7);
    }

    #[tokio::test]
    async fn concurrent_submissions_keep_the_maximum() {
        let state = state_with(MemoryStore::new()).await;

        for round in 0..50u32 {
            let name = format!("player{round}");
            let (a, b) = (round, 100 - round);
            let (left, right) = tokio::join!(
                submit_score(&state, &name, a),
                submit_score(&state, &name, b)
            );
            left.unwrap();
            right.unwrap();

            let UserLookup::Found(user) = get_user(&state, Some(&name)).await.unwrap() else {
                panic!("{name} missing");
            };
            assert_eq!(user.score, a.max(b));
        }
    }

    #[tokio::test]
    async fn concurrent_tasks_do_not_lose_updates() {
        let state = state_with(MemoryStore::new()).await;
        let handles: Vec<_> = (0..32u32)
            .map(|score| {
                let state = state.clone();
                tokio::spawn(async move { submit_score(&state, "shared", score).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let UserLookup::Found(user) = get_user(&state, Some("shared")).await.unwrap() else {
            panic!("shared user missing");
        };
        assert_eq!(user.score, 31);
    }

    #[tokio::test]
    async fn usernames_are_trimmed_and_length_checked() {
        let state = state_with(MemoryStore::new()).await;

        let user = submit_score(&state, "  carol ", 2).await.unwrap();
        assert_eq!(user.username, "carol");

        let err = submit_score(&state, " ab ", 2).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn force_flag_never_lowers_a_score() {
        let state = state_with(MemoryStore::new()).await;
        submit_score(&state, "dave", 8).await.unwrap();
        let user = update_user(&state, "dave", 2, true).await.unwrap();
        assert_eq!(user.score, 8);
    }

    #[tokio::test]
    async fn explicit_overwrite_can_lower_a_score() {
        let state = state_with(MemoryStore::new()).await;
        submit_score(&state, "erin", 8).await.unwrap();
        assert_eq!(force_set_score(&state, "erin", 1).await.unwrap().score, 1);
    }

    #[tokio::test]
    async fn lookup_reports_missing_users_and_requires_a_name() {
        let state = state_with(MemoryStore::new()).await;
        assert_eq!(
            get_user(&state, Some("nobody")).await.unwrap(),
            UserLookup::Missing
        );
        assert!(matches!(
            get_user(&state, None).await,
            Err(ServiceError::InvalidInput(_))
        ));
        assert!(matches!(
            get_user(&state, Some("   ")).await,
            Err(ServiceError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn strict_registration_conflicts_on_existing_name() {
        let state = state_with(MemoryStore::new()).await;
        register_user(&state, "frank", 0).await.unwrap();
        let err = register_user(&state, " frank ", 4).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn storage_outage_surfaces_as_unavailable() {
        let store = MemoryStore::new();
        store.set_offline(true);
        let state = state_with(store).await;
        let err = submit_score(&state, "gina", 1).await.unwrap_err();
        assert!(matches!(err, ServiceError::Unavailable(_)));
    }
}
