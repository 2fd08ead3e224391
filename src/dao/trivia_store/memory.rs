//! In-process [`TriviaStore`] used when no database is configured and by the test suite.

use std::{
    cmp::Reverse,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::SystemTime,
};

use dashmap::{DashMap, mapref::entry::Entry};
use futures::future::BoxFuture;
use indexmap::IndexMap;
use rand::seq::IndexedRandom;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::dao::{
    models::{ChallengeEntity, DestinationEntity, UserEntity},
    storage::{StorageError, StorageResult},
    trivia_store::TriviaStore,
};

#[derive(Debug, Error)]
pub enum MemoryStoreError {
    #[error("in-memory store is offline")]
    Offline,
}

impl From<MemoryStoreError> for StorageError {
    fn from(err: MemoryStoreError) -> Self {
        StorageError::unavailable(err.to_string(), err)
    }
}

/// Cloneable handle over shared in-memory collections.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    /// Keyed by city and kept sorted so `destination_at` is stable.
    destinations: RwLock<IndexMap<String, DestinationEntity>>,
    users: DashMap<String, UserEntity>,
    challenges: DashMap<String, ChallengeEntity>,
    offline: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with the given catalog.
    pub async fn with_destinations(destinations: Vec<DestinationEntity>) -> Self {
        let store = Self::new();
        store.put_destinations(destinations).await;
        store
    }

    /// Simulate a lost connection: every operation fails until switched back.
    pub fn set_offline(&self, offline: bool) {
        self.inner.offline.store(offline, Ordering::SeqCst);
    }

    fn ensure_online(&self) -> Result<(), MemoryStoreError> {
        if self.inner.offline.load(Ordering::SeqCst) {
            Err(MemoryStoreError::Offline)
        } else {
            Ok(())
        }
    }

    async fn put_destinations(&self, destinations: Vec<DestinationEntity>) -> usize {
        let mut guard = self.inner.destinations.write().await;
        let written = destinations.len();
        for destination in destinations {
            guard.insert(destination.city.clone(), destination);
        }
        guard.sort_keys();
        written
    }

    fn ranked_users(&self, skip: u64, limit: u64) -> Vec<UserEntity> {
        let mut users: Vec<UserEntity> = self
            .inner
            .users
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        users.sort_by(|a, b| {
            (Reverse(a.score), &a.username).cmp(&(Reverse(b.score), &b.username))
        });
        users
            .into_iter()
            .skip(usize::try_from(skip).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .collect()
    }
}

impl TriviaStore for MemoryStore {
    fn count_destinations(&self) -> BoxFuture<'static, StorageResult<u64>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            let guard = store.inner.destinations.read().await;
            Ok(guard.len() as u64)
        })
    }

    fn destination_at(
        &self,
        index: u64,
    ) -> BoxFuture<'static, StorageResult<Option<DestinationEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            let guard = store.inner.destinations.read().await;
            let found = usize::try_from(index)
                .ok()
                .and_then(|index| guard.get_index(index))
                .map(|(_, destination)| destination.clone());
            Ok(found)
        })
    }

    fn sample_destinations(
        &self,
        exclude_city: String,
        size: usize,
    ) -> BoxFuture<'static, StorageResult<Vec<DestinationEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            let guard = store.inner.destinations.read().await;
            let candidates: Vec<&DestinationEntity> = guard
                .values()
                .filter(|destination| destination.city != exclude_city)
                .collect();
            let sampled = {
                let mut rng = rand::rng();
                candidates
                    .choose_multiple(&mut rng, size)
                    .map(|destination| (*destination).clone())
                    .collect()
            };
            Ok(sampled)
        })
    }

    fn find_destination(
        &self,
        city: String,
    ) -> BoxFuture<'static, StorageResult<Option<DestinationEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            let guard = store.inner.destinations.read().await;
            Ok(guard.get(&city).cloned())
        })
    }

    fn insert_destinations(
        &self,
        destinations: Vec<DestinationEntity>,
    ) -> BoxFuture<'static, StorageResult<usize>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            Ok(store.put_destinations(destinations).await)
        })
    }

    fn find_user(&self, username: String) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            Ok(store
                .inner
                .users
                .get(&username)
                .map(|entry| entry.value().clone()))
        })
    }

    fn create_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            match store.inner.users.entry(user.username.clone()) {
                Entry::Occupied(_) => Err(StorageError::duplicate(user.username)),
                Entry::Vacant(slot) => {
                    slot.insert(user);
                    Ok(())
                }
            }
        })
    }

    fn upsert_max_score(
        &self,
        username: String,
        score: u32,
    ) -> BoxFuture<'static, StorageResult<UserEntity>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            // The entry guard holds the shard lock, so compare-and-set is atomic per username.
            let mut entry = store
                .inner
                .users
                .entry(username.clone())
                .or_insert_with(|| UserEntity { username, score });
            entry.score = entry.score.max(score);
            Ok(entry.value().clone())
        })
    }

    fn overwrite_score(
        &self,
        username: String,
        score: u32,
    ) -> BoxFuture<'static, StorageResult<UserEntity>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            let user = UserEntity { username, score };
            store.inner.users.insert(user.username.clone(), user.clone());
            Ok(user)
        })
    }

    fn count_users(&self) -> BoxFuture<'static, StorageResult<u64>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            Ok(store.inner.users.len() as u64)
        })
    }

    fn list_users_ranked(
        &self,
        skip: u64,
        limit: u64,
    ) -> BoxFuture<'static, StorageResult<Vec<UserEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            Ok(store.ranked_users(skip, limit))
        })
    }

    fn insert_challenge(&self, challenge: ChallengeEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            match store.inner.challenges.entry(challenge.code.clone()) {
                Entry::Occupied(_) => Err(StorageError::duplicate(challenge.code)),
                Entry::Vacant(slot) => {
                    slot.insert(challenge);
                    Ok(())
                }
            }
        })
    }

    fn find_active_challenge(
        &self,
        code: String,
        now: SystemTime,
    ) -> BoxFuture<'static, StorageResult<Option<ChallengeEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            Ok(store
                .inner
                .challenges
                .get(&code)
                .map(|entry| entry.value().clone())
                .filter(|challenge| challenge.is_active(now)))
        })
    }

    fn purge_expired_challenges(&self, now: SystemTime) -> BoxFuture<'static, StorageResult<u64>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            let before = store.inner.challenges.len();
            store
                .inner
                .challenges
                .retain(|_, challenge| challenge.is_active(now));
            Ok(before.saturating_sub(store.inner.challenges.len()) as u64)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ensure_online().map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ensure_online().map_err(Into::into) })
    }
}
