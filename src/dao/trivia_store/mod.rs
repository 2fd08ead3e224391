pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use std::time::SystemTime;

use crate::dao::models::{ChallengeEntity, DestinationEntity, UserEntity};
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;

/// Abstraction over the persistence layer for destinations, users and challenges.
///
/// Every method returns a `'static` future so handlers can hold the store behind an
/// `Arc<dyn TriviaStore>` and await without borrowing it.
pub trait TriviaStore: Send + Sync {
    fn count_destinations(&self) -> BoxFuture<'static, StorageResult<u64>>;
    /// Destination at `index` in a stable (city ascending) order.
    fn destination_at(&self, index: u64)
    -> BoxFuture<'static, StorageResult<Option<DestinationEntity>>>;
    /// Up to `size` destinations sampled without replacement, never including `exclude_city`.
    fn sample_destinations(
        &self,
        exclude_city: String,
        size: usize,
    ) -> BoxFuture<'static, StorageResult<Vec<DestinationEntity>>>;
    fn find_destination(
        &self,
        city: String,
    ) -> BoxFuture<'static, StorageResult<Option<DestinationEntity>>>;
    /// Upsert destinations by city, returning how many records were written.
    fn insert_destinations(
        &self,
        destinations: Vec<DestinationEntity>,
    ) -> BoxFuture<'static, StorageResult<usize>>;

    fn find_user(&self, username: String) -> BoxFuture<'static, StorageResult<Option<UserEntity>>>;
    /// Strict insert; fails with a duplicate key error when the username exists.
    fn create_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Atomically store `max(existing, score)`, creating the user when missing.
    fn upsert_max_score(
        &self,
        username: String,
        score: u32,
    ) -> BoxFuture<'static, StorageResult<UserEntity>>;
    /// Unconditionally store `score`, creating the user when missing.
    fn overwrite_score(
        &self,
        username: String,
        score: u32,
    ) -> BoxFuture<'static, StorageResult<UserEntity>>;
    fn count_users(&self) -> BoxFuture<'static, StorageResult<u64>>;
    /// Users ordered by score descending then username ascending.
    fn list_users_ranked(
        &self,
        skip: u64,
        limit: u64,
    ) -> BoxFuture<'static, StorageResult<Vec<UserEntity>>>;

    /// Insert a challenge; fails with a duplicate key error when the code is taken.
    fn insert_challenge(&self, challenge: ChallengeEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Challenge for `code` whose expiry is strictly after `now`.
    fn find_active_challenge(
        &self,
        code: String,
        now: SystemTime,
    ) -> BoxFuture<'static, StorageResult<Option<ChallengeEntity>>>;
    /// Drop challenges that expired at or before `now`, returning the count removed.
    fn purge_expired_challenges(&self, now: SystemTime) -> BoxFuture<'static, StorageResult<u64>>;

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
