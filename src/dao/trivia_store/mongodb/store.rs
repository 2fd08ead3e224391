use std::{sync::Arc, time::Duration, time::SystemTime};

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Client, Collection, Database, IndexModel,
    bson::{DateTime, Document, doc},
    options::{IndexOptions, ReturnDocument},
};
use tokio::sync::RwLock;
use tracing::debug;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult, is_duplicate_key},
    models::{MongoChallengeDocument, MongoUserDocument},
};
use crate::dao::{
    models::{ChallengeEntity, DestinationEntity, UserEntity},
    storage::StorageResult,
    trivia_store::TriviaStore,
};

const DESTINATION_COLLECTION_NAME: &str = "destinations";
const USER_COLLECTION_NAME: &str = "users";
const CHALLENGE_COLLECTION_NAME: &str = "challenges";

#[derive(Clone)]
pub struct MongoTriviaStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

impl MongoTriviaStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let database = self.database().await;

        let indexes: [(&'static str, &'static str, Document, IndexOptions); 5] = [
            (
                DESTINATION_COLLECTION_NAME,
                "city",
                doc! {"city": 1},
                IndexOptions::builder()
                    .name(Some("destination_city_idx".to_owned()))
                    .unique(Some(true))
                    .build(),
            ),
            (
                USER_COLLECTION_NAME,
                "username",
                doc! {"username": 1},
                IndexOptions::builder()
                    .name(Some("user_username_idx".to_owned()))
                    .unique(Some(true))
                    .build(),
            ),
            (
                USER_COLLECTION_NAME,
                "score,username",
                doc! {"score": -1, "username": 1},
                IndexOptions::builder()
                    .name(Some("user_rank_idx".to_owned()))
                    .build(),
            ),
            (
                CHALLENGE_COLLECTION_NAME,
                "code",
                doc! {"code": 1},
                IndexOptions::builder()
                    .name(Some("challenge_code_idx".to_owned()))
                    .unique(Some(true))
                    .build(),
            ),
            (
                CHALLENGE_COLLECTION_NAME,
                "expires_at",
                doc! {"expires_at": 1},
                IndexOptions::builder()
                    .name(Some("challenge_expiry_ttl".to_owned()))
                    .expire_after(Some(Duration::from_secs(0)))
                    .build(),
            ),
        ];

        for (collection, index, keys, options) in indexes {
            let model = IndexModel::builder().keys(keys).options(options).build();
            database
                .collection::<Document>(collection)
                .create_index(model)
                .await
                .map_err(|source| MongoDaoError::EnsureIndex {
                    collection,
                    index,
                    source,
                })?;
        }

        Ok(())
    }

    async fn database(&self) -> Database {
        let guard = self.inner.state.read().await;
        guard.database.clone()
    }

    async fn destinations(&self) -> Collection<DestinationEntity> {
        self.database()
            .await
            .collection::<DestinationEntity>(DESTINATION_COLLECTION_NAME)
    }

    async fn users(&self) -> Collection<MongoUserDocument> {
        self.database()
            .await
            .collection::<MongoUserDocument>(USER_COLLECTION_NAME)
    }

    async fn challenges(&self) -> Collection<MongoChallengeDocument> {
        self.database()
            .await
            .collection::<MongoChallengeDocument>(CHALLENGE_COLLECTION_NAME)
    }

    async fn count_destinations(&self) -> MongoResult<u64> {
        self.destinations()
            .await
            .count_documents(doc! {})
            .await
            .map_err(|source| MongoDaoError::LoadDestinations { source })
    }

    async fn destination_at(&self, index: u64) -> MongoResult<Option<DestinationEntity>> {
        self.destinations()
            .await
            .find_one(doc! {})
            .sort(doc! {"city": 1})
            .skip(index)
            .await
            .map_err(|source| MongoDaoError::LoadDestinations { source })
    }

    async fn sample_destinations(
        &self,
        exclude_city: String,
        size: usize,
    ) -> MongoResult<Vec<DestinationEntity>> {
        let size = i64::try_from(size).unwrap_or(i64::MAX);
        self.destinations()
            .await
            .aggregate(vec![
                doc! {"$match": {"city": {"$ne": exclude_city}}},
                doc! {"$sample": {"size": size}},
            ])
            .with_type::<DestinationEntity>()
            .await
            .map_err(|source| MongoDaoError::LoadDestinations { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::LoadDestinations { source })
    }

    async fn find_destination(&self, city: String) -> MongoResult<Option<DestinationEntity>> {
        self.destinations()
            .await
            .find_one(doc! {"city": city})
            .await
            .map_err(|source| MongoDaoError::LoadDestinations { source })
    }

    async fn insert_destinations(&self, destinations: Vec<DestinationEntity>) -> MongoResult<usize> {
        let collection = self.destinations().await;
        let mut written = 0;
        for destination in destinations {
            collection
                .replace_one(doc! {"city": destination.city.as_str()}, &destination)
                .upsert(true)
                .await
                .map_err(|source| MongoDaoError::SaveDestination {
                    city: destination.city.clone(),
                    source,
                })?;
            written += 1;
        }
        Ok(written)
    }

    async fn find_user(&self, username: String) -> MongoResult<Option<UserEntity>> {
        let document = self
            .users()
            .await
            .find_one(doc! {"username": username.as_str()})
            .await
            .map_err(|source| MongoDaoError::LoadUser { username, source })?;
        Ok(document.map(Into::into))
    }

    async fn create_user(&self, user: UserEntity) -> MongoResult<()> {
        let document = MongoUserDocument {
            username: user.username.clone(),
            score: i64::from(user.score),
        };
        match self.users().await.insert_one(&document).await {
            Ok(_) => Ok(()),
            Err(err) if is_duplicate_key(&err) => Err(MongoDaoError::Duplicate {
                key: user.username,
            }),
            Err(source) => Err(MongoDaoError::SaveUser {
                username: user.username,
                source,
            }),
        }
    }

    /// Apply an update operator as an upsert and return the stored document.
    ///
    /// Two concurrent upserts for a missing username can race on the unique index; the loser
    /// gets a duplicate key error and is retried once, at which point the document exists.
    async fn upsert_user(&self, username: String, update: Document) -> MongoResult<UserEntity> {
        let collection = self.users().await;
        let mut retried = false;
        loop {
            let result = collection
                .find_one_and_update(doc! {"username": username.as_str()}, update.clone())
                .upsert(true)
                .return_document(ReturnDocument::After)
                .await;

            match result {
                Ok(Some(document)) => return Ok(document.into()),
                Ok(None) => {
                    return Ok(UserEntity {
                        username,
                        score: 0,
                    });
                }
                Err(err) if is_duplicate_key(&err) && !retried => {
                    debug!(%username, "concurrent user upsert collided; retrying");
                    retried = true;
                }
                Err(source) => return Err(MongoDaoError::SaveUser { username, source }),
            }
        }
    }

    async fn list_users_ranked(&self, skip: u64, limit: u64) -> MongoResult<Vec<UserEntity>> {
        let documents: Vec<MongoUserDocument> = self
            .users()
            .await
            .find(doc! {})
            .sort(doc! {"score": -1, "username": 1})
            .skip(skip)
            .limit(i64::try_from(limit).unwrap_or(i64::MAX))
            .await
            .map_err(|source| MongoDaoError::ListUsers { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListUsers { source })?;

        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn count_users(&self) -> MongoResult<u64> {
        self.users()
            .await
            .count_documents(doc! {})
            .await
            .map_err(|source| MongoDaoError::ListUsers { source })
    }

    async fn insert_challenge(&self, challenge: ChallengeEntity) -> MongoResult<()> {
        let code = challenge.code.clone();
        let document: MongoChallengeDocument = challenge.into();
        match self.challenges().await.insert_one(&document).await {
            Ok(_) => Ok(()),
            Err(err) if is_duplicate_key(&err) => Err(MongoDaoError::Duplicate { key: code }),
            Err(source) => Err(MongoDaoError::SaveChallenge { code, source }),
        }
    }

    async fn find_active_challenge(
        &self,
        code: String,
        now: SystemTime,
    ) -> MongoResult<Option<ChallengeEntity>> {
        let document = self
            .challenges()
            .await
            .find_one(doc! {
                "code": code.as_str(),
                "expires_at": {"$gt": DateTime::from_system_time(now)},
            })
            .await
            .map_err(|source| MongoDaoError::LoadChallenge { code, source })?;
        Ok(document.map(Into::into))
    }

    async fn purge_expired_challenges(&self, now: SystemTime) -> MongoResult<u64> {
        let result = self
            .challenges()
            .await
            .delete_many(doc! {"expires_at": {"$lte": DateTime::from_system_time(now)}})
            .await
            .map_err(|source| MongoDaoError::PurgeChallenges { source })?;
        Ok(result.deleted_count)
    }
}

impl TriviaStore for MongoTriviaStore {
    fn count_destinations(&self) -> BoxFuture<'static, StorageResult<u64>> {
        let store = self.clone();
        Box::pin(async move { store.count_destinations().await.map_err(Into::into) })
    }

    fn destination_at(
        &self,
        index: u64,
    ) -> BoxFuture<'static, StorageResult<Option<DestinationEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.destination_at(index).await.map_err(Into::into) })
    }

    fn sample_destinations(
        &self,
        exclude_city: String,
        size: usize,
    ) -> BoxFuture<'static, StorageResult<Vec<DestinationEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .sample_destinations(exclude_city, size)
                .await
                .map_err(Into::into)
        })
    }

    fn find_destination(
        &self,
        city: String,
    ) -> BoxFuture<'static, StorageResult<Option<DestinationEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_destination(city).await.map_err(Into::into) })
    }

    fn insert_destinations(
        &self,
        destinations: Vec<DestinationEntity>,
    ) -> BoxFuture<'static, StorageResult<usize>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .insert_destinations(destinations)
                .await
                .map_err(Into::into)
        })
    }

    fn find_user(&self, username: String) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_user(username).await.map_err(Into::into) })
    }

    fn create_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.create_user(user).await.map_err(Into::into) })
    }

    fn upsert_max_score(
        &self,
        username: String,
        score: u32,
    ) -> BoxFuture<'static, StorageResult<UserEntity>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .upsert_user(username, doc! {"$max": {"score": i64::from(score)}})
                .await
                .map_err(Into::into)
        })
    }

    fn overwrite_score(
        &self,
        username: String,
        score: u32,
    ) -> BoxFuture<'static, StorageResult<UserEntity>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .upsert_user(username, doc! {"$set": {"score": i64::from(score)}})
                .await
                .map_err(Into::into)
        })
    }

    fn count_users(&self) -> BoxFuture<'static, StorageResult<u64>> {
        let store = self.clone();
        Box::pin(async move { store.count_users().await.map_err(Into::into) })
    }

    fn list_users_ranked(
        &self,
        skip: u64,
        limit: u64,
    ) -> BoxFuture<'static, StorageResult<Vec<UserEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_users_ranked(skip, limit).await.map_err(Into::into) })
    }

    fn insert_challenge(&self, challenge: ChallengeEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert_challenge(challenge).await.map_err(Into::into) })
    }

    fn find_active_challenge(
        &self,
        code: String,
        now: SystemTime,
    ) -> BoxFuture<'static, StorageResult<Option<ChallengeEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_active_challenge(code, now)
                .await
                .map_err(Into::into)
        })
    }

    fn purge_expired_challenges(&self, now: SystemTime) -> BoxFuture<'static, StorageResult<u64>> {
        let store = self.clone();
        Box::pin(async move { store.purge_expired_challenges(now).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
