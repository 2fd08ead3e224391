//! Destination catalog: uniform random picks, distractor sampling, lookups and seeding.

use std::{collections::HashSet, fs, path::Path, sync::Arc};

use rand::Rng;
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    dao::{models::DestinationEntity, storage::StorageError, trivia_store::TriviaStore},
    error::ServiceError,
};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("destination catalog is empty")]
    Empty,
    #[error("destination catalog holds {available} destination(s), {required} required")]
    Insufficient { available: u64, required: u64 },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<CatalogError> for ServiceError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Storage(source) => source.into(),
            other => ServiceError::NotFound(other.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read catalog file `{path}`")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse catalog file `{path}`")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Read-mostly view over the destinations held by a [`TriviaStore`].
#[derive(Clone)]
pub struct Catalog {
    store: Arc<dyn TriviaStore>,
}

impl Catalog {
    pub fn new(store: Arc<dyn TriviaStore>) -> Self {
        Self { store }
    }

    /// Number of destinations available.
    pub async fn size(&self) -> Result<u64, CatalogError> {
        Ok(self.store.count_destinations().await?)
    }

    /// Pick one destination uniformly at random.
    pub async fn random_destination<R>(&self, rng: &mut R) -> Result<DestinationEntity, CatalogError>
    where
        R: Rng + Send,
    {
        let size = self.size().await?;
        self.pick(size, rng).await
    }

    /// Pick uniformly among the first `size` destinations in stable order.
    pub async fn pick<R>(&self, size: u64, rng: &mut R) -> Result<DestinationEntity, CatalogError>
    where
        R: Rng + Send,
    {
        if size == 0 {
            return Err(CatalogError::Empty);
        }
        let index = rng.random_range(0..size);
        // A concurrent reseed can shrink the catalog between count and fetch.
        self.store
            .destination_at(index)
            .await?
            .ok_or(CatalogError::Empty)
    }

    /// Up to `count` distinct destinations other than `exclude_city`, uniformly sampled.
    pub async fn sample_distractors(
        &self,
        exclude_city: &str,
        count: usize,
    ) -> Result<Vec<DestinationEntity>, CatalogError> {
        Ok(self
            .store
            .sample_destinations(exclude_city.to_owned(), count)
            .await?)
    }

    pub async fn find_by_city(&self, city: &str) -> Result<Option<DestinationEntity>, CatalogError> {
        Ok(self.store.find_destination(city.to_owned()).await?)
    }

    /// Write the valid, de-duplicated subset of `destinations` and return how many were stored.
    pub async fn seed(&self, destinations: Vec<DestinationEntity>) -> Result<usize, StorageError> {
        let accepted = retain_valid(destinations);
        if accepted.is_empty() {
            return Ok(0);
        }
        self.store.insert_destinations(accepted).await
    }

    /// Load a JSON array of destinations from disk and seed the store with it.
    pub async fn seed_from_file(&self, path: &Path) -> Result<usize, SeedError> {
        let path_label = path.display().to_string();
        let contents = fs::read_to_string(path).map_err(|source| SeedError::Read {
            path: path_label.clone(),
            source,
        })?;
        let destinations: Vec<DestinationEntity> =
            serde_json::from_str(&contents).map_err(|source| SeedError::Parse {
                path: path_label.clone(),
                source,
            })?;

        let written = self.seed(destinations).await?;
        info!(path = %path_label, written, "seeded destination catalog");
        Ok(written)
    }
}

/// Drop records that break the catalog invariants; the first occurrence of a city wins.
fn retain_valid(destinations: Vec<DestinationEntity>) -> Vec<DestinationEntity> {
    let mut seen = HashSet::new();
    destinations
        .into_iter()
        .filter(|destination| match destination.check() {
            Ok(()) => {
                if seen.insert(destination.city.clone()) {
                    true
                } else {
                    warn!(city = %destination.city, "skipping duplicate destination");
                    false
                }
            }
            Err(reason) => {
                warn!(%reason, "skipping invalid destination");
                false
            }
        })
        .collect()
}
