pub mod clock;
pub mod session;

use std::{sync::Arc, time::SystemTime};

use tokio::sync::{RwLock, watch};

use crate::{config::AppConfig, dao::trivia_store::TriviaStore, error::ServiceError};

use self::clock::{Clock, SystemClock};

pub type SharedState = Arc<AppState>;

/// Central application state holding the store handle, configuration and clock.
///
/// The store is installed once a backend connects and is then reused by every request;
/// until then the application runs in degraded mode and store-backed calls fail fast.
pub struct AppState {
    store: RwLock<Option<Arc<dyn TriviaStore>>>,
    degraded: watch::Sender<bool>,
    config: AppConfig,
    clock: Arc<dyn Clock>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig) -> SharedState {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Same as [`AppState::new`] with an explicit time source.
    pub fn with_clock(config: AppConfig, clock: Arc<dyn Clock>) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            store: RwLock::new(None),
            degraded: degraded_tx,
            config,
            clock,
        })
    }

    /// Build a state with `store` already installed.
    pub async fn with_store(
        config: AppConfig,
        clock: Arc<dyn Clock>,
        store: Arc<dyn TriviaStore>,
    ) -> SharedState {
        let state = Self::with_clock(config, clock);
        state.set_store(store).await;
        state
    }

    /// Obtain a handle to the current store, if one is installed.
    pub async fn store(&self) -> Option<Arc<dyn TriviaStore>> {
        let guard = self.store.read().await;
        guard.as_ref().cloned()
    }

    /// Obtain the current store or fail with [`ServiceError::Degraded`].
    pub async fn require_store(&self) -> Result<Arc<dyn TriviaStore>, ServiceError> {
        self.store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new store implementation and leave degraded mode.
    pub async fn set_store(&self, store: Arc<dyn TriviaStore>) {
        {
            let mut guard = self.store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false);
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        });
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Current wall-clock time according to the configured clock.
    pub fn now(&self) -> SystemTime {
        self.clock.now()
    }
}
