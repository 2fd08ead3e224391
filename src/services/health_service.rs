use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Ping the store and report the catalog size, or degraded when storage is unreachable.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let Some(store) = state.store().await else {
        warn!("storage unavailable (degraded mode)");
        return HealthResponse::degraded();
    };

    if let Err(err) = store.health_check().await {
        warn!(error = %err, "storage health check failed");
        return HealthResponse::degraded();
    }
    if state.is_degraded() {
        return HealthResponse::degraded();
    }

    match store.count_destinations().await {
        Ok(size) => HealthResponse::ok(size),
        Err(err) => {
            warn!(error = %err, "failed to count destinations");
            HealthResponse::degraded()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::trivia_store::memory::MemoryStore,
        dto::health::HealthStatus,
        services::catalog::tests::four_cities,
        state::{AppState, clock::SystemClock},
    };

    #[tokio::test]
    async fn reports_catalog_size_when_healthy() {
        let store = MemoryStore::with_destinations(four_cities()).await;
        let state =
            AppState::with_store(AppConfig::default(), Arc::new(SystemClock), Arc::new(store))
                .await;
        let health = health_status(&state).await;
        assert_eq!(health.status, HealthStatus::Ok);
        assert_eq!(health.catalog_size, Some(4));
    }

    #[tokio::test]
    async fn degraded_without_store_or_when_offline() {
        let state = AppState::new(AppConfig::default());
        assert_eq!(health_status(&state).await.status, HealthStatus::Degraded);

        let store = MemoryStore::new();
        store.set_offline(true);
        state.set_store(Arc::new(store)).await;
        assert_eq!(health_status(&state).await.status, HealthStatus::Degraded);
    }
}
