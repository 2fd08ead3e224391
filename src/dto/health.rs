use serde::Serialize;
use utoipa::ToSchema;

/// Coarse service status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Ok,
    /// No storage connection; game routes answer 503.
    Degraded,
}

/// Payload returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: HealthStatus,
    /// Number of destinations available; zero means the catalog still needs seeding.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_size: Option<u64>,
}

impl HealthResponse {
    /// Storage reachable; report the catalog size alongside.
    pub fn ok(catalog_size: u64) -> Self {
        Self {
            status: HealthStatus::Ok,
            catalog_size: Some(catalog_size),
        }
    }

    /// Storage unreachable.
    pub fn degraded() -> Self {
        Self {
            status: HealthStatus::Degraded,
            catalog_size: None,
        }
    }
}
