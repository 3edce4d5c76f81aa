use serde::Serialize;
use utoipa::ToSchema;

/// Simple health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok" or "degraded").
    pub status: String,
    /// Whether the last poll cycle reached the device.
    pub device_connected: bool,
}

impl HealthResponse {
    /// Create a health response indicating the device is reachable.
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            device_connected: true,
        }
    }

    /// Create a health response indicating the device cannot currently be reached.
    pub fn degraded() -> Self {
        Self {
            status: "degraded".to_string(),
            device_connected: false,
        }
    }
}
