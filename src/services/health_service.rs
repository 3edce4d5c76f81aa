use tracing::warn;

use crate::{
    dto::health::HealthResponse,
    state::{SharedState, connectivity::ConnectionStatus},
};

/// Report `ok` while the last poll reached the device and `degraded` otherwise.
pub fn health_status(state: &SharedState) -> HealthResponse {
    let connectivity = state.connectivity();
    match connectivity.status {
        ConnectionStatus::Connected => HealthResponse::ok(),
        status => {
            warn!(
                ?status,
                failures = connectivity.consecutive_failures,
                "device not connected (degraded mode)"
            );
            HealthResponse::degraded()
        }
    }
}
