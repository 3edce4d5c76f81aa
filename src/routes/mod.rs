use axum::Router;

use crate::state::SharedState;

/// Dashboard projection routes.
pub mod dashboard;
/// Device command routes.
pub mod device;
/// OpenAPI document and Swagger UI.
pub mod docs;
/// Health check routes.
pub mod health;
/// SSE stream route.
pub mod sse;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(sse::router())
        .merge(dashboard::router())
        .merge(device::router());

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}
