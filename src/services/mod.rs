/// Balance, coin breakdown and math statistics derived from device snapshots.
pub mod aggregation;
/// Snapshot comparisons that decide when the view is recomputed.
pub mod change_detector;
/// Device command forwarding.
pub mod command_service;
/// Read-only dashboard projections.
pub mod dashboard_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Background device polling with failure backoff.
pub mod poll_scheduler;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
