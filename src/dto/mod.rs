use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Device command requests and responses.
pub mod command;
/// Dashboard projections.
pub mod dashboard;
/// Health check payloads.
pub mod health;
/// Server-sent event payloads.
pub mod sse;
/// Input validators shared by request payloads.
pub mod validation;

fn format_timestamp(time: OffsetDateTime) -> String {
    time.format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}
