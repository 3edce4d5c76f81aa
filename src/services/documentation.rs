use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Piggy Bank Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::dashboard_stream,
        crate::routes::dashboard::get_dashboard,
        crate::routes::dashboard::get_balance,
        crate::routes::dashboard::get_coins,
        crate::routes::dashboard::get_history,
        crate::routes::dashboard::get_math,
        crate::routes::dashboard::get_connectivity,
        crate::routes::device::refresh,
        crate::routes::device::dispense_exact,
        crate::routes::device::dispense_denomination,
        crate::routes::device::empty_bank,
        crate::routes::device::update_lock,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::dashboard::DashboardResponse,
            crate::dto::dashboard::ConnectivityResponse,
            crate::dto::dashboard::CoinsResponse,
            crate::dto::dashboard::HistoryResponse,
            crate::dto::dashboard::HistoryEntrySummary,
            crate::dto::command::ExactDispenseRequest,
            crate::dto::command::DenominationDispenseRequest,
            crate::dto::command::LockRequest,
            crate::dto::command::CommandKind,
            crate::dto::command::CommandResponse,
            crate::dto::sse::BankUpdatedEvent,
            crate::dto::sse::HistoryUpdatedEvent,
            crate::dto::sse::MathUpdatedEvent,
            crate::services::aggregation::BalanceSummary,
            crate::services::aggregation::CoinBreakdownLine,
            crate::services::aggregation::MathSummary,
            crate::services::aggregation::MathSessionPoint,
            crate::state::bank::GameResult,
            crate::state::connectivity::ConnectionStatus,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "sse", description = "Server-sent events stream"),
        (name = "dashboard", description = "Read-only dashboard projections"),
        (name = "device", description = "Commands forwarded to the piggy bank"),
    )
)]
/// OpenAPI document for every route the service exposes.
pub struct ApiDoc;
