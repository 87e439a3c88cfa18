use crate::handlers::{
    get_health, get_health_status, get_host_info, get_provider_statistics, get_provider_status,
    list_provider_statistics, list_provider_status, record_provider_statistics, AppState,
};
use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // 健康查询
        .route("/health", get(get_health))
        .route("/health/status", get(get_health_status))
        // provider 检查快照
        .route("/providerStatus", get(list_provider_status))
        .route("/providerStatus/:provider", get(get_provider_status))
        // provider 原始统计
        .route("/providerStatistics", get(list_provider_statistics))
        .route(
            "/providerStatistics/:provider",
            get(get_provider_statistics).post(record_provider_statistics),
        )
        // 按需主机采样
        .route("/host", get(get_host_info))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
