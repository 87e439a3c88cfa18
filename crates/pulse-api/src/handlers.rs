use crate::error::ApiError;
use axum::{
    extract::{Path, State},
    Json,
};
use pulse_monitor::{HostMetricsCollector, ProviderStatisticsSource, SharedProviderStats, StatusRegistry};
use pulse_types::{HostSnapshot, ProviderStats, TargetStatus};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// 应用状态
#[derive(Clone)]
pub struct AppState {
    pub status: StatusRegistry,
    pub stats: SharedProviderStats,
    pub collector: Arc<dyn HostMetricsCollector>,
}

/// 完整健康详情响应
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub host: Option<TargetStatus>,
    pub providers: Vec<TargetStatus>,
}

/// 完整健康详情
pub async fn get_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        host: state.status.host().await,
        providers: state.status.providers().await,
    })
}

/// 存活探针，进程在即 UP
pub async fn get_health_status() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "UP",
    }))
}

/// 全部 provider 的检查快照
pub async fn list_provider_status(
    State(state): State<AppState>,
) -> Json<Vec<TargetStatus>> {
    Json(state.status.providers().await)
}

/// 单个 provider 的检查快照
pub async fn get_provider_status(
    State(state): State<AppState>,
    Path(provider): Path<String>,
) -> Result<Json<TargetStatus>, ApiError> {
    match state.status.get(&provider).await {
        Some(status) => Ok(Json(status)),
        None => {
            let msg = format!("No provider found for {}", provider);
            debug!("{}", msg);
            Err(ApiError::BadRequest(msg))
        }
    }
}

/// 全部 provider 的原始统计
pub async fn list_provider_statistics(
    State(state): State<AppState>,
) -> Json<HashMap<String, ProviderStats>> {
    Json(state.stats.all().await)
}

/// 单个 provider 的原始统计
pub async fn get_provider_statistics(
    State(state): State<AppState>,
    Path(provider): Path<String>,
) -> Result<Json<ProviderStats>, ApiError> {
    match state.stats.stats_for(&provider).await {
        Some(stats) => Ok(Json(stats)),
        None => {
            let msg = format!("No provider found for {}", provider);
            debug!("{}", msg);
            Err(ApiError::BadRequest(msg))
        }
    }
}

/// 数据管道层上报 provider 统计
pub async fn record_provider_statistics(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Json(stats): Json<ProviderStats>,
) -> Json<serde_json::Value> {
    state.stats.record(&provider, stats).await;
    Json(serde_json::json!({
        "provider": provider,
        "deltaRate": stats.delta_rate,
    }))
}

/// 绕过调度器按需采一次主机样本
pub async fn get_host_info(
    State(state): State<AppState>,
) -> Result<Json<HostSnapshot>, ApiError> {
    match state.collector.fetch().await {
        Ok(snapshot) => Ok(Json(snapshot)),
        Err(e) => {
            let msg = format!("Host metrics unavailable: {}", e);
            debug!("{}", msg);
            Err(ApiError::BadRequest(msg))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pulse_monitor::MonitorError;
    use pulse_types::TargetKind;

    struct StubCollector {
        fail: bool,
    }

    #[async_trait]
    impl HostMetricsCollector for StubCollector {
        async fn fetch(&self) -> Result<HostSnapshot, MonitorError> {
            if self.fail {
                Err(MonitorError::Collection("sampler offline".to_string()))
            } else {
                Ok(HostSnapshot {
                    cpu_average_usage: 12.0,
                    free_mem_percentage: 70.0,
                    free_disk_percentage: 55.0,
                })
            }
        }
    }

    fn test_state(fail_collector: bool) -> AppState {
        AppState {
            status: StatusRegistry::new(),
            stats: SharedProviderStats::new(),
            collector: Arc::new(StubCollector {
                fail: fail_collector,
            }),
        }
    }

    #[tokio::test]
    async fn test_health_status_is_up() {
        let Json(body) = get_health_status().await;
        assert_eq!(body["status"], "UP");
    }

    #[tokio::test]
    async fn test_health_empty_when_nothing_checked() {
        let state = test_state(false);
        let Json(body) = get_health(State(state)).await;
        assert!(body.host.is_none());
        assert!(body.providers.is_empty());
    }

    #[tokio::test]
    async fn test_provider_status_unknown_is_bad_request() {
        let state = test_state(false);
        let result = get_provider_status(State(state), Path("ghost".to_string())).await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_provider_status_found() {
        let state = test_state(false);
        state
            .status
            .update(TargetStatus::new("nmea", TargetKind::Provider))
            .await;

        let Json(status) = get_provider_status(State(state), Path("nmea".to_string()))
            .await
            .unwrap();
        assert_eq!(status.id, "nmea");
    }

    #[tokio::test]
    async fn test_statistics_roundtrip() {
        let state = test_state(false);

        record_provider_statistics(
            State(state.clone()),
            Path("nmea".to_string()),
            Json(ProviderStats { delta_rate: 1.5 }),
        )
        .await;

        let Json(stats) = get_provider_statistics(State(state.clone()), Path("nmea".to_string()))
            .await
            .unwrap();
        assert_eq!(stats.delta_rate, 1.5);

        let Json(all) = list_provider_statistics(State(state)).await;
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_host_info_on_demand() {
        let Json(snapshot) = get_host_info(State(test_state(false))).await.unwrap();
        assert_eq!(snapshot.cpu_average_usage, 12.0);
    }

    #[tokio::test]
    async fn test_host_info_collection_failure_is_bad_request() {
        let result = get_host_info(State(test_state(true))).await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }
}
