use pulse_types::TargetStatus;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// 主机目标的固定 id
pub const HOST_TARGET_ID: &str = "host";

/// 状态注册表
///
/// 每个目标的检查周期写入自己的最新快照；
/// 状态查询接口只读。被禁用或还没检查过的目标没有条目
#[derive(Clone, Default)]
pub struct StatusRegistry {
    entries: Arc<RwLock<HashMap<String, TargetStatus>>>,
}

impl StatusRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入目标的最新快照
    pub async fn update(&self, status: TargetStatus) {
        let mut entries = self.entries.write().await;
        entries.insert(status.id.clone(), status);
    }

    pub async fn get(&self, target_id: &str) -> Option<TargetStatus> {
        self.entries.read().await.get(target_id).cloned()
    }

    /// 主机快照
    pub async fn host(&self) -> Option<TargetStatus> {
        self.get(HOST_TARGET_ID).await
    }

    /// 全部 provider 快照，按 id 排序保证输出稳定
    pub async fn providers(&self) -> Vec<TargetStatus> {
        let entries = self.entries.read().await;
        let mut providers: Vec<TargetStatus> = entries
            .values()
            .filter(|s| s.kind == pulse_types::TargetKind::Provider)
            .cloned()
            .collect();
        providers.sort_by(|a, b| a.id.cmp(&b.id));
        providers
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_types::TargetKind;

    #[tokio::test]
    async fn test_host_and_providers_partitioned() {
        let registry = StatusRegistry::new();

        registry
            .update(TargetStatus::new(HOST_TARGET_ID, TargetKind::Host))
            .await;
        registry
            .update(TargetStatus::new("nmea", TargetKind::Provider))
            .await;
        registry
            .update(TargetStatus::new("ais", TargetKind::Provider))
            .await;

        assert!(registry.host().await.is_some());

        let providers = registry.providers().await;
        assert_eq!(providers.len(), 2);
        // 按 id 排序
        assert_eq!(providers[0].id, "ais");
        assert_eq!(providers[1].id, "nmea");
    }

    #[tokio::test]
    async fn test_unknown_target_absent() {
        let registry = StatusRegistry::new();
        assert!(registry.get("nope").await.is_none());
        assert!(registry.host().await.is_none());
        assert!(registry.providers().await.is_empty());
    }
}
