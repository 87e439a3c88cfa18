use crate::error::MonitorError;
use async_trait::async_trait;
use pulse_types::{HostSnapshot, ProviderStats};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use sysinfo::{Disks, System, MINIMUM_CPU_UPDATE_INTERVAL};
use tokio::sync::{Mutex, RwLock};

/// 主机指标采集器
#[async_trait]
pub trait HostMetricsCollector: Send + Sync {
    /// 采一次主机样本，失败视为瞬时错误，本周期跳过
    async fn fetch(&self) -> Result<HostSnapshot, MonitorError>;
}

/// provider 统计来源
///
/// 查不到不算错误，由调用方记录并跳过该周期
#[async_trait]
pub trait ProviderStatisticsSource: Send + Sync {
    async fn stats_for(&self, provider_id: &str) -> Option<ProviderStats>;

    /// 全量快照，供统计查询接口使用
    async fn all(&self) -> HashMap<String, ProviderStats>;
}

/// 基于 sysinfo 的主机采集器
pub struct SystemHostCollector {
    system: Mutex<System>,
}

impl SystemHostCollector {
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new_all()),
        }
    }
}

impl Default for SystemHostCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HostMetricsCollector for SystemHostCollector {
    async fn fetch(&self) -> Result<HostSnapshot, MonitorError> {
        let mut system = self.system.lock().await;

        // CPU 使用率需要间隔两次刷新才有意义
        system.refresh_cpu_usage();
        tokio::time::sleep(MINIMUM_CPU_UPDATE_INTERVAL).await;
        system.refresh_cpu_usage();
        let cpu_average_usage = system.global_cpu_info().cpu_usage() as f64;

        system.refresh_memory();
        let total_memory = system.total_memory();
        if total_memory == 0 {
            return Err(MonitorError::Collection(
                "total memory reported as 0".to_string(),
            ));
        }
        let free_mem_percentage = system.available_memory() as f64 / total_memory as f64 * 100.0;

        let disks = Disks::new_with_refreshed_list();
        let disk = disks
            .list()
            .iter()
            .find(|d| d.mount_point() == Path::new("/"))
            .or_else(|| disks.list().first())
            .ok_or_else(|| MonitorError::Collection("no disks reported".to_string()))?;
        let total_space = disk.total_space();
        if total_space == 0 {
            return Err(MonitorError::Collection(
                "disk total space reported as 0".to_string(),
            ));
        }
        let free_disk_percentage = disk.available_space() as f64 / total_space as f64 * 100.0;

        Ok(HostSnapshot {
            cpu_average_usage,
            free_mem_percentage,
            free_disk_percentage,
        })
    }
}

/// 共享的 provider 统计注册表
///
/// 由数据管道层每个统计周期喂入，检查周期只读
#[derive(Clone, Default)]
pub struct SharedProviderStats {
    entries: Arc<RwLock<HashMap<String, ProviderStats>>>,
}

impl SharedProviderStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录某 provider 的当前统计
    pub async fn record(&self, provider_id: &str, stats: ProviderStats) {
        let mut entries = self.entries.write().await;
        entries.insert(provider_id.to_string(), stats);
    }

    pub async fn remove(&self, provider_id: &str) {
        let mut entries = self.entries.write().await;
        entries.remove(provider_id);
    }
}

#[async_trait]
impl ProviderStatisticsSource for SharedProviderStats {
    async fn stats_for(&self, provider_id: &str) -> Option<ProviderStats> {
        self.entries.read().await.get(provider_id).copied()
    }

    async fn all(&self) -> HashMap<String, ProviderStats> {
        self.entries.read().await.clone()
    }
}
