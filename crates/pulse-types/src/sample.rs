use serde::{Deserialize, Serialize};

/// 主机一次采样
///
/// 由外部采集器在每个检查周期产生，周期结束即失效
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HostSnapshot {
    /// CPU 平均使用率（百分比）
    #[serde(rename = "averageUsage")]
    pub cpu_average_usage: f64,
    /// 空闲内存（百分比）
    #[serde(rename = "freeMemPercentage")]
    pub free_mem_percentage: f64,
    /// 空闲磁盘（百分比）
    #[serde(rename = "freePercentage")]
    pub free_disk_percentage: f64,
}

/// 数据管道 provider 的当前统计
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProviderStats {
    /// 每秒增量消息数
    #[serde(rename = "deltaRate")]
    pub delta_rate: f64,
}
