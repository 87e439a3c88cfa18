use crate::check::{CheckCycle, HostCheck, ProviderCheck};
use crate::collector::{HostMetricsCollector, ProviderStatisticsSource};
use crate::status::StatusRegistry;
use crate::streak::StreakTable;
use pulse_config::HealthcheckConfig;
use pulse_notify::{MailTransport, NotificationSink};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, error, info, warn};

/// 健康检查调度器
///
/// 每个启用的目标一个独立定时任务：首次立即执行，
/// 之后按目标自己的频率固定周期重复。目标之间没有顺序保证，
/// 单个目标的周期严格串行。停止时所有任务一起取消，
/// 对从未启动过任务的目标调用停止也是安全的
pub struct HealthMonitor {
    config: HealthcheckConfig,
    collector: Arc<dyn HostMetricsCollector>,
    provider_stats: Arc<dyn ProviderStatisticsSource>,
    sink: Arc<dyn NotificationSink>,
    mailer: Option<Arc<dyn MailTransport>>,
    streaks: StreakTable,
    status: StatusRegistry,
    shutdown_tx: broadcast::Sender<()>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl HealthMonitor {
    pub fn new(
        config: HealthcheckConfig,
        collector: Arc<dyn HostMetricsCollector>,
        provider_stats: Arc<dyn ProviderStatisticsSource>,
        sink: Arc<dyn NotificationSink>,
        mailer: Option<Arc<dyn MailTransport>>,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(16);
        Self {
            config,
            collector,
            provider_stats,
            sink,
            mailer,
            streaks: StreakTable::new(),
            status: StatusRegistry::new(),
            shutdown_tx,
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// 状态查询句柄
    pub fn status(&self) -> StatusRegistry {
        self.status.clone()
    }

    /// 连击表句柄
    pub fn streaks(&self) -> StreakTable {
        self.streaks.clone()
    }

    /// 当前在跑的定时任务数
    pub async fn task_count(&self) -> usize {
        self.tasks.lock().await.len()
    }

    /// 启动所有启用目标的定时任务
    ///
    /// 校验失败的目标记录错误且不调度，其余目标不受影响
    pub async fn start(&self) {
        let mut tasks = self.tasks.lock().await;
        if !tasks.is_empty() {
            warn!("Health monitor is already running");
            return;
        }

        let smtp_configured = self.mailer.is_some();

        if self.config.host.enabled {
            match self.config.host.validate(smtp_configured) {
                Ok(()) => {
                    let check = HostCheck::new(
                        self.config.host.clone(),
                        self.collector.clone(),
                        self.streaks.clone(),
                        self.status.clone(),
                        self.sink.clone(),
                        self.mailer.clone(),
                    );
                    tasks.push(
                        self.spawn_target(Box::new(check), self.config.host.check_frequency),
                    );
                }
                Err(e) => {
                    let e = crate::MonitorError::Config(e.to_string());
                    error!(target_id = "host", error = %e, "Target not scheduled");
                }
            }
        }

        for (provider_id, config) in &self.config.providers {
            if !config.enabled {
                continue;
            }
            match config.validate(smtp_configured) {
                Ok(()) => {
                    let check = ProviderCheck::new(
                        provider_id.clone(),
                        config.clone(),
                        self.provider_stats.clone(),
                        self.streaks.clone(),
                        self.status.clone(),
                        self.sink.clone(),
                        self.mailer.clone(),
                    );
                    tasks.push(self.spawn_target(Box::new(check), config.check_frequency));
                }
                Err(e) => {
                    let e = crate::MonitorError::Config(e.to_string());
                    error!(target_id = %provider_id, error = %e, "Target not scheduled");
                }
            }
        }

        info!(tasks = tasks.len(), "Health monitor started");
    }

    fn spawn_target(&self, check: Box<dyn CheckCycle>, frequency_secs: u64) -> JoinHandle<()> {
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        tokio::spawn(async move {
            // interval 的第一个 tick 立即完成，目标注册后马上检查一次
            let mut ticker = interval(Duration::from_secs(frequency_secs));
            loop {
                tokio::select! {
                    _ = ticker.tick() => check.run_cycle().await,
                    _ = shutdown_rx.recv() => {
                        debug!(target_id = %check.target_id(), "Check task stopped");
                        break;
                    }
                }
            }
        })
    }

    /// 停止所有定时任务
    ///
    /// 在途的采集允许完成，之后任务退出；连击状态随调度器一起销毁
    pub async fn stop(&self) {
        let _ = self.shutdown_tx.send(());

        let mut tasks = self.tasks.lock().await;
        for task in tasks.drain(..) {
            let _ = task.await;
        }

        self.streaks.clear().await;
        info!("Health monitor stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::SharedProviderStats;
    use crate::error::MonitorError;
    use async_trait::async_trait;
    use pulse_config::{HostConfig, ProviderConfig};
    use pulse_notify::MemorySink;
    use pulse_types::{HostSnapshot, ProviderStats};

    struct StaticCollector(HostSnapshot);

    #[async_trait]
    impl HostMetricsCollector for StaticCollector {
        async fn fetch(&self) -> Result<HostSnapshot, MonitorError> {
            Ok(self.0)
        }
    }

    fn monitor_with(config: HealthcheckConfig, stats: SharedProviderStats) -> HealthMonitor {
        HealthMonitor::new(
            config,
            Arc::new(StaticCollector(HostSnapshot {
                cpu_average_usage: 10.0,
                free_mem_percentage: 80.0,
                free_disk_percentage: 80.0,
            })),
            Arc::new(stats),
            Arc::new(MemorySink::new()),
            None,
        )
    }

    #[tokio::test]
    async fn test_all_disabled_spawns_nothing() {
        let monitor = monitor_with(HealthcheckConfig::default(), SharedProviderStats::new());

        monitor.start().await;
        assert_eq!(monitor.task_count().await, 0);

        // 从未启动任何定时器时停止也安全
        monitor.stop().await;
    }

    #[tokio::test]
    async fn test_stop_without_start_is_safe() {
        let monitor = monitor_with(HealthcheckConfig::default(), SharedProviderStats::new());
        monitor.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_enabled_targets_run_and_stop() {
        let stats = SharedProviderStats::new();
        stats.record("nmea", ProviderStats { delta_rate: 0.2 }).await;

        let mut config = HealthcheckConfig::default();
        config.host = HostConfig {
            enabled: true,
            check_frequency: 1,
            ..Default::default()
        };
        config.providers.insert(
            "nmea".to_string(),
            ProviderConfig {
                enabled: true,
                check_frequency: 1,
                delta_alarm: 0.5,
                ..Default::default()
            },
        );
        // 禁用的 provider 不产生任务也不产生状态
        config
            .providers
            .insert("idle".to_string(), ProviderConfig::default());

        let monitor = monitor_with(config, stats);
        monitor.start().await;
        assert_eq!(monitor.task_count().await, 2);

        // 首次 tick 立即执行
        tokio::time::sleep(Duration::from_millis(50)).await;
        let status = monitor.status();
        assert!(status.host().await.is_some());
        assert!(status.get("nmea").await.is_some());
        assert!(status.get("idle").await.is_none());

        // 几个周期后连击随周期推进
        tokio::time::sleep(Duration::from_secs(3)).await;
        let streak = monitor.streaks().get("nmea", "deltaRate").await.unwrap();
        assert!(streak.count >= 3);

        monitor.stop().await;
        assert_eq!(monitor.task_count().await, 0);
        // 连击状态随调度器停止销毁
        assert!(monitor.streaks().get("nmea", "deltaRate").await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_target_does_not_block_others() {
        let stats = SharedProviderStats::new();
        stats.record("good", ProviderStats { delta_rate: 5.0 }).await;

        let mut config = HealthcheckConfig::default();
        config.providers.insert(
            "bad".to_string(),
            ProviderConfig {
                enabled: true,
                check_frequency: 0,
                ..Default::default()
            },
        );
        config.providers.insert(
            "good".to_string(),
            ProviderConfig {
                enabled: true,
                check_frequency: 1,
                ..Default::default()
            },
        );

        let monitor = monitor_with(config, stats);
        monitor.start().await;

        // 非法目标被拒绝，合法目标照常调度
        assert_eq!(monitor.task_count().await, 1);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(monitor.status().get("good").await.is_some());
        assert!(monitor.status().get("bad").await.is_none());

        monitor.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_email_enabled_without_smtp_rejected() {
        let mut config = HealthcheckConfig::default();
        config.host = HostConfig {
            enabled: true,
            email: true,
            to: vec!["ops@example.com".to_string()],
            ..Default::default()
        };

        // mailer 未配置，email 目标校验失败不调度
        let monitor = monitor_with(config, SharedProviderStats::new());
        monitor.start().await;
        assert_eq!(monitor.task_count().await, 0);
        monitor.stop().await;
    }
}
