use crate::classify::Thresholds;
use crate::collector::{HostMetricsCollector, ProviderStatisticsSource};
use crate::error::MonitorError;
use crate::escalator::EmailEscalator;
use crate::publisher::NotificationPublisher;
use crate::status::{StatusRegistry, HOST_TARGET_ID};
use crate::streak::StreakTable;
use async_trait::async_trait;
use pulse_config::{HostConfig, ProviderConfig};
use pulse_notify::{MailTransport, NotificationPath, NotificationSink};
use pulse_types::{CheckResult, HostSnapshot, TargetKind, TargetStatus};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// 一个可被调度的检查周期
#[async_trait]
pub(crate) trait CheckCycle: Send + Sync {
    async fn run_cycle(&self);

    fn target_id(&self) -> &str;
}

/// 主机检查周期
///
/// 每个周期：采样 -> 三个指标分类 -> 去抖 -> 通知/邮件 -> 状态快照。
/// 配置在注册时拷贝一份快照，调度后不再变化
pub struct HostCheck {
    config: HostConfig,
    collector: Arc<dyn HostMetricsCollector>,
    streaks: StreakTable,
    status: StatusRegistry,
    publisher: NotificationPublisher,
    escalator: Option<EmailEscalator>,
}

impl HostCheck {
    pub fn new(
        config: HostConfig,
        collector: Arc<dyn HostMetricsCollector>,
        streaks: StreakTable,
        status: StatusRegistry,
        sink: Arc<dyn NotificationSink>,
        mailer: Option<Arc<dyn MailTransport>>,
    ) -> Self {
        Self {
            config,
            collector,
            streaks,
            status,
            publisher: NotificationPublisher::new(sink),
            escalator: mailer.map(EmailEscalator::new),
        }
    }

    pub async fn run_cycle(&self) {
        let snapshot = match self.collector.fetch().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                // 瞬时采集失败：跳过本周期，连击不变
                warn!(error = %e, "Host metrics collection failed, skipping cycle");
                return;
            }
        };

        let results = classify_host(&self.config, &snapshot);
        let email_enabled = self.config.email && self.escalator.is_some();

        let mut streaks = HashMap::new();
        let mut crossed = Vec::new();
        for result in &results {
            let decision = self
                .streaks
                .observe(
                    HOST_TARGET_ID,
                    &result.metric,
                    result.state,
                    self.config.check_max_attempts,
                    email_enabled,
                )
                .await;
            streaks.insert(result.metric.clone(), decision.streak);
            if decision.escalate {
                crossed.push(result.metric.clone());
            }
        }

        if self.config.notifications {
            for result in &results {
                let path = NotificationPath::host(&result.metric, &result.field);
                self.publisher.publish(&path, result).await;
            }
        }

        if !crossed.is_empty() {
            if let Some(escalator) = &self.escalator {
                let unhealthy: Vec<CheckResult> = results
                    .iter()
                    .filter(|r| r.state.is_unhealthy())
                    .cloned()
                    .collect();
                match escalator.escalate_host(&self.config.to, &unhealthy).await {
                    Ok(()) => {
                        for metric in &crossed {
                            self.streaks.mark_email_sent(HOST_TARGET_ID, metric).await;
                        }
                        info!(metrics = ?crossed, "Host incident email sent");
                    }
                    Err(e) => {
                        // 发送失败不置位，下个周期连击仍达标时重试
                        error!(error = %e, "Host incident email delivery failed");
                    }
                }
            }
        }

        let mut status = TargetStatus::new(HOST_TARGET_ID, TargetKind::Host);
        status.results = results
            .into_iter()
            .map(|r| (r.metric.clone(), r))
            .collect();
        status.streaks = streaks;
        self.status.update(status).await;
    }
}

#[async_trait]
impl CheckCycle for HostCheck {
    async fn run_cycle(&self) {
        HostCheck::run_cycle(self).await
    }

    fn target_id(&self) -> &str {
        HOST_TARGET_ID
    }
}

/// 三个主机指标的分类
///
/// CPU 使用率判高坏，空闲内存和空闲磁盘判低坏
pub(crate) fn classify_host(config: &HostConfig, snapshot: &HostSnapshot) -> Vec<CheckResult> {
    vec![
        CheckResult::new(
            Thresholds::high_bad(config.cpu_warning, config.cpu_alarm)
                .classify(snapshot.cpu_average_usage),
            "cpu",
            "averageUsage",
            snapshot.cpu_average_usage,
        ),
        CheckResult::new(
            Thresholds::low_bad(config.mem_warning, config.mem_alarm)
                .classify(snapshot.free_mem_percentage),
            "memory",
            "freeMemPercentage",
            snapshot.free_mem_percentage,
        ),
        CheckResult::new(
            Thresholds::low_bad(config.disk_warning, config.disk_alarm)
                .classify(snapshot.free_disk_percentage),
            "disk",
            "freePercentage",
            snapshot.free_disk_percentage,
        ),
    ]
}

/// provider 检查周期
pub struct ProviderCheck {
    provider_id: String,
    config: ProviderConfig,
    source: Arc<dyn ProviderStatisticsSource>,
    streaks: StreakTable,
    status: StatusRegistry,
    publisher: NotificationPublisher,
    escalator: Option<EmailEscalator>,
}

impl ProviderCheck {
    pub fn new(
        provider_id: impl Into<String>,
        config: ProviderConfig,
        source: Arc<dyn ProviderStatisticsSource>,
        streaks: StreakTable,
        status: StatusRegistry,
        sink: Arc<dyn NotificationSink>,
        mailer: Option<Arc<dyn MailTransport>>,
    ) -> Self {
        Self {
            provider_id: provider_id.into(),
            config,
            source,
            streaks,
            status,
            publisher: NotificationPublisher::new(sink),
            escalator: mailer.map(EmailEscalator::new),
        }
    }

    pub async fn run_cycle(&self) {
        let stats = match self.source.stats_for(&self.provider_id).await {
            Some(stats) => stats,
            None => {
                // 没有统计不算错误，跳过本周期
                let e = MonitorError::MissingStats(self.provider_id.clone());
                debug!(provider_id = %self.provider_id, "{}", e);
                return;
            }
        };

        // deltaRate 判低坏：管道掉速或断流才是故障
        let state = Thresholds::low_bad(self.config.delta_warning, self.config.delta_alarm)
            .classify(stats.delta_rate);
        let result = CheckResult::new(state, "deltaRate", "deltaRate", stats.delta_rate);

        let email_enabled = self.config.email && self.escalator.is_some();
        let decision = self
            .streaks
            .observe(
                &self.provider_id,
                &result.metric,
                result.state,
                self.config.check_max_attempts,
                email_enabled,
            )
            .await;

        if self.config.notifications {
            let path = NotificationPath::provider(&self.provider_id);
            self.publisher.publish(&path, &result).await;
        }

        if decision.escalate {
            if let Some(escalator) = &self.escalator {
                match escalator
                    .escalate_provider(&self.config.to, &self.provider_id, &result)
                    .await
                {
                    Ok(()) => {
                        self.streaks
                            .mark_email_sent(&self.provider_id, &result.metric)
                            .await;
                        info!(provider_id = %self.provider_id, "Provider incident email sent");
                    }
                    Err(e) => {
                        error!(provider_id = %self.provider_id, error = %e, "Provider incident email delivery failed");
                    }
                }
            }
        }

        let mut status = TargetStatus::new(&self.provider_id, TargetKind::Provider);
        status.streaks.insert(result.metric.clone(), decision.streak);
        status.results.insert(result.metric.clone(), result);
        self.status.update(status).await;
    }
}

#[async_trait]
impl CheckCycle for ProviderCheck {
    async fn run_cycle(&self) {
        ProviderCheck::run_cycle(self).await
    }

    fn target_id(&self) -> &str {
        &self.provider_id
    }
}
