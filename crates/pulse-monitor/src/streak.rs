use pulse_types::CheckState;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// 单个 (目标, 指标) 的失败连击
#[derive(Debug, Clone, Copy, Default)]
pub struct FailureStreak {
    /// 连续非 ok 次数
    pub count: u32,
    /// 本次事件是否已成功发过邮件
    pub email_sent: bool,
}

/// 去抖状态机的当前状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceState {
    /// 连击为 0
    Healthy,
    /// 连击 n，邮件未发
    Degraded(u32),
    /// 邮件已发，等待恢复
    Escalated,
}

/// 一次观察的去抖结论
#[derive(Debug, Clone, Copy)]
pub struct DebounceDecision {
    pub streak: u32,
    pub state: DebounceState,
    /// 本周期是否应尝试发邮件
    pub escalate: bool,
}

/// 失败连击表
///
/// 键为 (目标 id, 指标名)，条目在第一次观察时惰性创建。
/// 只有目标自身的检查周期会写入；读写锁保证与按需状态查询互斥。
///
/// 不变量：email_sent == true 蕴含自置位以来 count >= max_attempts，
/// 且只有 ok 观察能清掉该标志
#[derive(Clone, Default)]
pub struct StreakTable {
    entries: Arc<RwLock<HashMap<(String, String), FailureStreak>>>,
}

impl StreakTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一次分类观察并返回去抖结论
    ///
    /// escalate 为 true 当且仅当连击达到 max_attempts、目标启用了邮件、
    /// 且本次事件还没有成功送达过邮件。发送是否成功由调用方通过
    /// [`mark_email_sent`](Self::mark_email_sent) 回写，失败不置位，
    /// 下个周期连击仍达标时会再次得到 escalate
    pub async fn observe(
        &self,
        target: &str,
        metric: &str,
        state: CheckState,
        max_attempts: u32,
        email_enabled: bool,
    ) -> DebounceDecision {
        let mut entries = self.entries.write().await;
        let entry = entries
            .entry((target.to_string(), metric.to_string()))
            .or_default();

        if state == CheckState::Ok {
            // 恢复：连击和已发标志立即清零
            if entry.count > 0 {
                debug!(target_id = %target, metric = %metric, "Streak reset");
            }
            entry.count = 0;
            entry.email_sent = false;
            return DebounceDecision {
                streak: 0,
                state: DebounceState::Healthy,
                escalate: false,
            };
        }

        entry.count = entry.count.saturating_add(1);

        let escalate = email_enabled && entry.count >= max_attempts && !entry.email_sent;
        let state = if entry.email_sent {
            DebounceState::Escalated
        } else {
            DebounceState::Degraded(entry.count)
        };

        DebounceDecision {
            streak: entry.count,
            state,
            escalate,
        }
    }

    /// 升级邮件成功送达后标记，之后同一事件不再触发
    pub async fn mark_email_sent(&self, target: &str, metric: &str) {
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get_mut(&(target.to_string(), metric.to_string())) {
            entry.email_sent = true;
        }
    }

    /// 某目标所有指标的连击计数
    pub async fn counters_for(&self, target: &str) -> HashMap<String, u32> {
        let entries = self.entries.read().await;
        entries
            .iter()
            .filter(|((t, _), _)| t == target)
            .map(|((_, metric), streak)| (metric.clone(), streak.count))
            .collect()
    }

    pub async fn get(&self, target: &str, metric: &str) -> Option<FailureStreak> {
        let entries = self.entries.read().await;
        entries
            .get(&(target.to_string(), metric.to_string()))
            .copied()
    }

    /// 清空全表，调度器停止时调用
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}
