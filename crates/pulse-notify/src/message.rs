use chrono::{DateTime, Utc};
use pulse_types::CheckState;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 通知路径
///
/// 下游按路径消费，格式保持稳定：
/// - 主机:     notifications.host.<metric>.<field>
/// - provider: notifications.provider.<id>.deltaRate
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationPath(String);

impl NotificationPath {
    /// 主机指标路径
    pub fn host(metric: &str, field: &str) -> Self {
        Self(format!("notifications.host.{}.{}", metric, field))
    }

    /// provider 指标路径
    pub fn provider(provider_id: &str) -> Self {
        Self(format!("notifications.provider.{}.deltaRate", provider_id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NotificationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 通知内容
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationValue {
    /// 状态
    pub state: CheckState,

    /// 可读消息
    pub message: String,

    /// 发布时间
    pub timestamp: DateTime<Utc>,
}

impl NotificationValue {
    pub fn new(state: CheckState, message: impl Into<String>) -> Self {
        Self {
            state,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

impl PartialEq for NotificationValue {
    // 时间戳不参与比较，重复发布同一内容视为相同
    fn eq(&self, other: &Self) -> bool {
        self.state == other.state && self.message == other.message
    }
}
