use serde::{Deserialize, Serialize};

/// 健康状态
///
/// 序关系固定为 ok < warn < alarm
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckState {
    /// 正常
    Ok,
    /// 警告
    Warn,
    /// 告警
    Alarm,
}

impl CheckState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckState::Ok => "ok",
            CheckState::Warn => "warn",
            CheckState::Alarm => "alarm",
        }
    }

    /// 是否为非正常状态
    pub fn is_unhealthy(&self) -> bool {
        *self != CheckState::Ok
    }
}

/// 单个指标的检查结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    /// 健康状态
    pub state: CheckState,
    /// 指标名称（cpu / memory / disk / deltaRate）
    pub metric: String,
    /// 字段名称（averageUsage / freeMemPercentage / ...）
    pub field: String,
    /// 本周期读数
    pub value: f64,
}

impl CheckResult {
    pub fn new(
        state: CheckState,
        metric: impl Into<String>,
        field: impl Into<String>,
        value: f64,
    ) -> Self {
        Self {
            state,
            metric: metric.into(),
            field: field.into(),
            value,
        }
    }
}
