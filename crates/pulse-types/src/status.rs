use crate::check::CheckResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 监控目标类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    /// 主机
    Host,
    /// 数据管道 provider
    Provider,
}

/// 目标的最近一次检查快照
///
/// 只读视图，由目标自己的检查周期写入，供状态查询接口读取
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetStatus {
    pub id: String,
    pub kind: TargetKind,
    /// 指标名称 -> 最近一次检查结果
    pub results: HashMap<String, CheckResult>,
    /// 指标名称 -> 连续失败次数
    pub streaks: HashMap<String, u32>,
    pub last_checked: DateTime<Utc>,
}

impl TargetStatus {
    pub fn new(id: impl Into<String>, kind: TargetKind) -> Self {
        Self {
            id: id.into(),
            kind,
            results: HashMap::new(),
            streaks: HashMap::new(),
            last_checked: Utc::now(),
        }
    }
}
