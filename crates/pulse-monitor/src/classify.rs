use pulse_types::CheckState;
use serde::{Deserialize, Serialize};

/// 阈值比较方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// 越高越差（CPU 使用率）
    HighBad,
    /// 越低越差（空闲内存、空闲磁盘、deltaRate）
    LowBad,
}

/// 阈值三元组
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub warning: f64,
    pub alarm: f64,
    pub direction: Direction,
}

impl Thresholds {
    pub fn high_bad(warning: f64, alarm: f64) -> Self {
        Self {
            warning,
            alarm,
            direction: Direction::HighBad,
        }
    }

    pub fn low_bad(warning: f64, alarm: f64) -> Self {
        Self {
            warning,
            alarm,
            direction: Direction::LowBad,
        }
    }

    /// 把一个读数分类为健康状态
    ///
    /// 告警条件先于警告条件判断：阈值允许重叠，
    /// 同时满足两个条件的读数必须稳定地分类为 alarm
    pub fn classify(&self, value: f64) -> CheckState {
        match self.direction {
            Direction::HighBad => {
                if value >= self.alarm {
                    CheckState::Alarm
                } else if value >= self.warning {
                    CheckState::Warn
                } else {
                    CheckState::Ok
                }
            }
            Direction::LowBad => {
                if value <= self.alarm {
                    CheckState::Alarm
                } else if value <= self.warning {
                    CheckState::Warn
                } else {
                    CheckState::Ok
                }
            }
        }
    }
}
