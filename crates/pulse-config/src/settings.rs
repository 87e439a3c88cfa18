use anyhow::{anyhow, Result};
use pulse_notify::SmtpConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 健康检查配置
///
/// 启动时一次性构造并校验，调度开始后不再变化
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HealthcheckConfig {
    #[serde(default)]
    pub host: HostConfig,

    /// provider id -> 配置
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    /// SMTP 出口，启用邮件的目标必须配置
    #[serde(default)]
    pub smtp: Option<SmtpConfig>,
}

impl Default for HealthcheckConfig {
    fn default() -> Self {
        Self {
            host: HostConfig::default(),
            providers: HashMap::new(),
            smtp: None,
        }
    }
}

/// 主机目标配置
///
/// 默认值与配置界面的 schema 默认值一致
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HostConfig {
    #[serde(default)]
    pub enabled: bool,

    /// CPU 平均使用率警告阈值（百分比，越高越差）
    #[serde(default = "default_cpu_warning")]
    pub cpu_warning: f64,
    #[serde(default = "default_cpu_alarm")]
    pub cpu_alarm: f64,

    /// 空闲内存警告阈值（百分比，越低越差）
    #[serde(default = "default_free_warning")]
    pub mem_warning: f64,
    #[serde(default = "default_free_alarm")]
    pub mem_alarm: f64,

    /// 空闲磁盘警告阈值（百分比，越低越差）
    #[serde(default = "default_free_warning")]
    pub disk_warning: f64,
    #[serde(default = "default_free_alarm")]
    pub disk_alarm: f64,

    /// 检查周期（秒）
    #[serde(default = "default_check_frequency")]
    pub check_frequency: u64,

    /// 连续失败多少次后升级发邮件
    #[serde(default = "default_check_max_attempts")]
    pub check_max_attempts: u32,

    #[serde(default = "default_true")]
    pub notifications: bool,

    #[serde(default)]
    pub email: bool,

    /// 邮件收件人
    #[serde(default)]
    pub to: Vec<String>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            cpu_warning: default_cpu_warning(),
            cpu_alarm: default_cpu_alarm(),
            mem_warning: default_free_warning(),
            mem_alarm: default_free_alarm(),
            disk_warning: default_free_warning(),
            disk_alarm: default_free_alarm(),
            check_frequency: default_check_frequency(),
            check_max_attempts: default_check_max_attempts(),
            notifications: true,
            email: false,
            to: Vec::new(),
        }
    }
}

impl HostConfig {
    /// 调度前校验，失败的目标不会被调度
    pub fn validate(&self, smtp_configured: bool) -> Result<()> {
        if self.check_frequency == 0 {
            return Err(anyhow!("check_frequency must be greater than 0"));
        }
        if self.check_max_attempts == 0 {
            return Err(anyhow!("check_max_attempts must be at least 1"));
        }
        for (name, value) in [
            ("cpu_warning", self.cpu_warning),
            ("cpu_alarm", self.cpu_alarm),
            ("mem_warning", self.mem_warning),
            ("mem_alarm", self.mem_alarm),
            ("disk_warning", self.disk_warning),
            ("disk_alarm", self.disk_alarm),
        ] {
            if !value.is_finite() {
                return Err(anyhow!("{} must be a finite number", name));
            }
        }
        if self.email {
            if self.to.is_empty() {
                return Err(anyhow!("email is enabled but no destination addresses set"));
            }
            if !smtp_configured {
                return Err(anyhow!("email is enabled but no [smtp] section configured"));
            }
        }
        Ok(())
    }
}

/// provider 目标配置
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub enabled: bool,

    /// 期望 deltas/s 警告阈值（越低越差）
    #[serde(default = "default_delta_threshold")]
    pub delta_warning: f64,
    #[serde(default = "default_delta_threshold")]
    pub delta_alarm: f64,

    #[serde(default = "default_check_frequency")]
    pub check_frequency: u64,

    #[serde(default = "default_check_max_attempts")]
    pub check_max_attempts: u32,

    #[serde(default = "default_true")]
    pub notifications: bool,

    #[serde(default)]
    pub email: bool,

    #[serde(default)]
    pub to: Vec<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            delta_warning: default_delta_threshold(),
            delta_alarm: default_delta_threshold(),
            check_frequency: default_check_frequency(),
            check_max_attempts: default_check_max_attempts(),
            notifications: true,
            email: false,
            to: Vec::new(),
        }
    }
}

impl ProviderConfig {
    pub fn validate(&self, smtp_configured: bool) -> Result<()> {
        if self.check_frequency == 0 {
            return Err(anyhow!("check_frequency must be greater than 0"));
        }
        if self.check_max_attempts == 0 {
            return Err(anyhow!("check_max_attempts must be at least 1"));
        }
        if !self.delta_warning.is_finite() || !self.delta_alarm.is_finite() {
            return Err(anyhow!("delta thresholds must be finite numbers"));
        }
        if self.email {
            if self.to.is_empty() {
                return Err(anyhow!("email is enabled but no destination addresses set"));
            }
            if !smtp_configured {
                return Err(anyhow!("email is enabled but no [smtp] section configured"));
            }
        }
        Ok(())
    }
}

fn default_cpu_warning() -> f64 {
    80.0
}

fn default_cpu_alarm() -> f64 {
    90.0
}

fn default_free_warning() -> f64 {
    20.0
}

fn default_free_alarm() -> f64 {
    10.0
}

fn default_delta_threshold() -> f64 {
    1.0
}

fn default_check_frequency() -> u64 {
    60
}

fn default_check_max_attempts() -> u32 {
    3
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_defaults_match_schema() {
        let config = HostConfig::default();
        assert!(!config.enabled);
        assert_eq!(config.cpu_warning, 80.0);
        assert_eq!(config.cpu_alarm, 90.0);
        assert_eq!(config.mem_warning, 20.0);
        assert_eq!(config.mem_alarm, 10.0);
        assert_eq!(config.disk_warning, 20.0);
        assert_eq!(config.disk_alarm, 10.0);
        assert_eq!(config.check_frequency, 60);
        assert_eq!(config.check_max_attempts, 3);
        assert!(config.notifications);
        assert!(!config.email);
    }

    #[test]
    fn test_provider_defaults_match_schema() {
        let config = ProviderConfig::default();
        assert!(!config.enabled);
        assert_eq!(config.delta_warning, 1.0);
        assert_eq!(config.delta_alarm, 1.0);
        assert_eq!(config.check_frequency, 60);
        assert_eq!(config.check_max_attempts, 3);
    }

    #[test]
    fn test_zero_frequency_rejected() {
        let config = HostConfig {
            check_frequency: 0,
            ..Default::default()
        };
        assert!(config.validate(false).is_err());
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let config = ProviderConfig {
            check_max_attempts: 0,
            ..Default::default()
        };
        assert!(config.validate(false).is_err());
    }

    #[test]
    fn test_email_requires_destinations_and_smtp() {
        let mut config = HostConfig {
            email: true,
            ..Default::default()
        };
        // 没有收件人
        assert!(config.validate(true).is_err());

        config.to = vec!["ops@example.com".to_string()];
        // 有收件人但没有 SMTP 配置
        assert!(config.validate(false).is_err());
        assert!(config.validate(true).is_ok());
    }

    #[test]
    fn test_overlapping_thresholds_accepted() {
        // 阈值允许重叠，分类器用告警优先的顺序消歧
        let config = HostConfig {
            cpu_warning: 90.0,
            cpu_alarm: 80.0,
            ..Default::default()
        };
        assert!(config.validate(false).is_ok());
    }
}
