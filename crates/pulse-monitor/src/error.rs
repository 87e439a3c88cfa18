use thiserror::Error;

/// 监控子系统统一错误类型
///
/// 所有错误都不致命：采集失败跳过本周期，邮件失败等下个周期重试，
/// 配置错误只影响该目标的调度
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Metrics collection failed: {0}")]
    Collection(String),

    #[error("No statistics available for provider {0}")]
    MissingStats(String),

    #[error("Email delivery failed: {0}")]
    Delivery(#[from] pulse_notify::MailError),

    #[error("Configuration error: {0}")]
    Config(String),
}
