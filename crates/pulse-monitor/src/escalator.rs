use crate::error::MonitorError;
use pulse_notify::MailTransport;
use pulse_types::{CheckResult, CheckState};
use std::sync::Arc;

/// 邮件升级器
///
/// 只在连击跨过 max_attempts 时被调用；
/// 正文列出该目标当前所有非 ok 指标及其字段和读数
pub struct EmailEscalator {
    mailer: Arc<dyn MailTransport>,
}

impl EmailEscalator {
    pub fn new(mailer: Arc<dyn MailTransport>) -> Self {
        Self { mailer }
    }

    /// 主机事件邮件，主题按最差状态取 Warning / Alarm
    pub async fn escalate_host(
        &self,
        to: &[String],
        unhealthy: &[CheckResult],
    ) -> Result<(), MonitorError> {
        let worst = unhealthy
            .iter()
            .map(|r| r.state)
            .max()
            .unwrap_or(CheckState::Warn);
        let severity = match worst {
            CheckState::Alarm => "Alarm",
            _ => "Warning",
        };
        let subject = format!("Healthcheck {}: host", severity);

        self.mailer
            .send(to, &subject, &Self::body(unhealthy))
            .await?;
        Ok(())
    }

    /// provider 事件邮件，主题使用原始状态字符串
    pub async fn escalate_provider(
        &self,
        to: &[String],
        provider_id: &str,
        result: &CheckResult,
    ) -> Result<(), MonitorError> {
        let subject = format!(
            "Healthcheck {}: provider {}",
            result.state.as_str(),
            provider_id
        );

        self.mailer
            .send(to, &subject, &Self::body(std::slice::from_ref(result)))
            .await?;
        Ok(())
    }

    fn body(results: &[CheckResult]) -> String {
        let mut body = String::from("The following checks are failing:\n\n");
        for result in results {
            body.push_str(&format!(
                "{} {}: {:.2} ({})\n",
                result.metric,
                result.field,
                result.value,
                result.state.as_str()
            ));
        }
        body
    }
}
