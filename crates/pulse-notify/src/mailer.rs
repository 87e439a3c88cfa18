use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// 邮件发送错误
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Message compose failed: {0}")]
    Compose(String),

    #[error("SMTP transport failed: {0}")]
    Transport(String),

    #[error("Mailer configuration error: {0}")]
    Config(String),
}

/// 邮件传输接口
///
/// 对核心而言发送即忘，失败由调用方记录
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// 发送一封邮件
    async fn send(&self, to: &[String], subject: &str, body: &str) -> Result<(), MailError>;

    /// 传输器名称
    fn name(&self) -> &str;
}

/// SMTP 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
}

/// SMTP 邮件传输器
pub struct SmtpMailer {
    config: SmtpConfig,
}

impl SmtpMailer {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, to: &[String], subject: &str, body: &str) -> Result<(), MailError> {
        use lettre::message::header::ContentType;
        use lettre::transport::smtp::authentication::Credentials;
        use lettre::{Message, SmtpTransport, Transport};

        if to.is_empty() {
            return Err(MailError::Config("no destination addresses".to_string()));
        }

        let mut builder = Message::builder()
            .from(
                self.config
                    .from
                    .parse()
                    .map_err(|e| MailError::Compose(format!("from address: {}", e)))?,
            )
            .subject(subject)
            .header(ContentType::TEXT_PLAIN);

        for address in to {
            builder = builder.to(address
                .parse()
                .map_err(|e| MailError::Compose(format!("to address {}: {}", address, e)))?);
        }

        let email = builder
            .body(body.to_string())
            .map_err(|e| MailError::Compose(e.to_string()))?;

        let creds = Credentials::new(self.config.username.clone(), self.config.password.clone());

        let mailer = SmtpTransport::relay(&self.config.host)
            .map_err(|e| MailError::Config(e.to_string()))?
            .credentials(creds)
            .port(self.config.port)
            .build();

        match mailer.send(&email) {
            Ok(_) => {
                debug!(to = ?to, subject = %subject, "Email sent");
                Ok(())
            }
            Err(e) => Err(MailError::Transport(e.to_string())),
        }
    }

    fn name(&self) -> &str {
        "smtp"
    }
}
