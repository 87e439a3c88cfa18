pub mod mailer;
pub mod message;
pub mod sink;

pub use mailer::{MailError, MailTransport, SmtpConfig, SmtpMailer};
pub use message::{NotificationPath, NotificationValue};
pub use sink::{MemorySink, NotificationSink};
