use pulse_notify::{NotificationPath, NotificationSink, NotificationValue};
use pulse_types::CheckResult;
use std::sync::Arc;

/// 通知发布器
///
/// 非 ok 状态每个周期都重发 set（接收端对重复 set 幂等）；
/// ok 状态只在路径当前有值时发一次 clear，不对已清除的路径重复清除
pub struct NotificationPublisher {
    sink: Arc<dyn NotificationSink>,
}

impl NotificationPublisher {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self { sink }
    }

    pub async fn publish(&self, path: &NotificationPath, result: &CheckResult) {
        if result.state.is_unhealthy() {
            let message = format!("{} {} at {:.2}", result.metric, result.field, result.value);
            self.sink
                .publish(path, Some(NotificationValue::new(result.state, message)))
                .await;
        } else if self.sink.read(path).await.is_some() {
            self.sink.publish(path, None).await;
        }
    }
}
