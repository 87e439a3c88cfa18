use crate::message::{NotificationPath, NotificationValue};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// 通知接收端
///
/// publish(None) 表示清除该路径；read 用于发布前查询当前值，
/// 避免对已清除的路径重复发清除事件
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// 发布或清除一条通知
    async fn publish(&self, path: &NotificationPath, value: Option<NotificationValue>);

    /// 读取路径当前值
    async fn read(&self, path: &NotificationPath) -> Option<NotificationValue>;
}

/// 内存通知树
///
/// 进程生命周期内有效，重启即清空
#[derive(Clone, Default)]
pub struct MemorySink {
    entries: Arc<RwLock<HashMap<NotificationPath, NotificationValue>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前全部通知的快照
    pub async fn snapshot(&self) -> HashMap<NotificationPath, NotificationValue> {
        self.entries.read().await.clone()
    }
}

#[async_trait]
impl NotificationSink for MemorySink {
    async fn publish(&self, path: &NotificationPath, value: Option<NotificationValue>) {
        let mut entries = self.entries.write().await;
        match value {
            Some(value) => {
                debug!(path = %path, state = ?value.state, "Notification set");
                entries.insert(path.clone(), value);
            }
            None => {
                debug!(path = %path, "Notification cleared");
                entries.remove(path);
            }
        }
    }

    async fn read(&self, path: &NotificationPath) -> Option<NotificationValue> {
        self.entries.read().await.get(path).cloned()
    }
}
