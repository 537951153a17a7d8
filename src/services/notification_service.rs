use crate::models::*;
use crate::store::{Store, StoreState};
use chrono::Utc;

/// 追加一条通知。只追加、永不修改；同时回显到运行日志。
/// 调用方需已持有 store 写锁（引擎副作用与状态变更在同一临界区内完成）。
pub fn emit(
    state: &mut StoreState,
    user_id: &str,
    kind: NotificationType,
    title: &str,
    message: String,
    order_id: &str,
    status: OrderStatus,
) -> Notification {
    let seq = state.next_notification_seq();
    let notification = Notification {
        id: format!("NOTIF-{seq}"),
        user_id: user_id.to_string(),
        kind,
        title: title.to_string(),
        message,
        order_id: order_id.to_string(),
        status,
        timestamp: Utc::now(),
    };
    state.notifications.push(notification.clone());
    log::info!("[NOTIFICATION] {}: {}", notification.title, notification.message);
    notification
}

#[derive(Clone)]
pub struct NotificationService {
    store: Store,
}

impl NotificationService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Vec<Notification> {
        self.store.read().await.notifications.clone()
    }

    pub async fn list_for_user(&self, user_id: &str) -> Vec<Notification> {
        self.store
            .read()
            .await
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect()
    }
}
