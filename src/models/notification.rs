use super::order::OrderStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    OrderCreated,
    OrderConfirmed,
    OrderCancelled,
    OrderPreparing,
    OrderOutForDelivery,
    OrderDelivered,
    DeliveryAssigned,
}

/// 只追加、永不修改的事件记录
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub order_id: String,
    pub status: OrderStatus,
    pub timestamp: DateTime<Utc>,
}
