use crate::error::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 订单生命周期状态，只允许沿定义顺序前进，CANCELLED 可从任意非终态进入
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Created,
    Confirmed,
    Preparing,
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    fn rank(self) -> u8 {
        match self {
            OrderStatus::Created => 0,
            OrderStatus::Confirmed => 1,
            OrderStatus::Preparing => 2,
            OrderStatus::OutForDelivery => 3,
            OrderStatus::Delivered => 4,
            OrderStatus::Cancelled => 5,
        }
    }

    /// 终态不再变化；其余状态只能向前推进或取消
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        match next {
            OrderStatus::Cancelled => true,
            _ => next.rank() > self.rank(),
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderStatus::Created => "CREATED",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::Preparing => "PREPARING",
            OrderStatus::OutForDelivery => "OUT_FOR_DELIVERY",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREATED" => Ok(OrderStatus::Created),
            "CONFIRMED" => Ok(OrderStatus::Confirmed),
            "PREPARING" => Ok(OrderStatus::Preparing),
            "OUT_FOR_DELIVERY" => Ok(OrderStatus::OutForDelivery),
            "DELIVERED" => Ok(OrderStatus::Delivered),
            "CANCELLED" => Ok(OrderStatus::Cancelled),
            _ => Err(AppError::ValidationError("Invalid status".to_string())),
        }
    }
}

/// 下单时已通过菜单校验的订单行，价格来自菜单而非请求
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub menu_item_id: i64,
    pub quantity: u32,
    pub menu_item_name: String,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: String,
    pub id: i64,
    pub user_id: String,
    pub restaurant_id: i64,
    pub status: OrderStatus,
    pub total_amount: f64,
    pub items: Vec<OrderLine>,
    pub delivery_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_longitude: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub menu_item_id: i64,
    pub quantity: u32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub user_id: Option<String>,
    pub restaurant_id: Option<i64>,
    pub items: Option<Vec<OrderItemRequest>>,
    pub delivery_address: Option<String>,
    pub delivery_latitude: Option<f64>,
    pub delivery_longitude: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RestaurantActionRequest {
    /// "accept" 或 "reject"
    #[schema(example = "accept")]
    pub action: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    #[schema(example = "PREPARING")]
    pub status: Option<String>,
}
