use crate::error::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryStatus {
    Assigned,
    PickedUp,
    OutForDelivery,
    Delivered,
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DeliveryStatus::Assigned => "ASSIGNED",
            DeliveryStatus::PickedUp => "PICKED_UP",
            DeliveryStatus::OutForDelivery => "OUT_FOR_DELIVERY",
            DeliveryStatus::Delivered => "DELIVERED",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for DeliveryStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ASSIGNED" => Ok(DeliveryStatus::Assigned),
            "PICKED_UP" => Ok(DeliveryStatus::PickedUp),
            "OUT_FOR_DELIVERY" => Ok(DeliveryStatus::OutForDelivery),
            "DELIVERED" => Ok(DeliveryStatus::Delivered),
            _ => Err(AppError::ValidationError("Invalid status".to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Delivery {
    pub id: String,
    pub delivery_id: String,
    pub order_id: String,
    pub partner_id: String,
    pub partner_name: String,
    pub partner_phone: String,
    pub status: DeliveryStatus,
    pub estimated_delivery_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateDeliveryStatusRequest {
    #[schema(example = "DELIVERED")]
    pub status: Option<String>,
}
