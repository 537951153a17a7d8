use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::{notification_service, order_service};
use crate::store::{Store, StoreState};
use chrono::{Duration, Utc};
use rand::Rng;

pub struct DeliveryPartner {
    pub id: &'static str,
    pub name: &'static str,
    pub phone: &'static str,
    pub available: bool,
}

/// 固定的三人配送员名册（不做可用性检查，见 available 字段）
pub const DELIVERY_PARTNERS: [DeliveryPartner; 3] = [
    DeliveryPartner {
        id: "DP001",
        name: "John Doe",
        phone: "+1234567890",
        available: true,
    },
    DeliveryPartner {
        id: "DP002",
        name: "Jane Smith",
        phone: "+1234567891",
        available: true,
    },
    DeliveryPartner {
        id: "DP003",
        name: "Mike Johnson",
        phone: "+1234567892",
        available: true,
    },
];

/// 为订单随机指派配送员：名册中等概率抽取一人，
/// ETA = 当前时间 + 30 分钟 + 0..15 分钟随机抖动。
/// 通知发给订单的真实下单人。调用方需已持有写锁。
pub fn assign_partner(state: &mut StoreState, order: &Order) -> Delivery {
    let mut rng = rand::thread_rng();
    let partner = &DELIVERY_PARTNERS[rng.gen_range(0..DELIVERY_PARTNERS.len())];
    let estimated = Utc::now() + Duration::minutes(30 + rng.gen_range(0..15));

    let seq = state.next_delivery_seq();
    let delivery_id = format!("DEL-{seq}");
    let delivery = Delivery {
        id: delivery_id.clone(),
        delivery_id,
        order_id: order.order_id.clone(),
        partner_id: partner.id.to_string(),
        partner_name: partner.name.to_string(),
        partner_phone: partner.phone.to_string(),
        status: DeliveryStatus::Assigned,
        estimated_delivery_time: estimated,
        created_at: Utc::now(),
        updated_at: None,
    };
    state.deliveries.insert(seq, delivery.clone());

    notification_service::emit(
        state,
        &order.user_id,
        NotificationType::DeliveryAssigned,
        "Delivery Partner Assigned",
        format!(
            "Your order {} has been assigned to {}. Estimated delivery: {}",
            order.order_id,
            partner.name,
            estimated.format("%H:%M:%S")
        ),
        &order.order_id,
        OrderStatus::OutForDelivery,
    );

    delivery
}

#[derive(Clone)]
pub struct DeliveryService {
    store: Store,
}

impl DeliveryService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Vec<Delivery> {
        self.store.read().await.deliveries.values().cloned().collect()
    }

    pub async fn get_by_order(&self, order_id: &str) -> AppResult<Delivery> {
        self.store
            .read()
            .await
            .delivery_by_order(order_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Delivery not found".to_string()))
    }

    /// 更新配送状态；状态变为 DELIVERED 时把所属订单一并推进到 DELIVERED
    pub async fn update_status(&self, delivery_id: &str, status_str: &str) -> AppResult<Delivery> {
        let mut state = self.store.write().await;

        let (updated, order_id) = {
            let delivery = state
                .find_delivery_mut(delivery_id)
                .ok_or_else(|| AppError::NotFound("Delivery not found".to_string()))?;
            let status: DeliveryStatus = status_str.parse()?;
            delivery.status = status;
            delivery.updated_at = Some(Utc::now());
            (delivery.clone(), delivery.order_id.clone())
        };

        if updated.status == DeliveryStatus::Delivered {
            let cascade = state
                .find_order(&order_id)
                .map(|o| !o.status.is_terminal())
                .unwrap_or(false);
            if cascade
                && let Err(e) = order_service::transition_with_effects(
                    &mut state,
                    &order_id,
                    OrderStatus::Delivered,
                )
            {
                log::warn!("Failed to cascade delivered status to order {order_id}: {e}");
            }
        }

        Ok(updated)
    }
}
