use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::{delivery_service, notification_service};
use crate::store::{Store, StoreState};
use chrono::Utc;

/// 推进订单状态：校验前进式状态机约束，写入新状态并触碰 updatedAt。
/// 不触发任何副作用，调用方需已持有写锁。
pub(crate) fn apply_transition(
    state: &mut StoreState,
    order_id: &str,
    next: OrderStatus,
) -> AppResult<Order> {
    let order = state
        .find_order_mut(order_id)
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;
    if !order.status.can_transition_to(next) {
        return Err(AppError::ValidationError(format!(
            "Illegal status transition: {} -> {}",
            order.status, next
        )));
    }
    order.status = next;
    order.updated_at = Utc::now();
    Ok(order.clone())
}

/// 推进状态并执行目标状态的副作用：
/// PREPARING 指派配送并挂上 deliveryId，OUT_FOR_DELIVERY / DELIVERED
/// 各发一条通知，其余状态只变更状态本身。
pub(crate) fn transition_with_effects(
    state: &mut StoreState,
    order_id: &str,
    next: OrderStatus,
) -> AppResult<Order> {
    let mut order = apply_transition(state, order_id, next)?;

    match next {
        OrderStatus::Preparing => {
            let delivery = delivery_service::assign_partner(state, &order);
            if let Some(stored) = state.find_order_mut(order_id) {
                stored.delivery_id = Some(delivery.delivery_id.clone());
                order = stored.clone();
            }
            notification_service::emit(
                state,
                &order.user_id,
                NotificationType::OrderPreparing,
                "Order Being Prepared",
                format!("Your order {} is being prepared.", order.order_id),
                &order.order_id,
                OrderStatus::Preparing,
            );
        }
        OrderStatus::OutForDelivery => {
            notification_service::emit(
                state,
                &order.user_id,
                NotificationType::OrderOutForDelivery,
                "Order Out for Delivery",
                format!("Your order {} is on the way!", order.order_id),
                &order.order_id,
                OrderStatus::OutForDelivery,
            );
        }
        OrderStatus::Delivered => {
            notification_service::emit(
                state,
                &order.user_id,
                NotificationType::OrderDelivered,
                "Order Delivered",
                format!("Your order {} has been delivered. Enjoy your meal!", order.order_id),
                &order.order_id,
                OrderStatus::Delivered,
            );
        }
        _ => {}
    }

    Ok(order)
}

#[derive(Clone)]
pub struct OrderService {
    store: Store,
}

impl OrderService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn create_order(&self, request: CreateOrderRequest) -> AppResult<Order> {
        let (Some(user_id), Some(restaurant_id), Some(items), Some(delivery_address)) = (
            request.user_id,
            request.restaurant_id,
            request.items,
            request.delivery_address,
        ) else {
            return Err(AppError::ValidationError(
                "Missing required fields".to_string(),
            ));
        };

        let mut state = self.store.write().await;

        if !state
            .restaurants
            .get(&restaurant_id)
            .is_some_and(|r| r.is_active)
        {
            return Err(AppError::ValidationError(
                "Restaurant not available".to_string(),
            ));
        }

        if items.is_empty() {
            return Err(AppError::ValidationError(
                "Items array is required and cannot be empty".to_string(),
            ));
        }

        // 逐行解析菜单项：必须属于目标餐厅且仍然可售，单价以菜单为准
        let mut lines = Vec::with_capacity(items.len());
        for item in &items {
            let menu_item = state
                .menu_items
                .get(&item.menu_item_id)
                .filter(|m| m.restaurant_id == restaurant_id && m.available)
                .ok_or_else(|| {
                    AppError::ValidationError(format!(
                        "Menu item {} not found or unavailable for restaurant {}",
                        item.menu_item_id, restaurant_id
                    ))
                })?;
            lines.push(OrderLine {
                menu_item_id: item.menu_item_id,
                quantity: item.quantity,
                menu_item_name: menu_item.name.clone(),
                price: menu_item.price,
            });
        }

        let total_amount: f64 = lines.iter().map(|l| l.price * f64::from(l.quantity)).sum();

        let seq = state.next_order_seq();
        let order_id = format!("ORD-{seq}");
        let now = Utc::now();
        let order = Order {
            order_id: order_id.clone(),
            id: seq,
            user_id: user_id.clone(),
            restaurant_id,
            status: OrderStatus::Created,
            total_amount,
            items: lines,
            delivery_address,
            delivery_latitude: request.delivery_latitude,
            delivery_longitude: request.delivery_longitude,
            created_at: now,
            updated_at: now,
            delivery_id: None,
        };
        state.orders.insert(seq, order.clone());

        notification_service::emit(
            &mut state,
            &user_id,
            NotificationType::OrderCreated,
            "Order Placed Successfully",
            format!(
                "Your order {order_id} has been placed. Total: ${total_amount:.2}"
            ),
            &order_id,
            OrderStatus::Created,
        );

        Ok(order)
    }

    pub async fn list(&self) -> Vec<Order> {
        self.store.read().await.orders.values().cloned().collect()
    }

    pub async fn get(&self, order_id: &str) -> AppResult<Order> {
        self.store
            .read()
            .await
            .find_order(order_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Order not found".to_string()))
    }

    /// 餐厅对新订单的受理动作：accept 确认、reject 取消，其余动作一律拒绝
    pub async fn restaurant_action(&self, order_id: &str, action: Option<&str>) -> AppResult<Order> {
        let mut state = self.store.write().await;

        if state.find_order(order_id).is_none() {
            return Err(AppError::NotFound("Order not found".to_string()));
        }

        match action {
            Some("accept") => {
                let order = apply_transition(&mut state, order_id, OrderStatus::Confirmed)?;
                notification_service::emit(
                    &mut state,
                    &order.user_id,
                    NotificationType::OrderConfirmed,
                    "Order Confirmed",
                    format!(
                        "Your order {} has been confirmed by the restaurant.",
                        order.order_id
                    ),
                    &order.order_id,
                    OrderStatus::Confirmed,
                );
                Ok(order)
            }
            Some("reject") => {
                let order = apply_transition(&mut state, order_id, OrderStatus::Cancelled)?;
                notification_service::emit(
                    &mut state,
                    &order.user_id,
                    NotificationType::OrderCancelled,
                    "Order Cancelled",
                    format!("Your order {} has been cancelled.", order.order_id),
                    &order.order_id,
                    OrderStatus::Cancelled,
                );
                Ok(order)
            }
            other => Err(AppError::ValidationError(format!(
                "Invalid action: {}",
                other.unwrap_or("<missing>")
            ))),
        }
    }

    pub async fn update_status(&self, order_id: &str, status_str: Option<&str>) -> AppResult<Order> {
        let mut state = self.store.write().await;

        if state.find_order(order_id).is_none() {
            return Err(AppError::NotFound("Order not found".to_string()));
        }

        let status: OrderStatus = status_str
            .ok_or_else(|| AppError::ValidationError("Invalid status".to_string()))?
            .parse()?;

        transition_with_effects(&mut state, order_id, status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PeerConfig;
    use crate::external::PeerClient;
    use crate::services::CatalogService;

    fn unreachable_peer() -> PeerClient {
        PeerClient::new(PeerConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            gated_timeout_ms: 200,
            replicate_timeout_ms: 200,
        })
    }

    /// 造一家活跃餐厅与两道可售菜（9.50 与 3.25），返回 (restaurant_id, item ids)
    async fn seed_catalog(store: &Store) -> (i64, i64, i64) {
        let catalog = CatalogService::new(store.clone(), unreachable_peer());
        let restaurant = catalog
            .create_restaurant(CreateRestaurantRequest {
                name: Some("Pasta Palace".to_string()),
                cuisine: Some("Italian".to_string()),
                address: Some("12 Main St".to_string()),
                latitude: Some(40.0),
                longitude: Some(-74.0),
                phone: None,
            })
            .await
            .unwrap();
        let margherita = catalog
            .create_menu_item(
                restaurant.id,
                CreateMenuItemRequest {
                    name: Some("Margherita".to_string()),
                    description: None,
                    price: Some(9.50),
                    category: Some("Pizza".to_string()),
                    available: None,
                },
            )
            .await
            .unwrap();
        let tiramisu = catalog
            .create_menu_item(
                restaurant.id,
                CreateMenuItemRequest {
                    name: Some("Tiramisu".to_string()),
                    description: None,
                    price: Some(3.25),
                    category: Some("Dessert".to_string()),
                    available: None,
                },
            )
            .await
            .unwrap();
        (restaurant.id, margherita.id, tiramisu.id)
    }

    fn order_request(restaurant_id: i64, items: Vec<OrderItemRequest>) -> CreateOrderRequest {
        CreateOrderRequest {
            user_id: Some("USER-1700000000000-1234".to_string()),
            restaurant_id: Some(restaurant_id),
            items: Some(items),
            delivery_address: Some("34 Elm St".to_string()),
            delivery_latitude: Some(40.1),
            delivery_longitude: Some(-74.1),
        }
    }

    #[tokio::test]
    async fn test_total_is_sum_of_price_times_quantity() {
        let store = Store::new();
        let (restaurant_id, margherita, tiramisu) = seed_catalog(&store).await;
        let service = OrderService::new(store);

        let order = service
            .create_order(order_request(
                restaurant_id,
                vec![
                    OrderItemRequest { menu_item_id: margherita, quantity: 2 },
                    OrderItemRequest { menu_item_id: tiramisu, quantity: 1 },
                ],
            ))
            .await
            .unwrap();

        assert_eq!(order.order_id, "ORD-1");
        assert_eq!(order.status, OrderStatus::Created);
        assert!((order.total_amount - 22.25).abs() < 1e-9);
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items[0].menu_item_name, "Margherita");
    }

    #[tokio::test]
    async fn test_create_order_emits_created_notification() {
        let store = Store::new();
        let (restaurant_id, margherita, _) = seed_catalog(&store).await;
        let service = OrderService::new(store.clone());

        service
            .create_order(order_request(
                restaurant_id,
                vec![OrderItemRequest { menu_item_id: margherita, quantity: 1 }],
            ))
            .await
            .unwrap();

        let state = store.read().await;
        assert_eq!(state.notifications.len(), 1);
        let n = &state.notifications[0];
        assert_eq!(n.kind, NotificationType::OrderCreated);
        assert_eq!(n.user_id, "USER-1700000000000-1234");
        assert!(n.message.contains("$9.50"));
    }

    #[tokio::test]
    async fn test_unknown_or_unavailable_item_rejected() {
        let store = Store::new();
        let (restaurant_id, margherita, tiramisu) = seed_catalog(&store).await;

        // 另一家餐厅的菜不可混入
        let catalog = CatalogService::new(store.clone(), unreachable_peer());
        let other = catalog
            .create_restaurant(CreateRestaurantRequest {
                name: Some("Wok This Way".to_string()),
                cuisine: None,
                address: Some("56 Oak Ave".to_string()),
                latitude: None,
                longitude: None,
                phone: None,
            })
            .await
            .unwrap();
        let foreign_item = catalog
            .create_menu_item(
                other.id,
                CreateMenuItemRequest {
                    name: Some("Fried Rice".to_string()),
                    description: None,
                    price: Some(7.0),
                    category: None,
                    available: None,
                },
            )
            .await
            .unwrap();

        let service = OrderService::new(store.clone());
        let result = service
            .create_order(order_request(
                restaurant_id,
                vec![OrderItemRequest { menu_item_id: foreign_item.id, quantity: 1 }],
            ))
            .await;
        match result {
            Err(AppError::ValidationError(msg)) => {
                assert!(msg.contains(&format!("Menu item {}", foreign_item.id)));
            }
            other => panic!("expected validation error, got {other:?}"),
        }

        // 下架的菜同样被拒绝
        catalog
            .set_menu_item_availability(restaurant_id, tiramisu, Some(false))
            .await
            .unwrap();
        let result = service
            .create_order(order_request(
                restaurant_id,
                vec![
                    OrderItemRequest { menu_item_id: margherita, quantity: 1 },
                    OrderItemRequest { menu_item_id: tiramisu, quantity: 1 },
                ],
            ))
            .await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_inactive_restaurant_rejected() {
        let store = Store::new();
        let (restaurant_id, margherita, _) = seed_catalog(&store).await;
        let catalog = CatalogService::new(store.clone(), unreachable_peer());
        catalog
            .set_restaurant_availability(restaurant_id, Some(false))
            .await
            .unwrap();

        let service = OrderService::new(store);
        let result = service
            .create_order(order_request(
                restaurant_id,
                vec![OrderItemRequest { menu_item_id: margherita, quantity: 1 }],
            ))
            .await;
        match result {
            Err(AppError::ValidationError(msg)) => assert_eq!(msg, "Restaurant not available"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_preparing_assigns_exactly_one_delivery() {
        let store = Store::new();
        let (restaurant_id, margherita, _) = seed_catalog(&store).await;
        let service = OrderService::new(store.clone());

        let order = service
            .create_order(order_request(
                restaurant_id,
                vec![OrderItemRequest { menu_item_id: margherita, quantity: 1 }],
            ))
            .await
            .unwrap();

        let updated = service
            .update_status(&order.order_id, Some("PREPARING"))
            .await
            .unwrap();

        assert_eq!(updated.status, OrderStatus::Preparing);
        assert_eq!(updated.delivery_id.as_deref(), Some("DEL-1"));

        let state = store.read().await;
        assert_eq!(state.deliveries.len(), 1);
        let delivery = state.delivery_by_order(&order.order_id).unwrap();
        assert_eq!(delivery.delivery_id, "DEL-1");
        // DELIVERY_ASSIGNED 与 ORDER_PREPARING 都已发出
        assert!(
            state
                .notifications
                .iter()
                .any(|n| n.kind == NotificationType::DeliveryAssigned
                    && n.user_id == order.user_id)
        );
        assert!(
            state
                .notifications
                .iter()
                .any(|n| n.kind == NotificationType::OrderPreparing)
        );
    }

    #[tokio::test]
    async fn test_status_change_touches_updated_at_only() {
        let store = Store::new();
        let (restaurant_id, margherita, _) = seed_catalog(&store).await;
        let service = OrderService::new(store);

        let order = service
            .create_order(order_request(
                restaurant_id,
                vec![OrderItemRequest { menu_item_id: margherita, quantity: 1 }],
            ))
            .await
            .unwrap();

        let updated = service
            .update_status(&order.order_id, Some("CONFIRMED"))
            .await
            .unwrap();

        assert_eq!(updated.status, OrderStatus::Confirmed);
        assert!(updated.updated_at >= order.updated_at);
        // 其余字段保持原样
        assert_eq!(updated.order_id, order.order_id);
        assert_eq!(updated.user_id, order.user_id);
        assert_eq!(updated.restaurant_id, order.restaurant_id);
        assert_eq!(updated.total_amount, order.total_amount);
        assert_eq!(updated.delivery_address, order.delivery_address);
        assert_eq!(updated.created_at, order.created_at);
        assert!(updated.delivery_id.is_none());
    }

    #[tokio::test]
    async fn test_backward_transition_rejected() {
        let store = Store::new();
        let (restaurant_id, margherita, _) = seed_catalog(&store).await;
        let service = OrderService::new(store);

        let order = service
            .create_order(order_request(
                restaurant_id,
                vec![OrderItemRequest { menu_item_id: margherita, quantity: 1 }],
            ))
            .await
            .unwrap();

        service
            .update_status(&order.order_id, Some("PREPARING"))
            .await
            .unwrap();
        let result = service
            .update_status(&order.order_id, Some("CREATED"))
            .await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_invalid_status_and_unknown_order() {
        let store = Store::new();
        let (restaurant_id, margherita, _) = seed_catalog(&store).await;
        let service = OrderService::new(store);

        let order = service
            .create_order(order_request(
                restaurant_id,
                vec![OrderItemRequest { menu_item_id: margherita, quantity: 1 }],
            ))
            .await
            .unwrap();

        let result = service.update_status(&order.order_id, Some("EATEN")).await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));

        let result = service.update_status("ORD-404", Some("CONFIRMED")).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_restaurant_action_accept_reject_and_invalid() {
        let store = Store::new();
        let (restaurant_id, margherita, _) = seed_catalog(&store).await;
        let service = OrderService::new(store.clone());

        let first = service
            .create_order(order_request(
                restaurant_id,
                vec![OrderItemRequest { menu_item_id: margherita, quantity: 1 }],
            ))
            .await
            .unwrap();
        let second = service
            .create_order(order_request(
                restaurant_id,
                vec![OrderItemRequest { menu_item_id: margherita, quantity: 1 }],
            ))
            .await
            .unwrap();

        let accepted = service
            .restaurant_action(&first.order_id, Some("accept"))
            .await
            .unwrap();
        assert_eq!(accepted.status, OrderStatus::Confirmed);

        let rejected = service
            .restaurant_action(&second.order_id, Some("reject"))
            .await
            .unwrap();
        assert_eq!(rejected.status, OrderStatus::Cancelled);

        // 未知动作不再是静默成功，而是显式校验错误
        let result = service
            .restaurant_action(&first.order_id, Some("shrug"))
            .await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));

        let result = service.restaurant_action("ORD-404", Some("accept")).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));

        let state = store.read().await;
        assert!(
            state
                .notifications
                .iter()
                .any(|n| n.kind == NotificationType::OrderConfirmed)
        );
        assert!(
            state
                .notifications
                .iter()
                .any(|n| n.kind == NotificationType::OrderCancelled)
        );
    }

    #[tokio::test]
    async fn test_missing_fields_rejected() {
        let service = OrderService::new(Store::new());
        let result = service
            .create_order(CreateOrderRequest {
                user_id: None,
                restaurant_id: Some(1),
                items: None,
                delivery_address: None,
                delivery_latitude: None,
                delivery_longitude: None,
            })
            .await;
        match result {
            Err(AppError::ValidationError(msg)) => assert_eq!(msg, "Missing required fields"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
