use crate::models::*;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// 进程内唯一的状态容器：按 id 索引的映射 + 单调递增计数器。
/// 所有写操作在持有写锁的整个「读取-校验-变更」区间内完成，
/// 避免原实现中共享列表带来的丢失更新与重复 id。
#[derive(Debug, Default)]
pub struct StoreState {
    pub users: HashMap<String, User>,
    pub restaurants: BTreeMap<i64, Restaurant>,
    pub menu_items: BTreeMap<i64, MenuItem>,
    pub orders: BTreeMap<i64, Order>,
    pub deliveries: BTreeMap<i64, Delivery>,
    pub notifications: Vec<Notification>,
    next_restaurant_id: i64,
    next_menu_item_id: i64,
    next_order_seq: i64,
    next_delivery_seq: i64,
    next_notification_seq: i64,
}

impl StoreState {
    pub fn next_restaurant_id(&mut self) -> i64 {
        self.next_restaurant_id += 1;
        self.next_restaurant_id
    }

    pub fn next_menu_item_id(&mut self) -> i64 {
        self.next_menu_item_id += 1;
        self.next_menu_item_id
    }

    pub fn next_order_seq(&mut self) -> i64 {
        self.next_order_seq += 1;
        self.next_order_seq
    }

    pub fn next_delivery_seq(&mut self) -> i64 {
        self.next_delivery_seq += 1;
        self.next_delivery_seq
    }

    pub fn next_notification_seq(&mut self) -> i64 {
        self.next_notification_seq += 1;
        self.next_notification_seq
    }

    pub fn user_by_email(&self, email: &str) -> Option<&User> {
        self.users.values().find(|u| u.email == email)
    }

    pub fn find_order(&self, order_id: &str) -> Option<&Order> {
        self.orders.values().find(|o| o.order_id == order_id)
    }

    pub fn find_order_mut(&mut self, order_id: &str) -> Option<&mut Order> {
        self.orders.values_mut().find(|o| o.order_id == order_id)
    }

    pub fn find_delivery_mut(&mut self, delivery_id: &str) -> Option<&mut Delivery> {
        self.deliveries
            .values_mut()
            .find(|d| d.delivery_id == delivery_id)
    }

    pub fn delivery_by_order(&self, order_id: &str) -> Option<&Delivery> {
        self.deliveries.values().find(|d| d.order_id == order_id)
    }

    pub fn menu_for_restaurant(&self, restaurant_id: i64) -> Vec<MenuItem> {
        self.menu_items
            .values()
            .filter(|m| m.restaurant_id == restaurant_id)
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Store {
    inner: Arc<RwLock<StoreState>>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.inner.read().await
    }

    pub async fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.inner.write().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_are_monotonic() {
        let mut state = StoreState::default();
        assert_eq!(state.next_order_seq(), 1);
        assert_eq!(state.next_order_seq(), 2);
        assert_eq!(state.next_delivery_seq(), 1);
        assert_eq!(state.next_restaurant_id(), 1);
        assert_eq!(state.next_restaurant_id(), 2);
        // 计数器彼此独立
        assert_eq!(state.next_order_seq(), 3);
    }

    #[tokio::test]
    async fn test_write_guard_spans_read_validate_mutate() {
        let store = Store::new();
        {
            let mut state = store.write().await;
            let id = state.next_restaurant_id();
            state.restaurants.insert(
                id,
                Restaurant {
                    id,
                    name: "Testo".to_string(),
                    cuisine: None,
                    address: "1 Test St".to_string(),
                    latitude: 0.0,
                    longitude: 0.0,
                    phone: None,
                    is_active: true,
                    created_at: chrono::Utc::now(),
                },
            );
        }
        let state = store.read().await;
        assert_eq!(state.restaurants.len(), 1);
    }
}
