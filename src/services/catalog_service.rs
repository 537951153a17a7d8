use crate::error::{AppError, AppResult};
use crate::external::PeerClient;
use crate::models::*;
use crate::store::Store;
use crate::utils::merge_by_key;
use chrono::Utc;

#[derive(Clone)]
pub struct CatalogService {
    store: Store,
    peer: PeerClient,
}

impl CatalogService {
    pub fn new(store: Store, peer: PeerClient) -> Self {
        Self { store, peer }
    }

    pub async fn create_restaurant(
        &self,
        request: CreateRestaurantRequest,
    ) -> AppResult<Restaurant> {
        let (Some(name), Some(address)) = (request.name, request.address) else {
            return Err(AppError::ValidationError(
                "Name and address are required".to_string(),
            ));
        };

        let restaurant = {
            let mut state = self.store.write().await;
            let id = state.next_restaurant_id();
            let restaurant = Restaurant {
                id,
                name,
                cuisine: request.cuisine,
                address,
                latitude: request.latitude.unwrap_or(0.0),
                longitude: request.longitude.unwrap_or(0.0),
                phone: request.phone,
                is_active: true,
                created_at: Utc::now(),
            };
            state.restaurants.insert(id, restaurant.clone());
            restaurant
        };

        // 对端自行分配 id，读取时靠 name+address 去重
        self.peer.replicate(
            "/api/restaurants",
            serde_json::json!({
                "name": restaurant.name,
                "cuisine": restaurant.cuisine,
                "address": restaurant.address,
                "latitude": restaurant.latitude,
                "longitude": restaurant.longitude,
                "phone": restaurant.phone,
            }),
        );

        Ok(restaurant)
    }

    /// 本地集合 + 对端合并视图；对端缺席时静默退回本地
    pub async fn list_restaurants(&self) -> Vec<Restaurant> {
        let local: Vec<Restaurant> = {
            let state = self.store.read().await;
            state.restaurants.values().cloned().collect()
        };

        match self.peer.fetch_restaurants().await {
            Ok(peer_records) => merge_by_key(local, peer_records, |r| {
                (r.name.clone(), r.address.clone())
            }),
            Err(e) => {
                log::debug!("Peer unavailable for restaurant list: {e}");
                local
            }
        }
    }

    pub async fn get_restaurant(&self, id: i64) -> AppResult<Restaurant> {
        self.store
            .read()
            .await
            .restaurants
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Restaurant not found".to_string()))
    }

    pub async fn set_restaurant_availability(
        &self,
        id: i64,
        is_active: Option<bool>,
    ) -> AppResult<Restaurant> {
        let mut state = self.store.write().await;
        let restaurant = state
            .restaurants
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("Restaurant not found".to_string()))?;
        if let Some(active) = is_active {
            restaurant.is_active = active;
        }
        Ok(restaurant.clone())
    }

    pub async fn create_menu_item(
        &self,
        restaurant_id: i64,
        request: CreateMenuItemRequest,
    ) -> AppResult<MenuItem> {
        let (Some(name), Some(price)) = (request.name, request.price) else {
            return Err(AppError::ValidationError(
                "Name and price are required".to_string(),
            ));
        };

        let menu_item = {
            let mut state = self.store.write().await;
            // 菜单项必须挂在已存在的餐厅下
            if !state.restaurants.contains_key(&restaurant_id) {
                return Err(AppError::NotFound("Restaurant not found".to_string()));
            }
            let id = state.next_menu_item_id();
            let menu_item = MenuItem {
                id,
                restaurant_id,
                name,
                description: request.description,
                price,
                category: request.category.unwrap_or_else(|| "General".to_string()),
                available: request.available.unwrap_or(true),
                created_at: Utc::now(),
                updated_at: None,
            };
            state.menu_items.insert(id, menu_item.clone());
            menu_item
        };

        self.peer.replicate(
            &format!("/api/restaurants/{restaurant_id}/menu/items"),
            serde_json::json!({
                "name": menu_item.name,
                "description": menu_item.description,
                "price": menu_item.price,
                "category": menu_item.category,
                "available": menu_item.available,
            }),
        );

        Ok(menu_item)
    }

    /// 某餐厅的本地菜单 + 对端合并视图
    pub async fn get_menu(&self, restaurant_id: i64) -> Vec<MenuItem> {
        let local = {
            let state = self.store.read().await;
            state.menu_for_restaurant(restaurant_id)
        };

        match self.peer.fetch_menu(restaurant_id).await {
            Ok(peer_records) => merge_by_key(local, peer_records, |m| {
                (m.name.clone(), m.restaurant_id)
            }),
            Err(e) => {
                log::debug!("Peer unavailable for menu of restaurant {restaurant_id}: {e}");
                local
            }
        }
    }

    pub async fn update_menu_item(
        &self,
        restaurant_id: i64,
        item_id: i64,
        request: UpdateMenuItemRequest,
    ) -> AppResult<MenuItem> {
        let mut state = self.store.write().await;
        let item = state
            .menu_items
            .get_mut(&item_id)
            .filter(|m| m.restaurant_id == restaurant_id)
            .ok_or_else(|| AppError::NotFound("Menu item not found".to_string()))?;

        if let Some(name) = request.name {
            item.name = name;
        }
        if let Some(description) = request.description {
            item.description = Some(description);
        }
        if let Some(price) = request.price {
            item.price = price;
        }
        if let Some(category) = request.category {
            item.category = category;
        }
        if let Some(available) = request.available {
            item.available = available;
        }
        item.updated_at = Some(Utc::now());

        Ok(item.clone())
    }

    pub async fn set_menu_item_availability(
        &self,
        restaurant_id: i64,
        item_id: i64,
        available: Option<bool>,
    ) -> AppResult<MenuItem> {
        let mut state = self.store.write().await;
        let item = state
            .menu_items
            .get_mut(&item_id)
            .filter(|m| m.restaurant_id == restaurant_id)
            .ok_or_else(|| AppError::NotFound("Menu item not found".to_string()))?;
        if let Some(available) = available {
            item.available = available;
        }
        item.updated_at = Some(Utc::now());
        Ok(item.clone())
    }
}
