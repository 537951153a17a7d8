use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::index,
        handlers::health::health,
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::me,
        handlers::restaurant::create_restaurant,
        handlers::restaurant::list_restaurants,
        handlers::restaurant::get_restaurant,
        handlers::restaurant::set_restaurant_availability,
        handlers::restaurant::get_menu,
        handlers::restaurant::create_menu_item,
        handlers::restaurant::update_menu_item,
        handlers::restaurant::set_menu_item_availability,
        handlers::order::create_order,
        handlers::order::list_orders,
        handlers::order::get_order,
        handlers::order::restaurant_action,
        handlers::order::update_order_status,
        handlers::delivery::list_deliveries,
        handlers::delivery::get_delivery_by_order,
        handlers::delivery::update_delivery_status,
        handlers::notification::list_notifications,
        handlers::notification::list_user_notifications,
    ),
    components(
        schemas(
            RegisterRequest,
            LoginRequest,
            UserResponse,
            AuthResponse,
            Restaurant,
            CreateRestaurantRequest,
            UpdateRestaurantAvailabilityRequest,
            MenuItem,
            CreateMenuItemRequest,
            UpdateMenuItemRequest,
            UpdateMenuItemAvailabilityRequest,
            Order,
            OrderLine,
            OrderStatus,
            OrderItemRequest,
            CreateOrderRequest,
            RestaurantActionRequest,
            UpdateOrderStatusRequest,
            Delivery,
            DeliveryStatus,
            UpdateDeliveryStatusRequest,
            Notification,
            NotificationType,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Service banner and health check"),
        (name = "auth", description = "Register / login / current user"),
        (name = "restaurant", description = "Restaurants and menus"),
        (name = "order", description = "Order lifecycle"),
        (name = "delivery", description = "Delivery assignments"),
        (name = "notification", description = "Notification log"),
    ),
    info(
        title = "FoodDash Backend API",
        version = "0.1.0",
        description = "Food-delivery order-management REST API"
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
