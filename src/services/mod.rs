pub mod auth_service;
pub mod catalog_service;
pub mod delivery_service;
pub mod notification_service;
pub mod order_service;

pub use auth_service::AuthService;
pub use catalog_service::CatalogService;
pub use delivery_service::DeliveryService;
pub use notification_service::NotificationService;
pub use order_service::OrderService;
