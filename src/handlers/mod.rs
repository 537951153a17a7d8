pub mod auth;
pub mod delivery;
pub mod health;
pub mod notification;
pub mod order;
pub mod restaurant;

pub use auth::auth_config;
pub use delivery::delivery_config;
pub use health::health_config;
pub use notification::notification_config;
pub use order::order_config;
pub use restaurant::restaurant_config;
