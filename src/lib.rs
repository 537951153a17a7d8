pub mod config;
pub mod error;
pub mod external;
pub mod handlers;
pub mod middlewares;
pub mod models;
pub mod services;
pub mod store;
pub mod swagger;
pub mod utils;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use store::Store;
