use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Auth error: {0}")]
    AuthError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Peer service unavailable: {0}")]
    PeerUnavailable(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("HTTP request error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::ValidationError(msg) => {
                log::warn!("Validation error: {msg}");
                HttpResponse::BadRequest().json(json!({ "error": msg }))
            }
            AppError::AuthError(msg) => {
                log::warn!("Authentication error: {msg}");
                HttpResponse::Unauthorized().json(json!({ "error": msg }))
            }
            AppError::NotFound(msg) => HttpResponse::NotFound().json(json!({ "error": msg })),
            _ => {
                // PeerUnavailable 在服务层已被吞掉，落到这里说明是程序缺陷
                log::error!("Internal error: {self}");
                HttpResponse::InternalServerError().json(json!({
                    "error": "Internal server error",
                    "message": self.to_string()
                }))
            }
        }
    }
}
