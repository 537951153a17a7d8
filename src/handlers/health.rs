use actix_web::{HttpResponse, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses(
        (status = 200, description = "服务信息")
    )
)]
pub async fn index() -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(json!({
        "service": "fooddash-backend",
        "version": env!("CARGO_PKG_VERSION"),
        "docs": "/swagger-ui/"
    })))
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "健康检查")
    )
)]
pub async fn health() -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(json!({
        "status": "ok",
        "service": "fooddash-backend"
    })))
}

pub fn health_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/health", web::get().to(health));
}
