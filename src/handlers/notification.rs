use crate::models::*;
use crate::services::NotificationService;
use actix_web::{HttpResponse, Result, web};

#[utoipa::path(
    get,
    path = "/api/notifications",
    tag = "notification",
    responses(
        (status = 200, description = "全部通知", body = [Notification])
    )
)]
pub async fn list_notifications(
    notification_service: web::Data<NotificationService>,
) -> Result<HttpResponse> {
    let notifications = notification_service.list().await;
    Ok(HttpResponse::Ok().json(notifications))
}

#[utoipa::path(
    get,
    path = "/api/notifications/user/{user_id}",
    tag = "notification",
    params(
        ("user_id" = String, Path, description = "用户 id")
    ),
    responses(
        (status = 200, description = "该用户的通知", body = [Notification])
    )
)]
pub async fn list_user_notifications(
    notification_service: web::Data<NotificationService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let notifications = notification_service
        .list_for_user(&path.into_inner())
        .await;
    Ok(HttpResponse::Ok().json(notifications))
}

pub fn notification_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/notifications")
            .route("", web::get().to(list_notifications))
            .route("/user/{user_id}", web::get().to(list_user_notifications)),
    );
}
