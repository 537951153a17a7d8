use crate::models::*;
use crate::services::DeliveryService;
use actix_web::{HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    get,
    path = "/api/deliveries",
    tag = "delivery",
    responses(
        (status = 200, description = "全部配送单", body = [Delivery])
    )
)]
pub async fn list_deliveries(
    delivery_service: web::Data<DeliveryService>,
) -> Result<HttpResponse> {
    let deliveries = delivery_service.list().await;
    Ok(HttpResponse::Ok().json(deliveries))
}

#[utoipa::path(
    get,
    path = "/api/deliveries/order/{order_id}",
    tag = "delivery",
    params(
        ("order_id" = String, Path, description = "订单号")
    ),
    responses(
        (status = 200, description = "该订单的配送单", body = Delivery),
        (status = 404, description = "配送单不存在")
    )
)]
pub async fn get_delivery_by_order(
    delivery_service: web::Data<DeliveryService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match delivery_service.get_by_order(&path.into_inner()).await {
        Ok(delivery) => Ok(HttpResponse::Ok().json(delivery)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/api/deliveries/{delivery_id}/status",
    tag = "delivery",
    params(
        ("delivery_id" = String, Path, description = "配送单号，如 DEL-1")
    ),
    request_body = UpdateDeliveryStatusRequest,
    responses(
        (status = 200, description = "更新后的配送单", body = Delivery),
        (status = 400, description = "非法状态"),
        (status = 404, description = "配送单不存在")
    )
)]
pub async fn update_delivery_status(
    delivery_service: web::Data<DeliveryService>,
    path: web::Path<String>,
    request: web::Json<UpdateDeliveryStatusRequest>,
) -> Result<HttpResponse> {
    let status = request.status.clone().unwrap_or_default();
    match delivery_service
        .update_status(&path.into_inner(), &status)
        .await
    {
        Ok(delivery) => Ok(HttpResponse::Ok().json(delivery)),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn delivery_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/deliveries")
            .route("", web::get().to(list_deliveries))
            .route("/order/{order_id}", web::get().to(get_delivery_by_order))
            .route(
                "/{delivery_id}/status",
                web::patch().to(update_delivery_status),
            ),
    );
}
