use crate::models::*;
use crate::services::OrderService;
use actix_web::{HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    post,
    path = "/api/orders",
    tag = "order",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "下单成功", body = Order),
        (status = 400, description = "参数缺失、餐厅不可用或菜单项无效")
    )
)]
pub async fn create_order(
    order_service: web::Data<OrderService>,
    request: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse> {
    match order_service.create_order(request.into_inner()).await {
        Ok(order) => Ok(HttpResponse::Created().json(order)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/orders",
    tag = "order",
    responses(
        (status = 200, description = "全部订单", body = [Order])
    )
)]
pub async fn list_orders(order_service: web::Data<OrderService>) -> Result<HttpResponse> {
    let orders = order_service.list().await;
    Ok(HttpResponse::Ok().json(orders))
}

#[utoipa::path(
    get,
    path = "/api/orders/{order_id}",
    tag = "order",
    params(
        ("order_id" = String, Path, description = "订单号，如 ORD-1")
    ),
    responses(
        (status = 200, description = "订单详情", body = Order),
        (status = 404, description = "订单不存在")
    )
)]
pub async fn get_order(
    order_service: web::Data<OrderService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match order_service.get(&path.into_inner()).await {
        Ok(order) => Ok(HttpResponse::Ok().json(order)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/orders/{order_id}/restaurant-action",
    tag = "order",
    params(
        ("order_id" = String, Path, description = "订单号")
    ),
    request_body = RestaurantActionRequest,
    responses(
        (status = 200, description = "受理后的订单", body = Order),
        (status = 400, description = "未知动作或状态不允许"),
        (status = 404, description = "订单不存在")
    )
)]
pub async fn restaurant_action(
    order_service: web::Data<OrderService>,
    path: web::Path<String>,
    request: web::Json<RestaurantActionRequest>,
) -> Result<HttpResponse> {
    match order_service
        .restaurant_action(&path.into_inner(), request.action.as_deref())
        .await
    {
        Ok(order) => Ok(HttpResponse::Ok().json(order)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/api/orders/{order_id}/status",
    tag = "order",
    params(
        ("order_id" = String, Path, description = "订单号")
    ),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "更新后的订单", body = Order),
        (status = 400, description = "非法状态或非法跃迁"),
        (status = 404, description = "订单不存在")
    )
)]
pub async fn update_order_status(
    order_service: web::Data<OrderService>,
    path: web::Path<String>,
    request: web::Json<UpdateOrderStatusRequest>,
) -> Result<HttpResponse> {
    match order_service
        .update_status(&path.into_inner(), request.status.as_deref())
        .await
    {
        Ok(order) => Ok(HttpResponse::Ok().json(order)),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn order_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/orders")
            .route("", web::post().to(create_order))
            .route("", web::get().to(list_orders))
            .route("/{order_id}", web::get().to(get_order))
            .route(
                "/{order_id}/restaurant-action",
                web::post().to(restaurant_action),
            )
            .route("/{order_id}/status", web::patch().to(update_order_status)),
    );
}
