use crate::models::*;
use crate::services::CatalogService;
use actix_web::{HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    post,
    path = "/api/restaurants",
    tag = "restaurant",
    request_body = CreateRestaurantRequest,
    responses(
        (status = 201, description = "创建成功", body = Restaurant),
        (status = 400, description = "缺少名称或地址")
    )
)]
pub async fn create_restaurant(
    catalog_service: web::Data<CatalogService>,
    request: web::Json<CreateRestaurantRequest>,
) -> Result<HttpResponse> {
    match catalog_service.create_restaurant(request.into_inner()).await {
        Ok(restaurant) => Ok(HttpResponse::Created().json(restaurant)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/restaurants",
    tag = "restaurant",
    responses(
        (status = 200, description = "本地与对端合并后的餐厅列表", body = [Restaurant])
    )
)]
pub async fn list_restaurants(
    catalog_service: web::Data<CatalogService>,
) -> Result<HttpResponse> {
    let restaurants = catalog_service.list_restaurants().await;
    Ok(HttpResponse::Ok().json(restaurants))
}

#[utoipa::path(
    get,
    path = "/api/restaurants/{id}",
    tag = "restaurant",
    params(
        ("id" = i64, Path, description = "餐厅 id")
    ),
    responses(
        (status = 200, description = "餐厅详情", body = Restaurant),
        (status = 404, description = "餐厅不存在")
    )
)]
pub async fn get_restaurant(
    catalog_service: web::Data<CatalogService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match catalog_service.get_restaurant(path.into_inner()).await {
        Ok(restaurant) => Ok(HttpResponse::Ok().json(restaurant)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/api/restaurants/{id}/availability",
    tag = "restaurant",
    params(
        ("id" = i64, Path, description = "餐厅 id")
    ),
    request_body = UpdateRestaurantAvailabilityRequest,
    responses(
        (status = 200, description = "更新后的餐厅", body = Restaurant),
        (status = 404, description = "餐厅不存在")
    )
)]
pub async fn set_restaurant_availability(
    catalog_service: web::Data<CatalogService>,
    path: web::Path<i64>,
    request: web::Json<UpdateRestaurantAvailabilityRequest>,
) -> Result<HttpResponse> {
    match catalog_service
        .set_restaurant_availability(path.into_inner(), request.is_active)
        .await
    {
        Ok(restaurant) => Ok(HttpResponse::Ok().json(restaurant)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/restaurants/{id}/menu",
    tag = "restaurant",
    params(
        ("id" = i64, Path, description = "餐厅 id")
    ),
    responses(
        (status = 200, description = "本地与对端合并后的菜单", body = [MenuItem])
    )
)]
pub async fn get_menu(
    catalog_service: web::Data<CatalogService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let menu = catalog_service.get_menu(path.into_inner()).await;
    Ok(HttpResponse::Ok().json(menu))
}

#[utoipa::path(
    post,
    path = "/api/restaurants/{id}/menu/items",
    tag = "restaurant",
    params(
        ("id" = i64, Path, description = "餐厅 id")
    ),
    request_body = CreateMenuItemRequest,
    responses(
        (status = 201, description = "创建成功", body = MenuItem),
        (status = 400, description = "缺少名称或价格"),
        (status = 404, description = "餐厅不存在")
    )
)]
pub async fn create_menu_item(
    catalog_service: web::Data<CatalogService>,
    path: web::Path<i64>,
    request: web::Json<CreateMenuItemRequest>,
) -> Result<HttpResponse> {
    match catalog_service
        .create_menu_item(path.into_inner(), request.into_inner())
        .await
    {
        Ok(menu_item) => Ok(HttpResponse::Created().json(menu_item)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/api/restaurants/{restaurant_id}/menu/items/{item_id}",
    tag = "restaurant",
    params(
        ("restaurant_id" = i64, Path, description = "餐厅 id"),
        ("item_id" = i64, Path, description = "菜单项 id")
    ),
    request_body = UpdateMenuItemRequest,
    responses(
        (status = 200, description = "更新后的菜单项", body = MenuItem),
        (status = 404, description = "菜单项不存在")
    )
)]
pub async fn update_menu_item(
    catalog_service: web::Data<CatalogService>,
    path: web::Path<(i64, i64)>,
    request: web::Json<UpdateMenuItemRequest>,
) -> Result<HttpResponse> {
    let (restaurant_id, item_id) = path.into_inner();
    match catalog_service
        .update_menu_item(restaurant_id, item_id, request.into_inner())
        .await
    {
        Ok(menu_item) => Ok(HttpResponse::Ok().json(menu_item)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/api/restaurants/{restaurant_id}/menu/items/{item_id}/availability",
    tag = "restaurant",
    params(
        ("restaurant_id" = i64, Path, description = "餐厅 id"),
        ("item_id" = i64, Path, description = "菜单项 id")
    ),
    request_body = UpdateMenuItemAvailabilityRequest,
    responses(
        (status = 200, description = "更新后的菜单项", body = MenuItem),
        (status = 404, description = "菜单项不存在")
    )
)]
pub async fn set_menu_item_availability(
    catalog_service: web::Data<CatalogService>,
    path: web::Path<(i64, i64)>,
    request: web::Json<UpdateMenuItemAvailabilityRequest>,
) -> Result<HttpResponse> {
    let (restaurant_id, item_id) = path.into_inner();
    match catalog_service
        .set_menu_item_availability(restaurant_id, item_id, request.available)
        .await
    {
        Ok(menu_item) => Ok(HttpResponse::Ok().json(menu_item)),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn restaurant_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/restaurants")
            .route("", web::post().to(create_restaurant))
            .route("", web::get().to(list_restaurants))
            .route("/{id}", web::get().to(get_restaurant))
            .route("/{id}/availability", web::patch().to(set_restaurant_availability))
            .route("/{id}/menu", web::get().to(get_menu))
            .route("/{id}/menu/items", web::post().to(create_menu_item))
            .route(
                "/{restaurant_id}/menu/items/{item_id}",
                web::put().to(update_menu_item),
            )
            .route(
                "/{restaurant_id}/menu/items/{item_id}/availability",
                web::patch().to(set_menu_item_availability),
            ),
    );
}
