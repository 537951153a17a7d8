use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter

use fooddash_backend::{
    config::Config,
    external::PeerClient,
    handlers,
    middlewares::create_cors,
    services::*,
    store::Store,
    swagger::swagger_config,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    // 加载配置
    let config = Config::from_toml().expect("Failed to load configuration file");

    // 进程内存储：所有状态都活在这里，随进程结束而消失
    let store = Store::new();

    // 对端孪生服务客户端
    let peer = PeerClient::new(config.peer.clone());
    log::info!("Peer collaborator configured at {}", config.peer.base_url);

    // 创建服务
    let auth_service = AuthService::new(store.clone(), peer.clone());
    let catalog_service = CatalogService::new(store.clone(), peer.clone());
    let order_service = OrderService::new(store.clone());
    let delivery_service = DeliveryService::new(store.clone());
    let notification_service = NotificationService::new(store.clone());

    // 启动HTTP服务器
    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors())
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(web::Data::new(catalog_service.clone()))
            .app_data(web::Data::new(order_service.clone()))
            .app_data(web::Data::new(delivery_service.clone()))
            .app_data(web::Data::new(notification_service.clone()))
            .configure(swagger_config)
            .configure(handlers::health_config)
            .service(
                web::scope("/api")
                    .configure(handlers::auth_config)
                    .configure(handlers::restaurant_config)
                    .configure(handlers::order_config)
                    .configure(handlers::delivery_config)
                    .configure(handlers::notification_config),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
