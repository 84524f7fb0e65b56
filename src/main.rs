use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use dotenvy::dotenv;
use std::sync::Arc;

mod api;
mod auth;
mod config;
mod db;
mod docs;
mod engine;
mod model;
mod routes;
mod store;
mod utils;

use config::Config;
use db::init_db;
use engine::AttendanceEngine;
use store::mysql::MySqlSessionStore;

use crate::docs::ApiDoc;
use crate::utils::stats_cache;
use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "Attendance service is running"
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    let config = Config::from_env();

    // Rolling daily log
    let file_appender = rolling::daily("logs", "attend.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let pool = init_db(&config.database_url).await;

    let store = MySqlSessionStore::new(pool);
    store
        .ensure_schema()
        .await
        .expect("Failed to prepare attendance schema");

    // The store lives for the whole process and is torn down with it; every
    // consumer gets it through this handle, never through a global.
    let engine = Data::new(AttendanceEngine::new(Arc::new(store)));

    let server_addr = config.server_addr.clone();
    let config_data = config.clone();

    let warm_engine = engine.clone();
    actix_web::rt::spawn(async move {
        if let Err(e) = stats_cache::warmup(warm_engine.get_ref()).await {
            eprintln!("Failed to warm up statistics cache: {:?}", e);
        }
    });

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(engine.clone())
            .app_data(Data::new(config.clone()))
            .service(index)
            .configure(|cfg| routes::configure(cfg, config_data.clone()))
    })
    .bind(server_addr)?
    .run()
    .await
}
