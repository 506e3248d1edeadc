mod api;
mod config;
mod database;
mod jobs;
mod middleware;
mod models;
mod seeds;
mod services;
mod utils;

use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::io;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::database::LocalDatabase;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;

    log::info!("🚀 Starting College Admin Service...");
    log::info!("📁 Data directory: {}", config.data_dir.display());

    utils::cache::configure_cache(config.cache_max_entries, config.cache_ttl);
    log::info!(
        "🗃️  Query cache: {} entries, {}s TTL",
        config.cache_max_entries,
        config.cache_ttl.as_secs()
    );

    let db = LocalDatabase::open(&config.data_dir)
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
    log::info!("✅ Local storage ready at {}", db.root().display());

    // 🌱 Demo records for an empty store
    if config.seed_demo_data {
        if let Err(e) = seeds::demo_data::seed_demo_data(&db).await {
            log::error!("❌ Demo data seed failed: {}", e);
        }
    }

    log::info!("📅 Starting background jobs...");
    jobs::backup_scheduler::start_backup_scheduler(db.clone(), config.backup_interval_hours, config.backup_retention);
    jobs::cache_janitor::start_cache_janitor();
    log::info!("✅ Background jobs started");

    let bind_addr = (config.host.clone(), config.port);
    log::info!("🌐 Server starting on {}:{}", config.host, config.port);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", config.host, config.port);
    log::info!("📄 OpenAPI spec at: http://{}:{}/api-docs/openapi.json", config.host, config.port);

    let db_data = web::Data::new(db);
    let config_data = web::Data::new(config);

    HttpServer::new(move || {
        let cors = config_data
            .cors_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                header::CONTENT_TYPE,
                header::ACCEPT,
                header::CACHE_CONTROL,
                header::HeaderName::from_static(middleware::role::ROLE_HEADER),
            ])
            .expose_headers(vec![header::CONTENT_TYPE, header::CONTENT_DISPOSITION])
            .max_age(3600);

        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(db_data.clone())
            .app_data(config_data.clone())
            .app_data(web::JsonConfig::default().limit(256 * 1024))
            .wrap(cors)
            .wrap(middleware::SecurityHeaders)
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi.clone())
            )
            .configure(api::configure)
    })
    .bind(bind_addr)?
    .run()
    .await
}
