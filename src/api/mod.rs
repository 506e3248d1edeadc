use actix_web::web;

use crate::middleware::RoleMiddleware;

/// Builds a test service with the full route table over `db`.
#[cfg(test)]
#[macro_export]
macro_rules! test_app {
    ($db:expr) => {{
        let config = $crate::config::Config::with_data_dir($db.root());
        $crate::test_app!($db, config)
    }};
    ($db:expr, $config:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($db.clone()))
                .app_data(actix_web::web::Data::new($config))
                .configure($crate::api::configure),
        )
        .await
    };
}

pub mod admin;
pub mod analytics;
pub mod events;
pub mod health;
pub mod metrics;
pub mod students;
pub mod swagger;
pub mod uploads;

/// Route table shared by the server and the HTTP tests. Everything under
/// /api/v1 requires the role header; /health, /metrics and stored uploads
/// do not.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check))
        .route("/metrics", web::get().to(metrics::get_metrics))
        .route("/uploads/{category}/{file}", web::get().to(uploads::serve_file))
        .service(
            web::scope("/api/v1")
                .wrap(RoleMiddleware)
                .service(
                    web::scope("/students")
                        .route("", web::get().to(students::list_students))
                        .route("", web::post().to(students::create_student))
                        .route("/export", web::get().to(students::export_students))
                        .route("/{id}", web::get().to(students::get_student))
                        .route("/{id}", web::put().to(students::update_student))
                        .route("/{id}", web::delete().to(students::delete_student))
                        .route("/{id}/participations", web::get().to(students::get_participations))
                        .route("/{id}/photo", web::post().to(students::upload_photo)),
                )
                .service(
                    web::scope("/events")
                        .route("", web::get().to(events::list_events))
                        .route("", web::post().to(events::create_event))
                        .route("/export", web::get().to(events::export_events))
                        .route("/{id}", web::get().to(events::get_event))
                        .route("/{id}", web::put().to(events::update_event))
                        .route("/{id}", web::delete().to(events::delete_event))
                        .route("/{id}/winners", web::post().to(events::add_winner))
                        .route("/{id}/attachments", web::post().to(events::upload_attachment))
                        .route("/{id}/report", web::get().to(events::event_report)),
                )
                .service(
                    web::scope("/analytics")
                        .route("/overview", web::get().to(analytics::get_overview))
                        .route("/events", web::get().to(analytics::get_events_summary)),
                )
                .route("/uploads/{category}", web::post().to(uploads::upload_file))
                .service(
                    web::scope("/admin")
                        .route("/backups", web::post().to(admin::create_backup))
                        .route("/backups", web::get().to(admin::list_backups))
                        .route("/backups/{name}/restore", web::post().to(admin::restore_backup))
                        .route("/storage", web::get().to(admin::storage_stats))
                        .route("/cache", web::get().to(admin::get_cache_stats))
                        .route("/cache", web::delete().to(admin::clear_cache_entries)),
                ),
        );
}
