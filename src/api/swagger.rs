use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "College Admin Service API",
        version = "1.0.0",
        description = "Student and event records for a college administration portal, stored as JSON documents on local disk.\n\n**Roles:** every `/api/v1` call must send `x-user-role` set to `admin`, `faculty` or `student`. Students read, faculty also write, admins also delete and run maintenance.\n\n**Features:**\n- Student and event CRUD with filtering and pagination\n- Winners and participation history\n- Photo and attachment uploads\n- CSV exports and PDF event reports\n- Dashboard analytics\n- Backups and restore",
        contact(
            name = "College Admin Team",
            email = "admin-portal@college.edu"
        )
    ),
    paths(
        // Health & Metrics
        crate::api::health::health_check,
        crate::api::metrics::get_metrics,

        // Students
        crate::api::students::list_students,
        crate::api::students::create_student,
        crate::api::students::get_student,
        crate::api::students::update_student,
        crate::api::students::delete_student,
        crate::api::students::get_participations,
        crate::api::students::upload_photo,
        crate::api::students::export_students,

        // Events
        crate::api::events::list_events,
        crate::api::events::create_event,
        crate::api::events::get_event,
        crate::api::events::update_event,
        crate::api::events::delete_event,
        crate::api::events::add_winner,
        crate::api::events::event_report,
        crate::api::events::upload_attachment,
        crate::api::events::export_events,

        // Uploads
        crate::api::uploads::upload_file,

        // Analytics
        crate::api::analytics::get_overview,
        crate::api::analytics::get_events_summary,

        // Admin
        crate::api::admin::create_backup,
        crate::api::admin::list_backups,
        crate::api::admin::restore_backup,
        crate::api::admin::storage_stats,
        crate::api::admin::get_cache_stats,
        crate::api::admin::clear_cache_entries,
    ),
    components(
        schemas(
            crate::api::health::HealthResponse,

            crate::models::Student,
            crate::models::Participation,
            crate::models::CreateStudentRequest,
            crate::models::UpdateStudentRequest,
            crate::models::StudentListResponse,

            crate::models::Event,
            crate::models::Winner,
            crate::models::EventStatus,
            crate::models::CreateEventRequest,
            crate::models::UpdateEventRequest,
            crate::models::EventListResponse,

            crate::models::AnalyticsOverview,
            crate::models::MonthlyActivity,
            crate::models::TopParticipant,
            crate::models::YearSummary,

            crate::services::upload_service::StoredFile,
            crate::api::uploads::FileUpload,
            crate::database::BackupManifest,
            crate::database::StorageStats,
            crate::database::CollectionStats,
            crate::utils::cache::CacheStats,
        )
    ),
    tags(
        (name = "Health", description = "Health check and Prometheus metrics. No role header required."),
        (name = "Students", description = "Student records, participation history and profile photos."),
        (name = "Events", description = "Events, winners, attachments, CSV export and PDF reports."),
        (name = "Uploads", description = "Multipart file uploads. Stored files are served from /uploads/{category}/{file}."),
        (name = "Analytics", description = "Dashboard aggregates over all students and events."),
        (name = "Admin", description = "Backups, restore, storage usage and cache maintenance. Admin role only."),
    ),
    modifiers(&RoleHeaderAddon)
)]
pub struct ApiDoc;

struct RoleHeaderAddon;

impl utoipa::Modify for RoleHeaderAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "user_role",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    crate::middleware::role::ROLE_HEADER,
                    "admin, faculty or student",
                ))),
            );
        }
    }
}
