use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};

use crate::{
    config::Config,
    database::{LocalDatabase, RecordStore},
    middleware::{Permission, Role},
    models::{CreateEventRequest, EventListResponse, EventQuery, UpdateEventRequest, Winner},
    services::upload_service::UploadCategory,
    services::{event_service, report_service, upload_service},
    utils::AppError,
};

/// GET /api/v1/events - List events, filterable by year, month, status and text
#[utoipa::path(
    get,
    path = "/api/v1/events",
    tag = "Events",
    params(EventQuery),
    responses(
        (status = 200, description = "Filtered, paginated events", body = EventListResponse),
        (status = 400, description = "Invalid month or status filter")
    )
)]
pub async fn list_events(
    role: web::ReqData<Role>,
    db: web::Data<LocalDatabase>,
    query: web::Query<EventQuery>,
) -> Result<HttpResponse, AppError> {
    role.require(Permission::Read)?;
    log::info!("📋 GET /events - {:?}", query.0);

    let response = event_service::list_events(&db, &query).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// POST /api/v1/events
#[utoipa::path(
    post,
    path = "/api/v1/events",
    tag = "Events",
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event created"),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Role may not create events")
    )
)]
pub async fn create_event(
    role: web::ReqData<Role>,
    db: web::Data<LocalDatabase>,
    body: web::Json<CreateEventRequest>,
) -> Result<HttpResponse, AppError> {
    role.require(Permission::Write)?;
    log::info!("📝 POST /events - {} on {}", body.title, body.date);

    let event = event_service::create_event(&db, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "event": event
    })))
}

/// GET /api/v1/events/{id}
#[utoipa::path(
    get,
    path = "/api/v1/events/{id}",
    tag = "Events",
    params(("id" = String, Path, description = "Event id")),
    responses(
        (status = 200, description = "Event found"),
        (status = 404, description = "Event not found")
    )
)]
pub async fn get_event(
    role: web::ReqData<Role>,
    db: web::Data<LocalDatabase>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    role.require(Permission::Read)?;

    let event = event_service::get_event(&db, &id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "event": event
    })))
}

/// PUT /api/v1/events/{id}
#[utoipa::path(
    put,
    path = "/api/v1/events/{id}",
    tag = "Events",
    params(("id" = String, Path, description = "Event id")),
    request_body = UpdateEventRequest,
    responses(
        (status = 200, description = "Event updated"),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Event not found")
    )
)]
pub async fn update_event(
    role: web::ReqData<Role>,
    db: web::Data<LocalDatabase>,
    id: web::Path<String>,
    body: web::Json<UpdateEventRequest>,
) -> Result<HttpResponse, AppError> {
    role.require(Permission::Write)?;
    log::info!("🔧 PUT /events/{}", id);

    let event = event_service::update_event(&db, &id, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "event": event
    })))
}

/// DELETE /api/v1/events/{id}
#[utoipa::path(
    delete,
    path = "/api/v1/events/{id}",
    tag = "Events",
    params(("id" = String, Path, description = "Event id")),
    responses(
        (status = 200, description = "Event deleted"),
        (status = 403, description = "Only admins may delete"),
        (status = 404, description = "Event not found")
    )
)]
pub async fn delete_event(
    role: web::ReqData<Role>,
    db: web::Data<LocalDatabase>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    role.require(Permission::Delete)?;
    log::info!("🗑️  DELETE /events/{}", id);

    event_service::delete_event(&db, &id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Event deleted successfully"
    })))
}

/// POST /api/v1/events/{id}/winners
#[utoipa::path(
    post,
    path = "/api/v1/events/{id}/winners",
    tag = "Events",
    params(("id" = String, Path, description = "Event id")),
    request_body = Winner,
    responses(
        (status = 200, description = "Winner recorded"),
        (status = 400, description = "Position already taken"),
        (status = 404, description = "Event not found")
    )
)]
pub async fn add_winner(
    role: web::ReqData<Role>,
    db: web::Data<LocalDatabase>,
    id: web::Path<String>,
    body: web::Json<Winner>,
) -> Result<HttpResponse, AppError> {
    role.require(Permission::Write)?;
    log::info!("🏆 POST /events/{}/winners - position {}", id, body.position);

    let event = event_service::add_winner(&db, &id, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "event": event
    })))
}

/// POST /api/v1/events/{id}/attachments - multipart
#[utoipa::path(
    post,
    path = "/api/v1/events/{id}/attachments",
    tag = "Events",
    params(("id" = String, Path, description = "Event id")),
    request_body(content = crate::api::uploads::FileUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File stored and attached"),
        (status = 400, description = "Disallowed extension or too large"),
        (status = 404, description = "Event not found")
    )
)]
pub async fn upload_attachment(
    role: web::ReqData<Role>,
    db: web::Data<LocalDatabase>,
    config: web::Data<Config>,
    id: web::Path<String>,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    role.require(Permission::Write)?;
    log::info!("📎 POST /events/{}/attachments", id);

    event_service::get_event(&db, &id).await?;

    let file = upload_service::read_file_field(payload, config.max_upload_bytes).await?;
    let stored = upload_service::store_upload(&db, UploadCategory::Events, file, config.max_upload_bytes).await?;
    let event = event_service::attach_file(&db, &id, stored.url.clone()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "file": stored,
        "event": event
    })))
}

/// GET /api/v1/events/{id}/report - PDF summary of one event
#[utoipa::path(
    get,
    path = "/api/v1/events/{id}/report",
    tag = "Events",
    params(("id" = String, Path, description = "Event id")),
    responses(
        (status = 200, description = "PDF document (application/pdf)"),
        (status = 404, description = "Event not found")
    )
)]
pub async fn event_report(
    role: web::ReqData<Role>,
    db: web::Data<LocalDatabase>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    role.require(Permission::Read)?;

    let event = event_service::get_event(&db, &id).await?;
    let pdf = web::block(move || report_service::event_report_pdf(&event))
        .await
        .map_err(|e| AppError::Report(e.to_string()))??;

    log::info!("📄 Generated report for event {} ({} bytes)", id, pdf.len());

    Ok(HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"event-{}.pdf\"", id),
        ))
        .body(pdf))
}

/// GET /api/v1/events/export - CSV of every event
#[utoipa::path(
    get,
    path = "/api/v1/events/export",
    tag = "Events",
    responses(
        (status = 200, description = "CSV file", body = String, content_type = "text/csv")
    )
)]
pub async fn export_events(
    role: web::ReqData<Role>,
    db: web::Data<LocalDatabase>,
) -> Result<HttpResponse, AppError> {
    role.require(Permission::Read)?;

    let events = db.events().list().await?;
    log::info!("📤 Exporting {} events", events.len());

    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header(("Content-Disposition", "attachment; filename=\"events.csv\""))
        .body(report_service::events_csv(&events)))
}
