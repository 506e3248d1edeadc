use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};

use crate::{
    config::Config,
    database::LocalDatabase,
    middleware::{Permission, Role},
    services::upload_service::{self, StoredFile, UploadCategory},
    utils::AppError,
};

/// Multipart body accepted by every upload endpoint
#[derive(utoipa::ToSchema)]
#[allow(dead_code)]
pub struct FileUpload {
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

/// POST /api/v1/uploads/{category} - Store a file without linking it to a record
#[utoipa::path(
    post,
    path = "/api/v1/uploads/{category}",
    tag = "Uploads",
    params(("category" = String, Path, description = "photos, events or documents")),
    request_body(content = FileUpload, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "File stored", body = StoredFile),
        (status = 400, description = "Unknown category, disallowed extension or file too large"),
        (status = 403, description = "Role may not upload")
    )
)]
pub async fn upload_file(
    role: web::ReqData<Role>,
    db: web::Data<LocalDatabase>,
    config: web::Data<Config>,
    category: web::Path<String>,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    role.require(Permission::Write)?;
    let category = UploadCategory::parse(&category)?;
    log::info!("📎 POST /uploads/{}", category.as_str());

    let file = upload_service::read_file_field(payload, config.max_upload_bytes).await?;
    let stored = upload_service::store_upload(&db, category, file, config.max_upload_bytes).await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "file": stored
    })))
}

/// GET /uploads/{category}/{file} - Public, so stored photos work in <img> tags
pub async fn serve_file(
    db: web::Data<LocalDatabase>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, AppError> {
    let (category, file_name) = path.into_inner();
    let full_path = upload_service::resolve_upload(&db, &category, &file_name).await?;
    let bytes = tokio::fs::read(&full_path).await?;

    Ok(HttpResponse::Ok()
        .content_type(upload_service::content_type_for(&file_name))
        .insert_header(("Cache-Control", "public, max-age=86400"))
        .body(bytes))
}
