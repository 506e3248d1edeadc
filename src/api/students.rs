use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};

use crate::{
    config::Config,
    database::{LocalDatabase, RecordStore},
    middleware::{Permission, Role},
    models::{CreateStudentRequest, StudentListResponse, StudentQuery, UpdateStudentRequest},
    services::{report_service, student_service, upload_service},
    services::upload_service::UploadCategory,
    utils::AppError,
};

/// GET /api/v1/students - List students with optional filters
#[utoipa::path(
    get,
    path = "/api/v1/students",
    tag = "Students",
    params(StudentQuery),
    responses(
        (status = 200, description = "Filtered, paginated students", body = StudentListResponse),
        (status = 403, description = "Missing or unknown role")
    )
)]
pub async fn list_students(
    role: web::ReqData<Role>,
    db: web::Data<LocalDatabase>,
    query: web::Query<StudentQuery>,
) -> Result<HttpResponse, AppError> {
    role.require(Permission::Read)?;
    log::info!("📋 GET /students - {:?}", query.0);

    let response = student_service::list_students(&db, &query).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// POST /api/v1/students - Create a student
#[utoipa::path(
    post,
    path = "/api/v1/students",
    tag = "Students",
    request_body = CreateStudentRequest,
    responses(
        (status = 201, description = "Student created"),
        (status = 400, description = "Validation failed or duplicate roll number / email"),
        (status = 403, description = "Role may not create students")
    )
)]
pub async fn create_student(
    role: web::ReqData<Role>,
    db: web::Data<LocalDatabase>,
    body: web::Json<CreateStudentRequest>,
) -> Result<HttpResponse, AppError> {
    role.require(Permission::Write)?;
    log::info!("📝 POST /students - {}", body.roll_number);

    let student = student_service::create_student(&db, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "student": student
    })))
}

/// GET /api/v1/students/{id}
#[utoipa::path(
    get,
    path = "/api/v1/students/{id}",
    tag = "Students",
    params(("id" = String, Path, description = "Student id")),
    responses(
        (status = 200, description = "Student found"),
        (status = 404, description = "Student not found")
    )
)]
pub async fn get_student(
    role: web::ReqData<Role>,
    db: web::Data<LocalDatabase>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    role.require(Permission::Read)?;

    let student = student_service::get_student(&db, &id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "student": student
    })))
}

/// PUT /api/v1/students/{id} - Partial update
#[utoipa::path(
    put,
    path = "/api/v1/students/{id}",
    tag = "Students",
    params(("id" = String, Path, description = "Student id")),
    request_body = UpdateStudentRequest,
    responses(
        (status = 200, description = "Student updated"),
        (status = 400, description = "Validation failed or duplicate"),
        (status = 404, description = "Student not found")
    )
)]
pub async fn update_student(
    role: web::ReqData<Role>,
    db: web::Data<LocalDatabase>,
    id: web::Path<String>,
    body: web::Json<UpdateStudentRequest>,
) -> Result<HttpResponse, AppError> {
    role.require(Permission::Write)?;
    log::info!("🔧 PUT /students/{}", id);

    let student = student_service::update_student(&db, &id, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "student": student
    })))
}

/// DELETE /api/v1/students/{id}
#[utoipa::path(
    delete,
    path = "/api/v1/students/{id}",
    tag = "Students",
    params(("id" = String, Path, description = "Student id")),
    responses(
        (status = 200, description = "Student deleted"),
        (status = 403, description = "Only admins may delete"),
        (status = 404, description = "Student not found")
    )
)]
pub async fn delete_student(
    role: web::ReqData<Role>,
    db: web::Data<LocalDatabase>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    role.require(Permission::Delete)?;
    log::info!("🗑️  DELETE /students/{}", id);

    student_service::delete_student(&db, &id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Student deleted successfully"
    })))
}

/// GET /api/v1/students/{id}/participations
#[utoipa::path(
    get,
    path = "/api/v1/students/{id}/participations",
    tag = "Students",
    params(("id" = String, Path, description = "Student id")),
    responses(
        (status = 200, description = "Events the student took part in"),
        (status = 404, description = "Student not found")
    )
)]
pub async fn get_participations(
    role: web::ReqData<Role>,
    db: web::Data<LocalDatabase>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    role.require(Permission::Read)?;

    let student = student_service::get_student(&db, &id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "participations": student.participations,
        "total": student.participations.len()
    })))
}

/// POST /api/v1/students/{id}/photo - multipart, stores the file and links it
#[utoipa::path(
    post,
    path = "/api/v1/students/{id}/photo",
    tag = "Students",
    params(("id" = String, Path, description = "Student id")),
    request_body(content = crate::api::uploads::FileUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Photo stored and linked"),
        (status = 400, description = "Not an image or too large"),
        (status = 404, description = "Student not found")
    )
)]
pub async fn upload_photo(
    role: web::ReqData<Role>,
    db: web::Data<LocalDatabase>,
    config: web::Data<Config>,
    id: web::Path<String>,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    role.require(Permission::Write)?;
    log::info!("📷 POST /students/{}/photo", id);

    // fail before storing anything when the student is unknown
    student_service::get_student(&db, &id).await?;

    let file = upload_service::read_file_field(payload, config.max_upload_bytes).await?;
    let stored = upload_service::store_upload(&db, UploadCategory::Photos, file, config.max_upload_bytes).await?;
    let student = student_service::set_photo(&db, &id, stored.url.clone()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "file": stored,
        "student": student
    })))
}

/// GET /api/v1/students/export - CSV of every student
#[utoipa::path(
    get,
    path = "/api/v1/students/export",
    tag = "Students",
    responses(
        (status = 200, description = "CSV file", body = String, content_type = "text/csv")
    )
)]
pub async fn export_students(
    role: web::ReqData<Role>,
    db: web::Data<LocalDatabase>,
) -> Result<HttpResponse, AppError> {
    role.require(Permission::Read)?;

    let students = db.students().list().await?;
    log::info!("📤 Exporting {} students", students.len());

    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header(("Content-Disposition", "attachment; filename=\"students.csv\""))
        .body(report_service::students_csv(&students)))
}
