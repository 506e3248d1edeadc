use actix_web::{web, HttpResponse};

use crate::{
    config::Config,
    database::{backup, LocalDatabase},
    middleware::{Permission, Role},
    utils::{
        cache::{cache_stats, clear_cache},
        AppError,
    },
};

/// POST /api/v1/admin/backups - Snapshot students and events now
#[utoipa::path(
    post,
    path = "/api/v1/admin/backups",
    tag = "Admin",
    responses(
        (status = 201, description = "Backup created", body = backup::BackupManifest),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn create_backup(
    role: web::ReqData<Role>,
    db: web::Data<LocalDatabase>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    role.require(Permission::Administer)?;
    log::info!("💾 POST /admin/backups");

    let manifest = backup::create_backup(&db).await?;
    let pruned = backup::prune_backups(&db, config.backup_retention).await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "backup": manifest,
        "pruned": pruned
    })))
}

/// GET /api/v1/admin/backups - Newest first
#[utoipa::path(
    get,
    path = "/api/v1/admin/backups",
    tag = "Admin",
    responses(
        (status = 200, description = "Available backups"),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn list_backups(
    role: web::ReqData<Role>,
    db: web::Data<LocalDatabase>,
) -> Result<HttpResponse, AppError> {
    role.require(Permission::Administer)?;

    let backups = backup::list_backups(&db).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "total": backups.len(),
        "backups": backups
    })))
}

/// POST /api/v1/admin/backups/{name}/restore - Replaces current students and events
#[utoipa::path(
    post,
    path = "/api/v1/admin/backups/{name}/restore",
    tag = "Admin",
    params(("name" = String, Path, description = "Backup directory name")),
    responses(
        (status = 200, description = "Backup restored", body = backup::BackupManifest),
        (status = 404, description = "No such backup")
    )
)]
pub async fn restore_backup(
    role: web::ReqData<Role>,
    db: web::Data<LocalDatabase>,
    name: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    role.require(Permission::Administer)?;
    log::warn!("♻️  POST /admin/backups/{}/restore", name);

    let manifest = backup::restore_backup(&db, &name).await?;
    clear_cache();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "restored": manifest
    })))
}

/// GET /api/v1/admin/storage - Record counts and bytes on disk
#[utoipa::path(
    get,
    path = "/api/v1/admin/storage",
    tag = "Admin",
    responses(
        (status = 200, description = "Storage usage", body = crate::database::StorageStats)
    )
)]
pub async fn storage_stats(
    role: web::ReqData<Role>,
    db: web::Data<LocalDatabase>,
) -> Result<HttpResponse, AppError> {
    role.require(Permission::Administer)?;

    let stats = db.stats().await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "storage": stats
    })))
}

/// GET /api/v1/admin/cache
#[utoipa::path(
    get,
    path = "/api/v1/admin/cache",
    tag = "Admin",
    responses(
        (status = 200, description = "Cache counters", body = crate::utils::cache::CacheStats)
    )
)]
pub async fn get_cache_stats(role: web::ReqData<Role>) -> Result<HttpResponse, AppError> {
    role.require(Permission::Administer)?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "cache": cache_stats()
    })))
}

/// DELETE /api/v1/admin/cache
#[utoipa::path(
    delete,
    path = "/api/v1/admin/cache",
    tag = "Admin",
    responses(
        (status = 200, description = "Cache emptied")
    )
)]
pub async fn clear_cache_entries(role: web::ReqData<Role>) -> Result<HttpResponse, AppError> {
    role.require(Permission::Administer)?;
    log::info!("🧹 DELETE /admin/cache");

    clear_cache();
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Cache cleared"
    })))
}
