// ==================== UPLOADS ====================
// Multipart files land in uploads/<category>/<uuid>-<name> and are served
// back from /uploads/<category>/<name>.

use crate::{
    database::{sanitize_segment, LocalDatabase},
    utils::AppError,
};
use actix_multipart::Multipart;
use futures::TryStreamExt;
use serde::Serialize;
use std::path::PathBuf;
use uuid::Uuid;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];
const DOCUMENT_EXTENSIONS: &[&str] = &["pdf", "doc", "docx", "xls", "xlsx", "csv", "txt"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadCategory {
    Photos,
    Events,
    Documents,
}

impl UploadCategory {
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        match raw {
            "photos" => Ok(UploadCategory::Photos),
            "events" => Ok(UploadCategory::Events),
            "documents" => Ok(UploadCategory::Documents),
            other => Err(AppError::Upload(format!("unknown upload category '{}'", other))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UploadCategory::Photos => "photos",
            UploadCategory::Events => "events",
            UploadCategory::Documents => "documents",
        }
    }

    fn allows(&self, extension: &str) -> bool {
        match self {
            UploadCategory::Photos => IMAGE_EXTENSIONS.contains(&extension),
            _ => IMAGE_EXTENSIONS.contains(&extension) || DOCUMENT_EXTENSIONS.contains(&extension),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    pub url: String,
    pub file_name: String,
    pub original_name: String,
    pub size: usize,
}

/// Pulls the first file part out of a multipart body, enforcing `max_bytes`
/// while streaming.
pub async fn read_file_field(mut payload: Multipart, max_bytes: usize) -> Result<UploadedFile, AppError> {
    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| AppError::Upload(e.to_string()))?
    {
        let file_name = match field.content_disposition().and_then(|cd| cd.get_filename()) {
            Some(name) => name.to_string(),
            None => continue,
        };

        let mut bytes = Vec::new();
        while let Some(chunk) = field
            .try_next()
            .await
            .map_err(|e| AppError::Upload(e.to_string()))?
        {
            if bytes.len() + chunk.len() > max_bytes {
                return Err(AppError::Upload(format!("file exceeds the {} byte limit", max_bytes)));
            }
            bytes.extend_from_slice(&chunk);
        }

        return Ok(UploadedFile { file_name, bytes });
    }

    Err(AppError::Upload("no file part in request".into()))
}

pub async fn store_upload(
    db: &LocalDatabase,
    category: UploadCategory,
    file: UploadedFile,
    max_bytes: usize,
) -> Result<StoredFile, AppError> {
    if file.bytes.is_empty() {
        return Err(AppError::Upload("file is empty".into()));
    }
    if file.bytes.len() > max_bytes {
        return Err(AppError::Upload(format!("file exceeds the {} byte limit", max_bytes)));
    }

    let extension = extension_of(&file.file_name)
        .ok_or_else(|| AppError::Upload("file has no extension".into()))?;
    if !category.allows(&extension) {
        return Err(AppError::Upload(format!(
            ".{} files are not accepted for {}",
            extension,
            category.as_str()
        )));
    }

    let stem = file
        .file_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(&file.file_name);
    let stored_name = format!("{}-{}.{}", Uuid::new_v4(), sanitize_segment(stem), extension);

    let dir = db.uploads_dir().join(category.as_str());
    tokio::fs::create_dir_all(&dir).await?;
    tokio::fs::write(dir.join(&stored_name), &file.bytes).await?;

    log::info!("📎 Stored upload {}/{} ({} bytes)", category.as_str(), stored_name, file.bytes.len());

    Ok(StoredFile {
        url: format!("/uploads/{}/{}", category.as_str(), stored_name),
        file_name: stored_name,
        original_name: file.file_name,
        size: file.bytes.len(),
    })
}

/// Path of a stored upload, refusing anything that could escape the
/// category directory.
pub async fn resolve_upload(db: &LocalDatabase, category: &str, file_name: &str) -> Result<PathBuf, AppError> {
    let category = UploadCategory::parse(category).map_err(|_| AppError::NotFound("File".into()))?;
    if file_name.is_empty()
        || file_name.contains('/')
        || file_name.contains('\\')
        || file_name.contains("..")
    {
        return Err(AppError::NotFound("File".into()));
    }

    let path = db.uploads_dir().join(category.as_str()).join(file_name);
    match tokio::fs::metadata(&path).await {
        Ok(meta) if meta.is_file() => Ok(path),
        _ => Err(AppError::NotFound("File".into())),
    }
}

pub fn content_type_for(file_name: &str) -> &'static str {
    match extension_of(file_name).as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("pdf") => "application/pdf",
        Some("csv") => "text/csv",
        Some("txt") => "text/plain; charset=utf-8",
        Some("doc") => "application/msword",
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        Some("xls") => "application/vnd.ms-excel",
        Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        _ => "application/octet-stream",
    }
}

fn extension_of(file_name: &str) -> Option<String> {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::tests::temp_db;

    fn file(name: &str, size: usize) -> UploadedFile {
        UploadedFile {
            file_name: name.into(),
            bytes: vec![7u8; size],
        }
    }

    #[tokio::test]
    async fn stores_and_resolves() {
        let (_dir, db) = temp_db().await;
        let stored = store_upload(&db, UploadCategory::Photos, file("Asha Photo.PNG", 10), 100)
            .await
            .unwrap();

        assert!(stored.url.starts_with("/uploads/photos/"));
        assert!(stored.file_name.ends_with("-Asha_Photo.png"));
        let path = resolve_upload(&db, "photos", &stored.file_name).await.unwrap();
        assert_eq!(tokio::fs::read(path).await.unwrap().len(), 10);
    }

    #[tokio::test]
    async fn enforces_extension_and_size() {
        let (_dir, db) = temp_db().await;
        let pdf_photo = store_upload(&db, UploadCategory::Photos, file("cv.pdf", 10), 100).await;
        assert!(matches!(pdf_photo, Err(AppError::Upload(_))));

        let exe = store_upload(&db, UploadCategory::Documents, file("run.exe", 10), 100).await;
        assert!(matches!(exe, Err(AppError::Upload(_))));

        let big = store_upload(&db, UploadCategory::Events, file("poster.png", 101), 100).await;
        assert!(matches!(big, Err(AppError::Upload(_))));

        let empty = store_upload(&db, UploadCategory::Events, file("poster.png", 0), 100).await;
        assert!(matches!(empty, Err(AppError::Upload(_))));

        assert!(store_upload(&db, UploadCategory::Documents, file("budget.xlsx", 10), 100).await.is_ok());
    }

    #[tokio::test]
    async fn resolve_rejects_traversal_and_unknown_category() {
        let (_dir, db) = temp_db().await;
        assert!(matches!(resolve_upload(&db, "photos", "../../students").await, Err(AppError::NotFound(_))));
        assert!(matches!(resolve_upload(&db, "secrets", "a.png").await, Err(AppError::NotFound(_))));
        assert!(matches!(resolve_upload(&db, "photos", "missing.png").await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn resolve_refuses_directories() {
        let (_dir, db) = temp_db().await;
        store_upload(&db, UploadCategory::Photos, file("a.png", 4), 100).await.unwrap();

        assert!(matches!(resolve_upload(&db, "photos", ".").await, Err(AppError::NotFound(_))));
    }

    #[test]
    fn content_types() {
        assert_eq!(content_type_for("a.JPG"), "image/jpeg");
        assert_eq!(content_type_for("report.pdf"), "application/pdf");
        assert_eq!(content_type_for("noext"), "application/octet-stream");
    }
}
