// ==================== BACKUP / RESTORE ====================
// Full copies of students/ and events/ into backups/<name>/. Every record is
// parsed and re-serialized on the way in, so a backup never carries a
// corrupt document. Runs on the blocking pool with std::fs.

use super::{LocalDatabase, BACKUPS_DIR, EVENTS_DIR, STUDENTS_DIR};
use crate::utils::AppError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const MANIFEST: &str = "manifest.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BackupManifest {
    pub name: String,
    pub created_at: i64,
    pub students: usize,
    pub events: usize,
    /// Records that failed to parse and were left out
    pub skipped: usize,
}

pub async fn create_backup(db: &LocalDatabase) -> Result<BackupManifest, AppError> {
    let root = db.root().to_path_buf();
    run_blocking(move || create_backup_blocking(&root)).await
}

pub async fn list_backups(db: &LocalDatabase) -> Result<Vec<BackupManifest>, AppError> {
    let root = db.root().to_path_buf();
    run_blocking(move || list_backups_blocking(&root)).await
}

pub async fn restore_backup(db: &LocalDatabase, name: &str) -> Result<BackupManifest, AppError> {
    let root = db.root().to_path_buf();
    let name = name.to_string();
    run_blocking(move || restore_backup_blocking(&root, &name)).await
}

/// Deletes all but the newest `keep` backups. Returns the names removed.
pub async fn prune_backups(db: &LocalDatabase, keep: usize) -> Result<Vec<String>, AppError> {
    let root = db.root().to_path_buf();
    run_blocking(move || prune_backups_blocking(&root, keep)).await
}

async fn run_blocking<F, R>(f: F) -> Result<R, AppError>
where
    F: FnOnce() -> Result<R, AppError> + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Storage(std::io::Error::new(ErrorKind::Other, format!("backup task failed: {}", e))))?
}

fn create_backup_blocking(root: &Path) -> Result<BackupManifest, AppError> {
    let now = chrono::Utc::now();
    let name = format!("backup-{}", now.format("%Y%m%d-%H%M%S-%3f"));
    let target = root.join(BACKUPS_DIR).join(&name);

    log::info!("💾 Creating backup {}", name);
    fs::create_dir_all(&target)?;

    let mut skipped = 0;
    let students = copy_records(&root.join(STUDENTS_DIR), &target.join(STUDENTS_DIR), &mut skipped)?;
    let events = copy_records(&root.join(EVENTS_DIR), &target.join(EVENTS_DIR), &mut skipped)?;

    let manifest = BackupManifest {
        name,
        created_at: now.timestamp(),
        students,
        events,
        skipped,
    };
    fs::write(target.join(MANIFEST), serde_json::to_vec_pretty(&manifest)?)?;

    log::info!(
        "✅ Backup {} done: {} students, {} events, {} skipped",
        manifest.name, manifest.students, manifest.events, manifest.skipped
    );
    Ok(manifest)
}

/// Recursively copies `*.json` records, re-serializing each one.
fn copy_records(src: &Path, dst: &Path, skipped: &mut usize) -> Result<usize, AppError> {
    let entries = match fs::read_dir(src) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e.into()),
    };

    fs::create_dir_all(dst)?;
    let mut copied = 0;

    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        let dest = dst.join(entry.file_name());

        if entry.file_type()?.is_dir() {
            copied += copy_records(&path, &dest, skipped)?;
            continue;
        }
        if path.extension().map(|ext| ext != "json").unwrap_or(true) {
            continue;
        }

        let parsed = fs::read(&path)
            .map_err(AppError::from)
            .and_then(|bytes| serde_json::from_slice::<serde_json::Value>(&bytes).map_err(AppError::from));

        match parsed {
            Ok(value) => {
                fs::write(&dest, serde_json::to_vec_pretty(&value)?)?;
                copied += 1;
            }
            Err(e) => {
                log::warn!("⚠️  Backup skipping {}: {}", path.display(), e);
                *skipped += 1;
            }
        }
    }

    Ok(copied)
}

fn list_backups_blocking(root: &Path) -> Result<Vec<BackupManifest>, AppError> {
    let mut manifests = Vec::new();
    for dir in backup_dirs(root)? {
        match fs::read(dir.join(MANIFEST)) {
            Ok(bytes) => match serde_json::from_slice::<BackupManifest>(&bytes) {
                Ok(manifest) => manifests.push(manifest),
                Err(e) => log::warn!("⚠️  Ignoring backup {} with bad manifest: {}", dir.display(), e),
            },
            Err(_) => log::debug!("Ignoring {} (no manifest)", dir.display()),
        }
    }
    manifests.sort_by(|a, b| b.name.cmp(&a.name));
    Ok(manifests)
}

fn restore_backup_blocking(root: &Path, name: &str) -> Result<BackupManifest, AppError> {
    if name.is_empty() || name.contains('/') || name.contains('\\') || name.contains("..") {
        return Err(AppError::Validation(format!("invalid backup name '{}'", name)));
    }

    let source = root.join(BACKUPS_DIR).join(name);
    let manifest: BackupManifest = match fs::read(source.join(MANIFEST)) {
        Ok(bytes) => serde_json::from_slice(&bytes)?,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(AppError::NotFound(format!("Backup '{}'", name)))
        }
        Err(e) => return Err(e.into()),
    };

    log::info!("♻️  Restoring backup {}", name);

    for dir in [STUDENTS_DIR, EVENTS_DIR] {
        let live = root.join(dir);
        match fs::remove_dir_all(&live) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        let mut skipped = 0;
        copy_records(&source.join(dir), &live, &mut skipped)?;
        fs::create_dir_all(&live)?;
    }

    log::info!("✅ Restored {} students and {} events", manifest.students, manifest.events);
    Ok(manifest)
}

fn prune_backups_blocking(root: &Path, keep: usize) -> Result<Vec<String>, AppError> {
    let mut dirs = backup_dirs(root)?;
    // names embed the timestamp, so lexical order is chronological
    dirs.sort();
    dirs.reverse();

    let mut removed = Vec::new();
    for dir in dirs.into_iter().skip(keep) {
        fs::remove_dir_all(&dir)?;
        if let Some(name) = dir.file_name() {
            removed.push(name.to_string_lossy().into_owned());
        }
    }
    if !removed.is_empty() {
        log::info!("🧹 Pruned {} old backups", removed.len());
    }
    Ok(removed)
}

fn backup_dirs(root: &Path) -> Result<Vec<PathBuf>, AppError> {
    let mut dirs = Vec::new();
    let entries = match fs::read_dir(root.join(BACKUPS_DIR)) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(dirs),
        Err(e) => return Err(e.into()),
    };
    for entry in entries {
        let entry = entry?;
        if entry.file_type()?.is_dir() && entry.file_name().to_string_lossy().starts_with("backup-") {
            dirs.push(entry.path());
        }
    }
    Ok(dirs)
}
