// ==================== LOCAL FILE DATABASE ====================
// One JSON document per record under a directory tree:
//
//   <root>/students/<batch>/<id>.json
//   <root>/events/<yyyy>/<mm>/<id>.json
//   <root>/uploads/<category>/<file>
//   <root>/backups/<name>/...
//
// Lookups are linear directory scans. There is no locking: two writers
// touching the same record race, last rename wins.

pub mod backup;
pub mod events;
pub mod students;

pub use backup::*;
pub use events::EventStorage;
pub use students::StudentStorage;

use crate::utils::AppError;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

pub const STUDENTS_DIR: &str = "students";
pub const EVENTS_DIR: &str = "events";
pub const UPLOADS_DIR: &str = "uploads";
pub const BACKUPS_DIR: &str = "backups";

/// CRUD surface shared by the per-entity storages
#[async_trait]
pub trait RecordStore<T: Send + Sync>: Send + Sync {
    async fn save(&self, record: &T) -> Result<(), AppError>;
    async fn get(&self, id: &str) -> Result<Option<T>, AppError>;
    async fn update(&self, id: &str, record: &T) -> Result<(), AppError>;
    async fn delete(&self, id: &str) -> Result<bool, AppError>;
    async fn list(&self) -> Result<Vec<T>, AppError>;
}

#[derive(Debug, Clone, Default, serde::Serialize, utoipa::ToSchema)]
pub struct CollectionStats {
    pub records: usize,
    pub bytes: u64,
}

#[derive(Debug, Clone, Default, serde::Serialize, utoipa::ToSchema)]
pub struct StorageStats {
    pub root: String,
    pub students: CollectionStats,
    pub events: CollectionStats,
    pub uploads: CollectionStats,
    pub backups: usize,
}

#[derive(Clone, Debug)]
pub struct LocalDatabase {
    root: PathBuf,
}

impl LocalDatabase {
    /// Opens (and if needed creates) the directory layout under `root`.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, AppError> {
        let db = Self { root: root.into() };
        db.ensure_layout().await?;
        Ok(db)
    }

    async fn ensure_layout(&self) -> Result<(), AppError> {
        log::info!("🔧 Preparing data directory {}", self.root.display());

        for dir in [STUDENTS_DIR, EVENTS_DIR, UPLOADS_DIR, BACKUPS_DIR] {
            let path = self.root.join(dir);
            if fs::try_exists(&path).await? {
                log::debug!("   ℹ️  {} already exists", path.display());
            } else {
                fs::create_dir_all(&path).await?;
                log::info!("   ✅ Created {}", path.display());
            }
        }

        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn students_dir(&self) -> PathBuf {
        self.root.join(STUDENTS_DIR)
    }

    pub fn events_dir(&self) -> PathBuf {
        self.root.join(EVENTS_DIR)
    }

    pub fn uploads_dir(&self) -> PathBuf {
        self.root.join(UPLOADS_DIR)
    }

    pub fn backups_dir(&self) -> PathBuf {
        self.root.join(BACKUPS_DIR)
    }

    pub fn students(&self) -> StudentStorage {
        StudentStorage::new(self.clone())
    }

    pub fn events(&self) -> EventStorage {
        EventStorage::new(self.clone())
    }

    /// Writes pretty JSON through a temp file renamed over the target.
    pub async fn write_json<T: Serialize + ?Sized>(&self, path: &Path, value: &T) -> Result<(), AppError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let body = serde_json::to_vec_pretty(value)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, body).await?;
        fs::rename(&tmp, path).await?;
        Ok(())
    }

    pub async fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<T, AppError> {
        let bytes = fs::read(path).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Returns false when there was nothing to remove.
    pub async fn remove(&self, path: &Path) -> Result<bool, AppError> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Immediate subdirectories of `dir`, sorted. A missing dir is empty.
    pub async fn subdirs(&self, dir: &Path) -> Result<Vec<PathBuf>, AppError> {
        let mut out = Vec::new();
        let mut entries = match fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(out),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_dir() {
                out.push(entry.path());
            }
        }
        out.sort();
        Ok(out)
    }

    /// `*.json` files directly inside `dir`, sorted.
    pub async fn json_files(&self, dir: &Path) -> Result<Vec<PathBuf>, AppError> {
        let mut out = Vec::new();
        let mut entries = match fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(out),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await?.is_file()
                && path.extension().map(|ext| ext == "json").unwrap_or(false)
            {
                out.push(path);
            }
        }
        out.sort();
        Ok(out)
    }

    /// Parses every record in `dir`. Unreadable files are logged and skipped.
    pub async fn load_records<T: DeserializeOwned>(&self, dir: &Path) -> Result<Vec<T>, AppError> {
        let mut records = Vec::new();
        for path in self.json_files(dir).await? {
            match self.read_json::<T>(&path).await {
                Ok(record) => records.push(record),
                Err(e) => log::warn!("⚠️  Skipping unreadable record {}: {}", path.display(), e),
            }
        }
        Ok(records)
    }

    pub async fn stats(&self) -> Result<StorageStats, AppError> {
        Ok(StorageStats {
            root: self.root.display().to_string(),
            students: self.collection_stats(&self.students_dir(), 1).await?,
            events: self.collection_stats(&self.events_dir(), 2).await?,
            uploads: self.collection_stats(&self.uploads_dir(), 1).await?,
            backups: self.subdirs(&self.backups_dir()).await?.len(),
        })
    }

    /// Counts files `depth` directory levels below `dir`.
    async fn collection_stats(&self, dir: &Path, depth: usize) -> Result<CollectionStats, AppError> {
        let mut level = vec![dir.to_path_buf()];
        for _ in 0..depth {
            let mut next = Vec::new();
            for d in &level {
                next.extend(self.subdirs(d).await?);
            }
            level = next;
        }

        let mut stats = CollectionStats::default();
        for d in &level {
            let mut entries = fs::read_dir(d).await?;
            while let Some(entry) = entries.next_entry().await? {
                let meta = entry.metadata().await?;
                if meta.is_file() {
                    stats.records += 1;
                    stats.bytes += meta.len();
                }
            }
        }
        Ok(stats)
    }
}

/// Maps a user-supplied label to a safe single directory name.
pub fn sanitize_segment(raw: &str) -> String {
    let cleaned: String = raw
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '_') {
        "unassigned".to_string()
    } else {
        cleaned
    }
}

/// Record ids are generated UUIDs; anything else can't name a stored file.
pub fn is_valid_record_id(id: &str) -> bool {
    !id.is_empty() && id.len() <= 64 && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}
