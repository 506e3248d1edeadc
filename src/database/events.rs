use super::{is_valid_record_id, LocalDatabase, RecordStore};
use crate::models::Event;
use crate::utils::AppError;
use async_trait::async_trait;
use chrono::Datelike;
use std::path::PathBuf;

/// Event files grouped by date: `events/<yyyy>/<mm>/<id>.json`
#[derive(Clone, Debug)]
pub struct EventStorage {
    db: LocalDatabase,
}

impl EventStorage {
    pub fn new(db: LocalDatabase) -> Self {
        Self { db }
    }

    fn year_dir(&self, year: i32) -> PathBuf {
        self.db.events_dir().join(format!("{:04}", year))
    }

    fn month_dir(&self, year: i32, month: u32) -> PathBuf {
        self.year_dir(year).join(format!("{:02}", month))
    }

    fn path_for(&self, event: &Event) -> PathBuf {
        self.month_dir(event.date.year(), event.date.month())
            .join(format!("{}.json", event.id))
    }

    async fn month_dirs(&self) -> Result<Vec<PathBuf>, AppError> {
        let mut dirs = Vec::new();
        for year in self.db.subdirs(&self.db.events_dir()).await? {
            dirs.extend(self.db.subdirs(&year).await?);
        }
        Ok(dirs)
    }

    async fn locate(&self, id: &str) -> Result<Option<PathBuf>, AppError> {
        if !is_valid_record_id(id) {
            return Ok(None);
        }

        let file_name = format!("{}.json", id);
        for dir in self.month_dirs().await? {
            let candidate = dir.join(&file_name);
            if tokio::fs::try_exists(&candidate).await? {
                return Ok(Some(candidate));
            }
        }
        Ok(None)
    }

    pub async fn list_year(&self, year: i32) -> Result<Vec<Event>, AppError> {
        let mut events = Vec::new();
        for dir in self.db.subdirs(&self.year_dir(year)).await? {
            events.extend(self.db.load_records::<Event>(&dir).await?);
        }
        sort_newest_first(&mut events);
        Ok(events)
    }

    pub async fn list_month(&self, year: i32, month: u32) -> Result<Vec<Event>, AppError> {
        let mut events: Vec<Event> = self.db.load_records(&self.month_dir(year, month)).await?;
        sort_newest_first(&mut events);
        Ok(events)
    }

    pub async fn is_empty(&self) -> Result<bool, AppError> {
        for dir in self.month_dirs().await? {
            if !self.db.json_files(&dir).await?.is_empty() {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

#[async_trait]
impl RecordStore<Event> for EventStorage {
    async fn save(&self, event: &Event) -> Result<(), AppError> {
        if !is_valid_record_id(&event.id) {
            return Err(AppError::Validation(format!("invalid event id '{}'", event.id)));
        }
        self.db.write_json(&self.path_for(event), event).await
    }

    async fn get(&self, id: &str) -> Result<Option<Event>, AppError> {
        match self.locate(id).await? {
            Some(path) => Ok(Some(self.db.read_json(&path).await?)),
            None => Ok(None),
        }
    }

    /// Rewrites the record, moving it when the date lands in another month.
    async fn update(&self, id: &str, event: &Event) -> Result<(), AppError> {
        let old_path = self
            .locate(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Event".into()))?;

        let mut event = event.clone();
        event.id = id.to_string();
        let new_path = self.path_for(&event);

        self.db.write_json(&new_path, &event).await?;
        if new_path != old_path {
            log::info!("📦 Event {} moved to {}", id, event.date.format("%Y/%m"));
            self.db.remove(&old_path).await?;
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool, AppError> {
        match self.locate(id).await? {
            Some(path) => self.db.remove(&path).await,
            None => Ok(false),
        }
    }

    async fn list(&self) -> Result<Vec<Event>, AppError> {
        let mut events = Vec::new();
        for dir in self.month_dirs().await? {
            events.extend(self.db.load_records::<Event>(&dir).await?);
        }
        sort_newest_first(&mut events);
        Ok(events)
    }
}

fn sort_newest_first(events: &mut [Event]) {
    events.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.title.cmp(&b.title)));
}
