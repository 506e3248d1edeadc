use super::{is_valid_record_id, sanitize_segment, LocalDatabase, RecordStore};
use crate::models::Student;
use crate::utils::AppError;
use async_trait::async_trait;
use std::path::PathBuf;

/// Student files grouped by batch: `students/<batch>/<id>.json`
#[derive(Clone, Debug)]
pub struct StudentStorage {
    db: LocalDatabase,
}

impl StudentStorage {
    pub fn new(db: LocalDatabase) -> Self {
        Self { db }
    }

    fn batch_dir(&self, batch: &str) -> PathBuf {
        self.db.students_dir().join(sanitize_segment(batch))
    }

    fn path_for(&self, student: &Student) -> PathBuf {
        self.batch_dir(&student.batch).join(format!("{}.json", student.id))
    }

    /// Finds the file holding `id` by probing every batch directory.
    async fn locate(&self, id: &str) -> Result<Option<PathBuf>, AppError> {
        if !is_valid_record_id(id) {
            return Ok(None);
        }

        let file_name = format!("{}.json", id);
        for dir in self.db.subdirs(&self.db.students_dir()).await? {
            let candidate = dir.join(&file_name);
            if tokio::fs::try_exists(&candidate).await? {
                return Ok(Some(candidate));
            }
        }
        Ok(None)
    }

    pub async fn list_batch(&self, batch: &str) -> Result<Vec<Student>, AppError> {
        let wanted = batch.trim();
        let mut students: Vec<Student> = self.db.load_records(&self.batch_dir(batch)).await?;
        // distinct batch names can sanitize to the same directory
        students.retain(|s| s.batch.trim().eq_ignore_ascii_case(wanted));
        sort_by_roll_number(&mut students);
        Ok(students)
    }

    pub async fn find_by_roll_number(&self, roll_number: &str) -> Result<Option<Student>, AppError> {
        let needle = roll_number.trim().to_lowercase();
        Ok(self
            .list()
            .await?
            .into_iter()
            .find(|s| s.roll_number.trim().to_lowercase() == needle))
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Student>, AppError> {
        let needle = email.trim().to_lowercase();
        Ok(self
            .list()
            .await?
            .into_iter()
            .find(|s| s.email.trim().to_lowercase() == needle))
    }

    pub async fn is_empty(&self) -> Result<bool, AppError> {
        for dir in self.db.subdirs(&self.db.students_dir()).await? {
            if !self.db.json_files(&dir).await?.is_empty() {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

#[async_trait]
impl RecordStore<Student> for StudentStorage {
    async fn save(&self, student: &Student) -> Result<(), AppError> {
        if !is_valid_record_id(&student.id) {
            return Err(AppError::Validation(format!("invalid student id '{}'", student.id)));
        }
        self.db.write_json(&self.path_for(student), student).await
    }

    async fn get(&self, id: &str) -> Result<Option<Student>, AppError> {
        match self.locate(id).await? {
            Some(path) => Ok(Some(self.db.read_json(&path).await?)),
            None => Ok(None),
        }
    }

    /// Rewrites the record, moving it when its batch changed.
    async fn update(&self, id: &str, student: &Student) -> Result<(), AppError> {
        let old_path = self
            .locate(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Student".into()))?;

        let mut student = student.clone();
        student.id = id.to_string();
        let new_path = self.path_for(&student);

        self.db.write_json(&new_path, &student).await?;
        if new_path != old_path {
            log::info!("📦 Student {} moved to batch {}", id, student.batch);
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

    async fn list(&self) -> Result<Vec<Student>, AppError> {
        let mut students = Vec::new();
        for dir in self.db.subdirs(&self.db.students_dir()).await? {
            students.extend(self.db.load_records::<Student>(&dir).await?);
        }
        sort_by_roll_number(&mut students);
        Ok(students)
    }
}

fn sort_by_roll_number(students: &mut [Student]) {
    students.sort_by(|a, b| a.roll_number.cmp(&b.roll_number));
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::database::tests::temp_db;

    pub(crate) fn student(id: &str, roll: &str, batch: &str) -> Student {
        Student {
            id: id.to_string(),
            name: format!("Student {}", roll),
            roll_number: roll.to_string(),
            email: format!("{}@college.edu", roll.to_lowercase()),
            phone: None,
            department: Some("CSE".into()),
            batch: batch.to_string(),
            section: Some("A".into()),
            photo_url: None,
            participations: vec![],
            created_at: 1_700_000_000,
            updated_at: 1_700_000_000,
        }
    }

    #[tokio::test]
    async fn saves_under_batch_directory() {
        let (_dir, db) = temp_db().await;
        let storage = db.students();
        let s = student("a1", "21CS001", "2021-2025");

        storage.save(&s).await.unwrap();

        assert!(db.students_dir().join("2021-2025").join("a1.json").is_file());
        assert_eq!(storage.get("a1").await.unwrap(), Some(s));
        assert_eq!(storage.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn update_moves_file_when_batch_changes() {
        let (_dir, db) = temp_db().await;
        let storage = db.students();
        let mut s = student("a1", "21CS001", "2021-2025");
        storage.save(&s).await.unwrap();

        s.batch = "2022-2026".into();
        storage.update("a1", &s).await.unwrap();

        assert!(!db.students_dir().join("2021-2025").join("a1.json").exists());
        assert!(db.students_dir().join("2022-2026").join("a1.json").is_file());
        assert_eq!(storage.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_missing_student_is_not_found() {
        let (_dir, db) = temp_db().await;
        let result = db.students().update("ghost", &student("ghost", "X1", "b")).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn lists_sorted_and_finds_case_insensitively() {
        let (_dir, db) = temp_db().await;
        let storage = db.students();
        storage.save(&student("b", "21CS002", "2021-2025")).await.unwrap();
        storage.save(&student("a", "21CS001", "2021-2025")).await.unwrap();
        storage.save(&student("c", "22EC001", "2022-2026")).await.unwrap();

        let rolls: Vec<String> = storage.list().await.unwrap().into_iter().map(|s| s.roll_number).collect();
        assert_eq!(rolls, vec!["21CS001", "21CS002", "22EC001"]);

        assert_eq!(storage.list_batch("2022-2026").await.unwrap().len(), 1);
        assert_eq!(storage.find_by_roll_number("21cs002").await.unwrap().unwrap().id, "b");
        assert_eq!(storage.find_by_email("21CS001@COLLEGE.EDU").await.unwrap().unwrap().id, "a");
        assert!(storage.find_by_email("nobody@college.edu").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn batch_listing_ignores_names_sharing_a_directory() {
        let (_dir, db) = temp_db().await;
        let storage = db.students();
        storage.save(&student("a", "21CS001", "CSE A")).await.unwrap();
        storage.save(&student("b", "21CS002", "CSE_A")).await.unwrap();

        assert!(db.students_dir().join("CSE_A").join("a.json").is_file());
        assert!(db.students_dir().join("CSE_A").join("b.json").is_file());

        let spaced = storage.list_batch("CSE A").await.unwrap();
        assert_eq!(spaced.len(), 1);
        assert_eq!(spaced[0].id, "a");

        let underscored = storage.list_batch("cse_a").await.unwrap();
        assert_eq!(underscored.len(), 1);
        assert_eq!(underscored[0].id, "b");
    }

    #[tokio::test]
    async fn delete_reports_whether_anything_was_removed() {
        let (_dir, db) = temp_db().await;
        let storage = db.students();
        storage.save(&student("a1", "21CS001", "2021-2025")).await.unwrap();

        assert!(!storage.is_empty().await.unwrap());
        assert!(storage.delete("a1").await.unwrap());
        assert!(!storage.delete("a1").await.unwrap());
        assert!(storage.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn ids_with_path_characters_never_resolve() {
        let (_dir, db) = temp_db().await;
        assert_eq!(db.students().get("../../etc/passwd").await.unwrap(), None);
        assert!(db.students().save(&student("../x", "R1", "b")).await.is_err());
    }
}
