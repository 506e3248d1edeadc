// ==================== STUDENTS ====================
// CRUD over StudentStorage. Uniqueness of roll number and email is checked
// by scanning every stored student before a write; nothing stops two
// concurrent requests from both passing the check.

use crate::{
    database::{LocalDatabase, RecordStore, StudentStorage},
    models::{
        CreateStudentRequest, Participation, Student, StudentListResponse, StudentQuery,
        UpdateStudentRequest,
    },
    services::{normalize_optional, paginate},
    utils::{
        cache::{get_cached, invalidate, remove_cached, set_cache},
        validation::{check_required, is_valid_email, is_valid_phone, is_valid_roll_number},
        validation_errors, AppError,
    },
};
use uuid::Uuid;

pub async fn list_students(db: &LocalDatabase, query: &StudentQuery) -> Result<StudentListResponse, AppError> {
    let cache_key = query.cache_key(&db.root().display().to_string());
    if let Some(cached) = get_cached(&cache_key) {
        match serde_json::from_value::<StudentListResponse>(cached) {
            Ok(response) => return Ok(response),
            Err(_) => {
                remove_cached(&cache_key);
            }
        }
    }

    let storage = db.students();
    let students = match query.batch.as_deref().filter(|b| !b.trim().is_empty()) {
        Some(batch) => storage.list_batch(batch).await?,
        None => storage.list().await?,
    };

    let filtered: Vec<Student> = students
        .into_iter()
        .filter(|s| matches_query(s, query))
        .collect();

    let (students, total, page, limit) = paginate(filtered, query.page, query.limit);
    let response = StudentListResponse {
        success: true,
        students,
        total,
        page,
        limit,
    };

    if let Ok(value) = serde_json::to_value(&response) {
        set_cache(cache_key, value);
    }
    Ok(response)
}

fn matches_query(student: &Student, query: &StudentQuery) -> bool {
    let eq = |field: &Option<String>, wanted: &Option<String>| match wanted.as_deref().map(str::trim) {
        None | Some("") => true,
        Some(w) => field.as_deref().map(|f| f.eq_ignore_ascii_case(w)).unwrap_or(false),
    };

    if !eq(&student.section, &query.section) || !eq(&student.department, &query.department) {
        return false;
    }

    match query.search.as_deref().map(|s| s.trim().to_lowercase()) {
        Some(needle) if !needle.is_empty() => {
            student.name.to_lowercase().contains(&needle)
                || student.roll_number.to_lowercase().contains(&needle)
                || student.email.to_lowercase().contains(&needle)
        }
        _ => true,
    }
}

pub async fn get_student(db: &LocalDatabase, id: &str) -> Result<Student, AppError> {
    db.students()
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Student".into()))
}

pub async fn create_student(db: &LocalDatabase, request: CreateStudentRequest) -> Result<Student, AppError> {
    let now = chrono::Utc::now().timestamp();
    let student = Student {
        id: Uuid::new_v4().to_string(),
        name: request.name.trim().to_string(),
        roll_number: request.roll_number.trim().to_string(),
        email: request.email.trim().to_lowercase(),
        phone: normalize_optional(request.phone),
        department: normalize_optional(request.department),
        batch: request.batch.trim().to_string(),
        section: normalize_optional(request.section),
        photo_url: normalize_optional(request.photo_url),
        participations: Vec::new(),
        created_at: now,
        updated_at: now,
    };

    validate_student(&student)?;
    let storage = db.students();
    ensure_unique(&storage, &student).await?;

    storage.save(&student).await?;
    invalidate_student_caches();

    log::info!("✅ Student created: {} ({})", student.roll_number, student.id);
    Ok(student)
}

pub async fn update_student(
    db: &LocalDatabase,
    id: &str,
    request: UpdateStudentRequest,
) -> Result<Student, AppError> {
    let storage = db.students();
    let mut student = storage
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Student".into()))?;

    if let Some(name) = request.name { student.name = name.trim().to_string(); }
    if let Some(roll) = request.roll_number { student.roll_number = roll.trim().to_string(); }
    if let Some(email) = request.email { student.email = email.trim().to_lowercase(); }
    if let Some(batch) = request.batch { student.batch = batch.trim().to_string(); }
    if request.phone.is_some() { student.phone = normalize_optional(request.phone); }
    if request.department.is_some() { student.department = normalize_optional(request.department); }
    if request.section.is_some() { student.section = normalize_optional(request.section); }
    if request.photo_url.is_some() { student.photo_url = normalize_optional(request.photo_url); }
    student.updated_at = chrono::Utc::now().timestamp();

    validate_student(&student)?;
    ensure_unique(&storage, &student).await?;

    storage.update(id, &student).await?;
    invalidate_student_caches();

    log::info!("✅ Student updated: {}", id);
    Ok(student)
}

pub async fn delete_student(db: &LocalDatabase, id: &str) -> Result<(), AppError> {
    if !db.students().delete(id).await? {
        return Err(AppError::NotFound("Student".into()));
    }
    invalidate_student_caches();
    log::info!("🗑️  Student deleted: {}", id);
    Ok(())
}

pub async fn set_photo(db: &LocalDatabase, id: &str, photo_url: String) -> Result<Student, AppError> {
    let storage = db.students();
    let mut student = storage
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Student".into()))?;

    student.photo_url = Some(photo_url);
    student.updated_at = chrono::Utc::now().timestamp();
    storage.update(id, &student).await?;
    invalidate_student_caches();
    Ok(student)
}

/// Appends a participation when the student exists. Returns whether it did.
pub async fn add_participation(
    db: &LocalDatabase,
    student_id: &str,
    participation: Participation,
) -> Result<bool, AppError> {
    let storage = db.students();
    let Some(mut student) = storage.get(student_id).await? else {
        return Ok(false);
    };

    let already = student
        .participations
        .iter()
        .any(|p| p.event_id == participation.event_id && p.achievement == participation.achievement);
    if !already {
        student.participations.push(participation);
        student.updated_at = chrono::Utc::now().timestamp();
        storage.update(student_id, &student).await?;
        invalidate_student_caches();
    }
    Ok(true)
}

pub fn validate_student(student: &Student) -> Result<(), AppError> {
    let mut errors = Vec::new();

    check_required(&mut errors, "name", &student.name, 100);
    check_required(&mut errors, "batch", &student.batch, 50);

    if !is_valid_roll_number(&student.roll_number) {
        errors.push("rollNumber must be 1-32 letters, digits, '-' or '/'".to_string());
    }
    if !is_valid_email(&student.email) {
        errors.push("email is invalid".to_string());
    }
    if let Some(phone) = &student.phone {
        if !is_valid_phone(phone) {
            errors.push("phone must contain 10-15 digits".to_string());
        }
    }

    validation_errors(errors)
}

async fn ensure_unique(storage: &StudentStorage, student: &Student) -> Result<(), AppError> {
    if let Some(other) = storage.find_by_roll_number(&student.roll_number).await? {
        if other.id != student.id {
            return Err(AppError::Duplicate(format!(
                "Student with roll number {} already exists",
                student.roll_number
            )));
        }
    }
    if let Some(other) = storage.find_by_email(&student.email).await? {
        if other.id != student.id {
            return Err(AppError::Duplicate(format!(
                "Student with email {} already exists",
                student.email
            )));
        }
    }
    Ok(())
}

fn invalidate_student_caches() {
    invalidate("students:*");
    invalidate("analytics:*");
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::database::tests::temp_db;

    pub(crate) fn create_request(roll: &str, email: &str) -> CreateStudentRequest {
        CreateStudentRequest {
            name: "Asha Kumar".into(),
            roll_number: roll.into(),
            email: email.into(),
            phone: Some("9876543210".into()),
            department: Some("CSE".into()),
            batch: "2021-2025".into(),
            section: Some("A".into()),
            photo_url: None,
        }
    }

    #[tokio::test]
    async fn creates_and_reads_back() {
        let (_dir, db) = temp_db().await;
        let created = create_student(&db, create_request("21CS001", " Asha@College.edu ")).await.unwrap();

        assert_eq!(created.email, "asha@college.edu");
        assert_eq!(get_student(&db, &created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn rejects_duplicate_roll_number_and_email() {
        let (_dir, db) = temp_db().await;
        create_student(&db, create_request("21CS001", "a@college.edu")).await.unwrap();

        let dup_roll = create_student(&db, create_request("21cs001", "b@college.edu")).await;
        assert!(matches!(dup_roll, Err(AppError::Duplicate(msg)) if msg.contains("roll number")));

        let dup_email = create_student(&db, create_request("21CS002", "A@college.edu")).await;
        assert!(matches!(dup_email, Err(AppError::Duplicate(msg)) if msg.contains("email")));
    }

    #[tokio::test]
    async fn rejects_invalid_fields() {
        let (_dir, db) = temp_db().await;
        let mut request = create_request("21 CS", "not-an-email");
        request.name = " ".into();
        request.phone = Some("123".into());

        match create_student(&db, request).await {
            Err(AppError::Validation(msg)) => {
                assert!(msg.contains("name is required"));
                assert!(msg.contains("rollNumber"));
                assert!(msg.contains("email"));
                assert!(msg.contains("phone"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn update_keeps_own_values_and_checks_others() {
        let (_dir, db) = temp_db().await;
        let a = create_student(&db, create_request("21CS001", "a@college.edu")).await.unwrap();
        create_student(&db, create_request("21CS002", "b@college.edu")).await.unwrap();

        // re-submitting its own roll number is not a duplicate
        let updated = update_student(
            &db,
            &a.id,
            UpdateStudentRequest {
                roll_number: Some("21CS001".into()),
                section: Some("".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.section, None);

        let clash = update_student(
            &db,
            &a.id,
            UpdateStudentRequest { email: Some("b@college.edu".into()), ..Default::default() },
        )
        .await;
        assert!(matches!(clash, Err(AppError::Duplicate(_))));
    }

    #[tokio::test]
    async fn filters_and_paginates() {
        let (_dir, db) = temp_db().await;
        for i in 1..=5 {
            let mut request = create_request(&format!("21CS00{}", i), &format!("s{}@college.edu", i));
            if i > 3 {
                request.section = Some("B".into());
            }
            create_student(&db, request).await.unwrap();
        }

        let query = StudentQuery { section: Some("b".into()), ..Default::default() };
        assert_eq!(list_students(&db, &query).await.unwrap().total, 2);

        let query = StudentQuery { search: Some("21cs003".into()), ..Default::default() };
        assert_eq!(list_students(&db, &query).await.unwrap().students.len(), 1);

        let query = StudentQuery { page: Some(2), limit: Some(2), ..Default::default() };
        let page = list_students(&db, &query).await.unwrap();
        assert_eq!(page.total, 5);
        let rolls: Vec<String> = page.students.into_iter().map(|s| s.roll_number).collect();
        assert_eq!(rolls, vec!["21CS003", "21CS004"]);
    }

    #[tokio::test]
    async fn participation_is_added_once_and_only_for_known_students() {
        let (_dir, db) = temp_db().await;
        let s = create_student(&db, create_request("21CS001", "a@college.edu")).await.unwrap();
        let participation = Participation {
            event_id: "e1".into(),
            event_title: "Tech Fest".into(),
            achievement: "Winner - position 1".into(),
            date: chrono::NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
        };

        assert!(add_participation(&db, &s.id, participation.clone()).await.unwrap());
        assert!(add_participation(&db, &s.id, participation.clone()).await.unwrap());
        assert!(!add_participation(&db, "unknown-id", participation).await.unwrap());

        assert_eq!(get_student(&db, &s.id).await.unwrap().participations.len(), 1);
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let (_dir, db) = temp_db().await;
        assert!(matches!(delete_student(&db, "nope").await, Err(AppError::NotFound(_))));
    }
}
