// ==================== DEMO DATA ====================
// A small, consistent data set for local development. Only written into an
// empty store, and only when SEED_DEMO_DATA is enabled.

use crate::{
    database::LocalDatabase,
    models::{CreateEventRequest, CreateStudentRequest, EventStatus, Winner},
    services::{event_service, student_service},
    utils::AppError,
};
use chrono::NaiveDate;

struct DemoStudent {
    name: &'static str,
    roll_number: &'static str,
    department: &'static str,
    batch: &'static str,
    section: &'static str,
}

const STUDENTS: &[DemoStudent] = &[
    DemoStudent { name: "Aarav Sharma", roll_number: "21CS001", department: "CSE", batch: "2021-2025", section: "A" },
    DemoStudent { name: "Diya Patel", roll_number: "21CS002", department: "CSE", batch: "2021-2025", section: "A" },
    DemoStudent { name: "Kabir Singh", roll_number: "21EC014", department: "ECE", batch: "2021-2025", section: "B" },
    DemoStudent { name: "Ananya Rao", roll_number: "22ME007", department: "MECH", batch: "2022-2026", section: "A" },
    DemoStudent { name: "Ishaan Verma", roll_number: "22CS031", department: "CSE", batch: "2022-2026", section: "B" },
    DemoStudent { name: "Meera Nair", roll_number: "23EE003", department: "EEE", batch: "2023-2027", section: "A" },
];

/// Seeds demo records when both collections are empty. Returns whether
/// anything was written.
pub async fn seed_demo_data(db: &LocalDatabase) -> Result<bool, AppError> {
    if !db.students().is_empty().await? || !db.events().is_empty().await? {
        log::info!("🌱 Demo data: store already has records, skipping seed");
        return Ok(false);
    }

    log::info!("🌱 Demo data: seeding {} students and 3 events...", STUDENTS.len());

    let mut students = Vec::with_capacity(STUDENTS.len());
    for s in STUDENTS {
        let created = student_service::create_student(
            db,
            CreateStudentRequest {
                name: s.name.to_string(),
                roll_number: s.roll_number.to_string(),
                email: format!("{}@college.edu", s.roll_number.to_lowercase()),
                phone: None,
                department: Some(s.department.to_string()),
                batch: s.batch.to_string(),
                section: Some(s.section.to_string()),
                photo_url: None,
            },
        )
        .await?;
        students.push(created);
    }

    let today = chrono::Utc::now().date_naive();
    let events = [
        ("Annual Tech Fest", "Coding contests and project expo", today - chrono::Duration::days(60), 45000.0, EventStatus::Completed),
        ("Inter-College Sports Meet", "Athletics and team sports", today - chrono::Duration::days(20), 30000.0, EventStatus::Completed),
        ("Cultural Night", "Music, dance and drama", today + chrono::Duration::days(30), 25000.0, EventStatus::Upcoming),
    ];

    for (index, (title, description, date, fund_spent, status)) in events.into_iter().enumerate() {
        let event = event_service::create_event(db, demo_event(title, description, date, fund_spent, status)).await?;

        if status == EventStatus::Completed {
            // rotate through the roster so every event gets different winners
            for position in 1..=3u32 {
                let student = &students[(index * 3 + position as usize - 1) % students.len()];
                event_service::add_winner(
                    db,
                    &event.id,
                    Winner {
                        student_id: student.id.clone(),
                        student_name: student.name.clone(),
                        position,
                        prize: Some(format!("Prize {}", position)),
                    },
                )
                .await?;
            }
        }
    }

    log::info!("   ✅ Demo data seeded");
    Ok(true)
}

fn demo_event(title: &str, description: &str, date: NaiveDate, fund_spent: f64, status: EventStatus) -> CreateEventRequest {
    CreateEventRequest {
        title: title.to_string(),
        description: Some(description.to_string()),
        date,
        location: "Main Auditorium".to_string(),
        organizer: Some("Student Council".to_string()),
        fund_spent,
        winners: Vec::new(),
        attachments: Vec::new(),
        status: Some(status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::tests::temp_db;
    use crate::database::RecordStore;

    #[tokio::test]
    async fn seeds_once_into_empty_store() {
        let (_dir, db) = temp_db().await;

        assert!(seed_demo_data(&db).await.unwrap());
        let students = db.students().list().await.unwrap();
        let events = db.events().list().await.unwrap();
        assert_eq!(students.len(), STUDENTS.len());
        assert_eq!(events.len(), 3);

        let winners: usize = events.iter().map(|e| e.winners.len()).sum();
        let participations: usize = students.iter().map(|s| s.participations.len()).sum();
        assert_eq!(winners, 6);
        assert_eq!(participations, winners);

        assert!(!seed_demo_data(&db).await.unwrap());
        assert_eq!(db.students().list().await.unwrap().len(), STUDENTS.len());
    }
}
