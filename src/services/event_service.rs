// ==================== EVENTS ====================

use crate::{
    database::{LocalDatabase, RecordStore},
    models::{
        CreateEventRequest, Event, EventListResponse, EventQuery, EventStatus, Participation,
        UpdateEventRequest, Winner,
    },
    services::{normalize_optional, paginate, student_service},
    utils::{cache::invalidate, validation::check_required, validation_errors, AppError},
};
use std::collections::HashSet;
use uuid::Uuid;

pub async fn list_events(db: &LocalDatabase, query: &EventQuery) -> Result<EventListResponse, AppError> {
    let storage = db.events();
    let events = match (query.year, query.month) {
        (Some(year), Some(month)) => storage.list_month(year, month).await?,
        (Some(year), None) => storage.list_year(year).await?,
        _ => storage.list().await?,
    };

    let status = match query.status.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(raw.parse::<EventStatus>().map_err(AppError::Validation)?),
    };
    let needle = query
        .search
        .as_deref()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());

    let filtered: Vec<Event> = events
        .into_iter()
        .filter(|e| status.map(|s| e.status == s).unwrap_or(true))
        .filter(|e| query.year.is_some() || query.month.map(|m| chrono::Datelike::month(&e.date) == m).unwrap_or(true))
        .filter(|e| match &needle {
            Some(n) => {
                e.title.to_lowercase().contains(n)
                    || e.location.to_lowercase().contains(n)
                    || e.organizer.as_deref().map(|o| o.to_lowercase().contains(n)).unwrap_or(false)
            }
            None => true,
        })
        .collect();

    let (events, total, page, limit) = paginate(filtered, query.page, query.limit);
    Ok(EventListResponse {
        success: true,
        events,
        total,
        page,
        limit,
    })
}

pub async fn get_event(db: &LocalDatabase, id: &str) -> Result<Event, AppError> {
    db.events()
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event".into()))
}

pub async fn create_event(db: &LocalDatabase, request: CreateEventRequest) -> Result<Event, AppError> {
    let now = chrono::Utc::now().timestamp();
    let event = Event {
        id: Uuid::new_v4().to_string(),
        title: request.title.trim().to_string(),
        description: normalize_optional(request.description),
        date: request.date,
        location: request.location.trim().to_string(),
        organizer: normalize_optional(request.organizer),
        fund_spent: request.fund_spent,
        winners: request.winners,
        attachments: request.attachments,
        status: request.status.unwrap_or_default(),
        created_at: now,
        updated_at: now,
    };

    validate_event(&event)?;
    db.events().save(&event).await?;
    invalidate_event_caches();

    log::info!("✅ Event created: {} on {} ({})", event.title, event.date, event.id);
    Ok(event)
}

pub async fn update_event(db: &LocalDatabase, id: &str, request: UpdateEventRequest) -> Result<Event, AppError> {
    let storage = db.events();
    let mut event = storage
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event".into()))?;

    if let Some(title) = request.title { event.title = title.trim().to_string(); }
    if let Some(date) = request.date { event.date = date; }
    if let Some(location) = request.location { event.location = location.trim().to_string(); }
    if let Some(fund) = request.fund_spent { event.fund_spent = fund; }
    if let Some(winners) = request.winners { event.winners = winners; }
    if let Some(attachments) = request.attachments { event.attachments = attachments; }
    if let Some(status) = request.status { event.status = status; }
    if request.description.is_some() { event.description = normalize_optional(request.description); }
    if request.organizer.is_some() { event.organizer = normalize_optional(request.organizer); }
    event.updated_at = chrono::Utc::now().timestamp();

    validate_event(&event)?;
    storage.update(id, &event).await?;
    invalidate_event_caches();

    log::info!("✅ Event updated: {}", id);
    Ok(event)
}

pub async fn delete_event(db: &LocalDatabase, id: &str) -> Result<(), AppError> {
    if !db.events().delete(id).await? {
        return Err(AppError::NotFound("Event".into()));
    }
    invalidate_event_caches();
    log::info!("🗑️  Event deleted: {}", id);
    Ok(())
}

/// Records a winner and, when that student exists, mirrors it into their
/// participations. A missing student is not an error.
pub async fn add_winner(db: &LocalDatabase, event_id: &str, winner: Winner) -> Result<Event, AppError> {
    let storage = db.events();
    let mut event = storage
        .get(event_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event".into()))?;

    if event.winners.iter().any(|w| w.position == winner.position) {
        return Err(AppError::Duplicate(format!(
            "Position {} already has a winner for this event",
            winner.position
        )));
    }

    event.winners.push(winner.clone());
    event.winners.sort_by_key(|w| w.position);
    event.updated_at = chrono::Utc::now().timestamp();

    validate_event(&event)?;
    storage.update(event_id, &event).await?;
    invalidate_event_caches();

    let participation = Participation {
        event_id: event.id.clone(),
        event_title: event.title.clone(),
        achievement: format!("Winner - position {}", winner.position),
        date: event.date,
    };
    match student_service::add_participation(db, &winner.student_id, participation).await {
        Ok(true) => {}
        Ok(false) => log::warn!(
            "⚠️  Winner {} of event {} has no student record",
            winner.student_id, event.id
        ),
        Err(e) => log::warn!(
            "⚠️  Could not record participation of {} in event {}: {}",
            winner.student_id, event.id, e
        ),
    }

    Ok(event)
}

pub async fn attach_file(db: &LocalDatabase, event_id: &str, url: String) -> Result<Event, AppError> {
    let storage = db.events();
    let mut event = storage
        .get(event_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event".into()))?;

    event.attachments.push(url);
    event.updated_at = chrono::Utc::now().timestamp();
    storage.update(event_id, &event).await?;
    invalidate_event_caches();
    Ok(event)
}

pub fn validate_event(event: &Event) -> Result<(), AppError> {
    let mut errors = Vec::new();

    check_required(&mut errors, "title", &event.title, 200);
    check_required(&mut errors, "location", &event.location, 200);

    if !event.fund_spent.is_finite() || event.fund_spent < 0.0 {
        errors.push("fundSpent must be a non-negative number".to_string());
    }

    let mut positions = HashSet::new();
    for winner in &event.winners {
        if winner.position == 0 {
            errors.push("winner position must be at least 1".to_string());
        }
        if winner.student_id.trim().is_empty() {
            errors.push("winner studentId is required".to_string());
        }
        if !positions.insert(winner.position) {
            errors.push(format!("position {} is listed more than once", winner.position));
        }
    }

    validation_errors(errors)
}

fn invalidate_event_caches() {
    invalidate("events:*");
    invalidate("analytics:*");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::tests::temp_db;
    use crate::services::student_service::{create_student, get_student, tests::create_request};
    use chrono::NaiveDate;

    fn request(title: &str, date: &str) -> CreateEventRequest {
        CreateEventRequest {
            title: title.into(),
            description: Some("Annual event".into()),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            location: "Main Auditorium".into(),
            organizer: Some("Tech Club".into()),
            fund_spent: 2500.0,
            winners: vec![],
            attachments: vec![],
            status: None,
        }
    }

    fn winner(student_id: &str, position: u32) -> Winner {
        Winner {
            student_id: student_id.into(),
            student_name: "Asha Kumar".into(),
            position,
            prize: Some("Trophy".into()),
        }
    }

    #[tokio::test]
    async fn creates_with_default_status() {
        let (_dir, db) = temp_db().await;
        let event = create_event(&db, request("Tech Fest", "2024-03-15")).await.unwrap();
        assert_eq!(event.status, EventStatus::Upcoming);
        assert_eq!(get_event(&db, &event.id).await.unwrap(), event);
    }

    #[tokio::test]
    async fn rejects_negative_fund_and_blank_title() {
        let (_dir, db) = temp_db().await;
        let mut bad = request(" ", "2024-03-15");
        bad.fund_spent = -5.0;

        match create_event(&db, bad).await {
            Err(AppError::Validation(msg)) => {
                assert!(msg.contains("title is required"));
                assert!(msg.contains("fundSpent"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn filters_by_year_month_status_and_search() {
        let (_dir, db) = temp_db().await;
        create_event(&db, request("Tech Fest", "2024-03-15")).await.unwrap();
        create_event(&db, request("Hackathon", "2024-04-01")).await.unwrap();
        let mut done = request("Sports Day", "2023-12-01");
        done.status = Some(EventStatus::Completed);
        create_event(&db, done).await.unwrap();

        let by_year = list_events(&db, &EventQuery { year: Some(2024), ..Default::default() }).await.unwrap();
        assert_eq!(by_year.total, 2);

        let by_month = list_events(&db, &EventQuery { year: Some(2024), month: Some(4), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(by_month.events[0].title, "Hackathon");

        let completed = list_events(&db, &EventQuery { status: Some("completed".into()), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(completed.total, 1);

        let search = list_events(&db, &EventQuery { search: Some("fest".into()), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(search.total, 1);

        let bad = list_events(&db, &EventQuery { status: Some("postponed".into()), ..Default::default() }).await;
        assert!(matches!(bad, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn adding_a_winner_updates_the_student() {
        let (_dir, db) = temp_db().await;
        let student = create_student(&db, create_request("21CS001", "a@college.edu")).await.unwrap();
        let event = create_event(&db, request("Tech Fest", "2024-03-15")).await.unwrap();

        let updated = add_winner(&db, &event.id, winner(&student.id, 1)).await.unwrap();
        assert_eq!(updated.winners.len(), 1);

        let student = get_student(&db, &student.id).await.unwrap();
        assert_eq!(student.participations.len(), 1);
        assert_eq!(student.participations[0].event_id, event.id);
        assert_eq!(student.participations[0].achievement, "Winner - position 1");
    }

    #[tokio::test]
    async fn winner_for_unknown_student_is_accepted() {
        let (_dir, db) = temp_db().await;
        let event = create_event(&db, request("Tech Fest", "2024-03-15")).await.unwrap();

        let updated = add_winner(&db, &event.id, winner("not-a-student", 2)).await.unwrap();
        assert_eq!(updated.winners[0].student_id, "not-a-student");

        let repeat = add_winner(&db, &event.id, winner("someone-else", 2)).await;
        assert!(matches!(repeat, Err(AppError::Duplicate(_))));
    }

    #[tokio::test]
    async fn unreadable_student_does_not_fail_the_winner() {
        let (_dir, db) = temp_db().await;
        let student = create_student(&db, create_request("21CS001", "a@college.edu")).await.unwrap();
        let event = create_event(&db, request("Tech Fest", "2024-03-15")).await.unwrap();

        let path = db
            .students_dir()
            .join(crate::database::sanitize_segment(&student.batch))
            .join(format!("{}.json", student.id));
        tokio::fs::write(&path, b"{corrupt").await.unwrap();

        let updated = add_winner(&db, &event.id, winner(&student.id, 1)).await.unwrap();
        assert_eq!(updated.winners.len(), 1);
        assert_eq!(get_event(&db, &event.id).await.unwrap().winners[0].student_id, student.id);
    }

    #[tokio::test]
    async fn update_moving_date_keeps_single_copy() {
        let (_dir, db) = temp_db().await;
        let event = create_event(&db, request("Tech Fest", "2024-03-15")).await.unwrap();

        update_event(
            &db,
            &event.id,
            UpdateEventRequest {
                date: NaiveDate::from_ymd_opt(2025, 1, 10),
                status: Some(EventStatus::Ongoing),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let all = list_events(&db, &EventQuery::default()).await.unwrap();
        assert_eq!(all.total, 1);
        assert_eq!(all.events[0].status, EventStatus::Ongoing);
    }

    #[tokio::test]
    async fn attach_file_appends_url() {
        let (_dir, db) = temp_db().await;
        let event = create_event(&db, request("Tech Fest", "2024-03-15")).await.unwrap();
        let updated = attach_file(&db, &event.id, "/uploads/events/x.pdf".into()).await.unwrap();
        assert_eq!(updated.attachments, vec!["/uploads/events/x.pdf".to_string()]);
        assert!(matches!(delete_event(&db, "missing").await, Err(AppError::NotFound(_))));
    }
}
