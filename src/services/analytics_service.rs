// ==================== ANALYTICS ====================
// Aggregates over a full load of both collections. The overview is cached
// because it touches every record on disk.

use crate::{
    database::{LocalDatabase, RecordStore},
    models::{AnalyticsOverview, Event, EventStatus, MonthlyActivity, Student, TopParticipant, YearSummary},
    utils::{
        cache::{get_cached, remove_cached, set_cache},
        AppError,
    },
};
use chrono::NaiveDate;
use std::collections::BTreeMap;

const TOP_PARTICIPANTS: usize = 5;

pub async fn overview(db: &LocalDatabase) -> Result<AnalyticsOverview, AppError> {
    let cache_key = format!("analytics:overview:{}", db.root().display());
    if let Some(cached) = get_cached(&cache_key) {
        match serde_json::from_value::<AnalyticsOverview>(cached) {
            Ok(overview) => return Ok(overview),
            Err(_) => {
                remove_cached(&cache_key);
            }
        }
    }

    let students = db.students().list().await?;
    let events = db.events().list().await?;
    let today = chrono::Utc::now().date_naive();

    let result = build_overview(&students, &events, today);
    if let Ok(value) = serde_json::to_value(&result) {
        set_cache(cache_key, value);
    }
    Ok(result)
}

pub fn build_overview(students: &[Student], events: &[Event], today: NaiveDate) -> AnalyticsOverview {
    let mut events_by_status: BTreeMap<String, usize> = BTreeMap::new();
    for event in events {
        *events_by_status.entry(event.status.to_string()).or_default() += 1;
    }

    let mut students_by_batch: BTreeMap<String, usize> = BTreeMap::new();
    for student in students {
        *students_by_batch.entry(student.batch.clone()).or_default() += 1;
    }

    let mut top: Vec<&Student> = students.iter().filter(|s| !s.participations.is_empty()).collect();
    top.sort_by(|a, b| {
        b.participations
            .len()
            .cmp(&a.participations.len())
            .then_with(|| a.name.cmp(&b.name))
    });

    AnalyticsOverview {
        total_students: students.len(),
        total_events: events.len(),
        total_fund_spent: events.iter().map(|e| e.fund_spent).sum(),
        total_winners: events.iter().map(|e| e.winners.len()).sum(),
        upcoming_events: events
            .iter()
            .filter(|e| e.status == EventStatus::Upcoming && e.date >= today)
            .count(),
        events_by_status,
        students_by_batch,
        monthly: monthly_activity(events.iter()),
        top_participants: top
            .into_iter()
            .take(TOP_PARTICIPANTS)
            .map(|s| TopParticipant {
                student_id: s.id.clone(),
                name: s.name.clone(),
                roll_number: s.roll_number.clone(),
                participations: s.participations.len(),
            })
            .collect(),
        generated_at: chrono::Utc::now().timestamp(),
    }
}

pub async fn events_summary(db: &LocalDatabase, year: i32) -> Result<YearSummary, AppError> {
    let events = db.events().list_year(year).await?;
    Ok(YearSummary {
        year,
        total_events: events.len(),
        total_fund_spent: events.iter().map(|e| e.fund_spent).sum(),
        monthly: monthly_activity(events.iter()),
    })
}

fn monthly_activity<'a>(events: impl Iterator<Item = &'a Event>) -> Vec<MonthlyActivity> {
    let mut months: BTreeMap<String, (usize, f64)> = BTreeMap::new();
    for event in events {
        let entry = months.entry(event.date.format("%Y-%m").to_string()).or_default();
        entry.0 += 1;
        entry.1 += event.fund_spent;
    }

    months
        .into_iter()
        .map(|(month, (events, fund_spent))| MonthlyActivity { month, events, fund_spent })
        .collect()
}
