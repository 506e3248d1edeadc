use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};

/// Event record, stored as `events/<yyyy>/<mm>/<id>.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organizer: Option<String>,
    #[serde(default)]
    pub fund_spent: f64,
    #[serde(default)]
    pub winners: Vec<Winner>,
    #[serde(default)]
    pub attachments: Vec<String>,
    #[serde(default)]
    pub status: EventStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Winner {
    /// Not checked against stored students
    pub student_id: String,
    pub student_name: String,
    pub position: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prize: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    #[default]
    Upcoming,
    Ongoing,
    Completed,
    Cancelled,
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EventStatus::Upcoming => "upcoming",
            EventStatus::Ongoing => "ongoing",
            EventStatus::Completed => "completed",
            EventStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for EventStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "upcoming" => Ok(EventStatus::Upcoming),
            "ongoing" => Ok(EventStatus::Ongoing),
            "completed" => Ok(EventStatus::Completed),
            "cancelled" | "canceled" => Ok(EventStatus::Cancelled),
            other => Err(format!("unknown event status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub title: String,
    pub description: Option<String>,
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    pub location: String,
    pub organizer: Option<String>,
    #[serde(default)]
    pub fund_spent: f64,
    #[serde(default)]
    pub winners: Vec<Winner>,
    #[serde(default)]
    pub attachments: Vec<String>,
    pub status: Option<EventStatus>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = Option<String>, format = Date)]
    pub date: Option<NaiveDate>,
    pub location: Option<String>,
    pub organizer: Option<String>,
    pub fund_spent: Option<f64>,
    pub winners: Option<Vec<Winner>>,
    pub attachments: Option<Vec<String>>,
    pub status: Option<EventStatus>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EventQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub status: Option<String>,
    pub search: Option<String>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventListResponse {
    pub success: bool,
    pub events: Vec<Event>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_text() {
        for status in [
            EventStatus::Upcoming,
            EventStatus::Ongoing,
            EventStatus::Completed,
            EventStatus::Cancelled,
        ] {
            assert_eq!(status.to_string().parse::<EventStatus>(), Ok(status));
        }
        assert_eq!("Canceled".parse::<EventStatus>(), Ok(EventStatus::Cancelled));
        assert!("postponed".parse::<EventStatus>().is_err());
    }

    #[test]
    fn reads_camel_case_documents_with_defaults() {
        let raw = r#"{
            "id": "e1",
            "title": "Tech Fest",
            "date": "2024-03-15",
            "location": "Main Auditorium",
            "createdAt": 1,
            "updatedAt": 1
        }"#;
        let event: Event = serde_json::from_str(raw).unwrap();
        assert_eq!(event.status, EventStatus::Upcoming);
        assert_eq!(event.fund_spent, 0.0);
        assert!(event.winners.is_empty());
        assert_eq!(event.date, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
    }
}
