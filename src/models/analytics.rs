use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsOverview {
    pub total_students: usize,
    pub total_events: usize,
    pub total_fund_spent: f64,
    pub total_winners: usize,
    pub upcoming_events: usize,
    pub events_by_status: BTreeMap<String, usize>,
    pub students_by_batch: BTreeMap<String, usize>,
    /// Ascending by `YYYY-MM`
    pub monthly: Vec<MonthlyActivity>,
    pub top_participants: Vec<TopParticipant>,
    pub generated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyActivity {
    pub month: String,
    pub events: usize,
    pub fund_spent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopParticipant {
    pub student_id: String,
    pub name: String,
    pub roll_number: String,
    pub participations: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct YearSummary {
    pub year: i32,
    pub total_events: usize,
    pub total_fund_spent: f64,
    pub monthly: Vec<MonthlyActivity>,
}
