use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Student record, stored as `students/<batch>/<id>.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub roll_number: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    pub batch: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub participations: Vec<Participation>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// One event a student took part in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Participation {
    pub event_id: String,
    pub event_title: String,
    /// e.g. "Winner - position 1", "Participant"
    pub achievement: String,
    #[schema(value_type = String, format = Date)]
    pub date: chrono::NaiveDate,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateStudentRequest {
    pub name: String,
    pub roll_number: String,
    pub email: String,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub batch: String,
    pub section: Option<String>,
    pub photo_url: Option<String>,
}

/// Partial update; absent fields keep their stored value
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStudentRequest {
    pub name: Option<String>,
    pub roll_number: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub batch: Option<String>,
    pub section: Option<String>,
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StudentQuery {
    pub batch: Option<String>,
    pub section: Option<String>,
    pub department: Option<String>,
    pub search: Option<String>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

impl StudentQuery {
    /// Stable cache key for this query against the store at `scope`
    pub fn cache_key(&self, scope: &str) -> String {
        format!(
            "students:list:{}:batch={}:section={}:dept={}:search={}:page={}:limit={}",
            scope,
            self.batch.as_deref().unwrap_or(""),
            self.section.as_deref().unwrap_or(""),
            self.department.as_deref().unwrap_or(""),
            self.search.as_deref().unwrap_or("").to_lowercase(),
            self.page.unwrap_or(1),
            self.limit.unwrap_or(0),
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StudentListResponse {
    pub success: bool,
    pub students: Vec<Student>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
}
