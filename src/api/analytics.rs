use actix_web::{web, HttpResponse};
use chrono::Datelike;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    database::LocalDatabase,
    middleware::{Permission, Role},
    models::{AnalyticsOverview, YearSummary},
    services::analytics_service,
    utils::AppError,
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct YearQuery {
    /// Defaults to the current year
    pub year: Option<i32>,
}

/// GET /api/v1/analytics/overview - Dashboard totals
#[utoipa::path(
    get,
    path = "/api/v1/analytics/overview",
    tag = "Analytics",
    responses(
        (status = 200, description = "Aggregated dashboard figures", body = AnalyticsOverview)
    )
)]
pub async fn get_overview(
    role: web::ReqData<Role>,
    db: web::Data<LocalDatabase>,
) -> Result<HttpResponse, AppError> {
    role.require(Permission::Read)?;
    log::info!("📊 GET /analytics/overview");

    let overview = analytics_service::overview(&db).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "overview": overview
    })))
}

/// GET /api/v1/analytics/events?year=YYYY - Month by month activity
#[utoipa::path(
    get,
    path = "/api/v1/analytics/events",
    tag = "Analytics",
    params(YearQuery),
    responses(
        (status = 200, description = "Events and spend per month", body = YearSummary)
    )
)]
pub async fn get_events_summary(
    role: web::ReqData<Role>,
    db: web::Data<LocalDatabase>,
    query: web::Query<YearQuery>,
) -> Result<HttpResponse, AppError> {
    role.require(Permission::Read)?;

    let year = query.year.unwrap_or_else(|| chrono::Utc::now().year());
    log::info!("📊 GET /analytics/events - {}", year);

    let summary = analytics_service::events_summary(&db, year).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "summary": summary
    })))
}

#[cfg(test)]
mod tests {
    use crate::database::tests::temp_db;
    use actix_web::{http::StatusCode, test};
    use serde_json::{json, Value};

    #[actix_web::test]
    async fn overview_reflects_writes() {
        let (_dir, db) = temp_db().await;
        let app = crate::test_app!(db);

        let overview = || {
            test::TestRequest::get()
                .uri("/api/v1/analytics/overview")
                .insert_header(("x-user-role", "student"))
                .to_request()
        };

        let body: Value = test::call_and_read_body_json(&app, overview()).await;
        assert_eq!(body["overview"]["totalEvents"], 0);

        let req = test::TestRequest::post()
            .uri("/api/v1/events")
            .insert_header(("x-user-role", "admin"))
            .set_json(json!({
                "title": "Tech Fest",
                "date": "2024-03-15",
                "location": "Main Auditorium",
                "fundSpent": 1200.5
            }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

        // cached overview must have been invalidated by the write
        let body: Value = test::call_and_read_body_json(&app, overview()).await;
        assert_eq!(body["overview"]["totalEvents"], 1);
        assert_eq!(body["overview"]["totalFundSpent"], 1200.5);

        let req = test::TestRequest::get()
            .uri("/api/v1/analytics/events?year=2024")
            .insert_header(("x-user-role", "faculty"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["summary"]["totalEvents"], 1);
        assert_eq!(body["summary"]["monthly"][0]["month"], "2024-03");
    }
}
