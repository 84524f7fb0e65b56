use actix_web::{HttpResponse, Responder, web};
use chrono::Local;
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::gate::AdminGate;
use crate::engine::{AttendanceEngine, DashboardStats};
use crate::model::session::ClockSession;
use crate::store::SessionFilter;
use crate::utils::stats_cache;

#[derive(Serialize, ToSchema)]
pub struct SessionListResponse {
    pub data: Vec<ClockSession>,
    #[schema(example = 12)]
    pub total: usize,
}

/// Filtered session report
#[utoipa::path(
    get,
    path = "/api/reports/sessions",
    params(SessionFilter),
    responses(
        (status = 200, description = "Sessions matching every supplied filter, most recent first", body = SessionListResponse),
        (status = 401, description = "Missing or wrong admin token"),
        (status = 500, description = "Internal server error")
    ),
    security(("admin_token" = [])),
    tag = "Reports"
)]
pub async fn list_sessions(
    _gate: AdminGate,
    engine: web::Data<AttendanceEngine>,
    query: web::Query<SessionFilter>,
) -> actix_web::Result<impl Responder> {
    let data = engine.list_sessions(query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(SessionListResponse {
        total: data.len(),
        data,
    }))
}

/// Daily dashboard statistics
#[utoipa::path(
    get,
    path = "/api/reports/statistics",
    responses(
        (status = 200, description = "Aggregates over today's sessions", body = DashboardStats),
        (status = 401, description = "Missing or wrong admin token"),
        (status = 500, description = "Internal server error")
    ),
    security(("admin_token" = [])),
    tag = "Reports"
)]
pub async fn get_statistics(
    _gate: AdminGate,
    engine: web::Data<AttendanceEngine>,
) -> actix_web::Result<impl Responder> {
    let today = Local::now().date_naive();
    if let Some(hit) = stats_cache::lookup(today).await {
        return Ok(HttpResponse::Ok().json(hit));
    }

    let stats = engine.statistics().await?;
    stats_cache::store(today, stats.clone()).await;
    Ok(HttpResponse::Ok().json(stats))
}
