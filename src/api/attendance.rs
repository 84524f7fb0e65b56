use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::engine::{AttendanceEngine, EmployeeStatus};
use crate::model::department::Department;
use crate::model::session::ClockSession;
use crate::utils::stats_cache;

#[derive(Deserialize, ToSchema)]
pub struct ClockInRequest {
    #[schema(example = "Jane Doe")]
    pub employee_name: String,
    #[schema(example = "Sales Team")]
    pub department: Department,
}

#[derive(Deserialize, ToSchema)]
pub struct ClockOutRequest {
    #[schema(example = "0e3f9b9c-5a04-4ba0-9f63-2f4c1d7a8e11")]
    pub record_id: String,
}

/// Clock-in endpoint
#[utoipa::path(
    post,
    path = "/api/attendance",
    request_body = ClockInRequest,
    responses(
        (status = 201, description = "Session opened", body = ClockSession),
        (status = 400, description = "Empty name or unknown department"),
        (status = 409, description = "Employee already has an open session today", body = Object, example = json!({
            "message": "an open session already exists for this employee today (record 0e3f9b9c-5a04-4ba0-9f63-2f4c1d7a8e11)",
            "record_id": "0e3f9b9c-5a04-4ba0-9f63-2f4c1d7a8e11"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn clock_in(
    engine: web::Data<AttendanceEngine>,
    payload: web::Json<ClockInRequest>,
) -> actix_web::Result<impl Responder> {
    let body = payload.into_inner();
    let session = engine.clock_in(&body.employee_name, body.department).await?;
    stats_cache::invalidate();
    Ok(HttpResponse::Created().json(session))
}

/// Clock-out endpoint
#[utoipa::path(
    put,
    path = "/api/attendance",
    request_body = ClockOutRequest,
    responses(
        (status = 200, description = "Session closed", body = ClockSession),
        (status = 400, description = "Empty record id"),
        (status = 404, description = "Unknown record id"),
        (status = 409, description = "Record already clocked out"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn clock_out(
    engine: web::Data<AttendanceEngine>,
    payload: web::Json<ClockOutRequest>,
) -> actix_web::Result<impl Responder> {
    let session = engine.clock_out(&payload.record_id).await?;
    stats_cache::invalidate();
    Ok(HttpResponse::Ok().json(session))
}

/// Current-status endpoint
#[utoipa::path(
    get,
    path = "/api/attendance/status/{employee_name}",
    params(
        ("employee_name", Path, description = "Employee to look up")
    ),
    responses(
        (status = 200, description = "Whether the employee has an open session today", body = EmployeeStatus),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn get_status(
    engine: web::Data<AttendanceEngine>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let employee_name = path.into_inner();
    let status = engine.status(&employee_name).await?;
    Ok(HttpResponse::Ok().json(status))
}
