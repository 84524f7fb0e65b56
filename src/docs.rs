use crate::api::attendance::{ClockInRequest, ClockOutRequest};
use crate::api::reports::SessionListResponse;
use crate::engine::{DashboardStats, EmployeeStatus};
use crate::model::department::Department;
use crate::model::session::{ClockSession, SessionStatus};
use utoipa::Modify;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance Service API",
        version = "1.0.0",
        description = r#"
## Employee Attendance Service

Tracks employee work-time sessions: clock in, clock out, and review.

### Key Features
- **Clock-in / Clock-out**
  - One open session per employee per day; arrivals after 09:15 are marked late
- **Status**
  - Whether an employee is currently clocked in
- **Reports**
  - Filterable session listing and daily dashboard statistics (admin-gated)

### Security
Report endpoints expect the shared admin token in the `x-admin-token` header.

### Response Format
- JSON-based RESTful responses
"#,
    ),
    paths(
        crate::api::attendance::clock_in,
        crate::api::attendance::clock_out,
        crate::api::attendance::get_status,

        crate::api::reports::list_sessions,
        crate::api::reports::get_statistics
    ),
    components(
        schemas(
            ClockInRequest,
            ClockOutRequest,
            ClockSession,
            SessionStatus,
            Department,
            EmployeeStatus,
            DashboardStats,
            SessionListResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Attendance", description = "Clock-in / clock-out APIs"),
        (name = "Reports", description = "Administrative reporting APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "admin_token",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("x-admin-token"))),
        );
    }
}
