use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::model::department::Department;

/// Clock-ins strictly after 09:15:00 are marked late.
const LATE_CUTOFF_HOUR: u32 = 9;
const LATE_CUTOFF_MINUTE: u32 = 15;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Late,
    Completed,
}

impl SessionStatus {
    /// Status at creation, decided from the clock-in time of day.
    /// 09:15:00 exactly is still on time; 09:15:01 is late.
    pub fn classify(clock_in: NaiveDateTime) -> Self {
        let t = clock_in.time();
        if (t.hour(), t.minute(), t.second()) > (LATE_CUTOFF_HOUR, LATE_CUTOFF_MINUTE, 0) {
            Self::Late
        } else {
            Self::Active
        }
    }
}

/// One employee's clock-in-to-clock-out interval for a given day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "id": "0e3f9b9c-5a04-4ba0-9f63-2f4c1d7a8e11",
        "employee_name": "Jane Doe",
        "department": "Sales Team",
        "clock_in": "2026-08-06T09:02:11",
        "clock_out": null,
        "total_hours": null,
        "status": "active",
        "work_date": "2026-08-06"
    })
)]
pub struct ClockSession {
    #[schema(example = "0e3f9b9c-5a04-4ba0-9f63-2f4c1d7a8e11")]
    pub id: String,

    #[schema(example = "Jane Doe")]
    pub employee_name: String,

    #[schema(example = "Sales Team")]
    pub department: Department,

    #[schema(value_type = String, format = "date-time")]
    pub clock_in: NaiveDateTime,

    #[schema(value_type = Option<String>, format = "date-time", nullable = true)]
    pub clock_out: Option<NaiveDateTime>,

    /// Worked hours, rounded to two decimals. Present iff `clock_out` is.
    #[schema(example = 8.25, nullable = true)]
    pub total_hours: Option<f64>,

    pub status: SessionStatus,

    /// Calendar day of the clock-in; scopes the one-open-session rule.
    #[schema(value_type = String, format = "date", example = "2026-08-06")]
    pub work_date: NaiveDate,
}

impl ClockSession {
    /// Builds a freshly opened session for the given clock-in instant.
    pub fn open(employee_name: impl Into<String>, department: Department, clock_in: NaiveDateTime) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            employee_name: employee_name.into(),
            department,
            clock_out: None,
            total_hours: None,
            status: SessionStatus::classify(clock_in),
            work_date: clock_in.date(),
            clock_in,
        }
    }

    /// Open means not yet clocked out (`active` or `late`).
    pub fn is_open(&self) -> bool {
        self.clock_out.is_none()
    }

    /// Whether the clock-in happened after the lateness cutoff. Unlike
    /// `status`, this does not change when the session completes, so a late
    /// arrival stays late in the daily statistics after clocking out.
    pub fn was_late(&self) -> bool {
        SessionStatus::classify(self.clock_in) == SessionStatus::Late
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn classify_cutoff_boundaries() {
        assert_eq!(SessionStatus::classify(dt("2026-03-02 09:00:00")), SessionStatus::Active);
        assert_eq!(SessionStatus::classify(dt("2026-03-02 09:15:00")), SessionStatus::Active);
        assert_eq!(SessionStatus::classify(dt("2026-03-02 09:15:01")), SessionStatus::Late);
        assert_eq!(SessionStatus::classify(dt("2026-03-02 09:16:00")), SessionStatus::Late);
        assert_eq!(SessionStatus::classify(dt("2026-03-02 10:00:00")), SessionStatus::Late);
        assert_eq!(SessionStatus::classify(dt("2026-03-02 00:05:00")), SessionStatus::Active);
    }

    #[test]
    fn open_session_derives_date_and_status() {
        let s = ClockSession::open("Jane Doe", Department::Sales, dt("2026-03-02 09:40:00"));
        assert_eq!(s.status, SessionStatus::Late);
        assert_eq!(s.work_date.to_string(), "2026-03-02");
        assert!(s.is_open());
        assert!(s.clock_out.is_none());
        assert!(s.total_hours.is_none());
        assert!(!s.id.is_empty());
    }

    #[test]
    fn was_late_is_independent_of_status() {
        let mut s = ClockSession::open("Jane Doe", Department::Other, dt("2026-03-02 09:30:00"));
        assert!(s.was_late());
        s.clock_out = Some(dt("2026-03-02 17:30:00"));
        s.total_hours = Some(8.0);
        s.status = SessionStatus::Completed;
        assert!(s.was_late());
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(serde_json::to_value(SessionStatus::Active).unwrap(), "active");
        assert_eq!(serde_json::to_value(SessionStatus::Late).unwrap(), "late");
        assert_eq!(serde_json::to_value(SessionStatus::Completed).unwrap(), "completed");
        assert_eq!(SessionStatus::Late.to_string(), "late");
        assert_eq!("completed".parse::<SessionStatus>().unwrap(), SessionStatus::Completed);
    }

    #[test]
    fn session_json_shape() {
        let s = ClockSession::open("Omar", Department::CustomerSupport, dt("2026-03-02 08:55:30"));
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(v["employee_name"], "Omar");
        assert_eq!(v["department"], "Customer Support");
        assert_eq!(v["status"], "active");
        assert_eq!(v["work_date"], "2026-03-02");
        assert!(v["clock_out"].is_null());
        assert!(v["total_hours"].is_null());
    }
}
