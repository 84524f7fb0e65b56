//! Attendance engine: the only component that decides session transitions.
//!
//! Every operation is a short read-then-write against the injected
//! [`SessionStore`]. Duplicate clock-ins are caught twice: a friendly
//! pre-check here, and atomically at the store boundary for requests racing
//! past the pre-check.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::model::department::Department;
use crate::model::session::{ClockSession, SessionStatus};
use crate::store::{SessionFilter, SessionStore, StoreError};

#[derive(Debug, Error)]
pub enum AttendanceError {
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("an open session already exists for this employee today (record {existing_id})")]
    DuplicateSession { existing_id: String },
    #[error("attendance record {0} not found")]
    NotFound(String),
    #[error("attendance record {0} is already clocked out")]
    AlreadyClosed(String),
    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),
}

/// Answer to "is this employee clocked in right now?".
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EmployeeStatus {
    pub is_active: bool,
    pub session: Option<ClockSession>,
}

/// Aggregates over today's sessions only.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DashboardStats {
    /// Distinct employees seen today, not all-time.
    pub total_employees: usize,
    /// Open on-time sessions; open late sessions are counted separately.
    pub currently_active: usize,
    /// Late arrivals today, whether or not they have clocked out since.
    pub late_today: usize,
    /// Mean of recorded hours today, one decimal; 0 when nothing is closed yet.
    pub avg_hours_today: f64,
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

pub struct AttendanceEngine {
    store: Arc<dyn SessionStore>,
}

impl AttendanceEngine {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    pub async fn clock_in(
        &self,
        employee_name: &str,
        department: Department,
    ) -> Result<ClockSession, AttendanceError> {
        self.clock_in_at(employee_name, department, Local::now().naive_local())
            .await
    }

    pub async fn clock_out(&self, record_id: &str) -> Result<ClockSession, AttendanceError> {
        self.clock_out_at(record_id, Local::now().naive_local())
            .await
    }

    pub async fn status(&self, employee_name: &str) -> Result<EmployeeStatus, AttendanceError> {
        self.status_on(employee_name, Local::now().date_naive())
            .await
    }

    pub async fn list_sessions(
        &self,
        filter: SessionFilter,
    ) -> Result<Vec<ClockSession>, AttendanceError> {
        Ok(self.store.query(&filter.normalized()).await?)
    }

    pub async fn statistics(&self) -> Result<DashboardStats, AttendanceError> {
        self.statistics_for(Local::now().date_naive()).await
    }

    async fn clock_in_at(
        &self,
        employee_name: &str,
        department: Department,
        now: NaiveDateTime,
    ) -> Result<ClockSession, AttendanceError> {
        let name = employee_name.trim();
        if name.is_empty() {
            return Err(AttendanceError::Validation(
                "employee name must not be empty".into(),
            ));
        }

        let today = now.date();
        if let Some(existing) = self.store.find_open(name, today).await? {
            return Err(AttendanceError::DuplicateSession {
                existing_id: existing.id,
            });
        }

        let session = ClockSession::open(name, department, now);
        match self.store.insert(session).await {
            Ok(created) => Ok(created),
            Err(e @ StoreError::UniqueViolation { .. }) => {
                // A concurrent clock-in won between our pre-check and the
                // write; report the surviving session instead.
                tracing::warn!(employee_name = %name, "clock-in lost a duplicate race");
                match self.store.find_open(name, today).await? {
                    Some(existing) => Err(AttendanceError::DuplicateSession {
                        existing_id: existing.id,
                    }),
                    None => Err(e.into()),
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn clock_out_at(
        &self,
        record_id: &str,
        now: NaiveDateTime,
    ) -> Result<ClockSession, AttendanceError> {
        let id = record_id.trim();
        if id.is_empty() {
            return Err(AttendanceError::Validation(
                "record id must not be empty".into(),
            ));
        }

        let session = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| AttendanceError::NotFound(id.to_string()))?;
        if session.clock_out.is_some() {
            return Err(AttendanceError::AlreadyClosed(id.to_string()));
        }
        if now <= session.clock_in {
            return Err(AttendanceError::Validation(
                "clock-out time must be after clock-in time".into(),
            ));
        }

        let worked = now - session.clock_in;
        let total_hours = round2(worked.num_seconds() as f64 / 3600.0);

        match self.store.close(id, now, total_hours).await? {
            Some(updated) => Ok(updated),
            // The open row vanished under us: either someone closed it
            // concurrently or it never existed.
            None => match self.store.get(id).await? {
                Some(_) => Err(AttendanceError::AlreadyClosed(id.to_string())),
                None => Err(AttendanceError::NotFound(id.to_string())),
            },
        }
    }

    async fn status_on(
        &self,
        employee_name: &str,
        date: NaiveDate,
    ) -> Result<EmployeeStatus, AttendanceError> {
        let session = self.store.find_open(employee_name.trim(), date).await?;
        Ok(EmployeeStatus {
            is_active: session.is_some(),
            session,
        })
    }

    async fn statistics_for(&self, date: NaiveDate) -> Result<DashboardStats, AttendanceError> {
        let sessions = self.store.by_date(date).await?;

        let mut names: HashSet<String> = HashSet::new();
        let mut currently_active = 0;
        let mut late_today = 0;
        let mut recorded_hours: Vec<f64> = Vec::new();

        for session in &sessions {
            names.insert(session.employee_name.to_lowercase());
            if session.status == SessionStatus::Active {
                currently_active += 1;
            }
            if session.was_late() {
                late_today += 1;
            }
            if let Some(hours) = session.total_hours {
                recorded_hours.push(hours);
            }
        }

        let avg_hours_today = if recorded_hours.is_empty() {
            0.0
        } else {
            round1(recorded_hours.iter().sum::<f64>() / recorded_hours.len() as f64)
        };

        Ok(DashboardStats {
            total_employees: names.len(),
            currently_active,
            late_today,
            avg_hours_today,
        })
    }
}
