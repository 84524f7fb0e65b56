//! Storage boundary for attendance sessions.
//!
//! The engine is the sole mutator of session state; implementations hold the
//! sessions but never decide transitions. Each implementation must enforce
//! the open-session uniqueness rule atomically: `insert` fails with
//! [`StoreError::UniqueViolation`] when the employee already has an open
//! session that day, and `close` only applies to a still-open session.

pub mod memory;
pub mod mysql;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use thiserror::Error;
use utoipa::{IntoParams, ToSchema};

use crate::model::department::Department;
use crate::model::session::ClockSession;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("open session already recorded for {employee_name} on {work_date}")]
    UniqueViolation {
        employee_name: String,
        work_date: NaiveDate,
    },
    #[error("corrupt session record {id}: {reason}")]
    Corrupt { id: String, reason: String },
}

/// Conjunctive report filter; every supplied field must match.
#[derive(Debug, Default, Clone, Deserialize, ToSchema, IntoParams)]
pub struct SessionFilter {
    /// Case-insensitive substring of the employee name.
    #[param(example = "jane")]
    pub employee_name: Option<String>,
    pub department: Option<Department>,
    /// Exact work date.
    #[param(value_type = Option<String>, example = "2026-08-06")]
    pub date: Option<NaiveDate>,
    /// Keeps only closed sessions with at least this many hours.
    #[param(example = 6.0)]
    pub min_hours: Option<f64>,
}

impl SessionFilter {
    /// Trims the name term and drops it entirely when blank, so a
    /// whitespace-only query parameter does not filter anything out.
    pub fn normalized(mut self) -> Self {
        self.employee_name = self
            .employee_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        self
    }

    pub fn matches(&self, session: &ClockSession) -> bool {
        if let Some(term) = &self.employee_name {
            if !session
                .employee_name
                .to_lowercase()
                .contains(&term.to_lowercase())
            {
                return false;
            }
        }
        if let Some(dept) = self.department {
            if session.department != dept {
                return false;
            }
        }
        if let Some(date) = self.date {
            if session.work_date != date {
                return false;
            }
        }
        if let Some(min) = self.min_hours {
            match session.total_hours {
                Some(hours) if hours >= min => {}
                _ => return false,
            }
        }
        true
    }
}

/// Repository contract the engine drives.
///
/// Lookup results are ordered descending by clock-in time, ties broken by
/// descending insertion order so equal timestamps still list
/// deterministically.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persists a freshly opened session. Fails with
    /// [`StoreError::UniqueViolation`] when an open session already exists
    /// for the same employee and day; the check and the write are atomic.
    async fn insert(&self, session: ClockSession) -> Result<ClockSession, StoreError>;

    async fn get(&self, id: &str) -> Result<Option<ClockSession>, StoreError>;

    /// Closes a still-open session: sets clock-out, total hours and the
    /// completed status in one conditional write. Returns `None` when no
    /// open session with this id exists (unknown id or already closed).
    async fn close(
        &self,
        id: &str,
        clock_out: NaiveDateTime,
        total_hours: f64,
    ) -> Result<Option<ClockSession>, StoreError>;

    /// The open session for `(employee_name, work_date)`, if any.
    /// Name comparison is case-insensitive.
    async fn find_open(
        &self,
        employee_name: &str,
        work_date: NaiveDate,
    ) -> Result<Option<ClockSession>, StoreError>;

    /// All sessions matching `filter`, ordered as documented on the trait.
    async fn query(&self, filter: &SessionFilter) -> Result<Vec<ClockSession>, StoreError>;

    /// All sessions for one work date, in insertion order.
    async fn by_date(&self, work_date: NaiveDate) -> Result<Vec<ClockSession>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_store_is_object_safe() {
        fn _accepts_dyn(_store: &dyn SessionStore) {}
    }

    #[test]
    fn normalized_drops_blank_name_term() {
        let f = SessionFilter {
            employee_name: Some("   ".into()),
            ..Default::default()
        }
        .normalized();
        assert!(f.employee_name.is_none());

        let f = SessionFilter {
            employee_name: Some("  Jane ".into()),
            ..Default::default()
        }
        .normalized();
        assert_eq!(f.employee_name.as_deref(), Some("Jane"));
    }
}
