//! In-memory session store.
//!
//! One mutex guards the whole state, so the duplicate check and the insert
//! happen under a single lock acquisition: this is the single-writer
//! serialization point that keeps open-session uniqueness intact under
//! concurrent clock-ins. Suits tests and ephemeral deployments.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};

use crate::model::session::{ClockSession, SessionStatus};
use crate::store::{SessionFilter, SessionStore, StoreError};

#[derive(Default)]
struct Inner {
    /// Insertion order doubles as the ordering tie-breaker.
    sessions: Vec<ClockSession>,
    by_id: HashMap<String, usize>,
    /// `(lowercased employee name, work date)` -> session id, open sessions only.
    open_index: HashMap<(String, NaiveDate), String>,
}

#[derive(Default)]
pub struct MemorySessionStore {
    inner: Mutex<Inner>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn open_key(employee_name: &str, work_date: NaiveDate) -> (String, NaiveDate) {
    (employee_name.to_lowercase(), work_date)
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn insert(&self, session: ClockSession) -> Result<ClockSession, StoreError> {
        let mut inner = self.lock();
        let key = open_key(&session.employee_name, session.work_date);
        if inner.open_index.contains_key(&key) {
            return Err(StoreError::UniqueViolation {
                employee_name: session.employee_name.clone(),
                work_date: session.work_date,
            });
        }
        let idx = inner.sessions.len();
        inner.open_index.insert(key, session.id.clone());
        inner.by_id.insert(session.id.clone(), idx);
        inner.sessions.push(session.clone());
        Ok(session)
    }

    async fn get(&self, id: &str) -> Result<Option<ClockSession>, StoreError> {
        let inner = self.lock();
        Ok(inner.by_id.get(id).map(|&i| inner.sessions[i].clone()))
    }

    async fn close(
        &self,
        id: &str,
        clock_out: NaiveDateTime,
        total_hours: f64,
    ) -> Result<Option<ClockSession>, StoreError> {
        let mut inner = self.lock();
        let Some(&idx) = inner.by_id.get(id) else {
            return Ok(None);
        };
        if inner.sessions[idx].clock_out.is_some() {
            return Ok(None);
        }
        let key = open_key(
            &inner.sessions[idx].employee_name,
            inner.sessions[idx].work_date,
        );
        inner.open_index.remove(&key);
        let session = &mut inner.sessions[idx];
        session.clock_out = Some(clock_out);
        session.total_hours = Some(total_hours);
        session.status = SessionStatus::Completed;
        Ok(Some(session.clone()))
    }

    async fn find_open(
        &self,
        employee_name: &str,
        work_date: NaiveDate,
    ) -> Result<Option<ClockSession>, StoreError> {
        let inner = self.lock();
        let id = inner.open_index.get(&open_key(employee_name, work_date));
        Ok(id
            .and_then(|id| inner.by_id.get(id))
            .map(|&i| inner.sessions[i].clone()))
    }

    async fn query(&self, filter: &SessionFilter) -> Result<Vec<ClockSession>, StoreError> {
        let inner = self.lock();
        let mut rows: Vec<(usize, ClockSession)> = inner
            .sessions
            .iter()
            .enumerate()
            .filter(|(_, s)| filter.matches(s))
            .map(|(i, s)| (i, s.clone()))
            .collect();
        // Most recent clock-in first; later insertions win on equal timestamps.
        rows.sort_by(|a, b| b.1.clock_in.cmp(&a.1.clock_in).then(b.0.cmp(&a.0)));
        Ok(rows.into_iter().map(|(_, s)| s).collect())
    }

    async fn by_date(&self, work_date: NaiveDate) -> Result<Vec<ClockSession>, StoreError> {
        let inner = self.lock();
        Ok(inner
            .sessions
            .iter()
            .filter(|s| s.work_date == work_date)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::department::Department;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn open_session(name: &str, clock_in: &str) -> ClockSession {
        ClockSession::open(name, Department::TechTeamAlpha, dt(clock_in))
    }

    #[actix_web::test]
    async fn insert_then_get_returns_identical_session() {
        let store = MemorySessionStore::new();
        let created = store
            .insert(open_session("Jane Doe", "2026-03-02 09:00:00"))
            .await
            .unwrap();
        let fetched = store.get(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
    }

    #[actix_web::test]
    async fn second_open_insert_same_day_is_rejected() {
        let store = MemorySessionStore::new();
        store
            .insert(open_session("Jane Doe", "2026-03-02 09:00:00"))
            .await
            .unwrap();
        let err = store
            .insert(open_session("jane doe", "2026-03-02 10:00:00"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation { .. }));

        // A different day is a different scope.
        store
            .insert(open_session("Jane Doe", "2026-03-03 09:00:00"))
            .await
            .unwrap();
    }

    #[actix_web::test]
    async fn close_clears_open_slot_and_is_one_shot() {
        let store = MemorySessionStore::new();
        let s = store
            .insert(open_session("Jane Doe", "2026-03-02 09:00:00"))
            .await
            .unwrap();

        let closed = store
            .close(&s.id, dt("2026-03-02 17:00:00"), 8.0)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(closed.status, SessionStatus::Completed);
        assert_eq!(closed.total_hours, Some(8.0));

        // Slot is free again, second close finds nothing open.
        assert!(store
            .find_open("Jane Doe", dt("2026-03-02 09:00:00").date())
            .await
            .unwrap()
            .is_none());
        assert!(store
            .close(&s.id, dt("2026-03-02 18:00:00"), 9.0)
            .await
            .unwrap()
            .is_none());

        // And a new open session for the same day is allowed now.
        store
            .insert(open_session("Jane Doe", "2026-03-02 18:30:00"))
            .await
            .unwrap();
    }

    #[actix_web::test]
    async fn find_open_ignores_name_case() {
        let store = MemorySessionStore::new();
        let s = store
            .insert(open_session("Jane Doe", "2026-03-02 09:00:00"))
            .await
            .unwrap();
        let found = store
            .find_open("JANE DOE", s.work_date)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, s.id);
    }

    #[actix_web::test]
    async fn query_orders_by_clock_in_descending() {
        let store = MemorySessionStore::new();
        store
            .insert(open_session("A", "2026-03-02 09:00:00"))
            .await
            .unwrap();
        store
            .insert(open_session("B", "2026-03-02 10:00:00"))
            .await
            .unwrap();
        store
            .insert(open_session("C", "2026-03-02 08:00:00"))
            .await
            .unwrap();

        let rows = store.query(&SessionFilter::default()).await.unwrap();
        let names: Vec<_> = rows.iter().map(|s| s.employee_name.as_str()).collect();
        assert_eq!(names, ["B", "A", "C"]);
    }

    #[actix_web::test]
    async fn query_ties_break_by_insertion_order() {
        let store = MemorySessionStore::new();
        store
            .insert(open_session("First", "2026-03-02 09:00:00"))
            .await
            .unwrap();
        store
            .insert(open_session("Second", "2026-03-02 09:00:00"))
            .await
            .unwrap();

        let rows = store.query(&SessionFilter::default()).await.unwrap();
        let names: Vec<_> = rows.iter().map(|s| s.employee_name.as_str()).collect();
        assert_eq!(names, ["Second", "First"]);
    }
}
