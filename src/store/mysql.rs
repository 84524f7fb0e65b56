//! MySQL-backed session store.
//!
//! Open-session uniqueness rides on the `uq_open_session` unique index:
//! `open_marker` is 1 while a session is open and NULL once closed, and
//! MySQL unique indexes skip NULLs, so any number of closed sessions per
//! employee and day may coexist while a second open one is impossible. A
//! racing duplicate insert surfaces as SQLSTATE 23000 and is mapped to
//! [`StoreError::UniqueViolation`].

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::MySqlPool;

use crate::model::session::{ClockSession, SessionStatus};
use crate::store::{SessionFilter, SessionStore, StoreError};

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS attendance_sessions (
    seq BIGINT UNSIGNED NOT NULL AUTO_INCREMENT,
    id CHAR(36) NOT NULL,
    employee_name VARCHAR(120) NOT NULL,
    department VARCHAR(64) NOT NULL,
    clock_in DATETIME NOT NULL,
    clock_out DATETIME NULL,
    total_hours DOUBLE NULL,
    status VARCHAR(16) NOT NULL,
    work_date DATE NOT NULL,
    open_marker TINYINT NULL,
    PRIMARY KEY (seq),
    UNIQUE KEY uq_session_id (id),
    UNIQUE KEY uq_open_session (employee_name, work_date, open_marker),
    KEY idx_work_date (work_date)
)
"#;

const SELECT_COLUMNS: &str =
    "id, employee_name, department, clock_in, clock_out, total_hours, status, work_date";

/// Raw row; department and status are decoded strings until parsed.
#[derive(sqlx::FromRow)]
struct SessionRow {
    id: String,
    employee_name: String,
    department: String,
    clock_in: NaiveDateTime,
    clock_out: Option<NaiveDateTime>,
    total_hours: Option<f64>,
    status: String,
    work_date: NaiveDate,
}

impl TryFrom<SessionRow> for ClockSession {
    type Error = StoreError;

    fn try_from(row: SessionRow) -> Result<Self, Self::Error> {
        let department = row.department.parse().map_err(|_| StoreError::Corrupt {
            id: row.id.clone(),
            reason: format!("unknown department {:?}", row.department),
        })?;
        let status = row.status.parse().map_err(|_| StoreError::Corrupt {
            id: row.id.clone(),
            reason: format!("unknown status {:?}", row.status),
        })?;
        Ok(ClockSession {
            id: row.id,
            employee_name: row.employee_name,
            department,
            clock_in: row.clock_in,
            clock_out: row.clock_out,
            total_hours: row.total_hours,
            status,
            work_date: row.work_date,
        })
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some("23000"),
        _ => false,
    }
}

pub struct MySqlSessionStore {
    pool: MySqlPool,
}

impl MySqlSessionStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Creates the sessions table and its indexes if missing. Called once at
    /// startup, before the server accepts requests.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for MySqlSessionStore {
    async fn insert(&self, session: ClockSession) -> Result<ClockSession, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO attendance_sessions
            (id, employee_name, department, clock_in, clock_out, total_hours, status, work_date, open_marker)
            VALUES (?, ?, ?, ?, NULL, NULL, ?, ?, 1)
            "#,
        )
        .bind(&session.id)
        .bind(&session.employee_name)
        .bind(session.department.to_string())
        .bind(session.clock_in)
        .bind(session.status.to_string())
        .bind(session.work_date)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(session),
            Err(e) if is_unique_violation(&e) => Err(StoreError::UniqueViolation {
                employee_name: session.employee_name,
                work_date: session.work_date,
            }),
            Err(e) => {
                tracing::error!(error = %e, id = %session.id, "session insert failed");
                Err(e.into())
            }
        }
    }

    async fn get(&self, id: &str) -> Result<Option<ClockSession>, StoreError> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM attendance_sessions WHERE id = ?");
        let row = sqlx::query_as::<_, SessionRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(ClockSession::try_from).transpose()
    }

    async fn close(
        &self,
        id: &str,
        clock_out: NaiveDateTime,
        total_hours: f64,
    ) -> Result<Option<ClockSession>, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE attendance_sessions
            SET clock_out = ?, total_hours = ?, status = ?, open_marker = NULL
            WHERE id = ? AND clock_out IS NULL
            "#,
        )
        .bind(clock_out)
        .bind(total_hours)
        .bind(SessionStatus::Completed.to_string())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(id).await
    }

    async fn find_open(
        &self,
        employee_name: &str,
        work_date: NaiveDate,
    ) -> Result<Option<ClockSession>, StoreError> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM attendance_sessions \
             WHERE employee_name = ? AND work_date = ? AND open_marker = 1"
        );
        let row = sqlx::query_as::<_, SessionRow>(&sql)
            .bind(employee_name)
            .bind(work_date)
            .fetch_optional(&self.pool)
            .await?;
        row.map(ClockSession::try_from).transpose()
    }

    async fn query(&self, filter: &SessionFilter) -> Result<Vec<ClockSession>, StoreError> {
        let mut conditions: Vec<&str> = Vec::new();
        if filter.employee_name.is_some() {
            conditions.push("LOWER(employee_name) LIKE ?");
        }
        if filter.department.is_some() {
            conditions.push("department = ?");
        }
        if filter.date.is_some() {
            conditions.push("work_date = ?");
        }
        if filter.min_hours.is_some() {
            conditions.push("total_hours IS NOT NULL AND total_hours >= ?");
        }

        let mut sql = format!("SELECT {SELECT_COLUMNS} FROM attendance_sessions");
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(" ORDER BY clock_in DESC, seq DESC");

        let mut query = sqlx::query_as::<_, SessionRow>(&sql);
        if let Some(term) = &filter.employee_name {
            query = query.bind(format!("%{}%", term.to_lowercase()));
        }
        if let Some(dept) = filter.department {
            query = query.bind(dept.to_string());
        }
        if let Some(date) = filter.date {
            query = query.bind(date);
        }
        if let Some(min) = filter.min_hours {
            query = query.bind(min);
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.into_iter().map(ClockSession::try_from).collect()
    }

    async fn by_date(&self, work_date: NaiveDate) -> Result<Vec<ClockSession>, StoreError> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM attendance_sessions WHERE work_date = ? ORDER BY seq"
        );
        let rows = sqlx::query_as::<_, SessionRow>(&sql)
            .bind(work_date)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(ClockSession::try_from).collect()
    }
}
