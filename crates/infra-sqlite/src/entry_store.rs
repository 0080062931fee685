// SQLite EntryStore Implementation

use async_trait::async_trait;
use dispatchq_core::domain::{EntryStatus, QueueEntry};
use dispatchq_core::error::{EngineError, Result};
use dispatchq_core::port::EntryStore;
use sqlx::SqlitePool;

// Helper to convert sqlx::Error to EngineError with structured information
fn map_sqlx_error(err: sqlx::Error) -> EngineError {
    match &err {
        sqlx::Error::Database(db_err) => {
            if let Some(code) = db_err.code() {
                let code_str = code.as_ref();

                // SQLite error codes: https://www.sqlite.org/rescode.html
                match code_str {
                    "2067" | "1555" => EngineError::StoreUnavailable(format!(
                        "Unique constraint violation: {} ({})",
                        db_err.message(),
                        code_str
                    )),
                    "5" => EngineError::StoreUnavailable(format!(
                        "Database locked (SQLITE_BUSY): {}",
                        db_err.message()
                    )),
                    "13" => EngineError::StoreUnavailable(format!(
                        "Database full: {}",
                        db_err.message()
                    )),
                    _ => EngineError::StoreUnavailable(format!(
                        "Database error [{}]: {}",
                        code_str,
                        db_err.message()
                    )),
                }
            } else {
                EngineError::StoreUnavailable(format!("Database error: {}", db_err.message()))
            }
        }
        sqlx::Error::RowNotFound => EngineError::StoreUnavailable("Row not found".to_string()),
        sqlx::Error::ColumnNotFound(col) => {
            EngineError::StoreUnavailable(format!("Column not found: {}", col))
        }
        other => EngineError::StoreUnavailable(other.to_string()),
    }
}

pub struct SqliteEntryStore {
    pool: SqlitePool,
}

impl SqliteEntryStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntryStore for SqliteEntryStore {
    async fn create_if_absent(&self, entry: &QueueEntry) -> Result<bool> {
        // Single atomic upsert: the DO UPDATE fires only over a Departed
        // row, so a live entry is never overwritten and the caller can
        // tell who won from rows_affected.
        let result = sqlx::query(
            r#"
            INSERT INTO entries (
                location_id, entry_id, registrant, secondary_tag, status, created_at
            ) VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT (location_id, entry_id) DO UPDATE SET
                registrant = excluded.registrant,
                secondary_tag = excluded.secondary_tag,
                status = excluded.status,
                created_at = excluded.created_at
            WHERE entries.status = 'DEPARTED'
            "#,
        )
        .bind(&entry.location_id)
        .bind(&entry.entry_id)
        .bind(&entry.registrant)
        .bind(&entry.secondary_tag)
        .bind(entry.status.to_string())
        .bind(entry.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_if_status(
        &self,
        location_id: &str,
        entry_id: &str,
        expected: EntryStatus,
        new: EntryStatus,
    ) -> Result<bool> {
        // Compare-and-set on status; rows_affected reports whether the
        // precondition still held.
        let result = sqlx::query(
            r#"
            UPDATE entries
            SET status = ?
            WHERE location_id = ? AND entry_id = ? AND status = ?
            "#,
        )
        .bind(new.to_string())
        .bind(location_id)
        .bind(entry_id)
        .bind(expected.to_string())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn read_all(&self, location_id: &str) -> Result<Vec<QueueEntry>> {
        let rows: Vec<EntryRow> = sqlx::query_as(
            r#"
            SELECT location_id, entry_id, registrant, secondary_tag, status, created_at
            FROM entries
            WHERE location_id = ?
            ORDER BY created_at ASC, entry_id ASC
            "#,
        )
        .bind(location_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(|row| row.into_entry()).collect()
    }
}

/// SQLite row representation
#[derive(Debug, sqlx::FromRow)]
struct EntryRow {
    location_id: String,
    entry_id: String,
    registrant: String,
    secondary_tag: Option<String>,
    status: String,
    created_at: i64,
}

impl EntryRow {
    fn into_entry(self) -> Result<QueueEntry> {
        let status = EntryStatus::parse(&self.status)?;
        Ok(QueueEntry {
            location_id: self.location_id,
            entry_id: self.entry_id,
            registrant: self.registrant,
            status,
            created_at: self.created_at,
            secondary_tag: self.secondary_tag,
        })
    }
}
