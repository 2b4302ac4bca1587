//! Database Connection Pool and Postgres Record Store
//!
//! This module provides PostgreSQL connection pooling using deadpool-postgres
//! and `PgRecordStore`, the durable implementation of the record store
//! gateway. Records live in a single table named after the collection;
//! deletion only sets `deleted_at` and every read filters on it.

use std::collections::VecDeque;
use std::fmt::Display;
use std::time::Duration;

use async_trait::async_trait;
use deadpool_postgres::{
    Config, ManagerConfig, Pool, PoolConfig, RecyclingMethod, Runtime, Timeouts,
};
use futures_util::stream::{self, StreamExt};
use tessera_core::{
    new_record_id, Record, RecordFilter, StorageError, TesseraError, TesseraResult, Timestamp,
    RECORD_MODEL,
};
use tessera_storage::{RecordStore, RecordStream};
use tokio_postgres::types::ToSql;
use tokio_postgres::{error::SqlState, NoTls, Row};

use crate::error::{ApiError, ApiResult};

// ============================================================================
// CONNECTION POOL CONFIGURATION
// ============================================================================

/// Database connection pool configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// PostgreSQL host
    pub host: String,
    /// PostgreSQL port
    pub port: u16,
    /// Database name
    pub dbname: String,
    /// Database user
    pub user: String,
    /// Database password
    pub password: String,
    /// Maximum pool size
    pub max_size: usize,
    /// Connection timeout
    pub timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            dbname: "tessera".to_string(),
            user: "postgres".to_string(),
            password: "".to_string(),
            max_size: 16,
            timeout: Duration::from_secs(30),
        }
    }
}

impl DbConfig {
    /// Create a new database configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("TESSERA_DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("TESSERA_DB_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5432),
            dbname: std::env::var("TESSERA_DB_NAME").unwrap_or_else(|_| "tessera".to_string()),
            user: std::env::var("TESSERA_DB_USER").unwrap_or_else(|_| "postgres".to_string()),
            password: std::env::var("TESSERA_DB_PASSWORD").unwrap_or_default(),
            max_size: std::env::var("TESSERA_DB_POOL_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(16),
            timeout: Duration::from_secs(
                std::env::var("TESSERA_DB_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }

    /// Create a connection pool from this configuration.
    pub fn create_pool(&self) -> ApiResult<Pool> {
        let mut cfg = Config::new();
        cfg.host = Some(self.host.clone());
        cfg.port = Some(self.port);
        cfg.dbname = Some(self.dbname.clone());
        cfg.user = Some(self.user.clone());
        cfg.password = Some(self.password.clone());

        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        let mut pool_cfg = PoolConfig::new(self.max_size);
        pool_cfg.timeouts = Timeouts {
            wait: Some(self.timeout),
            create: Some(self.timeout),
            recycle: Some(self.timeout),
        };
        cfg.pool = Some(pool_cfg);

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| ApiError::database_error(format!("Failed to create pool: {}", e)))?;

        Ok(pool)
    }
}

// ============================================================================
// POSTGRES RECORD STORE
// ============================================================================

const COLUMNS: &str = "id, name, created_by, created_at, updated_by, updated_at, deleted_at";

/// Rows fetched per round trip by `scan_active`.
const SCAN_BATCH: i64 = 500;

fn backend(err: impl Display) -> TesseraError {
    StorageError::Backend {
        reason: err.to_string(),
    }
    .into()
}

fn row_to_record(row: &Row) -> TesseraResult<Record> {
    Ok(Record {
        id: row.try_get("id").map_err(backend)?,
        name: row.try_get("name").map_err(backend)?,
        created_by: row
            .try_get::<_, Option<String>>("created_by")
            .map_err(backend)?
            .unwrap_or_default(),
        created_at: row.try_get("created_at").map_err(backend)?,
        updated_by: row
            .try_get::<_, Option<String>>("updated_by")
            .map_err(backend)?
            .unwrap_or_default(),
        updated_at: row.try_get("updated_at").map_err(backend)?,
        deleted_at: row.try_get("deleted_at").map_err(backend)?,
    })
}

/// Escape LIKE metacharacters so the filter is a literal substring.
fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// WHERE clause for active records matching `filter`, and its parameters.
fn filter_clause(filter: &RecordFilter) -> (String, Vec<String>) {
    let mut clause = String::from("deleted_at IS NULL");
    let mut values = Vec::new();
    if let Some(name) = &filter.name {
        values.push(like_pattern(name));
        clause.push_str(&format!(" AND name ILIKE ${}", values.len()));
    }
    if let Some(created_by) = &filter.created_by {
        values.push(created_by.clone());
        clause.push_str(&format!(" AND created_by = ${}", values.len()));
    }
    (clause, values)
}

/// Record store backed by a Postgres table.
#[derive(Clone)]
pub struct PgRecordStore {
    pool: Pool,
    table: &'static str,
}

impl PgRecordStore {
    pub fn new(pool: Pool) -> Self {
        Self {
            pool,
            table: RECORD_MODEL,
        }
    }

    /// Create a store from configuration.
    pub fn from_config(config: &DbConfig) -> ApiResult<Self> {
        Ok(Self::new(config.create_pool()?))
    }

    async fn get_conn(&self) -> TesseraResult<deadpool_postgres::Object> {
        get_conn(&self.pool).await
    }

    /// Create the record table and its deletion index if absent.
    pub async fn migrate(&self) -> TesseraResult<()> {
        let conn = self.get_conn().await?;
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                created_by TEXT,
                created_at TIMESTAMPTZ NOT NULL,
                updated_by TEXT,
                updated_at TIMESTAMPTZ NOT NULL,
                deleted_at TIMESTAMPTZ
            );
            CREATE INDEX IF NOT EXISTS idx_{table}_deleted_at ON {table} (deleted_at);",
            table = self.table
        );
        conn.batch_execute(&sql).await.map_err(backend)?;
        tracing::info!(table = self.table, "record table migrated");
        Ok(())
    }
}

async fn get_conn(pool: &Pool) -> TesseraResult<deadpool_postgres::Object> {
    pool.get().await.map_err(backend)
}

async fn scan_batch(
    pool: &Pool,
    table: &str,
    after: Option<&(Timestamp, String)>,
) -> TesseraResult<Vec<Record>> {
    let conn = get_conn(pool).await?;
    let rows = match after {
        Some((created_at, id)) => {
            let sql = format!(
                "SELECT {COLUMNS} FROM {table} WHERE deleted_at IS NULL \
                 AND (created_at, id) > ($1::timestamptz, $2::text) ORDER BY created_at, id LIMIT $3"
            );
            conn.query(&sql, &[created_at, id, &SCAN_BATCH]).await
        }
        None => {
            let sql = format!(
                "SELECT {COLUMNS} FROM {table} WHERE deleted_at IS NULL \
                 ORDER BY created_at, id LIMIT $1"
            );
            conn.query(&sql, &[&SCAN_BATCH]).await
        }
    }
    .map_err(backend)?;
    rows.iter().map(row_to_record).collect()
}

struct ScanState {
    pool: Pool,
    table: &'static str,
    after: Option<(Timestamp, String)>,
    buffer: VecDeque<Record>,
    done: bool,
}

#[async_trait]
impl RecordStore for PgRecordStore {
    fn collection(&self) -> &str {
        self.table
    }

    async fn create(&self, record: &Record) -> TesseraResult<Record> {
        let conn = self.get_conn().await?;
        let sql = format!(
            "INSERT INTO {} ({COLUMNS}) VALUES ($1, $2, $3, now(), $4, now(), NULL) \
             RETURNING {COLUMNS}",
            self.table
        );
        let id = new_record_id();
        let row = conn
            .query_one(&sql, &[&id, &record.name, &record.created_by, &record.updated_by])
            .await
            .map_err(|e| {
                if e.code() == Some(&SqlState::UNIQUE_VIOLATION) {
                    TesseraError::from(StorageError::InsertFailed {
                        reason: format!("id {} already exists", id),
                    })
                } else {
                    backend(e)
                }
            })?;
        row_to_record(&row)
    }

    async fn fetch_by_id(&self, id: &str) -> TesseraResult<Record> {
        let conn = self.get_conn().await?;
        let sql = format!(
            "SELECT {COLUMNS} FROM {} WHERE id = $1 AND deleted_at IS NULL",
            self.table
        );
        let row = conn.query_opt(&sql, &[&id]).await.map_err(backend)?;
        match row {
            Some(row) => row_to_record(&row),
            None => Err(TesseraError::not_found(id)),
        }
    }

    async fn overwrite_by_id(&self, record: &Record, id: &str) -> TesseraResult<Record> {
        let conn = self.get_conn().await?;
        let sql = format!(
            "UPDATE {} SET name = $2, created_by = $3, created_at = $4, updated_by = $5, \
             updated_at = now() WHERE id = $1 AND deleted_at IS NULL RETURNING {COLUMNS}",
            self.table
        );
        let row = conn
            .query_opt(
                &sql,
                &[
                    &id,
                    &record.name,
                    &record.created_by,
                    &record.created_at,
                    &record.updated_by,
                ],
            )
            .await
            .map_err(|e| StorageError::UpdateFailed {
                id: id.to_string(),
                reason: e.to_string(),
            })?;
        match row {
            Some(row) => row_to_record(&row),
            None => Err(TesseraError::not_found(id)),
        }
    }

    async fn soft_delete_by_id(&self, id: &str) -> TesseraResult<()> {
        let conn = self.get_conn().await?;
        let sql = format!(
            "UPDATE {} SET deleted_at = now() WHERE id = $1 AND deleted_at IS NULL",
            self.table
        );
        let affected = conn.execute(&sql, &[&id]).await.map_err(backend)?;
        if affected == 0 {
            return Err(TesseraError::not_found(id));
        }
        Ok(())
    }

    async fn scan_active(&self) -> TesseraResult<RecordStream> {
        let state = ScanState {
            pool: self.pool.clone(),
            table: self.table,
            after: None,
            buffer: VecDeque::new(),
            done: false,
        };

        let stream = stream::unfold(state, |mut state| async move {
            loop {
                if let Some(record) = state.buffer.pop_front() {
                    return Some((Ok(record), state));
                }
                if state.done {
                    return None;
                }
                match scan_batch(&state.pool, state.table, state.after.as_ref()).await {
                    Ok(batch) => {
                        if (batch.len() as i64) < SCAN_BATCH {
                            state.done = true;
                        }
                        if let Some(last) = batch.last() {
                            state.after = Some((last.created_at, last.id.clone()));
                        }
                        state.buffer.extend(batch);
                    }
                    Err(e) => {
                        state.done = true;
                        return Some((Err(e), state));
                    }
                }
            }
        });
        Ok(stream.boxed())
    }

    async fn count(&self, filter: &RecordFilter) -> TesseraResult<i64> {
        let conn = self.get_conn().await?;
        let (clause, values) = filter_clause(filter);
        let sql = format!("SELECT COUNT(*) FROM {} WHERE {}", self.table, clause);
        let params: Vec<&(dyn ToSql + Sync)> =
            values.iter().map(|v| v as &(dyn ToSql + Sync)).collect();
        let row = conn.query_one(&sql, &params).await.map_err(backend)?;
        row.try_get(0).map_err(backend)
    }

    async fn fetch_page(
        &self,
        filter: &RecordFilter,
        offset: i64,
        limit: i64,
    ) -> TesseraResult<Vec<Record>> {
        let conn = self.get_conn().await?;
        let (clause, values) = filter_clause(filter);
        let sql = format!(
            "SELECT {COLUMNS} FROM {} WHERE {} ORDER BY created_at, id LIMIT ${} OFFSET ${}",
            self.table,
            clause,
            values.len() + 1,
            values.len() + 2
        );
        let offset = offset.max(0);
        let limit = limit.max(0);
        let mut params: Vec<&(dyn ToSql + Sync)> =
            values.iter().map(|v| v as &(dyn ToSql + Sync)).collect();
        params.push(&limit);
        params.push(&offset);
        let rows = conn.query(&sql, &params).await.map_err(backend)?;
        rows.iter().map(row_to_record).collect()
    }
}
