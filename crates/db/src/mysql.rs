//! MySQL adapter for the `records` table.

use std::error::Error;

use async_trait::async_trait;
use roster_core::types::DbId;
use sqlx::mysql::MySqlDatabaseError;

use crate::models::record::{Record, RecordFields};
use crate::schema::{LIVENESS_QUERY, MYSQL_INIT};
use crate::store::{PoolStatus, RecordStore, StoreResult};
use crate::DbPool;

/// MySQL server error number for a duplicate entry on a unique key.
pub const ER_DUP_ENTRY: u16 = 1062;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, email, role, created_at";

/// [`RecordStore`] backed by a bounded `sqlx` MySQL pool.
///
/// Every call checks a connection out of the pool for the duration of one
/// statement and returns it when the statement completes.
#[derive(Clone)]
pub struct MySqlRecordStore {
    pool: DbPool,
}

impl MySqlRecordStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for MySqlRecordStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query(LIVENESS_QUERY).execute(&self.pool).await?;
        Ok(())
    }

    async fn ensure_schema(&self) -> StoreResult<()> {
        sqlx::raw_sql(MYSQL_INIT).execute(&self.pool).await?;
        Ok(())
    }

    async fn list(&self) -> StoreResult<Vec<Record>> {
        let query = format!("SELECT {COLUMNS} FROM records ORDER BY id DESC");
        let rows = sqlx::query_as::<_, Record>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn insert(&self, fields: &RecordFields) -> StoreResult<DbId> {
        let result = sqlx::query("INSERT INTO records (name, email, role) VALUES (?, ?, ?)")
            .bind(&fields.name)
            .bind(&fields.email)
            .bind(&fields.role)
            .execute(&self.pool)
            .await?;
        Ok(DbId::try_from(result.last_insert_id())?)
    }

    async fn update(&self, id: DbId, fields: &RecordFields) -> StoreResult<u64> {
        let result =
            sqlx::query("UPDATE records SET name = ?, email = ?, role = ? WHERE id = ?")
                .bind(&fields.name)
                .bind(&fields.email)
                .bind(&fields.role)
                .bind(id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected())
    }

    async fn delete(&self, id: DbId) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM records WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    fn is_duplicate_key_violation(&self, err: &(dyn Error + Send + Sync + 'static)) -> bool {
        match err.downcast_ref::<sqlx::Error>() {
            Some(sqlx::Error::Database(db_err)) => db_err
                .try_downcast_ref::<MySqlDatabaseError>()
                .is_some_and(|e| e.number() == ER_DUP_ENTRY),
            _ => false,
        }
    }

    fn pool_status(&self) -> Option<PoolStatus> {
        Some(PoolStatus {
            size: self.pool.size(),
            idle: u32::try_from(self.pool.num_idle()).unwrap_or(u32::MAX),
            max: self.pool.options().get_max_connections(),
        })
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
