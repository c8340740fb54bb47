//! Postgres 历史补数任务存储实现

use crate::error::StorageError;
use crate::models::{SyncJobRecord, SyncJobStatus};
use crate::traits::SyncJobStore;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

pub struct PgSyncJobStore {
    pub pool: PgPool,
}

impl PgSyncJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = crate::connection::connect_pool(database_url).await?;
        Ok(Self { pool })
    }
}

fn job_from_row(row: &PgRow) -> Result<SyncJobRecord, StorageError> {
    let status: String = row.try_get("status")?;
    let status = SyncJobStatus::parse(&status)
        .ok_or_else(|| StorageError::new(format!("unknown job status: {status}")))?;
    let fetched: i64 = row.try_get("fetched")?;
    let inserted: i64 = row.try_get("inserted")?;
    Ok(SyncJobRecord {
        job_id: row.try_get("job_id")?,
        vehicle_id: row.try_get("vehicle_id")?,
        status,
        from_ms: row.try_get("from_ms")?,
        to_ms: row.try_get("to_ms")?,
        fetched: fetched.max(0) as u64,
        inserted: inserted.max(0) as u64,
        error: row.try_get("error")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait::async_trait]
impl SyncJobStore for PgSyncJobStore {
    async fn create_job(&self, record: SyncJobRecord) -> Result<SyncJobRecord, StorageError> {
        sqlx::query(
            "insert into sync_jobs (job_id, vehicle_id, status, range_from, range_to, fetched, inserted, \
             error, created_at, updated_at) \
             values ($1,$2,$3,to_timestamp($4 / 1000.0),to_timestamp($5 / 1000.0),$6,$7,$8,\
             to_timestamp($9 / 1000.0),to_timestamp($10 / 1000.0))",
        )
        .bind(&record.job_id)
        .bind(&record.vehicle_id)
        .bind(record.status.as_str())
        .bind(record.from_ms)
        .bind(record.to_ms)
        .bind(record.fetched as i64)
        .bind(record.inserted as i64)
        .bind(&record.error)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(record)
    }

    async fn find_job(&self, job_id: &str) -> Result<Option<SyncJobRecord>, StorageError> {
        let row = sqlx::query(
            "select job_id, vehicle_id, status, \
             (extract(epoch from range_from) * 1000)::bigint as from_ms, \
             (extract(epoch from range_to) * 1000)::bigint as to_ms, \
             fetched, inserted, error, \
             (extract(epoch from created_at) * 1000)::bigint as created_at, \
             (extract(epoch from updated_at) * 1000)::bigint as updated_at \
             from sync_jobs where job_id = $1",
        )
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(job_from_row).transpose()
    }

    async fn update_job(&self, record: &SyncJobRecord) -> Result<bool, StorageError> {
        let result = sqlx::query(
            "update sync_jobs set status = $2, fetched = $3, inserted = $4, error = $5, \
             updated_at = to_timestamp($6 / 1000.0) where job_id = $1",
        )
        .bind(&record.job_id)
        .bind(record.status.as_str())
        .bind(record.fetched as i64)
        .bind(record.inserted as i64)
        .bind(&record.error)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn fail_unfinished_jobs(&self, message: &str, now_ms: i64) -> Result<u64, StorageError> {
        let result = sqlx::query(
            "update sync_jobs set status = 'error', error = $1, updated_at = to_timestamp($2 / 1000.0) \
             where status in ('pending', 'running')",
        )
        .bind(message)
        .bind(now_ms)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
