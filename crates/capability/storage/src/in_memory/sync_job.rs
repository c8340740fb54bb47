//! 历史补数任务内存存储实现

use crate::error::StorageError;
use crate::models::{SyncJobRecord, SyncJobStatus};
use crate::traits::SyncJobStore;
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Default)]
pub struct InMemorySyncJobStore {
    jobs: RwLock<HashMap<String, SyncJobRecord>>,
}

impl InMemorySyncJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl SyncJobStore for InMemorySyncJobStore {
    async fn create_job(&self, record: SyncJobRecord) -> Result<SyncJobRecord, StorageError> {
        let mut map = self
            .jobs
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        if map.contains_key(&record.job_id) {
            return Err(StorageError::new("job exists"));
        }
        map.insert(record.job_id.clone(), record.clone());
        Ok(record)
    }

    async fn find_job(&self, job_id: &str) -> Result<Option<SyncJobRecord>, StorageError> {
        let map = self
            .jobs
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(map.get(job_id).cloned())
    }

    async fn update_job(&self, record: &SyncJobRecord) -> Result<bool, StorageError> {
        let mut map = self
            .jobs
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        match map.get_mut(&record.job_id) {
            Some(existing) => {
                *existing = record.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn fail_unfinished_jobs(&self, message: &str, now_ms: i64) -> Result<u64, StorageError> {
        let mut map = self
            .jobs
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let mut affected = 0;
        for job in map.values_mut().filter(|job| !job.status.is_finished()) {
            job.status = SyncJobStatus::Error;
            job.error = Some(message.to_string());
            job.updated_at = now_ms;
            affected += 1;
        }
        Ok(affected)
    }
}
