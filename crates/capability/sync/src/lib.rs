//! 上游同步：周期性全量同步与单车历史补数任务。
//!
//! - [`SyncEngine`]：固定周期、不重叠的同步循环，每周期产出 [`CycleReport`]
//! - [`HistorySyncService`]：补数任务，状态持久化在 `SyncJobStore`
//! - [`recover_interrupted_jobs`]：启动时把未完成任务标记为失败

mod engine;
mod jobs;

use fleet_storage::StorageError;
use fleet_upstream::{TorCredentials, UpstreamError};
use std::time::Duration;

pub use engine::{CycleReport, SyncEngine};
pub use jobs::{HistorySyncService, INTERRUPTED_MESSAGE, recover_interrupted_jobs};

/// 同步错误。
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("invalid range: {0}")]
    InvalidRange(String),
    #[error("vehicle not found: {0}")]
    VehicleNotFound(String),
    #[error("upstream: {0}")]
    Upstream(#[from] UpstreamError),
    #[error("storage: {0}")]
    Storage(#[from] StorageError),
}

/// 同步参数。
#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub credentials: TorCredentials,
    pub interval: Duration,
    pub page_size: u64,
    pub history_cap: usize,
    pub history_endpoint: String,
}

impl SyncSettings {
    pub fn new(credentials: TorCredentials) -> Self {
        Self {
            credentials,
            interval: Duration::from_secs(20),
            page_size: 1000,
            history_cap: domain::HISTORY_CAP,
            history_endpoint: "/MachineData/GetMachineDataHistory".to_string(),
        }
    }
}
