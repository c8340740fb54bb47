use crate::{SyncError, SyncSettings};
use domain::now_epoch_ms;
use fleet_normalize::{format_iso_ms, parse_tor_timestamp, sample_from_row};
use fleet_storage::{SyncJobRecord, SyncJobStatus, SyncJobStore, VehicleStore};
use fleet_telemetry::{
    record_history_job_done, record_history_job_failed, record_history_job_started,
    record_pages_fetched, record_page_failure,
};
use fleet_upstream::{PageFilter, TelemetryApi, UpstreamError, UpstreamSession, fetch_all_pages};
use std::sync::Arc;
use tracing::{info, warn};

/// 重启时遗留任务的失败原因。
pub const INTERRUPTED_MESSAGE: &str = "interrupted by restart";

/// 单车历史补数任务。
///
/// 每个任务使用独立会话登录，与同步循环互不影响；任务不可取消。
#[derive(Clone)]
pub struct HistorySyncService {
    api: Arc<dyn TelemetryApi>,
    vehicles: Arc<dyn VehicleStore>,
    jobs: Arc<dyn SyncJobStore>,
    settings: SyncSettings,
}

impl HistorySyncService {
    pub fn new(
        api: Arc<dyn TelemetryApi>,
        vehicles: Arc<dyn VehicleStore>,
        jobs: Arc<dyn SyncJobStore>,
        settings: SyncSettings,
    ) -> Self {
        Self {
            api,
            vehicles,
            jobs,
            settings,
        }
    }

    /// 校验范围与车辆，持久化 pending 任务并在后台执行。
    pub async fn start_job(
        &self,
        vehicle_id: &str,
        from: &str,
        to: &str,
    ) -> Result<SyncJobRecord, SyncError> {
        let (from_ms, to_ms) = parse_range(from, to)?;
        if self.vehicles.find_vehicle(vehicle_id).await?.is_none() {
            return Err(SyncError::VehicleNotFound(vehicle_id.to_string()));
        }

        let job = SyncJobRecord::pending(
            uuid::Uuid::new_v4().to_string(),
            vehicle_id,
            from_ms,
            to_ms,
            now_epoch_ms(),
        );
        let job = self.jobs.create_job(job).await?;
        record_history_job_started();
        info!(
            target: "fleet.jobs",
            job_id = %job.job_id,
            vehicle_id = %job.vehicle_id,
            from_ms = job.from_ms,
            to_ms = job.to_ms,
            "history_job_created"
        );

        let service = self.clone();
        let pending = job.clone();
        tokio::spawn(async move {
            service.run_job(pending).await;
        });
        Ok(job)
    }

    /// 执行任务直到 done / error，返回终态记录。
    pub async fn run_job(&self, mut job: SyncJobRecord) -> SyncJobRecord {
        job.status = SyncJobStatus::Running;
        job.updated_at = now_epoch_ms();
        self.persist(&job).await;

        match self.fetch_and_merge(&mut job).await {
            Ok(()) => {
                job.status = SyncJobStatus::Done;
                job.error = None;
                record_history_job_done();
                info!(
                    target: "fleet.jobs",
                    job_id = %job.job_id,
                    fetched = job.fetched,
                    inserted = job.inserted,
                    "history_job_done"
                );
            }
            Err(err) => {
                job.status = SyncJobStatus::Error;
                job.error = Some(err.to_string());
                record_history_job_failed();
                warn!(
                    target: "fleet.jobs",
                    job_id = %job.job_id,
                    fetched = job.fetched,
                    inserted = job.inserted,
                    error = %err,
                    "history_job_failed"
                );
            }
        }
        job.updated_at = now_epoch_ms();
        self.persist(&job).await;
        job
    }

    async fn fetch_and_merge(&self, job: &mut SyncJobRecord) -> Result<(), SyncError> {
        let mut session = UpstreamSession::new();
        session
            .authenticate(self.api.as_ref(), &self.settings.credentials)
            .await?;
        let token = session
            .token()
            .ok_or(SyncError::Upstream(UpstreamError::MissingToken))?;

        let filter = PageFilter::history(
            job.vehicle_id.clone(),
            format_iso_ms(job.from_ms),
            format_iso_ms(job.to_ms),
        );
        let fetch = fetch_all_pages(
            self.api.as_ref(),
            token,
            &self.settings.history_endpoint,
            &filter,
            self.settings.page_size,
        )
        .await;
        record_pages_fetched(u64::from(fetch.pages));
        job.fetched = fetch.rows.len() as u64;

        let samples: Vec<_> = fetch.rows.into_iter().filter_map(sample_from_row).collect();
        if !samples.is_empty() {
            let inserted = self
                .vehicles
                .merge_history(&job.vehicle_id, samples, self.settings.history_cap)
                .await?
                .ok_or_else(|| SyncError::VehicleNotFound(job.vehicle_id.clone()))?;
            job.inserted = inserted as u64;
        }

        // 分页中断：已拉取的样本保留，任务仍记为失败
        if let Some(err) = fetch.error {
            record_page_failure();
            return Err(err.into());
        }
        Ok(())
    }

    async fn persist(&self, job: &SyncJobRecord) {
        if let Err(err) = self.jobs.update_job(job).await {
            warn!(
                target: "fleet.jobs",
                job_id = %job.job_id,
                error = %err,
                "history_job_persist_failed"
            );
        }
    }
}

/// 启动时将 pending / running 任务标记为 error。
pub async fn recover_interrupted_jobs(jobs: &dyn SyncJobStore) -> Result<u64, SyncError> {
    let affected = jobs
        .fail_unfinished_jobs(INTERRUPTED_MESSAGE, now_epoch_ms())
        .await?;
    if affected > 0 {
        warn!(target: "fleet.jobs", affected = affected, "history_jobs_interrupted");
    }
    Ok(affected)
}

fn parse_range(from: &str, to: &str) -> Result<(i64, i64), SyncError> {
    let from_ms = parse_tor_timestamp(from)
        .ok_or_else(|| SyncError::InvalidRange(format!("invalid from: {from}")))?;
    let to_ms = parse_tor_timestamp(to)
        .ok_or_else(|| SyncError::InvalidRange(format!("invalid to: {to}")))?;
    if from_ms > to_ms {
        return Err(SyncError::InvalidRange("from is after to".to_string()));
    }
    Ok((from_ms, to_ms))
}
