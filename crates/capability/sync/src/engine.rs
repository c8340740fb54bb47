use crate::SyncSettings;
use domain::now_epoch_ms;
use fleet_normalize::{history_sample, keep_last_per_id, normalize_fleet};
use fleet_storage::VehicleStore;
use fleet_telemetry::{
    record_cycle_skipped, record_cycle_started, record_login_failure, record_login_success,
    record_page_failure, record_pages_fetched, record_records_dropped, record_records_upserted,
    record_unauthorized, record_upsert_failure,
};
use fleet_upstream::{
    LATEST_MACHINE_DATA_ENDPOINT, PageFetch, PageFilter, TelemetryApi, UpstreamSession,
    VEHICLE_DETAILS_ENDPOINT, fetch_all_pages,
};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

/// 单个同步周期的结果。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// 登录失败，本周期未做任何写入。
    pub skipped: bool,
    pub metadata_rows: usize,
    pub telemetry_rows: usize,
    pub upserted: usize,
    /// 缺少硬件 ID 的遥测行。
    pub dropped: usize,
    /// 同一周期内重复的硬件 ID（保留最后一行）。
    pub duplicates: usize,
    pub failed: usize,
    pub unauthorized: bool,
}

/// 周期性同步：登录 → 元数据分页 → 最新遥测分页 → 标准化 → 逐条写入。
pub struct SyncEngine {
    api: Arc<dyn TelemetryApi>,
    vehicles: Arc<dyn VehicleStore>,
    settings: SyncSettings,
}

impl SyncEngine {
    pub fn new(
        api: Arc<dyn TelemetryApi>,
        vehicles: Arc<dyn VehicleStore>,
        settings: SyncSettings,
    ) -> Self {
        Self {
            api,
            vehicles,
            settings,
        }
    }

    /// 在后台任务中运行同步循环。
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run(UpstreamSession::new()))
    }

    /// 固定周期运行；周期之间不重叠，错过的 tick 顺延。
    pub async fn run(self, mut session: UpstreamSession) {
        info!(
            target: "fleet.sync",
            interval_seconds = self.settings.interval.as_secs(),
            page_size = self.settings.page_size,
            "sync_loop_started"
        );
        let mut ticker = tokio::time::interval(self.settings.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            self.run_cycle(&mut session).await;
        }
    }

    /// 执行一个同步周期。
    pub async fn run_cycle(&self, session: &mut UpstreamSession) -> CycleReport {
        record_cycle_started();
        let mut report = CycleReport::default();

        if !session.is_authenticated() {
            match session
                .authenticate(self.api.as_ref(), &self.settings.credentials)
                .await
            {
                Ok(()) => {
                    record_login_success();
                    info!(target: "fleet.sync", "upstream_login_succeeded");
                }
                Err(err) => {
                    record_login_failure();
                    record_cycle_skipped();
                    warn!(target: "fleet.sync", error = %err, "upstream_login_failed");
                    report.skipped = true;
                    return report;
                }
            }
        }
        let Some(token) = session.token().map(str::to_string) else {
            record_cycle_skipped();
            report.skipped = true;
            return report;
        };

        let metadata = self.fetch(&token, VEHICLE_DETAILS_ENDPOINT).await;
        report.metadata_rows = metadata.rows.len();
        if metadata.unauthorized() {
            self.invalidate(session, VEHICLE_DETAILS_ENDPOINT);
            report.unauthorized = true;
            return report;
        }

        let telemetry = self.fetch(&token, LATEST_MACHINE_DATA_ENDPOINT).await;
        report.telemetry_rows = telemetry.rows.len();
        if telemetry.unauthorized() {
            // 已拉取的遥测仍然写入
            self.invalidate(session, LATEST_MACHINE_DATA_ENDPOINT);
            report.unauthorized = true;
        }

        let outcome = normalize_fleet(&metadata.rows, &telemetry.rows);
        report.dropped = outcome.dropped;
        let (vehicles, duplicates) = keep_last_per_id(outcome.vehicles);
        report.duplicates = duplicates;

        let now_ms = now_epoch_ms();
        for vehicle in &vehicles {
            let sample = history_sample(vehicle, now_ms);
            match self
                .vehicles
                .upsert_vehicle(vehicle, sample, self.settings.history_cap, now_ms)
                .await
            {
                Ok(()) => report.upserted += 1,
                Err(err) => {
                    report.failed += 1;
                    record_upsert_failure();
                    warn!(
                        target: "fleet.sync",
                        vehicle_id = %vehicle.id,
                        error = %err,
                        "vehicle_upsert_failed"
                    );
                }
            }
        }

        record_records_upserted(report.upserted as u64);
        record_records_dropped(report.dropped as u64);
        info!(
            target: "fleet.sync",
            metadata_rows = report.metadata_rows,
            telemetry_rows = report.telemetry_rows,
            upserted = report.upserted,
            dropped = report.dropped,
            duplicates = report.duplicates,
            failed = report.failed,
            unauthorized = report.unauthorized,
            "sync_cycle_completed"
        );
        report
    }

    async fn fetch(&self, token: &str, endpoint: &str) -> PageFetch {
        let fetch = fetch_all_pages(
            self.api.as_ref(),
            token,
            endpoint,
            &PageFilter::fleet(),
            self.settings.page_size,
        )
        .await;
        record_pages_fetched(u64::from(fetch.pages));
        if fetch.error.is_some() {
            record_page_failure();
        }
        fetch
    }

    fn invalidate(&self, session: &mut UpstreamSession, endpoint: &str) {
        session.invalidate();
        record_unauthorized();
        warn!(target: "fleet.sync", endpoint = endpoint, "upstream_session_invalidated");
    }
}
