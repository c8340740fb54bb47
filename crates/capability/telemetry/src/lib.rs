//! 追踪、请求 ID 生成与同步计数器。

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::{EnvFilter, fmt};

/// 请求级追踪标识。
#[derive(Debug, Clone)]
pub struct RequestIds {
    pub request_id: String,
    pub trace_id: String,
}

/// 同步计数器快照。
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
    pub cycles_started: u64,
    pub cycles_skipped: u64,
    pub login_success: u64,
    pub login_failure: u64,
    pub pages_fetched: u64,
    pub page_failures: u64,
    pub unauthorized: u64,
    pub records_upserted: u64,
    pub records_dropped: u64,
    pub upsert_failures: u64,
    pub history_jobs_started: u64,
    pub history_jobs_done: u64,
    pub history_jobs_failed: u64,
}

/// 进程级同步计数器。
pub struct SyncMetrics {
    cycles_started: AtomicU64,
    cycles_skipped: AtomicU64,
    login_success: AtomicU64,
    login_failure: AtomicU64,
    pages_fetched: AtomicU64,
    page_failures: AtomicU64,
    unauthorized: AtomicU64,
    records_upserted: AtomicU64,
    records_dropped: AtomicU64,
    upsert_failures: AtomicU64,
    history_jobs_started: AtomicU64,
    history_jobs_done: AtomicU64,
    history_jobs_failed: AtomicU64,
}

impl SyncMetrics {
    pub fn new() -> Self {
        Self {
            cycles_started: AtomicU64::new(0),
            cycles_skipped: AtomicU64::new(0),
            login_success: AtomicU64::new(0),
            login_failure: AtomicU64::new(0),
            pages_fetched: AtomicU64::new(0),
            page_failures: AtomicU64::new(0),
            unauthorized: AtomicU64::new(0),
            records_upserted: AtomicU64::new(0),
            records_dropped: AtomicU64::new(0),
            upsert_failures: AtomicU64::new(0),
            history_jobs_started: AtomicU64::new(0),
            history_jobs_done: AtomicU64::new(0),
            history_jobs_failed: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            cycles_started: self.cycles_started.load(Ordering::Relaxed),
            cycles_skipped: self.cycles_skipped.load(Ordering::Relaxed),
            login_success: self.login_success.load(Ordering::Relaxed),
            login_failure: self.login_failure.load(Ordering::Relaxed),
            pages_fetched: self.pages_fetched.load(Ordering::Relaxed),
            page_failures: self.page_failures.load(Ordering::Relaxed),
            unauthorized: self.unauthorized.load(Ordering::Relaxed),
            records_upserted: self.records_upserted.load(Ordering::Relaxed),
            records_dropped: self.records_dropped.load(Ordering::Relaxed),
            upsert_failures: self.upsert_failures.load(Ordering::Relaxed),
            history_jobs_started: self.history_jobs_started.load(Ordering::Relaxed),
            history_jobs_done: self.history_jobs_done.load(Ordering::Relaxed),
            history_jobs_failed: self.history_jobs_failed.load(Ordering::Relaxed),
        }
    }
}

impl Default for SyncMetrics {
    fn default() -> Self {
        Self::new()
    }
}

static METRICS: OnceLock<SyncMetrics> = OnceLock::new();

/// 获取全局计数器实例。
pub fn metrics() -> &'static SyncMetrics {
    METRICS.get_or_init(SyncMetrics::new)
}

/// 初始化 tracing（默认 info）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// 生成新的 request_id 与 trace_id。
pub fn new_request_ids() -> RequestIds {
    RequestIds {
        request_id: uuid::Uuid::new_v4().to_string(),
        trace_id: uuid::Uuid::new_v4().to_string(),
    }
}

/// 记录同步周期开始次数。
pub fn record_cycle_started() {
    metrics().cycles_started.fetch_add(1, Ordering::Relaxed);
}

/// 记录因登录失败跳过的周期。
pub fn record_cycle_skipped() {
    metrics().cycles_skipped.fetch_add(1, Ordering::Relaxed);
}

pub fn record_login_success() {
    metrics().login_success.fetch_add(1, Ordering::Relaxed);
}

pub fn record_login_failure() {
    metrics().login_failure.fetch_add(1, Ordering::Relaxed);
}

/// 记录成功拉取的分页数。
pub fn record_pages_fetched(count: u64) {
    metrics().pages_fetched.fetch_add(count, Ordering::Relaxed);
}

/// 记录中断分页的请求失败。
pub fn record_page_failure() {
    metrics().page_failures.fetch_add(1, Ordering::Relaxed);
}

/// 记录上游 401。
pub fn record_unauthorized() {
    metrics().unauthorized.fetch_add(1, Ordering::Relaxed);
}

pub fn record_records_upserted(count: u64) {
    metrics()
        .records_upserted
        .fetch_add(count, Ordering::Relaxed);
}

/// 记录缺少硬件 ID 被丢弃的行。
pub fn record_records_dropped(count: u64) {
    metrics()
        .records_dropped
        .fetch_add(count, Ordering::Relaxed);
}

pub fn record_upsert_failure() {
    metrics().upsert_failures.fetch_add(1, Ordering::Relaxed);
}

pub fn record_history_job_started() {
    metrics()
        .history_jobs_started
        .fetch_add(1, Ordering::Relaxed);
}

pub fn record_history_job_done() {
    metrics().history_jobs_done.fetch_add(1, Ordering::Relaxed);
}

pub fn record_history_job_failed() {
    metrics()
        .history_jobs_failed
        .fetch_add(1, Ordering::Relaxed);
}
