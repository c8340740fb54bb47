//! 同步计数器快照。
//!
//! - GET /metrics

use api_contract::{ApiResponse, MetricsSnapshotDto};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use fleet_telemetry::metrics;

pub async fn get_metrics() -> Response {
    let snapshot = metrics().snapshot();
    (
        StatusCode::OK,
        Json(ApiResponse::success(MetricsSnapshotDto {
            cycles_started: snapshot.cycles_started,
            cycles_skipped: snapshot.cycles_skipped,
            login_success: snapshot.login_success,
            login_failure: snapshot.login_failure,
            pages_fetched: snapshot.pages_fetched,
            page_failures: snapshot.page_failures,
            unauthorized: snapshot.unauthorized,
            records_upserted: snapshot.records_upserted,
            records_dropped: snapshot.records_dropped,
            upsert_failures: snapshot.upsert_failures,
            history_jobs_started: snapshot.history_jobs_started,
            history_jobs_done: snapshot.history_jobs_done,
            history_jobs_failed: snapshot.history_jobs_failed,
        })),
    )
        .into_response()
}
