//! 历史补数 handlers
//!
//! - POST /telemetry/{id}/sync-history - 创建补数任务，立即返回 jobId
//! - GET /sync-progress/{job_id} - 查询任务状态
//!
//! 任务在后台执行，状态持久化在 SyncJobStore，进程重启后可继续查询。

use api_contract::{ApiResponse, SyncHistoryRequest, SyncHistoryResponse};
use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};

use crate::AppState;
use crate::handlers::telemetry::find_visible;
use crate::middleware::require_write_auth;
use crate::utils::normalize_required;
use crate::utils::response::{job_to_progress, not_found_error, storage_error, sync_error};

#[derive(serde::Deserialize)]
pub struct HistoryPath {
    vehicle_id: String,
}

#[derive(serde::Deserialize)]
pub struct JobPath {
    job_id: String,
}

/// 创建补数任务
///
/// # 错误处理
///
/// - `400 BAD REQUEST`: 时间缺失、无法解析或 from 晚于 to
/// - `401 UNAUTHORIZED`: 开启写保护且未认证
/// - `404 NOT FOUND`: 车辆不存在或对当前主体不可见
pub async fn sync_history(
    State(state): State<AppState>,
    Path(path): Path<HistoryPath>,
    headers: HeaderMap,
    Json(req): Json<SyncHistoryRequest>,
) -> Response {
    let principal = match require_write_auth(&state, &headers) {
        Ok(principal) => principal,
        Err(response) => return response,
    };
    if let Some(principal) = principal.as_ref() {
        if let Err(response) = find_visible(&state, Some(principal), &path.vehicle_id).await {
            return response;
        }
    }
    let from = match normalize_required(req.from, "from") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let to = match normalize_required(req.to, "to") {
        Ok(value) => value,
        Err(response) => return response,
    };
    match state
        .history_sync
        .start_job(&path.vehicle_id, &from, &to)
        .await
    {
        Ok(job) => (
            StatusCode::OK,
            Json(ApiResponse::success(SyncHistoryResponse { job_id: job.job_id })),
        )
            .into_response(),
        Err(err) => sync_error(err),
    }
}

/// 查询补数任务进度
pub async fn sync_progress(State(state): State<AppState>, Path(path): Path<JobPath>) -> Response {
    match state.job_store.find_job(&path.job_id).await {
        Ok(Some(job)) => {
            (StatusCode::OK, Json(ApiResponse::success(job_to_progress(job)))).into_response()
        }
        Ok(None) => not_found_error(),
        Err(err) => storage_error(err),
    }
}
