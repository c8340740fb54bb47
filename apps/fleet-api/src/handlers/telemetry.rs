//! 单车遥测 handlers
//!
//! - GET /telemetry/{id} - 当前状态与历史（最新在前）
//! - POST /telemetry/{id} - 手动编辑，提供的字段整体替换，后写者生效
//! - POST /telemetry/bulk - 批量写入已标准化的车辆记录（同批次按 ID 去重）
//! - GET /telemetry/{id}/export - 历史原始数据 CSV 报表

use api_contract::{ApiResponse, BulkUpsertResponse, UpdateVehicleRequest};
use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use domain::{NormalizedVehicle, Principal, now_epoch_ms};
use fleet_normalize::{export_history_csv, history_sample, keep_last_per_id};
use fleet_storage::{VehicleRecord, VehicleUpdate};
use fleet_telemetry::{record_records_dropped, record_records_upserted, record_upsert_failure};
use tracing::{info, warn};

use crate::AppState;
use crate::middleware::{optional_principal, require_admin, require_write_auth};
use crate::utils::response::{
    bad_request_error, forbidden_error, not_found_error, storage_error, vehicle_to_detail,
};
use crate::utils::{normalize_optional, parse_status};

#[derive(serde::Deserialize)]
pub struct VehiclePath {
    vehicle_id: String,
}

/// 查找当前主体可见的车辆；不可见与不存在同样返回 404。
pub(crate) async fn find_visible(
    state: &AppState,
    principal: Option<&Principal>,
    vehicle_id: &str,
) -> Result<VehicleRecord, Response> {
    match state.vehicle_store.find_vehicle(vehicle_id).await {
        Ok(Some(record)) => {
            let visible = principal
                .map(|principal| principal.can_view(&record.id, &record.equipment_config))
                .unwrap_or(true);
            if visible { Ok(record) } else { Err(not_found_error()) }
        }
        Ok(None) => Err(not_found_error()),
        Err(err) => Err(storage_error(err)),
    }
}

/// 获取车辆详情
///
/// # 错误处理
///
/// - `401 UNAUTHORIZED`: 携带了无效 token
/// - `404 NOT FOUND`: 车辆不存在或对当前主体不可见
/// - `500 INTERNAL SERVER ERROR`: 存储层错误
pub async fn get_vehicle(
    State(state): State<AppState>,
    Path(path): Path<VehiclePath>,
    headers: HeaderMap,
) -> Response {
    let principal = match optional_principal(&state, &headers) {
        Ok(principal) => principal,
        Err(response) => return response,
    };
    match find_visible(&state, principal.as_ref(), &path.vehicle_id).await {
        Ok(record) => {
            (StatusCode::OK, Json(ApiResponse::success(vehicle_to_detail(record)))).into_response()
        }
        Err(response) => response,
    }
}

/// 更新车辆
///
/// 仅替换请求中提供的字段；与同步写入之间不做版本校验。
///
/// # 错误处理
///
/// - `400 BAD REQUEST`: 空更新或字段为空串
/// - `401 UNAUTHORIZED`: 开启写保护且未认证
/// - `403 FORBIDDEN`: 非管理员修改 equipmentConfig
/// - `404 NOT FOUND`: 车辆不存在或对当前主体不可见
pub async fn update_vehicle(
    State(state): State<AppState>,
    Path(path): Path<VehiclePath>,
    headers: HeaderMap,
    Json(req): Json<UpdateVehicleRequest>,
) -> Response {
    let principal = match require_write_auth(&state, &headers) {
        Ok(principal) => principal,
        Err(response) => return response,
    };
    // equipmentConfig 决定客户归属，只有管理员可以改
    if req.equipment_config.is_some()
        && principal.as_ref().is_some_and(|principal| !principal.is_admin())
    {
        return forbidden_error();
    }
    if let Err(response) = find_visible(&state, principal.as_ref(), &path.vehicle_id).await {
        return response;
    }
    let display_device_id = match normalize_optional(req.display_device_id, "displayDeviceId") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let status = match parse_status(req.status) {
        Ok(value) => value,
        Err(response) => return response,
    };
    let update = VehicleUpdate {
        display_device_id,
        chassis_number: req.chassis_number,
        registration_no: req.registration_no,
        status,
        location: req.location,
        metrics: req.metrics,
        equipment_config: req.equipment_config,
    };
    if update.display_device_id.is_none()
        && update.chassis_number.is_none()
        && update.registration_no.is_none()
        && update.status.is_none()
        && update.location.is_none()
        && update.metrics.is_none()
        && update.equipment_config.is_none()
    {
        return bad_request_error("empty update");
    }

    match state
        .vehicle_store
        .update_vehicle(&path.vehicle_id, update, now_epoch_ms())
        .await
    {
        Ok(Some(record)) => {
            info!(target: "fleet.api", vehicle_id = %record.id, "vehicle_updated");
            (StatusCode::OK, Json(ApiResponse::success(vehicle_to_detail(record)))).into_response()
        }
        Ok(None) => not_found_error(),
        Err(err) => storage_error(err),
    }
}

/// 批量写入
///
/// 缺少硬件 ID 的记录丢弃，同一 ID 只写入最后一条；单条写入失败不影响其余记录。
/// 开启写保护时仅限管理员。
pub async fn bulk_upsert(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(items): Json<Vec<NormalizedVehicle>>,
) -> Response {
    if let Err(response) = require_admin(&state, &headers) {
        return response;
    }
    let received = items.len();
    let valid: Vec<NormalizedVehicle> = items
        .into_iter()
        .filter_map(|mut item| {
            item.id = item.id.trim().to_string();
            (!item.id.is_empty()).then_some(item)
        })
        .collect();
    let dropped = received - valid.len();
    let (unique, duplicates) = keep_last_per_id(valid);
    let mut result = BulkUpsertResponse {
        received,
        upserted: 0,
        dropped,
        duplicates,
        failed: 0,
    };
    let now_ms = now_epoch_ms();
    for item in unique {
        let sample = history_sample(&item, now_ms);
        match state
            .vehicle_store
            .upsert_vehicle(&item, sample, state.history_cap, now_ms)
            .await
        {
            Ok(()) => result.upserted += 1,
            Err(err) => {
                record_upsert_failure();
                warn!(target: "fleet.api", vehicle_id = %item.id, error = %err, "bulk_upsert_failed");
                result.failed += 1;
            }
        }
    }
    record_records_upserted(result.upserted as u64);
    record_records_dropped(result.dropped as u64);
    info!(
        target: "fleet.api",
        received = result.received,
        upserted = result.upserted,
        dropped = result.dropped,
        duplicates = result.duplicates,
        failed = result.failed,
        "bulk_upsert"
    );
    (StatusCode::OK, Json(ApiResponse::success(result))).into_response()
}

/// 导出历史报表
///
/// 返回带 BOM 的 CSV，文件名为 `Report_{displayDeviceId}.csv`。
pub async fn export_history(
    State(state): State<AppState>,
    Path(path): Path<VehiclePath>,
    headers: HeaderMap,
) -> Response {
    let principal = match optional_principal(&state, &headers) {
        Ok(principal) => principal,
        Err(response) => return response,
    };
    let record = match find_visible(&state, principal.as_ref(), &path.vehicle_id).await {
        Ok(record) => record,
        Err(response) => return response,
    };
    let body = match export_history_csv(&record.history) {
        Ok(body) => body,
        Err(err) => {
            warn!(target: "fleet.api", vehicle_id = %record.id, error = %err, "export_failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::error(err.to_string())),
            )
                .into_response();
        }
    };
    let name = if record.display_device_id.is_empty() {
        &record.id
    } else {
        &record.display_device_id
    };
    let filename: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"Report_{filename}.csv\""),
            ),
        ],
        body,
    )
        .into_response()
}
