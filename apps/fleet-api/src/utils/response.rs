//! HTTP 响应辅助函数和 DTO 转换
//!
//! - 错误响应：auth_error, forbidden_error, bad_request_error, not_found_error,
//!   internal_auth_error, auth_service_error, storage_error, sync_error
//! - DTO 转换：vehicle_to_snapshot, vehicle_to_detail, job_to_progress,
//!   customer_to_dto, dealer_to_dto, user_to_dto
//!
//! 失败统一为 `{success:false, data:null, error:{message}}`，仅以 HTTP 状态区分。

use api_contract::{
    ApiResponse, CustomerDto, DealerDto, SyncProgressDto, UserDto, VehicleDetailDto,
    VehicleSnapshotDto,
};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use fleet_auth::AuthError;
use fleet_storage::{
    CustomerRecord, DealerRecord, StorageError, SyncJobRecord, UserRecord, VehicleRecord,
};
use fleet_sync::SyncError;
use tracing::warn;

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ApiResponse::<()>::error(message))).into_response()
}

/// 认证错误响应
pub fn auth_error(status: StatusCode) -> Response {
    error_response(status, "unauthorized")
}

/// 禁止访问错误响应
pub fn forbidden_error() -> Response {
    error_response(StatusCode::FORBIDDEN, "forbidden")
}

/// 错误请求响应
pub fn bad_request_error(message: impl Into<String>) -> Response {
    error_response(StatusCode::BAD_REQUEST, message)
}

/// 资源未找到错误响应
pub fn not_found_error() -> Response {
    error_response(StatusCode::NOT_FOUND, "not found")
}

/// 认证内部错误响应
pub fn internal_auth_error(err: AuthError) -> Response {
    warn!(target: "fleet.api", error = %err, "auth_internal_error");
    error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}

/// 认证服务错误：输入问题为 400，凭据问题为 401，其余为 500。
pub fn auth_service_error(err: AuthError) -> Response {
    match err {
        AuthError::InvalidInput(message) => bad_request_error(message),
        AuthError::InvalidCredentials => {
            error_response(StatusCode::UNAUTHORIZED, "invalid credentials")
        }
        AuthError::TokenInvalid | AuthError::TokenExpired => auth_error(StatusCode::UNAUTHORIZED),
        err => internal_auth_error(err),
    }
}

/// 存储错误响应
pub fn storage_error(err: StorageError) -> Response {
    warn!(target: "fleet.api", error = %err, "storage_error");
    error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}

/// 补数任务错误响应
pub fn sync_error(err: SyncError) -> Response {
    match err {
        SyncError::InvalidRange(message) => bad_request_error(message),
        SyncError::VehicleNotFound(_) => not_found_error(),
        SyncError::Storage(err) => storage_error(err),
        err => error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

pub fn vehicle_to_snapshot(record: VehicleRecord) -> VehicleSnapshotDto {
    VehicleSnapshotDto {
        id: record.id,
        display_device_id: record.display_device_id,
        chassis_number: record.chassis_number,
        registration_no: record.registration_no,
        status: record.status,
        location: record.location,
        metrics: record.metrics,
        raw_tor: record.raw,
        equipment_config: record.equipment_config,
        last_update: record.last_update,
    }
}

pub fn vehicle_to_detail(mut record: VehicleRecord) -> VehicleDetailDto {
    let history = std::mem::take(&mut record.history);
    VehicleDetailDto {
        vehicle: vehicle_to_snapshot(record),
        history,
    }
}

pub fn job_to_progress(record: SyncJobRecord) -> SyncProgressDto {
    SyncProgressDto {
        job_id: record.job_id,
        vehicle_id: record.vehicle_id,
        status: record.status.as_str().to_string(),
        from: record.from_ms,
        to: record.to_ms,
        fetched: record.fetched,
        inserted: record.inserted,
        error: record.error,
        created_at: record.created_at,
        updated_at: record.updated_at,
    }
}

pub fn customer_to_dto(record: CustomerRecord) -> CustomerDto {
    CustomerDto {
        id: record.customer_id,
        customer_code: record.customer_code,
        customer_name: record.customer_name,
        phone_no: record.phone_no,
        whatsapp_no: record.whatsapp_no,
        email_id: record.email_id,
        onboard_date: record.onboard_date,
        address: record.address,
        city: record.city,
        state: record.state,
        country: record.country,
        manufacturing_year: record.manufacturing_year,
        timezone_name: record.timezone_name,
        parent_position_name: record.parent_position_name,
        dealer_code: record.dealer_code,
        is_user: record.is_user,
        username: record.username,
    }
}

pub fn dealer_to_dto(record: DealerRecord) -> DealerDto {
    DealerDto {
        id: record.dealer_id,
        dealer_name: record.dealer_name,
        dealer_contact_person: record.dealer_contact_person,
        dealer_contact_number: record.dealer_contact_number,
        dealer_code: record.dealer_code,
        address: record.address,
        email: record.email,
        state: record.state,
        city: record.city,
        is_user: record.is_user,
        username: record.username,
    }
}

/// 用户返回结构（不含口令哈希）
pub fn user_to_dto(record: UserRecord) -> UserDto {
    UserDto {
        user_id: record.user_id,
        username: record.username,
        role: record.role,
        customer_code: record.customer_code,
        assigned_vehicles: record.assigned_vehicles,
    }
}
