//! 稳定的 DTO 与 API 响应契约。

use domain::{HistorySample, Location, VehicleMetrics, VehicleStatus};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 标准 API 响应封装。
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

/// 失败响应的错误体（仅描述信息，不带错误码）。
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError {
                message: message.into(),
            }),
        }
    }
}

/// 登录请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// 登录响应体。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    /// 过期时间（Unix 毫秒）。
    pub expires: u64,
    pub user: UserDto,
}

/// 车辆列表项（不含历史）。
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleSnapshotDto {
    pub id: String,
    pub display_device_id: String,
    pub chassis_number: String,
    pub registration_no: String,
    pub status: VehicleStatus,
    pub location: Location,
    pub metrics: VehicleMetrics,
    #[serde(rename = "rawTor")]
    pub raw_tor: Value,
    pub equipment_config: Value,
    /// 最后更新时间（Unix 毫秒）。
    pub last_update: i64,
}

/// 车辆详情（含历史，最新在前）。
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleDetailDto {
    #[serde(flatten)]
    pub vehicle: VehicleSnapshotDto,
    pub history: Vec<HistorySample>,
}

/// 车辆字段更新请求体：提供的字段整体替换。
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVehicleRequest {
    pub display_device_id: Option<String>,
    pub chassis_number: Option<String>,
    pub registration_no: Option<String>,
    pub status: Option<String>,
    pub location: Option<Location>,
    pub metrics: Option<VehicleMetrics>,
    pub equipment_config: Option<Value>,
}

/// 批量写入结果。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkUpsertResponse {
    pub received: usize,
    pub upserted: usize,
    pub dropped: usize,
    /// 同批次内重复 ID 被合并的条数（保留最后一条）。
    pub duplicates: usize,
    pub failed: usize,
}

/// 历史补数请求体（ISO 时间）。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncHistoryRequest {
    pub from: String,
    pub to: String,
}

/// 历史补数任务创建结果。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncHistoryResponse {
    pub job_id: String,
}

/// 历史补数任务进度。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncProgressDto {
    pub job_id: String,
    pub vehicle_id: String,
    /// pending / running / done / error
    pub status: String,
    pub from: i64,
    pub to: i64,
    pub fetched: u64,
    pub inserted: u64,
    pub error: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// 客户返回结构（不回传口令）。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDto {
    pub id: String,
    pub customer_code: String,
    pub customer_name: String,
    pub phone_no: String,
    pub whatsapp_no: String,
    pub email_id: String,
    pub onboard_date: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub manufacturing_year: String,
    pub timezone_name: String,
    pub parent_position_name: String,
    pub dealer_code: String,
    pub is_user: bool,
    pub username: Option<String>,
}

/// 客户保存请求体：带 id 为整体替换，不带 id 为新建。
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SaveCustomerRequest {
    pub id: Option<String>,
    pub customer_code: String,
    pub customer_name: String,
    pub phone_no: String,
    pub whatsapp_no: String,
    pub email_id: String,
    pub onboard_date: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub manufacturing_year: String,
    pub timezone_name: String,
    pub parent_position_name: String,
    pub dealer_code: String,
    pub is_user: bool,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// 经销商返回结构（不回传口令）。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DealerDto {
    pub id: String,
    pub dealer_name: String,
    pub dealer_contact_person: String,
    pub dealer_contact_number: String,
    pub dealer_code: String,
    pub address: String,
    pub email: String,
    pub state: String,
    pub city: String,
    pub is_user: bool,
    pub username: Option<String>,
}

/// 经销商保存请求体。
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SaveDealerRequest {
    pub id: Option<String>,
    pub dealer_name: String,
    pub dealer_contact_person: String,
    pub dealer_contact_number: String,
    pub dealer_code: String,
    pub address: String,
    pub email: String,
    pub state: String,
    pub city: String,
    pub is_user: bool,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// 仪表盘用户返回结构。
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub user_id: String,
    pub username: String,
    pub role: String,
    pub customer_code: Option<String>,
    pub assigned_vehicles: Vec<String>,
}

/// 用户保存请求体：同名用户存在时更新，口令为空则保留原口令。
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SaveUserRequest {
    pub username: String,
    pub password: Option<String>,
    pub role: Option<String>,
    pub customer_code: Option<String>,
    pub assigned_vehicles: Option<Vec<String>>,
}

/// 车队统计。
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetStatsDto {
    pub total_count: u64,
    pub online_count: u64,
    pub offline_count: u64,
    pub idle_count: u64,
    pub charging_count: u64,
    pub immobilized_count: u64,
    pub non_communicating_count: u64,
    pub active_subscriptions: u64,
    pub inactive_subscriptions: u64,
    pub total_km: f64,
    pub total_co2_saved: f64,
}

/// 同步计数器快照。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshotDto {
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
