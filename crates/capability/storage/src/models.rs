//! 数据模型
//!
//! - 车辆：VehicleRecord, VehicleUpdate
//! - 历史补数任务：SyncJobRecord, SyncJobStatus
//! - 客户 / 经销商：CustomerRecord, DealerRecord
//! - 仪表盘用户：UserRecord

use domain::{HistorySample, Location, NormalizedVehicle, Principal, VehicleMetrics, VehicleStatus};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 车辆记录（以硬件 ID 唯一标识）。
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleRecord {
    pub id: String,
    pub display_device_id: String,
    pub chassis_number: String,
    pub registration_no: String,
    pub status: VehicleStatus,
    pub location: Location,
    pub metrics: VehicleMetrics,
    pub raw: Value,
    pub equipment_config: Value,
    /// 最近一次写入（Unix 毫秒）。
    pub last_update: i64,
    /// 最新在前，长度不超过上限。
    pub history: Vec<HistorySample>,
}

impl VehicleRecord {
    /// 新车辆：以同步结果初始化，历史为空。
    pub fn from_normalized(vehicle: &NormalizedVehicle, now_ms: i64) -> Self {
        Self {
            id: vehicle.id.clone(),
            display_device_id: vehicle.display_device_id.clone(),
            chassis_number: vehicle.chassis_number.clone(),
            registration_no: vehicle.registration_no.clone(),
            status: vehicle.status.clone(),
            location: vehicle.location,
            metrics: vehicle.metrics.clone(),
            raw: vehicle.raw.clone(),
            equipment_config: vehicle.equipment_config.clone(),
            last_update: now_ms,
            history: Vec::new(),
        }
    }

    /// 以同步结果覆盖当前状态字段（历史不变）。
    pub fn apply_normalized(&mut self, vehicle: &NormalizedVehicle, now_ms: i64) {
        self.display_device_id = vehicle.display_device_id.clone();
        self.chassis_number = vehicle.chassis_number.clone();
        self.registration_no = vehicle.registration_no.clone();
        self.status = vehicle.status.clone();
        self.location = vehicle.location;
        self.metrics = vehicle.metrics.clone();
        self.raw = vehicle.raw.clone();
        self.equipment_config = vehicle.equipment_config.clone();
        self.last_update = now_ms;
    }

    /// 手动编辑：仅替换提供的字段，后写者生效。
    pub fn apply_update(&mut self, update: VehicleUpdate, now_ms: i64) {
        if let Some(value) = update.display_device_id {
            self.display_device_id = value;
        }
        if let Some(value) = update.chassis_number {
            self.chassis_number = value;
        }
        if let Some(value) = update.registration_no {
            self.registration_no = value;
        }
        if let Some(value) = update.status {
            self.status = value;
        }
        if let Some(value) = update.location {
            self.location = value;
        }
        if let Some(value) = update.metrics {
            self.metrics = value;
        }
        if let Some(value) = update.equipment_config {
            self.equipment_config = value;
        }
        self.last_update = now_ms;
    }

    /// 列表视图：去掉历史。
    pub fn without_history(mut self) -> Self {
        self.history = Vec::new();
        self
    }
}

/// 车辆手动编辑输入。
#[derive(Debug, Clone, Default)]
pub struct VehicleUpdate {
    pub display_device_id: Option<String>,
    pub chassis_number: Option<String>,
    pub registration_no: Option<String>,
    pub status: Option<VehicleStatus>,
    pub location: Option<Location>,
    pub metrics: Option<VehicleMetrics>,
    pub equipment_config: Option<Value>,
}

/// 历史补数任务状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncJobStatus {
    Pending,
    Running,
    Done,
    Error,
}

impl SyncJobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Done => "done",
            Self::Error => "error",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "running" => Some(Self::Running),
            "done" => Some(Self::Done),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    /// 终态：done / error。
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Done | Self::Error)
    }
}

/// 历史补数任务记录。
#[derive(Debug, Clone, PartialEq)]
pub struct SyncJobRecord {
    pub job_id: String,
    pub vehicle_id: String,
    pub status: SyncJobStatus,
    pub from_ms: i64,
    pub to_ms: i64,
    pub fetched: u64,
    pub inserted: u64,
    pub error: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl SyncJobRecord {
    pub fn pending(
        job_id: impl Into<String>,
        vehicle_id: impl Into<String>,
        from_ms: i64,
        to_ms: i64,
        now_ms: i64,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            vehicle_id: vehicle_id.into(),
            status: SyncJobStatus::Pending,
            from_ms,
            to_ms,
            fetched: 0,
            inserted: 0,
            error: None,
            created_at: now_ms,
            updated_at: now_ms,
        }
    }
}

/// 客户档案。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerRecord {
    pub customer_id: String,
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
    /// 是否开通仪表盘登录。
    pub is_user: bool,
    pub username: Option<String>,
}

/// 经销商档案。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DealerRecord {
    pub dealer_id: String,
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

/// 仪表盘用户。`password` 为 argon2 哈希（历史数据可能为明文）。
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub user_id: String,
    pub username: String,
    pub password: String,
    pub role: String,
    pub customer_code: Option<String>,
    pub assigned_vehicles: Vec<String>,
    /// 关联的客户 / 经销商 ID。
    pub linked_id: Option<String>,
}

impl UserRecord {
    /// 转换为请求主体。
    pub fn to_principal(&self) -> Principal {
        Principal {
            user_id: self.user_id.clone(),
            username: self.username.clone(),
            role: self.role.clone(),
            customer_code: self.customer_code.clone(),
            assigned_vehicles: self.assigned_vehicles.clone(),
        }
    }
}
