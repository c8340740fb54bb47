//! 车辆快照与历史样本。
//!
//! JSON 字段命名与仪表盘保持一致（camelCase，原始上游数据字段名为 `rawTor`）。

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// 车辆运行状态。
///
/// 上游状态字符串不在已知集合内时原样保留。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum VehicleStatus {
    On,
    #[default]
    Off,
    Idle,
    Charging,
    OnCharge,
    NonCommunicating,
    Service,
    Geofence,
    Immobilized,
    Other(String),
}

impl VehicleStatus {
    /// 解析上游 MachineStatus；空值视为 Off。
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "" => Self::Off,
            "On" => Self::On,
            "Off" => Self::Off,
            "Idle" => Self::Idle,
            "Charging" => Self::Charging,
            "On Charge" => Self::OnCharge,
            "Non-Communicating" => Self::NonCommunicating,
            "Service" => Self::Service,
            "Geofence" => Self::Geofence,
            "Immobilized" => Self::Immobilized,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::On => "On",
            Self::Off => "Off",
            Self::Idle => "Idle",
            Self::Charging => "Charging",
            Self::OnCharge => "On Charge",
            Self::NonCommunicating => "Non-Communicating",
            Self::Service => "Service",
            Self::Geofence => "Geofence",
            Self::Immobilized => "Immobilized",
            Self::Other(value) => value,
        }
    }

    /// 充电中（含 "On Charge" 别名）。
    pub fn is_charging(&self) -> bool {
        matches!(self, Self::Charging | Self::OnCharge)
    }
}

impl std::fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for VehicleStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for VehicleStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value.as_deref().map(Self::parse).unwrap_or_default())
    }
}

/// 最后已知位置。
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

/// 归一化后的车辆指标。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VehicleMetrics {
    pub battery_level: f64,
    pub speed: f64,
    pub ignition: bool,
    pub total_km: f64,
    pub dte: f64,
    pub voltage: f64,
    pub temp: f64,
    pub motor_temp: f64,
    pub time_to_charge: String,
    pub vehicle_mode_request: String,
}

pub const DEFAULT_TIME_TO_CHARGE: &str = "00:00";
pub const DEFAULT_VEHICLE_MODE: &str = "NEUTRAL";

impl Default for VehicleMetrics {
    fn default() -> Self {
        Self {
            battery_level: 0.0,
            speed: 0.0,
            ignition: false,
            total_km: 0.0,
            dte: 0.0,
            voltage: 0.0,
            temp: 0.0,
            motor_temp: 0.0,
            time_to_charge: DEFAULT_TIME_TO_CHARGE.to_string(),
            vehicle_mode_request: DEFAULT_VEHICLE_MODE.to_string(),
        }
    }
}

/// 单条历史样本（最新在前存放）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySample {
    /// 上游 ENTRYDATE 原文，缺失时为同步时刻的 ISO 时间。
    pub timestamp: String,
    #[serde(default)]
    pub ts_ms: i64,
    #[serde(rename = "rawTor", default)]
    pub raw: Value,
    #[serde(default)]
    pub metrics: VehicleMetrics,
}

/// 一次同步产生的车辆当前状态。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedVehicle {
    /// 硬件 ID（HWID）。
    pub id: String,
    #[serde(default)]
    pub display_device_id: String,
    #[serde(default)]
    pub chassis_number: String,
    #[serde(default)]
    pub registration_no: String,
    #[serde(default)]
    pub status: VehicleStatus,
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub metrics: VehicleMetrics,
    #[serde(rename = "rawTor", default)]
    pub raw: Value,
    #[serde(default)]
    pub equipment_config: Value,
    /// 上游样本时间原文（ENTRYDATE 等）。
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_timestamp: Option<String>,
}

impl NormalizedVehicle {
    /// 以给定时间生成对应的历史样本。
    pub fn to_sample(&self, timestamp: String, ts_ms: i64) -> HistorySample {
        HistorySample {
            timestamp,
            ts_ms,
            raw: self.raw.clone(),
            metrics: self.metrics.clone(),
        }
    }
}
