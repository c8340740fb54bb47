//! 元数据与最新遥测按硬件 ID 关联并生成规范记录。

use crate::fields::{
    CanonicalField, resolve_f64, resolve_flag, resolve_string,
};
use crate::timestamp::{format_iso_ms, parse_tor_timestamp};
use domain::vehicle::{DEFAULT_TIME_TO_CHARGE, DEFAULT_VEHICLE_MODE};
use domain::{HistorySample, Location, NormalizedVehicle, VehicleMetrics, VehicleStatus};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// 缺失的底盘号/车牌号占位。
pub const MISSING_TEXT: &str = "---";

/// 一次关联的输出。
#[derive(Debug, Default)]
pub struct NormalizeOutcome {
    pub vehicles: Vec<NormalizedVehicle>,
    /// 缺少硬件 ID 被丢弃的遥测行数。
    pub dropped: usize,
}

/// 读取去空白的硬件 ID。
pub fn hardware_id(row: &Value) -> Option<String> {
    resolve_string(row, CanonicalField::HardwareId)
}

/// 以硬件 ID 建立元数据索引，重复 ID 以后出现的为准。
pub fn index_metadata(metadata: &[Value]) -> HashMap<String, &Value> {
    let mut index = HashMap::with_capacity(metadata.len());
    for row in metadata {
        if let Some(id) = hardware_id(row) {
            index.insert(id, row);
        }
    }
    index
}

/// 每条带硬件 ID 的遥测行生成一条记录；无硬件 ID 的行丢弃并计数。
pub fn normalize_fleet(metadata: &[Value], telemetry: &[Value]) -> NormalizeOutcome {
    let index = index_metadata(metadata);
    let empty = Value::Object(Map::new());
    let mut outcome = NormalizeOutcome::default();
    for row in telemetry {
        let Some(id) = hardware_id(row) else {
            outcome.dropped += 1;
            continue;
        };
        let meta = index.get(&id).copied().unwrap_or(&empty);
        outcome.vehicles.push(normalize_row(id, row, meta));
    }
    outcome
}

/// 单行遥测 + 对应元数据 → 规范记录。
pub fn normalize_row(id: String, row: &Value, meta: &Value) -> NormalizedVehicle {
    let display_device_id =
        resolve_string(meta, CanonicalField::EquipmentCode).unwrap_or_else(|| id.clone());
    let chassis_number = resolve_string(meta, CanonicalField::ChassisNumber)
        .unwrap_or_else(|| MISSING_TEXT.to_string());
    let registration_no = resolve_string(meta, CanonicalField::RegistrationNo)
        .unwrap_or_else(|| MISSING_TEXT.to_string());
    let status = resolve_string(row, CanonicalField::Status)
        .map(|value| VehicleStatus::parse(&value))
        .unwrap_or_default();
    NormalizedVehicle {
        id,
        display_device_id,
        chassis_number,
        registration_no,
        status,
        location: Location {
            lat: resolve_f64(row, CanonicalField::Latitude),
            lng: resolve_f64(row, CanonicalField::Longitude),
        },
        metrics: metrics_from_row(row),
        raw: row.clone(),
        equipment_config: meta.clone(),
        sample_timestamp: resolve_string(row, CanonicalField::EntryDate),
    }
}

/// 从遥测行提取指标。
pub fn metrics_from_row(row: &Value) -> VehicleMetrics {
    VehicleMetrics {
        battery_level: resolve_f64(row, CanonicalField::BatteryLevel),
        speed: resolve_f64(row, CanonicalField::Speed),
        ignition: resolve_flag(row, CanonicalField::Ignition),
        total_km: resolve_f64(row, CanonicalField::TotalKm),
        dte: resolve_f64(row, CanonicalField::DistanceToEmpty),
        voltage: resolve_f64(row, CanonicalField::Voltage),
        temp: resolve_f64(row, CanonicalField::BatteryTemp),
        motor_temp: resolve_f64(row, CanonicalField::MotorTemp),
        time_to_charge: resolve_string(row, CanonicalField::TimeToCharge)
            .unwrap_or_else(|| DEFAULT_TIME_TO_CHARGE.to_string()),
        vehicle_mode_request: resolve_string(row, CanonicalField::VehicleMode)
            .unwrap_or_else(|| DEFAULT_VEHICLE_MODE.to_string()),
    }
}

/// 为本周期生成历史样本：优先使用上游时间，缺失时使用同步时刻。
pub fn history_sample(vehicle: &NormalizedVehicle, now_ms: i64) -> HistorySample {
    match vehicle.sample_timestamp.as_deref() {
        Some(timestamp) => {
            let ts_ms = parse_tor_timestamp(timestamp).unwrap_or(now_ms);
            vehicle.to_sample(timestamp.to_string(), ts_ms)
        }
        None => vehicle.to_sample(format_iso_ms(now_ms), now_ms),
    }
}

/// 历史补数行 → 样本；缺少或无法解析时间的行返回 None。
pub fn sample_from_row(row: Value) -> Option<HistorySample> {
    let timestamp = resolve_string(&row, CanonicalField::EntryDate)?;
    let ts_ms = parse_tor_timestamp(&timestamp)?;
    let metrics = metrics_from_row(&row);
    Some(HistorySample {
        timestamp,
        ts_ms,
        raw: row,
        metrics,
    })
}

/// 同一硬件 ID 只保留最后一行，保持首次出现的位置。
pub fn keep_last_per_id(vehicles: Vec<NormalizedVehicle>) -> (Vec<NormalizedVehicle>, usize) {
    let mut positions: HashMap<String, usize> = HashMap::with_capacity(vehicles.len());
    let mut unique: Vec<NormalizedVehicle> = Vec::with_capacity(vehicles.len());
    let mut duplicates = 0;
    for vehicle in vehicles {
        match positions.get(&vehicle.id) {
            Some(&index) => {
                unique[index] = vehicle;
                duplicates += 1;
            }
            None => {
                positions.insert(vehicle.id.clone(), unique.len());
                unique.push(vehicle);
            }
        }
    }
    (unique, duplicates)
}
