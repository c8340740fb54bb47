//! 字段映射表：规范字段 → 按优先级排列的上游候选键。
//!
//! 上游键名不统一，解析时取第一个存在且非 null 的候选键。

use serde_json::Value;

/// 规范字段。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalField {
    HardwareId,
    EquipmentCode,
    ChassisNumber,
    RegistrationNo,
    Status,
    Latitude,
    Longitude,
    BatteryLevel,
    Speed,
    Ignition,
    TotalKm,
    DistanceToEmpty,
    Voltage,
    BatteryTemp,
    MotorTemp,
    TimeToCharge,
    VehicleMode,
    EntryDate,
}

/// 声明式映射表。
pub const FIELD_TABLE: &[(CanonicalField, &[&str])] = &[
    (CanonicalField::HardwareId, &["HWID", "hardwareId", "HardwareId", "hwid"]),
    (CanonicalField::EquipmentCode, &["equipmentCode", "EquipmentCode"]),
    (CanonicalField::ChassisNumber, &["vehicleChassisNo", "VehicleChassisNo", "chassisNumber"]),
    (CanonicalField::RegistrationNo, &["vehicleRegNo", "VehicleRegNo", "registrationNo"]),
    (CanonicalField::Status, &["MachineStatus", "machineStatus"]),
    (CanonicalField::Latitude, &["Latitude", "latitude"]),
    (CanonicalField::Longitude, &["Longitude", "longitude"]),
    (CanonicalField::BatteryLevel, &["StateofCharge", "stateOfCharge", "SOC", "soc"]),
    (CanonicalField::Speed, &["Speed", "speed"]),
    (CanonicalField::Ignition, &["KeyOnSignal", "keyOnSignal"]),
    (CanonicalField::TotalKm, &["Odometer", "odometer"]),
    (CanonicalField::DistanceToEmpty, &["DistancetoEmpty1", "DistanceToEmpty", "distanceToEmpty"]),
    (CanonicalField::Voltage, &["BatteryVoltage", "batteryVoltage"]),
    (CanonicalField::BatteryTemp, &["BatteryTemp", "BattTemp"]),
    (CanonicalField::MotorTemp, &["MotorTemp", "MotorTem"]),
    (CanonicalField::TimeToCharge, &["TimetoCharge", "TimeToCharge"]),
    (CanonicalField::VehicleMode, &["VehicleMode", "Vehiclemoderequest"]),
    (CanonicalField::EntryDate, &["ENTRYDATE", "DeviceDate", "entryDate"]),
];

/// 查询规范字段的候选键。
pub fn candidates(field: CanonicalField) -> &'static [&'static str] {
    FIELD_TABLE
        .iter()
        .find(|(canonical, _)| *canonical == field)
        .map(|(_, keys)| *keys)
        .unwrap_or(&[])
}

/// 取第一个存在且非 null 的候选值。
pub fn resolve(row: &Value, field: CanonicalField) -> Option<&Value> {
    candidates(field)
        .iter()
        .filter_map(|key| row.get(*key))
        .find(|value| !value.is_null())
}

/// 解析为字符串；空白字符串视为缺失。
pub fn resolve_string(row: &Value, field: CanonicalField) -> Option<String> {
    let text = match resolve(row, field)? {
        Value::String(text) => text.trim().to_string(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        _ => return None,
    };
    if text.is_empty() { None } else { Some(text) }
}

/// 解析为数值；缺失、非数值、非有限值均回退为 0。
pub fn resolve_f64(row: &Value, field: CanonicalField) -> f64 {
    resolve(row, field).and_then(parse_number).unwrap_or(0.0)
}

/// 解析开关量：`1`、`"1"`、`true` 为真。
pub fn resolve_flag(row: &Value, field: CanonicalField) -> bool {
    match resolve(row, field) {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(number)) => number.as_f64() == Some(1.0),
        Some(Value::String(text)) => matches!(text.trim(), "1" | "true"),
        _ => false,
    }
}

fn parse_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}
