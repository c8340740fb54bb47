//! 原始数据报表（CSV）。

use crate::NormalizeError;
use domain::HistorySample;
use serde_json::Value;

/// 报表列（上游原始字段名）。
pub const REPORT_COLUMNS: &[&str] = &[
    "ENTRYDATE", "DeviceDate", "HWID", "ModelNumber", "Latitude", "Longitude",
    "StateofCharge", "TimetoCharge", "DistancetoEmpty1", "KeyOnSignal",
    "BattFaultlight", "BattTemp", "BatteryFault", "BattHighTemp", "HighCutOffTemp",
    "BattLowTemp", "BattLowCutoffTemp", "BattCutoffOverVoltage", "BattOverVoltage",
    "BattLowVoltage", "BattCutoffLowVoltage", "OutputVoltageFailure", "BattInternalFailure",
    "PositiveBusbarHighTemp", "NegativeBusbarHighTemp", "PositiveBusbarOverTemp",
    "NegativeBusbarOverTemp", "LowSOCDuringKeyON", "LowSOCDuringDrive", "TCUCommFailure",
    "DriveCurrentLimit", "BattCurrent", "RegenCurrentLimit", "Vehiclemoderequest",
    "MinCellVoltage", "MaxCellVoltage", "BattCurrent1", "AmpHour", "KWattHour",
    "kWh", "BatteryVoltage", "Odometer", "MCUTem", "MotorTem", "Speed",
    "DriveMode", "RegenFlag", "Battery_swapping_successful", "Battery_State",
    "InputSuppy", "RSSI", "MachineStatus", "Sudden_acceleration", "Sudden_breaking",
    "HarshDriving", "isCharging", "Immobilization_status", "ControllerTemperature",
];

const MISSING_CELL: &str = "---";
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// 读取报表单元格：先精确匹配，再忽略大小写匹配；缺失或 null 输出 `---`。
pub fn report_value(raw: &Value, key: &str) -> String {
    let Some(object) = raw.as_object() else {
        return MISSING_CELL.to_string();
    };
    let value = object.get(key).filter(|value| !value.is_null()).or_else(|| {
        object
            .iter()
            .find(|(name, value)| name.eq_ignore_ascii_case(key) && !value.is_null())
            .map(|(_, value)| value)
    });
    match value {
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
        None => MISSING_CELL.to_string(),
    }
}

/// 导出历史样本为带 BOM 的 CSV（按给定顺序）。
pub fn export_history_csv(samples: &[HistorySample]) -> Result<Vec<u8>, NormalizeError> {
    let mut buffer = UTF8_BOM.to_vec();
    {
        let mut writer = csv::WriterBuilder::new()
            .quote_style(csv::QuoteStyle::Always)
            .from_writer(&mut buffer);
        writer
            .write_record(REPORT_COLUMNS)
            .map_err(|err| NormalizeError::Csv(err.to_string()))?;
        for sample in samples {
            let row = REPORT_COLUMNS
                .iter()
                .map(|key| report_value(&sample.raw, key));
            writer
                .write_record(row)
                .map_err(|err| NormalizeError::Csv(err.to_string()))?;
        }
        writer
            .flush()
            .map_err(|err| NormalizeError::Csv(err.to_string()))?;
    }
    Ok(buffer)
}
