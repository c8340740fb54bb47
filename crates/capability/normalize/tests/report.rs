use domain::{HistorySample, VehicleMetrics};
use fleet_normalize::{REPORT_COLUMNS, export_history_csv, report_value};
use serde_json::json;

fn sample(raw: serde_json::Value) -> HistorySample {
    HistorySample {
        timestamp: "2024-05-01 00:00:00".to_string(),
        ts_ms: 0,
        raw,
        metrics: VehicleMetrics::default(),
    }
}

#[test]
fn report_has_fixed_columns() {
    assert_eq!(REPORT_COLUMNS.len(), 58);
    assert_eq!(REPORT_COLUMNS[0], "ENTRYDATE");
    assert_eq!(REPORT_COLUMNS[57], "ControllerTemperature");
}

#[test]
fn value_lookup_is_exact_then_case_insensitive() {
    let raw = json!({ "hwid": "lower", "Speed": 12, "RSSI": null });
    assert_eq!(report_value(&raw, "HWID"), "lower");
    assert_eq!(report_value(&raw, "Speed"), "12");
    assert_eq!(report_value(&raw, "RSSI"), "---");
    assert_eq!(report_value(&raw, "Odometer"), "---");
    assert_eq!(report_value(&json!("scalar"), "HWID"), "---");

    let both = json!({ "HWID": "exact", "hwid": "other" });
    assert_eq!(report_value(&both, "HWID"), "exact");
}

#[test]
fn export_writes_bom_header_and_quoted_rows() {
    let samples = vec![
        sample(json!({ "ENTRYDATE": "2024-05-01 00:00:00", "HWID": "123", "Speed": 4 })),
        sample(json!({ "HWID": "123" })),
    ];
    let bytes = export_history_csv(&samples).expect("csv");
    assert!(bytes.starts_with(b"\xEF\xBB\xBF"));

    let text = String::from_utf8(bytes[3..].to_vec()).expect("utf8");
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("\"ENTRYDATE\",\"DeviceDate\",\"HWID\""));
    assert!(lines[1].starts_with("\"2024-05-01 00:00:00\",\"---\",\"123\""));
    assert!(lines[2].starts_with("\"---\",\"---\",\"123\""));
    assert_eq!(lines[1].split(',').count(), 58);
}

#[test]
fn empty_history_exports_header_only() {
    let bytes = export_history_csv(&[]).expect("csv");
    let text = String::from_utf8(bytes[3..].to_vec()).expect("utf8");
    assert_eq!(text.lines().count(), 1);
}
