//! 上游遥测标准化：字段映射表、元数据关联、时间解析与原始数据报表。

pub mod fields;
pub mod join;
pub mod report;
pub mod timestamp;

pub use fields::{CanonicalField, FIELD_TABLE, candidates, resolve, resolve_f64, resolve_flag, resolve_string};
pub use join::{
    NormalizeOutcome, hardware_id, history_sample, index_metadata, keep_last_per_id,
    metrics_from_row, normalize_fleet, normalize_row, sample_from_row,
};
pub use report::{REPORT_COLUMNS, export_history_csv, report_value};
pub use timestamp::{format_iso_ms, parse_tor_timestamp};

/// 规范化错误。
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("csv export failed: {0}")]
    Csv(String),
}
