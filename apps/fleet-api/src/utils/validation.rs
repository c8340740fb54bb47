//! 输入验证辅助函数
//!
//! - normalize_required：验证必填字段，去除空格并检查非空
//! - normalize_optional：验证可选字段，如果提供则去除空格并检查非空
//! - parse_status：车辆状态字符串校验

use crate::utils::response::bad_request_error;
use axum::response::Response;
use domain::VehicleStatus;

/// 验证必填字段，去除空格并检查非空
pub fn normalize_required(value: String, field: &str) -> Result<String, Response> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(bad_request_error(format!("{field} required")));
    }
    Ok(trimmed.to_string())
}

/// 验证可选字段，如果提供则去除空格并检查非空
pub fn normalize_optional(value: Option<String>, field: &str) -> Result<Option<String>, Response> {
    match value {
        Some(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return Err(bad_request_error(format!("{field} required")));
            }
            Ok(Some(trimmed.to_string()))
        }
        None => Ok(None),
    }
}

/// 车辆状态：不能为空，未知取值原样保留。
pub fn parse_status(value: Option<String>) -> Result<Option<VehicleStatus>, Response> {
    Ok(normalize_optional(value, "status")?.map(|value| VehicleStatus::parse(&value)))
}
