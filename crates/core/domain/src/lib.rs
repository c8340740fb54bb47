//! 车队遥测领域模型：车辆快照、历史样本、登录主体。

pub mod history;
pub mod roles;
pub mod vehicle;

pub use history::{HISTORY_CAP, merge_capped, prepend_capped};
pub use vehicle::{HistorySample, Location, NormalizedVehicle, VehicleMetrics, VehicleStatus};

/// 已认证的仪表盘用户：读写接口共享的执行主体。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Principal {
    pub user_id: String,
    pub username: String,
    pub role: String,
    /// Customer 角色可见的客户编码。
    pub customer_code: Option<String>,
    /// User 角色可见的车辆硬件 ID。
    pub assigned_vehicles: Vec<String>,
}

impl Principal {
    pub fn new(user_id: impl Into<String>, username: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
            role: role.into(),
            customer_code: None,
            assigned_vehicles: Vec::new(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == roles::ROLE_ADMIN
    }

    /// 判断车辆对当前主体是否可见。
    ///
    /// Customer 按 equipmentConfig.customerCode 过滤，User 按分配列表过滤，其余角色可见全部。
    pub fn can_view(&self, vehicle_id: &str, equipment_config: &serde_json::Value) -> bool {
        match self.role.as_str() {
            roles::ROLE_CUSTOMER => {
                let code = equipment_config
                    .get("customerCode")
                    .and_then(|value| value.as_str());
                matches!((code, self.customer_code.as_deref()), (Some(a), Some(b)) if a == b)
            }
            roles::ROLE_USER => self.assigned_vehicles.iter().any(|id| id == vehicle_id),
            _ => true,
        }
    }
}

/// 当前 Unix 毫秒时间戳。
pub fn now_epoch_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
