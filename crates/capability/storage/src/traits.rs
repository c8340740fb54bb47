//! 存储接口 Trait 定义
//!
//! - VehicleStore：车辆当前状态与历史
//! - SyncJobStore：历史补数任务
//! - CustomerStore / DealerStore：档案
//! - UserStore：仪表盘用户
//!
//! 所有接口返回 StorageError，使用 async_trait 支持动态分发。

use crate::error::StorageError;
use crate::models::{
    CustomerRecord, DealerRecord, SyncJobRecord, UserRecord, VehicleRecord, VehicleUpdate,
};
use async_trait::async_trait;
use domain::{HistorySample, NormalizedVehicle};

/// 车辆存储接口
#[async_trait]
pub trait VehicleStore: Send + Sync {
    /// 列出全部车辆（不含历史）
    async fn list_vehicles(&self) -> Result<Vec<VehicleRecord>, StorageError>;

    /// 查找车辆（含历史）
    async fn find_vehicle(&self, vehicle_id: &str) -> Result<Option<VehicleRecord>, StorageError>;

    /// 同步写入：覆盖当前状态，头插样本并截断到 `cap`。
    async fn upsert_vehicle(
        &self,
        vehicle: &NormalizedVehicle,
        sample: HistorySample,
        cap: usize,
        now_ms: i64,
    ) -> Result<(), StorageError>;

    /// 手动编辑；车辆不存在时返回 None。
    async fn update_vehicle(
        &self,
        vehicle_id: &str,
        update: VehicleUpdate,
        now_ms: i64,
    ) -> Result<Option<VehicleRecord>, StorageError>;

    /// 合并补数样本，返回新插入条数；车辆不存在时返回 None。
    async fn merge_history(
        &self,
        vehicle_id: &str,
        samples: Vec<HistorySample>,
        cap: usize,
    ) -> Result<Option<usize>, StorageError>;
}

/// 历史补数任务存储接口
#[async_trait]
pub trait SyncJobStore: Send + Sync {
    async fn create_job(&self, record: SyncJobRecord) -> Result<SyncJobRecord, StorageError>;

    async fn find_job(&self, job_id: &str) -> Result<Option<SyncJobRecord>, StorageError>;

    /// 整条覆盖；任务不存在时返回 false。
    async fn update_job(&self, record: &SyncJobRecord) -> Result<bool, StorageError>;

    /// 将所有 pending / running 任务置为 error，返回受影响条数。
    async fn fail_unfinished_jobs(&self, message: &str, now_ms: i64) -> Result<u64, StorageError>;
}

/// 客户存储接口
#[async_trait]
pub trait CustomerStore: Send + Sync {
    async fn list_customers(&self) -> Result<Vec<CustomerRecord>, StorageError>;

    async fn find_customer(&self, customer_id: &str) -> Result<Option<CustomerRecord>, StorageError>;

    /// 按 ID 新建或整条替换
    async fn save_customer(&self, record: CustomerRecord) -> Result<CustomerRecord, StorageError>;
}

/// 经销商存储接口
#[async_trait]
pub trait DealerStore: Send + Sync {
    async fn list_dealers(&self) -> Result<Vec<DealerRecord>, StorageError>;

    async fn find_dealer(&self, dealer_id: &str) -> Result<Option<DealerRecord>, StorageError>;

    async fn save_dealer(&self, record: DealerRecord) -> Result<DealerRecord, StorageError>;
}

/// 用户存储接口
///
/// 提供用户查询功能（禁止在 handler 中直接连 SQL）。
#[async_trait]
pub trait UserStore: Send + Sync {
    /// 根据用户名查找用户
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, StorageError>;

    /// 根据关联的客户 / 经销商 ID 查找用户
    async fn find_by_linked_id(&self, linked_id: &str) -> Result<Option<UserRecord>, StorageError>;

    async fn list_users(&self) -> Result<Vec<UserRecord>, StorageError>;

    /// 按 user_id 新建或整条替换；用户名与其他用户冲突时报错。
    async fn save_user(&self, record: UserRecord) -> Result<UserRecord, StorageError>;

    /// 更新密码哈希（用于登录时升级旧密码）
    async fn update_password_hash(
        &self,
        user_id: &str,
        password_hash: &str,
    ) -> Result<bool, StorageError>;
    /// 删除关联到档案的登录账号，返回是否删除了记录
    async fn delete_by_linked_id(&self, linked_id: &str) -> Result<bool, StorageError>;
}
