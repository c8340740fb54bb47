//! # Fleet Storage 模块
//!
//! 车辆快照、历史、补数任务与档案的存储抽象。
//!
//! - [`traits`]：异步存储接口
//! - [`models`]：存储记录
//! - [`error`]：统一错误类型
//! - [`connection`]：Postgres 连接池
//! - [`in_memory`]：`RwLock<HashMap>` 实现，未配置数据库时使用，也用于测试
//! - [`postgres`]：sqlx 实现，每辆车一行，历史以 JSONB 数组内嵌
//!
//! 车辆之间的写入相互独立；同一车辆的历史合并在单个事务内完成。

pub mod connection;
pub mod error;
pub mod in_memory;
pub mod models;
pub mod postgres;
pub mod traits;

pub use connection::*;
pub use error::*;
pub use models::*;
pub use traits::*;

pub use in_memory::{
    InMemoryCustomerStore, InMemoryDealerStore, InMemorySyncJobStore, InMemoryUserStore,
    InMemoryVehicleStore,
};

pub use postgres::{PgCustomerStore, PgDealerStore, PgSyncJobStore, PgUserStore, PgVehicleStore};
