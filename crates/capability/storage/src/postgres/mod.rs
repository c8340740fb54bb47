//! # PostgreSQL 存储实现模块
//!
//! 表结构见 `migrations/0001_init.sql`：
//!
//! - `vehicles`：每辆车一行，metrics / raw_tor / equipment_config / history 为 JSONB
//! - `sync_jobs`：历史补数任务
//! - `customers` / `dealers`：档案整体存入 `document` JSONB
//! - `users`：仪表盘用户
//!
//! JSON 列以文本绑定（`$n::jsonb`），读取时转为 `::text` 再反序列化；
//! 时间列为 timestamptz，对外统一为 Unix 毫秒。

pub mod customer;
pub mod dealer;
pub mod sync_job;
pub mod user;
pub mod vehicle;

pub use customer::*;
pub use dealer::*;
pub use sync_job::*;
pub use user::*;
pub use vehicle::*;
