//! 内存存储实现模块
//!
//! 未配置数据库时使用，也用于测试。进程退出后数据丢失。

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
