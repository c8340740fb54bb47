//! Handlers 模块

pub mod accounts;
pub mod auth;
pub mod history;
pub mod metrics;
pub mod telemetry;
pub mod vehicles;

pub use accounts::*;
pub use auth::*;
pub use history::*;
pub use metrics::*;
pub use telemetry::*;
pub use vehicles::*;
