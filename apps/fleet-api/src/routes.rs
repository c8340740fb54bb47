//! 路由定义
//!
//! 集中管理所有 API 路由，将路径映射到对应的 handlers：
//! - 健康检查与计数器：/health, /metrics
//! - 认证：/login
//! - 车辆：/vehicles, /fleet-stats, /telemetry/*
//! - 历史补数：/telemetry/{id}/sync-history, /sync-progress/{job_id}
//! - 档案与账号：/customers, /dealers, /users

use super::AppState;
use super::handlers::*;
use axum::{
    Router,
    routing::{get, post},
};

/// 创建 API 路由
///
/// 返回包含所有 API 端点的 Router，由调用方挂载到 / 和 /api 两种前缀下
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(get_metrics))
        .route("/login", post(login))
        .route("/vehicles", get(list_vehicles))
        .route("/fleet-stats", get(fleet_stats))
        // 字面量路由优先匹配：ID 为 bulk 的车辆不可经 /telemetry/:vehicle_id 访问
        .route("/telemetry/bulk", post(bulk_upsert))
        .route(
            "/telemetry/:vehicle_id",
            get(get_vehicle).post(update_vehicle),
        )
        .route("/telemetry/:vehicle_id/export", get(export_history))
        .route("/telemetry/:vehicle_id/sync-history", post(sync_history))
        .route("/sync-progress/:job_id", get(sync_progress))
        .route("/customers", get(list_customers).post(save_customer))
        .route("/dealers", get(list_dealers).post(save_dealer))
        .route("/users", get(list_users).post(save_user))
}
