//! 健康检查与仪表盘登录
//!
//! - GET /health
//! - POST /login

use api_contract::{ApiResponse, LoginRequest, LoginResponse};
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{info, warn};

use crate::AppState;
use crate::utils::response::{auth_service_error, user_to_dto};

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "ok": true }))
}

/// 用户登录
///
/// 校验用户名口令，签发 access token 并返回用户信息（不含口令）。
///
/// # 错误处理
///
/// - `401 UNAUTHORIZED`: 用户不存在或口令错误
/// - `500 INTERNAL SERVER ERROR`: 存储或签名失败
pub async fn login(State(state): State<AppState>, Json(req): Json<LoginRequest>) -> Response {
    match state.auth.login(req.username.trim(), &req.password).await {
        Ok((user, tokens)) => {
            info!(target: "fleet.api", username = %user.username, role = %user.role, "login_success");
            let response = LoginResponse {
                access_token: tokens.access_token,
                expires: tokens.expires_at.saturating_mul(1000),
                user: user_to_dto(user),
            };
            (StatusCode::OK, Json(ApiResponse::success(response))).into_response()
        }
        Err(err) => {
            warn!(target: "fleet.api", username = %req.username, error = %err, "login_failed");
            auth_service_error(err)
        }
    }
}
