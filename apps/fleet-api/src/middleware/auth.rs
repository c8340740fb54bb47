//! 认证和授权中间件
//!
//! 提供以下中间件和辅助函数：
//! - request_context：请求上下文中间件，注入 request_id/trace_id
//! - bearer_token：从 Authorization 头提取 Bearer token
//! - require_principal：验证 token 并提取登录主体
//! - optional_principal：读接口可选认证，携带 token 时按角色过滤
//! - require_write_auth：开启写保护时写接口必须认证
//! - require_admin：账号管理接口在写保护下仅限管理员

use axum::{
    body::Body,
    extract::Request,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    middleware::Next,
    response::Response,
};
use domain::Principal;
use fleet_auth::AuthError;
use fleet_telemetry::new_request_ids;
use tracing::{Instrument, info_span};

use crate::AppState;
use crate::utils::response::{auth_error, forbidden_error, internal_auth_error};

/// 请求上下文中间件：注入 request_id/trace_id
pub async fn request_context(mut req: Request<Body>, next: Next) -> Response {
    let ids = new_request_ids();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    req.extensions_mut().insert(ids.clone());

    let span = info_span!(
        "request",
        request_id = %ids.request_id,
        trace_id = %ids.trace_id,
        method = %method,
        path = %path
    );

    let mut response = next.run(req).instrument(span).await;
    response.headers_mut().insert(
        "x-request-id",
        HeaderValue::from_str(&ids.request_id).unwrap_or_else(|_| HeaderValue::from_static("")),
    );
    response.headers_mut().insert(
        "x-trace-id",
        HeaderValue::from_str(&ids.trace_id).unwrap_or_else(|_| HeaderValue::from_static("")),
    );
    response
}

/// 从请求头中提取 Bearer token
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let header_value = headers.get(header::AUTHORIZATION)?;
    let auth_str = header_value.to_str().ok()?;
    auth_str.strip_prefix("Bearer ")
}

/// 验证 token 并提取登录主体
pub fn require_principal(state: &AppState, headers: &HeaderMap) -> Result<Principal, Response> {
    let token = match bearer_token(headers) {
        Some(token) => token,
        None => return Err(auth_error(StatusCode::UNAUTHORIZED)),
    };
    match state.auth.verify_access_token(token) {
        Ok(principal) => Ok(principal),
        Err(AuthError::TokenInvalid | AuthError::TokenExpired) => {
            Err(auth_error(StatusCode::UNAUTHORIZED))
        }
        Err(err) => Err(internal_auth_error(err)),
    }
}

/// 未携带 token 时为匿名访问；携带了无效 token 则拒绝。
pub fn optional_principal(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Option<Principal>, Response> {
    if bearer_token(headers).is_none() {
        return Ok(None);
    }
    require_principal(state, headers).map(Some)
}

/// 写接口认证：关闭写保护时等同 optional_principal。
pub fn require_write_auth(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Option<Principal>, Response> {
    if state.write_auth_enabled {
        require_principal(state, headers).map(Some)
    } else {
        optional_principal(state, headers)
    }
}

/// 账号管理写接口：开启写保护时仅限管理员。
pub fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<(), Response> {
    match require_write_auth(state, headers)? {
        Some(principal) if state.write_auth_enabled && !principal.is_admin() => {
            Err(forbidden_error())
        }
        _ => Ok(()),
    }
}
