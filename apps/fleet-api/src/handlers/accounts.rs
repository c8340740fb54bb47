//! 档案与账号 handlers
//!
//! - GET/POST /customers - 客户列表 / 保存（带 id 为整体替换）
//! - GET/POST /dealers - 经销商列表 / 保存
//! - GET/POST /users - 仪表盘用户列表 / 保存
//!
//! 客户、经销商先保存档案，再按 isUser 开通或删除关联的登录账号（按档案 ID 关联）。
//! 开通失败时档案恢复到保存前的状态。
//! 开启写保护时写接口仅限管理员。

use api_contract::{
    ApiResponse, CustomerDto, DealerDto, SaveCustomerRequest, SaveDealerRequest, SaveUserRequest,
    UserDto,
};
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use domain::roles::{ROLE_CUSTOMER, ROLE_DEALER, ROLE_USER};
use fleet_auth::UserInput;
use fleet_storage::{CustomerRecord, DealerRecord};
use tracing::{info, warn};
use uuid::Uuid;

use crate::AppState;
use crate::middleware::require_admin;
use crate::utils::response::{
    auth_service_error, customer_to_dto, dealer_to_dto, storage_error, user_to_dto,
};
use crate::utils::{normalize_optional, normalize_required};

/// 勾选 isUser 时取出用户名；未勾选返回 None。
fn login_username(is_user: bool, username: Option<String>) -> Result<Option<String>, Response> {
    if !is_user {
        return Ok(None);
    }
    normalize_required(username.unwrap_or_default(), "username").map(Some)
}

/// 按档案 ID 开通或更新关联的登录账号；用户名为空时删除已有账号。
async fn link_login(
    state: &AppState,
    linked_id: &str,
    username: Option<String>,
    password: Option<String>,
    role: &str,
    customer_code: Option<String>,
) -> Result<(), Response> {
    let Some(username) = username else {
        let removed = state
            .auth
            .unlink_user(linked_id)
            .await
            .map_err(auth_service_error)?;
        if removed {
            info!(target: "fleet.api", linked_id, "linked_user_removed");
        }
        return Ok(());
    };
    let user = state
        .auth
        .save_user(UserInput {
            username,
            password,
            role: role.to_string(),
            customer_code,
            assigned_vehicles: Vec::new(),
            linked_id: Some(linked_id.to_string()),
        })
        .await
        .map_err(auth_service_error)?;
    info!(target: "fleet.api", linked_id, username = %user.username, role, "linked_user_saved");
    Ok(())
}

pub async fn list_customers(State(state): State<AppState>) -> Response {
    match state.customer_store.list_customers().await {
        Ok(items) => {
            let data: Vec<CustomerDto> = items.into_iter().map(customer_to_dto).collect();
            (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
        }
        Err(err) => storage_error(err),
    }
}

/// 保存客户
///
/// # 错误处理
///
/// - `400 BAD REQUEST`: 客户编码 / 名称缺失，或开通账号时用户名缺失、新账号未给口令、用户名冲突
///   （后三种情况档案恢复原状）
/// - `401 UNAUTHORIZED` / `403 FORBIDDEN`: 开启写保护且非管理员
pub async fn save_customer(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<SaveCustomerRequest>,
) -> Response {
    if let Err(response) = require_admin(&state, &headers) {
        return response;
    }
    let customer_code = match normalize_required(req.customer_code, "customerCode") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let customer_name = match normalize_required(req.customer_name, "customerName") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let customer_id = match normalize_optional(req.id, "id") {
        Ok(value) => value.unwrap_or_else(|| Uuid::new_v4().to_string()),
        Err(response) => return response,
    };

    let username = match login_username(req.is_user, req.username) {
        Ok(value) => value,
        Err(response) => return response,
    };
    let previous = match state.customer_store.find_customer(&customer_id).await {
        Ok(previous) => previous,
        Err(err) => return storage_error(err),
    };

    let record = CustomerRecord {
        customer_id,
        customer_code,
        customer_name,
        phone_no: req.phone_no,
        whatsapp_no: req.whatsapp_no,
        email_id: req.email_id,
        onboard_date: req.onboard_date,
        address: req.address,
        city: req.city,
        state: req.state,
        country: req.country,
        manufacturing_year: req.manufacturing_year,
        timezone_name: req.timezone_name,
        parent_position_name: req.parent_position_name,
        dealer_code: req.dealer_code,
        is_user: username.is_some(),
        username: username.clone(),
    };
    let item = match state.customer_store.save_customer(record).await {
        Ok(item) => item,
        Err(err) => return storage_error(err),
    };

    if let Err(response) = link_login(
        &state,
        &item.customer_id,
        username,
        req.password,
        ROLE_CUSTOMER,
        Some(item.customer_code.clone()),
    )
    .await
    {
        let restored = previous.unwrap_or_else(|| CustomerRecord {
            is_user: false,
            username: None,
            ..item
        });
        if let Err(err) = state.customer_store.save_customer(restored).await {
            warn!(target: "fleet.api", error = %err, "customer_restore_failed");
        }
        return response;
    }
    info!(target: "fleet.api", customer_id = %item.customer_id, "customer_saved");
    (StatusCode::OK, Json(ApiResponse::success(customer_to_dto(item)))).into_response()
}

pub async fn list_dealers(State(state): State<AppState>) -> Response {
    match state.dealer_store.list_dealers().await {
        Ok(items) => {
            let data: Vec<DealerDto> = items.into_iter().map(dealer_to_dto).collect();
            (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
        }
        Err(err) => storage_error(err),
    }
}

/// 保存经销商
pub async fn save_dealer(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<SaveDealerRequest>,
) -> Response {
    if let Err(response) = require_admin(&state, &headers) {
        return response;
    }
    let dealer_code = match normalize_required(req.dealer_code, "dealerCode") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let dealer_name = match normalize_required(req.dealer_name, "dealerName") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let dealer_id = match normalize_optional(req.id, "id") {
        Ok(value) => value.unwrap_or_else(|| Uuid::new_v4().to_string()),
        Err(response) => return response,
    };

    let username = match login_username(req.is_user, req.username) {
        Ok(value) => value,
        Err(response) => return response,
    };
    let previous = match state.dealer_store.find_dealer(&dealer_id).await {
        Ok(previous) => previous,
        Err(err) => return storage_error(err),
    };

    let record = DealerRecord {
        dealer_id,
        dealer_name,
        dealer_contact_person: req.dealer_contact_person,
        dealer_contact_number: req.dealer_contact_number,
        dealer_code,
        address: req.address,
        email: req.email,
        state: req.state,
        city: req.city,
        is_user: username.is_some(),
        username: username.clone(),
    };
    let item = match state.dealer_store.save_dealer(record).await {
        Ok(item) => item,
        Err(err) => return storage_error(err),
    };

    if let Err(response) =
        link_login(&state, &item.dealer_id, username, req.password, ROLE_DEALER, None).await
    {
        let restored = previous.unwrap_or_else(|| DealerRecord {
            is_user: false,
            username: None,
            ..item
        });
        if let Err(err) = state.dealer_store.save_dealer(restored).await {
            warn!(target: "fleet.api", error = %err, "dealer_restore_failed");
        }
        return response;
    }
    info!(target: "fleet.api", dealer_id = %item.dealer_id, "dealer_saved");
    (StatusCode::OK, Json(ApiResponse::success(dealer_to_dto(item)))).into_response()
}

pub async fn list_users(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Err(response) = require_admin(&state, &headers) {
        return response;
    }
    match state.auth.list_users().await {
        Ok(items) => {
            let data: Vec<UserDto> = items.into_iter().map(user_to_dto).collect();
            (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
        }
        Err(err) => auth_service_error(err),
    }
}

/// 保存用户：同名用户存在时更新，口令为空则保留原口令；角色缺省为 User。
pub async fn save_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<SaveUserRequest>,
) -> Response {
    if let Err(response) = require_admin(&state, &headers) {
        return response;
    }
    let username = match normalize_required(req.username, "username") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let role = match normalize_optional(req.role, "role") {
        Ok(value) => value.unwrap_or_else(|| ROLE_USER.to_string()),
        Err(response) => return response,
    };
    let input = UserInput {
        username,
        password: req.password,
        role,
        customer_code: req.customer_code.filter(|code| !code.trim().is_empty()),
        assigned_vehicles: req.assigned_vehicles.unwrap_or_default(),
        linked_id: None,
    };
    match state.auth.save_user(input).await {
        Ok(user) => {
            info!(target: "fleet.api", username = %user.username, role = %user.role, "user_saved");
            (StatusCode::OK, Json(ApiResponse::success(user_to_dto(user)))).into_response()
        }
        Err(err) => auth_service_error(err),
    }
}
