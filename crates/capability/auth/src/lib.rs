//! 认证能力：仪表盘登录、JWT 签发与校验、用户开通。

mod jwt;
mod password;

use domain::Principal;
use domain::roles::{ROLE_ADMIN, is_known_role};
use fleet_storage::{UserRecord, UserStore};
use std::sync::Arc;

pub use jwt::JwtManager;
pub use password::{PasswordCheck, hash_password, verify_password_and_maybe_upgrade};

/// 首次启动时创建的管理员账号。
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
const DEFAULT_ADMIN_PASSWORD: &str = "admin";

/// 认证相关错误。
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("token expired")]
    TokenExpired,
    #[error("token invalid")]
    TokenInvalid,
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("internal error: {0}")]
    Internal(String),
}

/// 登录返回的 token 结构。
pub struct AuthTokens {
    pub access_token: String,
    /// 过期时间（Unix 秒）。
    pub expires_at: u64,
}

/// 新建或更新用户的输入；`password` 为空时沿用原密码。
#[derive(Debug, Clone, Default)]
pub struct UserInput {
    pub username: String,
    pub password: Option<String>,
    pub role: String,
    pub customer_code: Option<String>,
    pub assigned_vehicles: Vec<String>,
    /// 关联的客户 / 经销商 ID，存在时按关联查找已有用户。
    pub linked_id: Option<String>,
}

/// 认证服务实现（基于 UserStore + JWT）。
pub struct AuthService {
    user_store: Arc<dyn UserStore>,
    jwt: JwtManager,
}

impl AuthService {
    /// 创建认证服务实例。
    pub fn new(user_store: Arc<dyn UserStore>, jwt: JwtManager) -> Self {
        Self { user_store, jwt }
    }

    /// 登录校验并签发 token；旧明文口令校验通过后升级为 argon2。
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(UserRecord, AuthTokens), AuthError> {
        let mut user = self
            .user_store
            .find_by_username(username)
            .await
            .map_err(|err| AuthError::Internal(err.to_string()))?
            .ok_or(AuthError::InvalidCredentials)?;
        let check = verify_password_and_maybe_upgrade(&user.password, password)?;
        if !check.verified {
            return Err(AuthError::InvalidCredentials);
        }
        if let Some(password_hash) = check.upgrade_hash {
            let updated = self
                .user_store
                .update_password_hash(&user.user_id, &password_hash)
                .await
                .map_err(|err| AuthError::Internal(err.to_string()))?;
            if !updated {
                return Err(AuthError::Internal("password migration update failed".to_string()));
            }
            user.password = password_hash;
        }
        let tokens = self.jwt.issue_tokens(&user.to_principal())?;
        Ok((user, tokens))
    }

    /// 校验 access token 并提取登录主体。
    pub fn verify_access_token(&self, token: &str) -> Result<Principal, AuthError> {
        self.jwt.decode_access(token)
    }

    /// 不存在 admin 时创建默认管理员，返回是否新建。
    pub async fn seed_default_admin(&self) -> Result<bool, AuthError> {
        let existing = self
            .user_store
            .find_by_username(DEFAULT_ADMIN_USERNAME)
            .await
            .map_err(|err| AuthError::Internal(err.to_string()))?;
        if existing.is_some() {
            return Ok(false);
        }
        self.save_user(UserInput {
            username: DEFAULT_ADMIN_USERNAME.to_string(),
            password: Some(DEFAULT_ADMIN_PASSWORD.to_string()),
            role: ROLE_ADMIN.to_string(),
            ..UserInput::default()
        })
        .await?;
        Ok(true)
    }

    /// 新建或更新用户；新用户必须提供密码。
    pub async fn save_user(&self, input: UserInput) -> Result<UserRecord, AuthError> {
        let username = input.username.trim().to_string();
        if username.is_empty() {
            return Err(AuthError::InvalidInput("username required".to_string()));
        }
        if !is_known_role(&input.role) {
            return Err(AuthError::InvalidInput(format!("unknown role: {}", input.role)));
        }
        let password = input
            .password
            .as_deref()
            .filter(|value| !value.is_empty());

        let existing = match input.linked_id.as_deref() {
            Some(linked_id) => self.user_store.find_by_linked_id(linked_id).await,
            None => self.user_store.find_by_username(&username).await,
        }
        .map_err(|err| AuthError::Internal(err.to_string()))?;

        let record = match existing {
            Some(mut user) => {
                if let Some(password) = password {
                    user.password = hash_password(password)?;
                }
                user.username = username;
                user.role = input.role;
                user.customer_code = input.customer_code;
                user.assigned_vehicles = input.assigned_vehicles;
                user.linked_id = input.linked_id.or(user.linked_id);
                user
            }
            None => {
                let password =
                    password.ok_or_else(|| AuthError::InvalidInput("password required".to_string()))?;
                UserRecord {
                    user_id: uuid::Uuid::new_v4().to_string(),
                    username,
                    password: hash_password(password)?,
                    role: input.role,
                    customer_code: input.customer_code,
                    assigned_vehicles: input.assigned_vehicles,
                    linked_id: input.linked_id,
                }
            }
        };

        self.user_store
            .save_user(record)
            .await
            .map_err(|err| AuthError::InvalidInput(err.to_string()))
    }

    /// 档案取消登录权限时删除其关联账号；返回是否存在过账号。
    pub async fn unlink_user(&self, linked_id: &str) -> Result<bool, AuthError> {
        self.user_store
            .delete_by_linked_id(linked_id)
            .await
            .map_err(|err| AuthError::Internal(err.to_string()))
    }

    pub async fn list_users(&self) -> Result<Vec<UserRecord>, AuthError> {
        self.user_store
            .list_users()
            .await
            .map_err(|err| AuthError::Internal(err.to_string()))
    }
}
