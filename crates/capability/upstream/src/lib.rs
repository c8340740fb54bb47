//! 上游 TOR 遥测接口：凭据登录、分页拉取、显式会话。
//!
//! - [`TelemetryApi`]：传输抽象，生产实现为 [`HttpTelemetryApi`]（reqwest）
//! - [`UpstreamSession`]：持有 bearer token，遇到 401 即失效，下个周期重新登录
//! - [`fetch_all_pages`]：顺序分页，短页或空页终止，出错保留已拉取数据

mod client;
mod envelope;
mod paging;

use async_trait::async_trait;
use serde_json::Value;

pub use client::HttpTelemetryApi;
pub use envelope::{extract_rows, extract_token};
pub use paging::{MAX_PAGES, PageFetch, PageFilter, fetch_all_pages};

/// 登录接口。
pub const LOGIN_ENDPOINT: &str = "/Auth/login";
/// 车辆元数据分页接口。
pub const VEHICLE_DETAILS_ENDPOINT: &str = "/EquipDetails/GetVehicleDetails";
/// 最新遥测分页接口。
pub const LATEST_MACHINE_DATA_ENDPOINT: &str = "/MachineData/GetLatestMachineData";

/// 上游调用错误。
#[derive(Debug, Clone, thiserror::Error)]
pub enum UpstreamError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("unexpected status: {0}")]
    Status(u16),
    #[error("invalid response: {0}")]
    Decode(String),
    #[error("login response carried no token")]
    MissingToken,
}

impl UpstreamError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

/// 上游账号凭据。
#[derive(Clone)]
pub struct TorCredentials {
    pub username: String,
    pub password: String,
}

impl TorCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for TorCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TorCredentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// 上游传输抽象，便于替换实现与测试。
#[async_trait]
pub trait TelemetryApi: Send + Sync {
    /// 凭据登录，返回 bearer token。
    async fn login(&self, credentials: &TorCredentials) -> Result<String, UpstreamError>;

    /// 请求单页数据，返回该页的行。
    async fn fetch_page(
        &self,
        token: &str,
        endpoint: &str,
        body: &Value,
    ) -> Result<Vec<Value>, UpstreamError>;
}

/// 上游会话：UNAUTHENTICATED（无 token）/ AUTHENTICATED（有 token）。
#[derive(Debug, Default)]
pub struct UpstreamSession {
    token: Option<String>,
}

impl UpstreamSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    /// 丢弃缓存 token（收到 401 时调用）。
    pub fn invalidate(&mut self) {
        self.token = None;
    }

    /// 登录并缓存 token；失败时会话保持未认证。
    pub async fn authenticate(
        &mut self,
        api: &dyn TelemetryApi,
        credentials: &TorCredentials,
    ) -> Result<(), UpstreamError> {
        self.token = None;
        let token = api.login(credentials).await?;
        self.token = Some(token);
        Ok(())
    }
}
