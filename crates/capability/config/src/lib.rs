//! 应用运行配置加载。

use std::env;

/// 配置加载错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env: {0}")]
    Missing(String),
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
}

/// 应用运行配置。
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_addr: String,
    /// 未配置时使用内存存储。
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub jwt_access_ttl_seconds: u64,
    /// 写接口是否要求 Bearer token。
    pub write_auth_enabled: bool,
    pub tor_base_url: String,
    pub tor_username: Option<String>,
    pub tor_password: Option<String>,
    pub tor_page_size: u64,
    pub tor_login_timeout_seconds: u64,
    pub tor_request_timeout_seconds: u64,
    pub tor_history_endpoint: String,
    pub sync_enabled: bool,
    pub sync_interval_seconds: u64,
    pub history_cap: usize,
}

impl AppConfig {
    /// 从环境变量读取配置。
    pub fn from_env() -> Result<Self, ConfigError> {
        let jwt_secret = env::var("FLEET_JWT_SECRET")
            .map_err(|_| ConfigError::Missing("FLEET_JWT_SECRET".to_string()))?;
        let jwt_access_ttl_seconds = read_u64_with_default("FLEET_JWT_TTL_SECONDS", 86_400)?;
        let http_addr = env::var("FLEET_HTTP_ADDR").unwrap_or_else(|_| "0.0.0.0:5000".to_string());
        let database_url = read_optional("FLEET_DATABASE_URL");
        let write_auth_enabled = read_bool_with_default("FLEET_WRITE_AUTH", false);

        let tor_base_url = env::var("TOR_BASE_URL")
            .unwrap_or_else(|_| "https://torapis.tor-iot.com".to_string())
            .trim_end_matches('/')
            .to_string();
        let tor_username = read_optional("TOR_USERNAME");
        let tor_password = read_optional("TOR_PASSWORD");
        let tor_page_size = read_positive_u64("TOR_PAGE_SIZE", 1000)?;
        let tor_login_timeout_seconds = read_positive_u64("TOR_LOGIN_TIMEOUT_SECONDS", 15)?;
        let tor_request_timeout_seconds = read_positive_u64("TOR_REQUEST_TIMEOUT_SECONDS", 60)?;
        let tor_history_endpoint = env::var("TOR_HISTORY_ENDPOINT")
            .unwrap_or_else(|_| "/MachineData/GetMachineDataHistory".to_string());

        let sync_enabled = read_bool_with_default("FLEET_SYNC", true);
        let sync_interval_seconds = read_positive_u64("FLEET_SYNC_INTERVAL_SECONDS", 20)?;
        let history_cap = read_positive_u64("FLEET_HISTORY_CAP", 500)? as usize;

        // 同步开启时上游凭据必填
        if sync_enabled {
            if tor_username.is_none() {
                return Err(ConfigError::Missing("TOR_USERNAME".to_string()));
            }
            if tor_password.is_none() {
                return Err(ConfigError::Missing("TOR_PASSWORD".to_string()));
            }
        }

        Ok(Self {
            http_addr,
            database_url,
            jwt_secret,
            jwt_access_ttl_seconds,
            write_auth_enabled,
            tor_base_url,
            tor_username,
            tor_password,
            tor_page_size,
            tor_login_timeout_seconds,
            tor_request_timeout_seconds,
            tor_history_endpoint,
            sync_enabled,
            sync_interval_seconds,
            history_cap,
        })
    }
}

fn read_u64_with_default(key: &str, default: u64) -> Result<u64, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u64>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_positive_u64(key: &str, default: u64) -> Result<u64, ConfigError> {
    let value = read_u64_with_default(key, default)?;
    if value == 0 {
        return Err(ConfigError::Invalid(key.to_string(), "0".to_string()));
    }
    Ok(value)
}

fn read_optional(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.is_empty() => Some(value),
        _ => None,
    }
}

fn read_bool_with_default(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(value) => matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "on"),
        Err(_) => default,
    }
}
