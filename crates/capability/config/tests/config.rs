use fleet_config::{AppConfig, ConfigError};

// 环境变量为进程级共享状态，所有场景放在同一个测试内顺序执行。
#[test]
fn load_config_from_env() {
    // Rust 2024 中 set_var 需要显式标注 unsafe（测试进程内可控）。
    unsafe {
        std::env::set_var("FLEET_JWT_SECRET", "secret");
        std::env::set_var("FLEET_HTTP_ADDR", "127.0.0.1:8081");
        std::env::set_var("FLEET_SYNC", "on");
        std::env::remove_var("TOR_USERNAME");
        std::env::remove_var("TOR_PASSWORD");
    }
    let err = AppConfig::from_env().expect_err("credentials required");
    assert!(matches!(err, ConfigError::Missing(key) if key == "TOR_USERNAME"));

    unsafe {
        std::env::set_var("TOR_USERNAME", "ops@example.com");
        std::env::set_var("TOR_PASSWORD", "pw");
        std::env::set_var("TOR_BASE_URL", "http://127.0.0.1:9000/");
    }
    let config = AppConfig::from_env().expect("config");
    assert_eq!(config.http_addr, "127.0.0.1:8081");
    assert_eq!(config.tor_base_url, "http://127.0.0.1:9000");
    assert_eq!(config.tor_page_size, 1000);
    assert_eq!(config.tor_login_timeout_seconds, 15);
    assert_eq!(config.tor_request_timeout_seconds, 60);
    assert_eq!(config.sync_interval_seconds, 20);
    assert_eq!(config.history_cap, 500);
    assert_eq!(config.jwt_access_ttl_seconds, 86_400);
    assert!(!config.write_auth_enabled);

    unsafe {
        std::env::set_var("FLEET_HISTORY_CAP", "0");
    }
    let err = AppConfig::from_env().expect_err("zero cap");
    assert!(matches!(err, ConfigError::Invalid(key, _) if key == "FLEET_HISTORY_CAP"));

    unsafe {
        std::env::set_var("FLEET_HISTORY_CAP", "20");
        std::env::set_var("FLEET_SYNC", "off");
        std::env::remove_var("TOR_USERNAME");
    }
    let config = AppConfig::from_env().expect("sync disabled");
    assert!(!config.sync_enabled);
    assert_eq!(config.history_cap, 20);
}
