//! 车队遥测 HTTP API：REST 接口、后台同步循环与请求追踪 ID。

mod handlers;
mod middleware;
mod routes;
mod utils;

use axum::{Router, middleware as axum_middleware};
use fleet_auth::{AuthService, JwtManager};
use fleet_config::AppConfig;
use fleet_storage::{
    CustomerStore, DealerStore, InMemoryCustomerStore, InMemoryDealerStore, InMemorySyncJobStore,
    InMemoryUserStore, InMemoryVehicleStore, PgCustomerStore, PgDealerStore, PgSyncJobStore,
    PgUserStore, PgVehicleStore, SyncJobStore, UserStore, VehicleStore, connect_pool,
};
use fleet_sync::{HistorySyncService, SyncEngine, SyncSettings, recover_interrupted_jobs};
use fleet_telemetry::init_tracing;
use fleet_upstream::{HttpTelemetryApi, TelemetryApi, TorCredentials};
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::middleware::request_context;
use crate::routes::create_api_router;

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub vehicle_store: Arc<dyn VehicleStore>,
    pub job_store: Arc<dyn SyncJobStore>,
    pub customer_store: Arc<dyn CustomerStore>,
    pub dealer_store: Arc<dyn DealerStore>,
    pub history_sync: HistorySyncService,
    /// 每辆车保留的历史样本上限。
    pub history_cap: usize,
    /// 写接口是否要求 Bearer token。
    pub write_auth_enabled: bool,
}

struct Stores {
    vehicles: Arc<dyn VehicleStore>,
    jobs: Arc<dyn SyncJobStore>,
    customers: Arc<dyn CustomerStore>,
    dealers: Arc<dyn DealerStore>,
    users: Arc<dyn UserStore>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载本地 .env（如存在），便于直接 cargo run 启动
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    init_tracing();

    let stores = build_stores(&config).await?;

    // 上次进程退出时未完成的补数任务不会再执行
    let recovered = recover_interrupted_jobs(stores.jobs.as_ref()).await?;
    if recovered > 0 {
        warn!(target: "fleet.api", recovered, "history_jobs_interrupted");
    }

    let jwt = JwtManager::new(config.jwt_secret.clone(), config.jwt_access_ttl_seconds);
    let auth = Arc::new(AuthService::new(stores.users.clone(), jwt));
    if auth.seed_default_admin().await? {
        warn!(target: "fleet.api", "default_admin_created");
    }

    let api: Arc<dyn TelemetryApi> = Arc::new(HttpTelemetryApi::new(
        config.tor_base_url.clone(),
        Duration::from_secs(config.tor_login_timeout_seconds),
        Duration::from_secs(config.tor_request_timeout_seconds),
    )?);
    let settings = sync_settings(&config);

    if config.sync_enabled {
        if settings.credentials.username.is_empty() || settings.credentials.password.is_empty() {
            warn!(target: "fleet.api", "sync_disabled_missing_credentials");
        } else {
            SyncEngine::new(api.clone(), stores.vehicles.clone(), settings.clone()).spawn();
            info!(
                target: "fleet.api",
                interval_seconds = config.sync_interval_seconds,
                "sync_loop_started"
            );
        }
    }

    let history_sync = HistorySyncService::new(
        api,
        stores.vehicles.clone(),
        stores.jobs.clone(),
        settings,
    );
    let state = AppState {
        auth,
        vehicle_store: stores.vehicles,
        job_store: stores.jobs,
        customer_store: stores.customers,
        dealer_store: stores.dealers,
        history_sync,
        history_cap: config.history_cap,
        write_auth_enabled: config.write_auth_enabled,
    };

    let app = build_app(state);
    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    info!(target: "fleet.api", addr = %config.http_addr, "http_listening");
    axum::serve(listener, app).await?;
    Ok(())
}

/// 组装路由：同一组接口同时挂载在 `/` 与 `/api` 下。
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(create_api_router())
        .nest("/api", create_api_router())
        .with_state(state)
        // 注入 request_id/trace_id
        .layer(axum_middleware::from_fn(request_context))
        .layer(TraceLayer::new_for_http())
}

/// 配置了数据库时使用 Postgres（共享连接池），否则使用内存存储。
async fn build_stores(config: &AppConfig) -> Result<Stores, Box<dyn std::error::Error>> {
    match config.database_url.as_deref() {
        Some(database_url) => {
            let pool = connect_pool(database_url).await?;
            info!(target: "fleet.api", "store_postgres");
            Ok(Stores {
                vehicles: Arc::new(PgVehicleStore::new(pool.clone())),
                jobs: Arc::new(PgSyncJobStore::new(pool.clone())),
                customers: Arc::new(PgCustomerStore::new(pool.clone())),
                dealers: Arc::new(PgDealerStore::new(pool.clone())),
                users: Arc::new(PgUserStore::new(pool)),
            })
        }
        None => {
            warn!(target: "fleet.api", "store_in_memory");
            Ok(Stores {
                vehicles: Arc::new(InMemoryVehicleStore::new()),
                jobs: Arc::new(InMemorySyncJobStore::new()),
                customers: Arc::new(InMemoryCustomerStore::new()),
                dealers: Arc::new(InMemoryDealerStore::new()),
                users: Arc::new(InMemoryUserStore::new()),
            })
        }
    }
}

fn sync_settings(config: &AppConfig) -> SyncSettings {
    let credentials = TorCredentials::new(
        config.tor_username.clone().unwrap_or_default(),
        config.tor_password.clone().unwrap_or_default(),
    );
    let mut settings = SyncSettings::new(credentials);
    settings.interval = Duration::from_secs(config.sync_interval_seconds);
    settings.page_size = config.tor_page_size;
    settings.history_cap = config.history_cap;
    settings.history_endpoint = config.tor_history_endpoint.clone();
    settings
}


#[cfg(test)]
mod tests {
    use super::build_app;
    use super::test_support::{body_json, get_request, test_state};
    use axum::http::StatusCode;
    use tower::ServiceExt;

    #[tokio::test]
    async fn health_served_on_both_prefixes() {
        for uri in ["/health", "/api/health"] {
            let response = build_app(test_state(false))
                .oneshot(get_request(uri))
                .await
                .expect("response");
            assert_eq!(response.status(), StatusCode::OK);
            assert!(response.headers().contains_key("x-request-id"));
            assert!(response.headers().contains_key("x-trace-id"));
            assert_eq!(body_json(response).await["ok"], true);
        }
    }
}
