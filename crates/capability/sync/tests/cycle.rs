mod support;

use fleet_storage::{InMemoryVehicleStore, VehicleStore};
use fleet_sync::{SyncEngine, SyncSettings};
use fleet_upstream::{
    LATEST_MACHINE_DATA_ENDPOINT, UpstreamError, UpstreamSession, VEHICLE_DETAILS_ENDPOINT,
};
use serde_json::json;
use std::sync::Arc;
use support::{FakeApi, credentials};

fn engine(api: Arc<FakeApi>, store: Arc<InMemoryVehicleStore>, cap: usize, page_size: u64) -> SyncEngine {
    let mut settings = SyncSettings::new(credentials());
    settings.history_cap = cap;
    settings.page_size = page_size;
    SyncEngine::new(api, store, settings)
}

#[tokio::test]
async fn metadata_and_telemetry_join_into_store() {
    let api = Arc::new(FakeApi::new());
    api.set_rows(
        VEHICLE_DETAILS_ENDPOINT,
        vec![json!({ "HWID": "123", "equipmentCode": "OM-1" })],
    );
    api.set_rows(
        LATEST_MACHINE_DATA_ENDPOINT,
        vec![json!({ "HWID": "123", "StateofCharge": "80", "Speed": "0" })],
    );
    let store = Arc::new(InMemoryVehicleStore::new());
    let engine = engine(api.clone(), store.clone(), 500, 1000);

    let mut session = UpstreamSession::new();
    let report = engine.run_cycle(&mut session).await;
    assert!(!report.skipped);
    assert_eq!(report.upserted, 1);
    assert!(session.is_authenticated());

    let record = store.find_vehicle("123").await.expect("find").expect("vehicle");
    assert_eq!(record.display_device_id, "OM-1");
    assert_eq!(record.metrics.battery_level, 80.0);
    assert_eq!(record.metrics.speed, 0.0);
    assert_eq!(record.history.len(), 1);

    // 两个接口各请求一页（短页即停止），均携带登录 token
    let requests = api.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests.iter().all(|(token, _, _)| token == "token-1"));
    assert_eq!(requests[0].1, VEHICLE_DETAILS_ENDPOINT);
    assert_eq!(requests[1].2["pageSize"], 1000);
}

#[tokio::test]
async fn login_failure_skips_cycle() {
    let api = Arc::new(FakeApi::new());
    api.push_login(Err(UpstreamError::Status(500)));
    api.set_rows(LATEST_MACHINE_DATA_ENDPOINT, vec![json!({ "HWID": "A" })]);
    let store = Arc::new(InMemoryVehicleStore::new());
    let engine = engine(api.clone(), store.clone(), 500, 1000);

    let mut session = UpstreamSession::new();
    let report = engine.run_cycle(&mut session).await;
    assert!(report.skipped);
    assert!(!session.is_authenticated());
    assert!(api.requests().is_empty());
    assert!(store.list_vehicles().await.expect("list").is_empty());

    // 下一周期重新登录
    let report = engine.run_cycle(&mut session).await;
    assert!(!report.skipped);
    assert_eq!(api.login_calls(), 2);
    assert_eq!(report.upserted, 1);
}

#[tokio::test]
async fn history_length_is_bounded_by_cap() {
    let api = Arc::new(FakeApi::new());
    let store = Arc::new(InMemoryVehicleStore::new());
    let engine = engine(api.clone(), store.clone(), 3, 1000);
    let mut session = UpstreamSession::new();

    // 每个周期的上游时间各不相同
    let entry_date = |minute: u32| format!("2024-05-01T00:{minute:02}:00Z");
    for minute in 0..2 {
        api.set_rows(
            LATEST_MACHINE_DATA_ENDPOINT,
            vec![json!({ "HWID": "A", "ENTRYDATE": entry_date(minute) })],
        );
        engine.run_cycle(&mut session).await;
    }
    let record = store.find_vehicle("A").await.expect("find").expect("vehicle");
    assert_eq!(record.history.len(), 2);

    for minute in 2..6 {
        api.set_rows(
            LATEST_MACHINE_DATA_ENDPOINT,
            vec![json!({ "HWID": "A", "ENTRYDATE": entry_date(minute) })],
        );
        engine.run_cycle(&mut session).await;
    }
    let record = store.find_vehicle("A").await.expect("find").expect("vehicle");
    let timestamps: Vec<&str> = record
        .history
        .iter()
        .map(|sample| sample.timestamp.as_str())
        .collect();
    assert_eq!(
        timestamps,
        vec!["2024-05-01T00:05:00Z", "2024-05-01T00:04:00Z", "2024-05-01T00:03:00Z"]
    );
    assert_eq!(api.login_calls(), 1);
}

#[tokio::test]
async fn unauthorized_telemetry_keeps_fetched_rows() {
    let api = Arc::new(FakeApi::new());
    api.push_page(LATEST_MACHINE_DATA_ENDPOINT, Ok(vec![json!({ "HWID": "A" })]));
    api.push_page(LATEST_MACHINE_DATA_ENDPOINT, Err(UpstreamError::Unauthorized));
    let store = Arc::new(InMemoryVehicleStore::new());
    let engine = engine(api.clone(), store.clone(), 500, 1);

    let mut session = UpstreamSession::new();
    let report = engine.run_cycle(&mut session).await;
    assert!(report.unauthorized);
    assert_eq!(report.upserted, 1);
    assert!(!session.is_authenticated());

    engine.run_cycle(&mut session).await;
    assert_eq!(api.login_calls(), 2);
}

#[tokio::test]
async fn unauthorized_metadata_ends_cycle() {
    let api = Arc::new(FakeApi::new());
    api.push_page(VEHICLE_DETAILS_ENDPOINT, Err(UpstreamError::Unauthorized));
    api.set_rows(LATEST_MACHINE_DATA_ENDPOINT, vec![json!({ "HWID": "A" })]);
    let store = Arc::new(InMemoryVehicleStore::new());
    let engine = engine(api.clone(), store.clone(), 500, 1000);

    let mut session = UpstreamSession::new();
    let report = engine.run_cycle(&mut session).await;
    assert!(report.unauthorized);
    assert_eq!(report.upserted, 0);
    assert!(!session.is_authenticated());
    assert_eq!(api.requests().len(), 1);
    assert!(store.list_vehicles().await.expect("list").is_empty());
}

#[tokio::test]
async fn blank_ids_dropped_and_duplicates_collapsed() {
    let api = Arc::new(FakeApi::new());
    api.set_rows(
        LATEST_MACHINE_DATA_ENDPOINT,
        vec![
            json!({ "HWID": "A", "Speed": 1 }),
            json!({ "HWID": " " }),
            json!({ "Speed": 9 }),
            json!({ "HWID": "A", "Speed": 2 }),
        ],
    );
    let store = Arc::new(InMemoryVehicleStore::new());
    let engine = engine(api, store.clone(), 500, 1000);

    let report = engine.run_cycle(&mut UpstreamSession::new()).await;
    assert_eq!(report.telemetry_rows, 4);
    assert_eq!(report.dropped, 2);
    assert_eq!(report.duplicates, 1);
    assert_eq!(report.upserted, 1);

    let record = store.find_vehicle("A").await.expect("find").expect("vehicle");
    assert_eq!(record.metrics.speed, 2.0);
    assert_eq!(record.history.len(), 1);
}
