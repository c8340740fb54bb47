//! Postgres 车辆存储测试：设置 FLEET_TEST_DATABASE_URL 时运行，未设置时跳过。

use domain::{HistorySample, NormalizedVehicle, VehicleMetrics, VehicleStatus};
use fleet_storage::{PgVehicleStore, VehicleStore, VehicleUpdate, connect_pool};
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

async fn test_pool() -> Option<sqlx::PgPool> {
    let url = std::env::var("FLEET_TEST_DATABASE_URL").ok()?;
    let pool = connect_pool(&url).await.expect("connect");
    sqlx::raw_sql(include_str!("../../../../migrations/0001_init.sql"))
        .execute(&pool)
        .await
        .expect("migrate");
    Some(pool)
}

fn unique_id(prefix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    format!("{prefix}-{nanos}")
}

fn vehicle(id: &str) -> NormalizedVehicle {
    NormalizedVehicle {
        id: id.to_string(),
        display_device_id: "OM-1".to_string(),
        chassis_number: "---".to_string(),
        registration_no: "---".to_string(),
        status: VehicleStatus::On,
        location: Default::default(),
        metrics: VehicleMetrics::default(),
        raw: json!({ "HWID": id }),
        equipment_config: json!({}),
        sample_timestamp: None,
    }
}

#[tokio::test]
async fn manual_update_keeps_fields_written_concurrently() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let store = Arc::new(PgVehicleStore::new(pool.clone()));
    let id = unique_id("pg-edit");
    let sample = HistorySample {
        timestamp: "t1".to_string(),
        ts_ms: 1,
        raw: json!({}),
        metrics: VehicleMetrics::default(),
    };
    store
        .upsert_vehicle(&vehicle(&id), sample, 500, 1)
        .await
        .expect("upsert");

    // 另一个写入者持有行锁期间发起手动编辑
    let mut tx = pool.begin().await.expect("begin");
    sqlx::query("select id from vehicles where id = $1 for update")
        .bind(&id)
        .execute(&mut *tx)
        .await
        .expect("lock");

    let editor = store.clone();
    let edit_id = id.clone();
    let edit = tokio::spawn(async move {
        editor
            .update_vehicle(
                &edit_id,
                VehicleUpdate {
                    registration_no: Some("KA-01".to_string()),
                    ..VehicleUpdate::default()
                },
                2,
            )
            .await
    });
    tokio::time::sleep(Duration::from_millis(200)).await;

    sqlx::query("update vehicles set status = 'Charging' where id = $1")
        .bind(&id)
        .execute(&mut *tx)
        .await
        .expect("concurrent write");
    tx.commit().await.expect("commit");

    let updated = edit
        .await
        .expect("join")
        .expect("update")
        .expect("vehicle exists");
    assert_eq!(updated.registration_no, "KA-01");
    assert_eq!(updated.status, VehicleStatus::Charging);

    let stored = store.find_vehicle(&id).await.expect("find").expect("exists");
    assert_eq!(stored.status, VehicleStatus::Charging);
    assert_eq!(stored.history.len(), 1);

    sqlx::query("delete from vehicles where id = $1")
        .bind(&id)
        .execute(&pool)
        .await
        .expect("cleanup");
}
