//! Postgres 车辆存储实现

use crate::error::StorageError;
use crate::models::{VehicleRecord, VehicleUpdate};
use crate::traits::VehicleStore;
use domain::{HistorySample, Location, NormalizedVehicle, VehicleStatus, merge_capped, prepend_capped};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};

const SELECT_COLUMNS: &str = "select id, display_device_id, chassis_number, registration_no, status, \
     lat, lng, metrics::text as metrics, raw_tor::text as raw_tor, \
     equipment_config::text as equipment_config, \
     (extract(epoch from last_update) * 1000)::bigint as last_update";

pub struct PgVehicleStore {
    pub pool: PgPool,
}

impl PgVehicleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 通过数据库 URL 建立连接池
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = crate::connection::connect_pool(database_url).await?;
        Ok(Self { pool })
    }
}

fn record_from_row(row: &PgRow, history: Vec<HistorySample>) -> Result<VehicleRecord, StorageError> {
    let status: String = row.try_get("status")?;
    let metrics: String = row.try_get("metrics")?;
    let raw: String = row.try_get("raw_tor")?;
    let equipment_config: String = row.try_get("equipment_config")?;
    Ok(VehicleRecord {
        id: row.try_get("id")?,
        display_device_id: row.try_get("display_device_id")?,
        chassis_number: row.try_get("chassis_number")?,
        registration_no: row.try_get("registration_no")?,
        status: VehicleStatus::parse(&status),
        location: Location {
            lat: row.try_get("lat")?,
            lng: row.try_get("lng")?,
        },
        metrics: serde_json::from_str(&metrics)?,
        raw: serde_json::from_str(&raw)?,
        equipment_config: serde_json::from_str(&equipment_config)?,
        last_update: row.try_get("last_update")?,
        history,
    })
}

/// 锁定车辆行并读取历史；车辆不存在时返回 None。
async fn lock_history(
    tx: &mut Transaction<'_, Postgres>,
    vehicle_id: &str,
) -> Result<Option<Vec<HistorySample>>, StorageError> {
    let history: Option<String> =
        sqlx::query_scalar("select history::text from vehicles where id = $1 for update")
            .bind(vehicle_id)
            .fetch_optional(&mut **tx)
            .await?;
    match history {
        Some(text) => Ok(Some(serde_json::from_str(&text)?)),
        None => Ok(None),
    }
}

async fn write_history(
    tx: &mut Transaction<'_, Postgres>,
    vehicle_id: &str,
    history: &[HistorySample],
) -> Result<(), StorageError> {
    sqlx::query("update vehicles set history = $2::jsonb where id = $1")
        .bind(vehicle_id)
        .bind(serde_json::to_string(history)?)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

#[async_trait::async_trait]
impl VehicleStore for PgVehicleStore {
    async fn list_vehicles(&self) -> Result<Vec<VehicleRecord>, StorageError> {
        let rows = sqlx::query(&format!("{SELECT_COLUMNS} from vehicles order by id asc"))
            .fetch_all(&self.pool)
            .await?;
        rows.iter()
            .map(|row| record_from_row(row, Vec::new()))
            .collect()
    }

    async fn find_vehicle(&self, vehicle_id: &str) -> Result<Option<VehicleRecord>, StorageError> {
        let row = sqlx::query(&format!(
            "{SELECT_COLUMNS}, history::text as history from vehicles where id = $1"
        ))
        .bind(vehicle_id)
        .fetch_optional(&self.pool)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let history: String = row.try_get("history")?;
        let history: Vec<HistorySample> = serde_json::from_str(&history)?;
        Ok(Some(record_from_row(&row, history)?))
    }

    async fn upsert_vehicle(
        &self,
        vehicle: &NormalizedVehicle,
        sample: HistorySample,
        cap: usize,
        now_ms: i64,
    ) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await?;
        let mut history = lock_history(&mut tx, &vehicle.id).await?.unwrap_or_default();
        prepend_capped(&mut history, sample, cap);

        sqlx::query(
            "insert into vehicles (id, display_device_id, chassis_number, registration_no, status, \
             lat, lng, metrics, raw_tor, equipment_config, history, last_update) \
             values ($1,$2,$3,$4,$5,$6,$7,$8::jsonb,$9::jsonb,$10::jsonb,$11::jsonb,to_timestamp($12 / 1000.0)) \
             on conflict (id) do update set display_device_id = excluded.display_device_id, \
             chassis_number = excluded.chassis_number, registration_no = excluded.registration_no, \
             status = excluded.status, lat = excluded.lat, lng = excluded.lng, \
             metrics = excluded.metrics, raw_tor = excluded.raw_tor, \
             equipment_config = excluded.equipment_config, history = excluded.history, \
             last_update = excluded.last_update",
        )
        .bind(&vehicle.id)
        .bind(&vehicle.display_device_id)
        .bind(&vehicle.chassis_number)
        .bind(&vehicle.registration_no)
        .bind(vehicle.status.as_str())
        .bind(vehicle.location.lat)
        .bind(vehicle.location.lng)
        .bind(serde_json::to_string(&vehicle.metrics)?)
        .bind(serde_json::to_string(&vehicle.raw)?)
        .bind(serde_json::to_string(&vehicle.equipment_config)?)
        .bind(serde_json::to_string(&history)?)
        .bind(now_ms)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn update_vehicle(
        &self,
        vehicle_id: &str,
        update: VehicleUpdate,
        now_ms: i64,
    ) -> Result<Option<VehicleRecord>, StorageError> {
        // 锁定行后读改写，避免并发的同步写入被旧值覆盖
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query(&format!(
            "{SELECT_COLUMNS}, history::text as history from vehicles where id = $1 for update"
        ))
        .bind(vehicle_id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let history: String = row.try_get("history")?;
        let mut record = record_from_row(&row, serde_json::from_str(&history)?)?;
        record.apply_update(update, now_ms);

        let result = sqlx::query(
            "update vehicles set display_device_id = $2, chassis_number = $3, registration_no = $4, \
             status = $5, lat = $6, lng = $7, metrics = $8::jsonb, equipment_config = $9::jsonb, \
             last_update = to_timestamp($10 / 1000.0) where id = $1",
        )
        .bind(&record.id)
        .bind(&record.display_device_id)
        .bind(&record.chassis_number)
        .bind(&record.registration_no)
        .bind(record.status.as_str())
        .bind(record.location.lat)
        .bind(record.location.lng)
        .bind(serde_json::to_string(&record.metrics)?)
        .bind(serde_json::to_string(&record.equipment_config)?)
        .bind(now_ms)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        tx.commit().await?;
        Ok(Some(record))
    }

    async fn merge_history(
        &self,
        vehicle_id: &str,
        samples: Vec<HistorySample>,
        cap: usize,
    ) -> Result<Option<usize>, StorageError> {
        let mut tx = self.pool.begin().await?;
        let Some(mut history) = lock_history(&mut tx, vehicle_id).await? else {
            return Ok(None);
        };
        let added = merge_capped(&mut history, samples, cap);
        write_history(&mut tx, vehicle_id, &history).await?;
        tx.commit().await?;
        Ok(Some(added))
    }
}
