//! 车辆内存存储实现

use crate::error::StorageError;
use crate::models::{VehicleRecord, VehicleUpdate};
use crate::traits::VehicleStore;
use domain::{HistorySample, NormalizedVehicle, merge_capped, prepend_capped};
use std::collections::HashMap;
use std::sync::RwLock;

/// 车辆内存存储
///
/// 使用 RwLock + HashMap 提供线程安全的内存存储。
#[derive(Default)]
pub struct InMemoryVehicleStore {
    vehicles: RwLock<HashMap<String, VehicleRecord>>,
}

impl InMemoryVehicleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl VehicleStore for InMemoryVehicleStore {
    async fn list_vehicles(&self) -> Result<Vec<VehicleRecord>, StorageError> {
        let map = self
            .vehicles
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        let mut items: Vec<VehicleRecord> = map
            .values()
            .map(|item| item.clone().without_history())
            .collect();
        items.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(items)
    }

    async fn find_vehicle(&self, vehicle_id: &str) -> Result<Option<VehicleRecord>, StorageError> {
        let map = self
            .vehicles
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(map.get(vehicle_id).cloned())
    }

    async fn upsert_vehicle(
        &self,
        vehicle: &NormalizedVehicle,
        sample: HistorySample,
        cap: usize,
        now_ms: i64,
    ) -> Result<(), StorageError> {
        let mut map = self
            .vehicles
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let record = map
            .entry(vehicle.id.clone())
            .or_insert_with(|| VehicleRecord::from_normalized(vehicle, now_ms));
        record.apply_normalized(vehicle, now_ms);
        prepend_capped(&mut record.history, sample, cap);
        Ok(())
    }

    async fn update_vehicle(
        &self,
        vehicle_id: &str,
        update: VehicleUpdate,
        now_ms: i64,
    ) -> Result<Option<VehicleRecord>, StorageError> {
        let mut map = self
            .vehicles
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let Some(record) = map.get_mut(vehicle_id) else {
            return Ok(None);
        };
        record.apply_update(update, now_ms);
        Ok(Some(record.clone()))
    }

    async fn merge_history(
        &self,
        vehicle_id: &str,
        samples: Vec<HistorySample>,
        cap: usize,
    ) -> Result<Option<usize>, StorageError> {
        let mut map = self
            .vehicles
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let Some(record) = map.get_mut(vehicle_id) else {
            return Ok(None);
        };
        Ok(Some(merge_capped(&mut record.history, samples, cap)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn poisoned_lock_is_reported_not_missing() {
        let store = Arc::new(InMemoryVehicleStore::new());
        let writer = store.clone();
        let _ = std::thread::spawn(move || {
            let _guard = writer.vehicles.write().unwrap();
            panic!("writer died holding the lock");
        })
        .join();

        assert!(store.find_vehicle("v-1").await.is_err());
        assert!(store.list_vehicles().await.is_err());
    }
}
