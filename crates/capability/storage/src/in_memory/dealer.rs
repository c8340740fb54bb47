//! 经销商内存存储实现

use crate::error::StorageError;
use crate::models::DealerRecord;
use crate::traits::DealerStore;
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Default)]
pub struct InMemoryDealerStore {
    dealers: RwLock<HashMap<String, DealerRecord>>,
}

impl InMemoryDealerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl DealerStore for InMemoryDealerStore {
    async fn list_dealers(&self) -> Result<Vec<DealerRecord>, StorageError> {
        let mut items: Vec<DealerRecord> = self
            .dealers
            .read()
            .map_err(|_| StorageError::new("lock failed"))?
            .values()
            .cloned()
            .collect();
        items.sort_by(|a, b| a.dealer_code.cmp(&b.dealer_code));
        Ok(items)
    }

    async fn find_dealer(&self, dealer_id: &str) -> Result<Option<DealerRecord>, StorageError> {
        let map = self
            .dealers
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(map.get(dealer_id).cloned())
    }

    async fn save_dealer(&self, record: DealerRecord) -> Result<DealerRecord, StorageError> {
        let mut map = self
            .dealers
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        map.insert(record.dealer_id.clone(), record.clone());
        Ok(record)
    }
}
