//! 客户内存存储实现

use crate::error::StorageError;
use crate::models::CustomerRecord;
use crate::traits::CustomerStore;
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Default)]
pub struct InMemoryCustomerStore {
    customers: RwLock<HashMap<String, CustomerRecord>>,
}

impl InMemoryCustomerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl CustomerStore for InMemoryCustomerStore {
    async fn list_customers(&self) -> Result<Vec<CustomerRecord>, StorageError> {
        let mut items: Vec<CustomerRecord> = self
            .customers
            .read()
            .map_err(|_| StorageError::new("lock failed"))?
            .values()
            .cloned()
            .collect();
        items.sort_by(|a, b| a.customer_code.cmp(&b.customer_code));
        Ok(items)
    }

    async fn find_customer(&self, customer_id: &str) -> Result<Option<CustomerRecord>, StorageError> {
        let map = self
            .customers
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(map.get(customer_id).cloned())
    }

    async fn save_customer(&self, record: CustomerRecord) -> Result<CustomerRecord, StorageError> {
        let mut map = self
            .customers
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        map.insert(record.customer_id.clone(), record.clone());
        Ok(record)
    }
}
