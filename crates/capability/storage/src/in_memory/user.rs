//! 用户内存存储实现

use crate::error::StorageError;
use crate::models::UserRecord;
use crate::traits::UserStore;
use std::collections::HashMap;
use std::sync::RwLock;

/// 用户内存存储，以 user_id 为键。
#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, StorageError> {
        let map = self
            .users
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(map.values().find(|user| user.username == username).cloned())
    }

    async fn find_by_linked_id(&self, linked_id: &str) -> Result<Option<UserRecord>, StorageError> {
        let map = self
            .users
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(map
            .values()
            .find(|user| user.linked_id.as_deref() == Some(linked_id))
            .cloned())
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>, StorageError> {
        let mut items: Vec<UserRecord> = self
            .users
            .read()
            .map_err(|_| StorageError::new("lock failed"))?
            .values()
            .cloned()
            .collect();
        items.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(items)
    }

    async fn save_user(&self, record: UserRecord) -> Result<UserRecord, StorageError> {
        let mut map = self
            .users
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let taken = map
            .values()
            .any(|user| user.username == record.username && user.user_id != record.user_id);
        if taken {
            return Err(StorageError::new("username exists"));
        }
        map.insert(record.user_id.clone(), record.clone());
        Ok(record)
    }

    async fn update_password_hash(
        &self,
        user_id: &str,
        password_hash: &str,
    ) -> Result<bool, StorageError> {
        let mut map = self
            .users
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        match map.get_mut(user_id) {
            Some(user) => {
                user.password = password_hash.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_by_linked_id(&self, linked_id: &str) -> Result<bool, StorageError> {
        let mut map = self
            .users
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let before = map.len();
        map.retain(|_, user| user.linked_id.as_deref() != Some(linked_id));
        Ok(map.len() < before)
    }
}
