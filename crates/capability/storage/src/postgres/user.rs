//! Postgres 用户存储实现

use crate::error::StorageError;
use crate::models::UserRecord;
use crate::traits::UserStore;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

const SELECT_USER: &str = "select user_id, username, password_hash, role, customer_code, \
     assigned_vehicles::text as assigned_vehicles, linked_id from users";

pub struct PgUserStore {
    pub pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 通过数据库 URL 建立连接池
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = crate::connection::connect_pool(database_url).await?;
        Ok(Self { pool })
    }
}

fn user_from_row(row: &PgRow) -> Result<UserRecord, StorageError> {
    let assigned: String = row.try_get("assigned_vehicles")?;
    Ok(UserRecord {
        user_id: row.try_get("user_id")?,
        username: row.try_get("username")?,
        password: row.try_get("password_hash")?,
        role: row.try_get("role")?,
        customer_code: row.try_get("customer_code")?,
        assigned_vehicles: serde_json::from_str(&assigned)?,
        linked_id: row.try_get("linked_id")?,
    })
}

#[async_trait::async_trait]
impl UserStore for PgUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, StorageError> {
        let row = sqlx::query(&format!("{SELECT_USER} where username = $1"))
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_by_linked_id(&self, linked_id: &str) -> Result<Option<UserRecord>, StorageError> {
        let row = sqlx::query(&format!("{SELECT_USER} where linked_id = $1"))
            .bind(linked_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>, StorageError> {
        let rows = sqlx::query(&format!("{SELECT_USER} order by username asc"))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(user_from_row).collect()
    }

    async fn save_user(&self, record: UserRecord) -> Result<UserRecord, StorageError> {
        let taken: Option<String> =
            sqlx::query_scalar("select user_id from users where username = $1 and user_id <> $2")
                .bind(&record.username)
                .bind(&record.user_id)
                .fetch_optional(&self.pool)
                .await?;
        if taken.is_some() {
            return Err(StorageError::new("username exists"));
        }

        sqlx::query(
            "insert into users (user_id, username, password_hash, role, customer_code, assigned_vehicles, linked_id) \
             values ($1,$2,$3,$4,$5,$6::jsonb,$7) \
             on conflict (user_id) do update set username = excluded.username, \
             password_hash = excluded.password_hash, role = excluded.role, \
             customer_code = excluded.customer_code, assigned_vehicles = excluded.assigned_vehicles, \
             linked_id = excluded.linked_id",
        )
        .bind(&record.user_id)
        .bind(&record.username)
        .bind(&record.password)
        .bind(&record.role)
        .bind(&record.customer_code)
        .bind(serde_json::to_string(&record.assigned_vehicles)?)
        .bind(&record.linked_id)
        .execute(&self.pool)
        .await?;
        Ok(record)
    }

    async fn update_password_hash(
        &self,
        user_id: &str,
        password_hash: &str,
    ) -> Result<bool, StorageError> {
        let result = sqlx::query("update users set password_hash = $2 where user_id = $1")
            .bind(user_id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_linked_id(&self, linked_id: &str) -> Result<bool, StorageError> {
        let result = sqlx::query("delete from users where linked_id = $1")
            .bind(linked_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
