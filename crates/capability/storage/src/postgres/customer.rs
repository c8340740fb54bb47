//! Postgres 客户存储实现

use crate::error::StorageError;
use crate::models::CustomerRecord;
use crate::traits::CustomerStore;
use sqlx::{PgPool, Row};

pub struct PgCustomerStore {
    pub pool: PgPool,
}

impl PgCustomerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = crate::connection::connect_pool(database_url).await?;
        Ok(Self { pool })
    }
}

#[async_trait::async_trait]
impl CustomerStore for PgCustomerStore {
    async fn list_customers(&self) -> Result<Vec<CustomerRecord>, StorageError> {
        let rows = sqlx::query(
            "select document::text as document from customers order by customer_code asc",
        )
        .fetch_all(&self.pool)
        .await?;
        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            let document: String = row.try_get("document")?;
            items.push(serde_json::from_str(&document)?);
        }
        Ok(items)
    }

    async fn find_customer(&self, customer_id: &str) -> Result<Option<CustomerRecord>, StorageError> {
        let document: Option<String> =
            sqlx::query_scalar("select document::text from customers where customer_id = $1")
                .bind(customer_id)
                .fetch_optional(&self.pool)
                .await?;
        match document {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    async fn save_customer(&self, record: CustomerRecord) -> Result<CustomerRecord, StorageError> {
        sqlx::query(
            "insert into customers (customer_id, customer_code, document) values ($1,$2,$3::jsonb) \
             on conflict (customer_id) do update set customer_code = excluded.customer_code, \
             document = excluded.document, updated_at = now()",
        )
        .bind(&record.customer_id)
        .bind(&record.customer_code)
        .bind(serde_json::to_string(&record)?)
        .execute(&self.pool)
        .await?;
        Ok(record)
    }
}
