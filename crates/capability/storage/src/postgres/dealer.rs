//! Postgres 经销商存储实现

use crate::error::StorageError;
use crate::models::DealerRecord;
use crate::traits::DealerStore;
use sqlx::{PgPool, Row};

pub struct PgDealerStore {
    pub pool: PgPool,
}

impl PgDealerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = crate::connection::connect_pool(database_url).await?;
        Ok(Self { pool })
    }
}

#[async_trait::async_trait]
impl DealerStore for PgDealerStore {
    async fn list_dealers(&self) -> Result<Vec<DealerRecord>, StorageError> {
        let rows = sqlx::query("select document::text as document from dealers order by dealer_code asc")
            .fetch_all(&self.pool)
            .await?;
        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            let document: String = row.try_get("document")?;
            items.push(serde_json::from_str(&document)?);
        }
        Ok(items)
    }

    async fn find_dealer(&self, dealer_id: &str) -> Result<Option<DealerRecord>, StorageError> {
        let document: Option<String> =
            sqlx::query_scalar("select document::text from dealers where dealer_id = $1")
                .bind(dealer_id)
                .fetch_optional(&self.pool)
                .await?;
        match document {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    async fn save_dealer(&self, record: DealerRecord) -> Result<DealerRecord, StorageError> {
        sqlx::query(
            "insert into dealers (dealer_id, dealer_code, document) values ($1,$2,$3::jsonb) \
             on conflict (dealer_id) do update set dealer_code = excluded.dealer_code, \
             document = excluded.document, updated_at = now()",
        )
        .bind(&record.dealer_id)
        .bind(&record.dealer_code)
        .bind(serde_json::to_string(&record)?)
        .execute(&self.pool)
        .await?;
        Ok(record)
    }
}
