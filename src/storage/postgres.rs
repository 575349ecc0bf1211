//! Product collection stored as JSONB documents in PostgreSQL.

use crate::domain::product::{DocumentUpdate, ProductId, COLLECTION};
use crate::storage::store::{Document, ProductStore, StoreError, UpdateResult};
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use std::time::Duration;

/// Returns true for plain SQL identifiers (`[A-Za-z_][A-Za-z0-9_]*`).
pub fn validate_ident(ident: &str) -> bool {
    let mut chars = ident.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[derive(Clone)]
pub struct PostgresProductStore {
    pool: PgPool,
    /// Fully qualified, quoted table name, e.g. `"products_api"."products"`.
    table: String,
}

impl PostgresProductStore {
    /// Connects with a bounded acquire timeout and makes sure the collection exists.
    pub async fn connect(
        database_url: &str,
        schema: &str,
        max_connections: u32,
        connect_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(connect_timeout)
            .connect(database_url)
            .await?;
        Self::new_with_pool(pool, schema).await
    }

    pub async fn new_with_pool(pool: PgPool, schema: &str) -> Result<Self, StoreError> {
        if !validate_ident(schema) {
            return Err(StoreError::InvalidName(schema.to_string()));
        }

        sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS \"{}\"", schema))
            .execute(&pool)
            .await?;

        let table = format!("\"{}\".\"{}\"", schema, COLLECTION);
        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS {} (
                seq BIGSERIAL,
                id TEXT PRIMARY KEY,
                doc JSONB NOT NULL
            )",
            table
        ))
        .execute(&pool)
        .await?;

        tracing::debug!(table = %table, "product collection ready");
        Ok(Self { pool, table })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Removes every document. Used by tests against a real database.
    pub async fn clear(&self) -> Result<(), StoreError> {
        sqlx::query(&format!("TRUNCATE TABLE {}", self.table))
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn into_document(value: JsonValue) -> Result<Document, StoreError> {
    match value {
        JsonValue::Object(map) => Ok(map),
        other => Err(StoreError::Corrupt(format!("expected object, got {}", other))),
    }
}

fn parse_stored_id(raw: &str) -> Result<ProductId, StoreError> {
    ProductId::parse(raw).map_err(|e| StoreError::Corrupt(e.to_string()))
}

#[async_trait]
impl ProductStore for PostgresProductStore {
    async fn find_all(&self) -> Result<Vec<(ProductId, Document)>, StoreError> {
        let rows = sqlx::query(&format!("SELECT id, doc FROM {} ORDER BY seq", self.table))
            .fetch_all(&self.pool)
            .await?;

        let mut docs = Vec::with_capacity(rows.len());
        for row in rows {
            let id: String = row.try_get("id")?;
            let doc: JsonValue = row.try_get("doc")?;
            docs.push((parse_stored_id(&id)?, into_document(doc)?));
        }
        Ok(docs)
    }

    async fn find_one(&self, id: ProductId) -> Result<Option<Document>, StoreError> {
        let row = sqlx::query(&format!("SELECT doc FROM {} WHERE id = $1", self.table))
            .bind(id.to_hex())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let doc: JsonValue = row.try_get("doc")?;
                Ok(Some(into_document(doc)?))
            }
            None => Ok(None),
        }
    }

    async fn insert_one(&self, doc: Document) -> Result<ProductId, StoreError> {
        let id = ProductId::generate();
        sqlx::query(&format!("INSERT INTO {} (id, doc) VALUES ($1, $2)", self.table))
            .bind(id.to_hex())
            .bind(Json(JsonValue::Object(doc)))
            .execute(&self.pool)
            .await?;
        Ok(id)
    }

    async fn update_one(
        &self,
        id: ProductId,
        update: &DocumentUpdate,
    ) -> Result<UpdateResult, StoreError> {
        // One statement: count the match, and only rewrite the row when the merged
        // document differs from the stored one.
        let sql = format!(
            "WITH target AS (
                SELECT id, doc FROM {table} WHERE id = $1
            ),
            updated AS (
                UPDATE {table} AS p
                SET doc = (target.doc || $2::jsonb) - $3::text[]
                FROM target
                WHERE p.id = target.id
                  AND (target.doc || $2::jsonb) - $3::text[] <> target.doc
                RETURNING p.id
            )
            SELECT (SELECT COUNT(*) FROM target) AS matched,
                   (SELECT COUNT(*) FROM updated) AS modified",
            table = self.table
        );

        let row = sqlx::query(&sql)
            .bind(id.to_hex())
            .bind(Json(JsonValue::Object(update.set.clone())))
            .bind(&update.unset)
            .fetch_one(&self.pool)
            .await?;

        let matched: i64 = row.try_get("matched")?;
        let modified: i64 = row.try_get("modified")?;
        Ok(UpdateResult {
            matched: matched.max(0) as u64,
            modified: modified.max(0) as u64,
        })
    }

    async fn delete_one(&self, id: ProductId) -> Result<u64, StoreError> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", self.table))
            .bind(id.to_hex())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
