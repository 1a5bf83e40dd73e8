//! Items repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::item::Item,
};

#[derive(Clone)]
pub struct ItemsRepository {
    pool: Pool<Postgres>,
}

impl ItemsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get item by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Item> {
        sqlx::query_as::<_, Item>(
            "SELECT id, name, description, available, owner_id FROM items WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Item with id {} not found", id)))
    }

    /// Create a new item
    pub async fn create(
        &self,
        owner_id: i64,
        name: &str,
        description: &str,
        available: bool,
    ) -> AppResult<Item> {
        let item = sqlx::query_as::<_, Item>(
            r#"
            INSERT INTO items (name, description, available, owner_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, description, available, owner_id
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(available)
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(item)
    }

    /// Update an item with final field values
    pub async fn update(
        &self,
        id: i64,
        name: &str,
        description: &str,
        available: bool,
    ) -> AppResult<Item> {
        let item = sqlx::query_as::<_, Item>(
            r#"
            UPDATE items SET name = $1, description = $2, available = $3
            WHERE id = $4
            RETURNING id, name, description, available, owner_id
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(available)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(item)
    }

    /// List items owned by a user
    pub async fn list_by_owner(&self, owner_id: i64) -> AppResult<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(
            r#"
            SELECT id, name, description, available, owner_id
            FROM items WHERE owner_id = $1 ORDER BY id
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    /// Search available items by name or description, case-insensitively
    pub async fn search(&self, text: &str) -> AppResult<Vec<Item>> {
        let pattern = format!("%{}%", text);
        let items = sqlx::query_as::<_, Item>(
            r#"
            SELECT id, name, description, available, owner_id
            FROM items
            WHERE available AND (name ILIKE $1 OR description ILIKE $1)
            ORDER BY id
            "#,
        )
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }
}
