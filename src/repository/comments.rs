//! Comments repository for database operations

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Row};

use crate::{
    error::AppResult,
    models::comment::CommentDetails,
};

#[derive(Clone)]
pub struct CommentsRepository {
    pool: Pool<Postgres>,
}

impl CommentsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Create a comment and return it with the author's name
    pub async fn create(
        &self,
        item_id: i64,
        author_id: i64,
        text: &str,
        created: DateTime<Utc>,
    ) -> AppResult<CommentDetails> {
        let row = sqlx::query(
            r#"
            INSERT INTO comments (text, item_id, author_id, created)
            VALUES ($1, $2, $3, $4)
            RETURNING id, text, created,
                      (SELECT name FROM users WHERE id = $3) AS author_name
            "#,
        )
        .bind(text)
        .bind(item_id)
        .bind(author_id)
        .bind(created)
        .fetch_one(&self.pool)
        .await?;

        Ok(CommentDetails {
            id: row.get("id"),
            text: row.get("text"),
            author_name: row.get("author_name"),
            created: row.get("created"),
        })
    }

    /// Comments on an item, newest first
    pub async fn list_for_item(&self, item_id: i64) -> AppResult<Vec<CommentDetails>> {
        let comments = sqlx::query_as::<_, CommentDetails>(
            r#"
            SELECT c.id, c.text, u.name AS author_name, c.created
            FROM comments c
            JOIN users u ON c.author_id = u.id
            WHERE c.item_id = $1
            ORDER BY c.created DESC
            "#,
        )
        .bind(item_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(comments)
    }

    /// Comments across a set of items, newest first, paired with their item id
    pub async fn list_for_items(&self, item_ids: &[i64]) -> AppResult<Vec<(i64, CommentDetails)>> {
        let rows = sqlx::query(
            r#"
            SELECT c.id, c.text, c.item_id, u.name AS author_name, c.created
            FROM comments c
            JOIN users u ON c.author_id = u.id
            WHERE c.item_id = ANY($1)
            ORDER BY c.created DESC
            "#,
        )
        .bind(item_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                (
                    row.get("item_id"),
                    CommentDetails {
                        id: row.get("id"),
                        text: row.get("text"),
                        author_name: row.get("author_name"),
                        created: row.get("created"),
                    },
                )
            })
            .collect())
    }
}
