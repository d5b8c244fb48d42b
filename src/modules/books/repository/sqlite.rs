use async_trait::async_trait;
use sqlx::SqlitePool;

use super::{merge, BookRepository, StoreError};
use crate::modules::books::models::{Book, BookInput, BookPatch};

/// `books` table adapter over an injected connection pool.
#[derive(Debug, Clone)]
pub struct SqliteBookRepository {
    pool: SqlitePool,
}

impl SqliteBookRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookRepository for SqliteBookRepository {
    async fn create_book(&self, input: &BookInput) -> Result<Book, StoreError> {
        let book = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author, published)
            VALUES (?, ?, ?)
            RETURNING id, title, author, published
            "#,
        )
        .bind(&input.title)
        .bind(&input.author)
        .bind(input.published)
        .fetch_one(&self.pool)
        .await?;

        Ok(book)
    }

    async fn get_book_by_id(&self, id: i64) -> Result<Book, StoreError> {
        sqlx::query_as::<_, Book>(
            "SELECT id, title, author, published FROM books WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound(id))
    }

    async fn get_all_books(&self) -> Result<Vec<Book>, StoreError> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT id, title, author, published FROM books ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    async fn update_book(&self, id: i64, patch: &BookPatch) -> Result<Book, StoreError> {
        let merged = merge(self.get_book_by_id(id).await?, patch);

        // Save semantics: upsert keyed by the primary key.
        let saved = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (id, title, author, published)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (id) DO UPDATE SET
                title = excluded.title,
                author = excluded.author,
                published = excluded.published
            RETURNING id, title, author, published
            "#,
        )
        .bind(merged.id)
        .bind(&merged.title)
        .bind(&merged.author)
        .bind(merged.published)
        .fetch_one(&self.pool)
        .await?;

        Ok(saved)
    }

    async fn delete_book(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }
}
