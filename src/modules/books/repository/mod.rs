//! Storage abstraction for books.
//!
//! Handlers only ever see [`BookRepository`]. Each backend is one adapter
//! implementing it; the merge rule for updates lives here so every adapter
//! applies the same semantics.

mod memory;
mod sqlite;

pub use memory::InMemoryBookRepository;
pub use sqlite::SqliteBookRepository;

use async_trait::async_trait;
use thiserror::Error;

use super::models::{Book, BookInput, BookPatch};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("book {0} not found")]
    NotFound(i64),

    #[error("database failure: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait BookRepository: Send + Sync + 'static {
    /// Persist a new row; the store assigns the id. Input is not validated here.
    async fn create_book(&self, input: &BookInput) -> Result<Book, StoreError>;

    async fn get_book_by_id(&self, id: i64) -> Result<Book, StoreError>;

    /// All rows in ascending id order; empty when the store is empty
    async fn get_all_books(&self) -> Result<Vec<Book>, StoreError>;

    /// Look up `id`, apply [`merge`], and save the result.
    ///
    /// Not re-validated. Concurrent updates to one id are last-write-wins.
    async fn update_book(&self, id: i64, patch: &BookPatch) -> Result<Book, StoreError>;

    /// Fails with `NotFound` when no row was removed
    async fn delete_book(&self, id: i64) -> Result<(), StoreError>;
}

/// Overwrite only the fields the patch supplies; the id never changes.
pub fn merge(mut book: Book, patch: &BookPatch) -> Book {
    if let Some(title) = &patch.title {
        book.title = title.clone();
    }
    if let Some(author) = &patch.author {
        book.author = author.clone();
    }
    if let Some(published) = patch.published {
        book.published = published;
    }
    book
}
