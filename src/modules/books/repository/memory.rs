use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{merge, BookRepository, StoreError};
use crate::modules::books::models::{Book, BookInput, BookPatch};

#[derive(Debug)]
struct Shelf {
    last_id: i64,
    rows: BTreeMap<i64, Book>,
}

/// Process-local store; ids increase monotonically and are never reused.
#[derive(Debug)]
pub struct InMemoryBookRepository {
    shelf: RwLock<Shelf>,
}

impl InMemoryBookRepository {
    pub fn new() -> Self {
        Self {
            shelf: RwLock::new(Shelf {
                last_id: 0,
                rows: BTreeMap::new(),
            }),
        }
    }
}

impl Default for InMemoryBookRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookRepository for InMemoryBookRepository {
    async fn create_book(&self, input: &BookInput) -> Result<Book, StoreError> {
        let mut shelf = self.shelf.write().await;
        shelf.last_id += 1;

        let book = Book {
            id: shelf.last_id,
            title: input.title.clone(),
            author: input.author.clone(),
            published: input.published,
        };
        shelf.rows.insert(book.id, book.clone());
        Ok(book)
    }

    async fn get_book_by_id(&self, id: i64) -> Result<Book, StoreError> {
        self.shelf
            .read()
            .await
            .rows
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn get_all_books(&self) -> Result<Vec<Book>, StoreError> {
        Ok(self.shelf.read().await.rows.values().cloned().collect())
    }

    async fn update_book(&self, id: i64, patch: &BookPatch) -> Result<Book, StoreError> {
        let existing = self.get_book_by_id(id).await?;
        let merged = merge(existing, patch);

        self.shelf
            .write()
            .await
            .rows
            .insert(merged.id, merged.clone());
        Ok(merged)
    }

    async fn delete_book(&self, id: i64) -> Result<(), StoreError> {
        match self.shelf.write().await.rows.remove(&id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(id)),
        }
    }
}
