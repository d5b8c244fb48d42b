pub mod books;

use std::sync::Arc;

use bookshelf_kernel::ModuleRegistry;
use sqlx::SqlitePool;

use books::repository::SqliteBookRepository;

/// Register every service module, each backed by the shared pool
pub fn register_all(registry: &mut ModuleRegistry, pool: &SqlitePool) {
    registry.register(books::create_module(Arc::new(SqliteBookRepository::new(
        pool.clone(),
    ))));
}
