//! Bookshelf application library
//!
//! Service modules and the bootstrap used by the `bookshelf` binary.

pub mod modules;

use anyhow::Context;
use bookshelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};

/// Run the service until a shutdown signal arrives.
///
/// Owns the store handle for the whole process lifetime: opened before any
/// module initializes, closed after every module has stopped.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    tracing::info!(
        env = ?settings.environment,
        db = %settings.database.url,
        "bookshelf bootstrap starting"
    );

    let pool = bookshelf_db::connect(&settings.database)
        .await
        .context("failed to connect to the book store")?;

    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, &pool);

    let ctx = InitCtx {
        settings: &settings,
    };
    registry.init_all(&ctx).await?;

    let applied = bookshelf_db::run_migrations(&pool, &registry.collect_migrations())
        .await
        .context("failed to run migrations")?;
    tracing::info!(applied, "migrations complete");

    registry.start_all(&ctx).await?;
    tracing::info!("bookshelf bootstrap complete");

    let served =
        bookshelf_http::start_server(&registry, &settings, bookshelf_http::shutdown_signal()).await;

    registry.stop_all().await?;
    pool.close().await;
    tracing::info!("book store closed");

    served
}
