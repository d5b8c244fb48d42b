use async_trait::async_trait;
use axum::Router;

/// Context handed to modules during `init` and `start`.
pub struct InitCtx<'a> {
    pub settings: &'a crate::settings::Settings,
}

/// A schema change contributed by a module.
///
/// `id` must be unique within the owning module; it is recorded once applied.
#[derive(Debug, Clone)]
pub struct Migration {
    pub id: &'static str,
    pub up: &'static str,
}

/// Lifecycle contract of a mountable service module.
///
/// Modules own their storage handles. The bootstrap constructs them with
/// whatever backend they need and registers them with a
/// [`ModuleRegistry`](crate::ModuleRegistry).
#[async_trait]
pub trait Module: Sync + Send {
    /// Unique name; also the mount point under `/api/{name}`
    fn name(&self) -> &'static str;

    /// Called once at startup, before migrations run
    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Routes for this module, mounted under `/api/{name}`
    fn routes(&self) -> Router {
        Router::new()
    }

    /// OpenAPI fragment (`paths` and `components`) merged into the served document
    fn openapi(&self) -> Option<serde_json::Value> {
        None
    }

    /// Migrations executed in the order returned
    fn migrations(&self) -> Vec<Migration> {
        vec![]
    }

    /// Called after migrations are applied
    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called during shutdown, in reverse registration order
    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
