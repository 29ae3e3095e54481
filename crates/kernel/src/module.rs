//! The contract every Folio feature module implements.
//!
//! A module contributes routes, an OpenAPI fragment and SQL migrations, and
//! takes part in the process lifecycle: `init`, migrations, `start`, serve,
//! `stop`. Readiness probes call `health` on every module.

use async_trait::async_trait;
use axum::Router;

use crate::settings::Settings;

/// Borrowed view of process state handed to lifecycle hooks.
pub struct InitCtx<'a> {
    pub settings: &'a Settings,
}

impl<'a> InitCtx<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }
}

/// A forward-only SQL script. `id` orders scripts within one module and is
/// recorded once applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    pub id: &'static str,
    pub up: &'static str,
}

#[async_trait]
pub trait Module: Sync + Send {
    /// Unique name; also the mount point `/api/{name}`.
    fn name(&self) -> &'static str;

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
    }

    /// Paths are relative to the mount point; `"/"` is the mount point itself.
    fn openapi(&self) -> Option<serde_json::Value> {
        None
    }

    fn migrations(&self) -> Vec<Migration> {
        Vec::new()
    }

    /// Runs after migrations, before the server accepts requests.
    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Readiness of the module's backing services.
    async fn health(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
