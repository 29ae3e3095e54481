//! Wires backends from settings into the module registry and runs the server.

use std::sync::Arc;

use anyhow::Context;
use folio_cache::{Cache, MemoryCache};
use folio_events::{EventPublisher, MemoryEventLog};
use folio_kernel::settings::{
    CacheSettings, EventSettings, RemoteBackend, Settings, StoreBackend,
};
use folio_kernel::{InitCtx, ModuleRegistry};
use sqlx::postgres::PgPool;

use crate::modules::books::store::{BookStore, MemoryBookStore, PgBookStore};
use crate::modules::{self, books::ServiceOptions, books::BookService};

/// Connected collaborators for the book service.
pub struct Backends {
    pub store: Arc<dyn BookStore>,
    pub cache: Arc<dyn Cache>,
    pub events: Arc<dyn EventPublisher>,
    /// Present when the postgres store is selected.
    pub pool: Option<PgPool>,
}

impl Backends {
    /// All-in-memory collaborators.
    pub fn in_memory(settings: &Settings) -> Self {
        Self {
            store: Arc::new(MemoryBookStore::new()),
            cache: Arc::new(MemoryCache::new(settings.cache.max_entries)),
            events: Arc::new(memory_events(&settings.events)),
            pool: None,
        }
    }

    pub async fn connect(settings: &Settings) -> anyhow::Result<Self> {
        let pool = match settings.database.backend {
            StoreBackend::Memory => None,
            StoreBackend::Postgres => {
                let pool = folio_db::connect(&settings.database).await?;
                folio_db::health_check(&pool).await?;
                Some(pool)
            }
        };
        let store: Arc<dyn BookStore> = match &pool {
            Some(pool) => Arc::new(PgBookStore::new(pool.clone())),
            None => Arc::new(MemoryBookStore::new()),
        };

        Ok(Self {
            store,
            cache: connect_cache(&settings.cache).await?,
            events: connect_events(&settings.events).await?,
            pool,
        })
    }
}

/// Register every module around the given backends.
pub fn build_registry(settings: &Settings, backends: &Backends) -> anyhow::Result<ModuleRegistry> {
    let service = BookService::new(
        backends.store.clone(),
        backends.cache.clone(),
        backends.events.clone(),
        ServiceOptions::from_settings(settings),
    );

    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, Arc::new(service))?;
    Ok(registry)
}

/// Serve until a shutdown signal, running module lifecycle hooks around it.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    tracing::info!(
        env = ?settings.environment,
        store = ?settings.database.backend,
        cache = ?settings.cache.backend,
        events = ?settings.events.backend,
        "folio bootstrap starting"
    );

    let backends = Backends::connect(&settings).await?;
    let registry = build_registry(&settings, &backends)?;
    let ctx = InitCtx::new(&settings);

    registry.init_all(&ctx).await?;
    if let Some(pool) = &backends.pool {
        let applied = folio_db::run_migrations(pool, &registry.collect_migrations()).await?;
        tracing::info!(applied, "migrations complete");
    }
    registry.start_all(&ctx).await?;

    let served = folio_http::start_server(&registry, &settings).await;
    let stopped = registry.stop_all().await;

    served?;
    stopped
}

/// Apply pending migrations without starting the server.
pub async fn migrate(settings: &Settings) -> anyhow::Result<usize> {
    if settings.database.backend != StoreBackend::Postgres {
        anyhow::bail!("migrations require database.backend = \"postgres\"");
    }

    let pool = folio_db::connect(&settings.database).await?;
    let backends = Backends {
        store: Arc::new(PgBookStore::new(pool.clone())),
        pool: Some(pool.clone()),
        ..Backends::in_memory(settings)
    };
    let registry = build_registry(settings, &backends)?;

    let applied = folio_db::run_migrations(&pool, &registry.collect_migrations())
        .await
        .context("migration run failed")?;
    pool.close().await;
    Ok(applied)
}

async fn connect_cache(settings: &CacheSettings) -> anyhow::Result<Arc<dyn Cache>> {
    match settings.backend {
        RemoteBackend::Memory => Ok(Arc::new(MemoryCache::new(settings.max_entries))),
        RemoteBackend::Redis => connect_redis_cache(settings).await,
    }
}

async fn connect_events(settings: &EventSettings) -> anyhow::Result<Arc<dyn EventPublisher>> {
    match settings.backend {
        RemoteBackend::Memory => Ok(Arc::new(memory_events(settings))),
        RemoteBackend::Redis => connect_redis_events(settings).await,
    }
}

fn memory_events(settings: &EventSettings) -> MemoryEventLog {
    MemoryEventLog::new().with_max_len(settings.max_len)
}

#[cfg(feature = "redis")]
async fn connect_redis_cache(settings: &CacheSettings) -> anyhow::Result<Arc<dyn Cache>> {
    let cache = folio_cache::RedisCache::connect(&settings.url)
        .await
        .context("failed to connect to redis cache")?;
    Ok(Arc::new(cache))
}

#[cfg(not(feature = "redis"))]
async fn connect_redis_cache(_settings: &CacheSettings) -> anyhow::Result<Arc<dyn Cache>> {
    anyhow::bail!("cache backend \"redis\" requires building with the `redis` feature")
}

#[cfg(feature = "redis")]
async fn connect_redis_events(
    settings: &EventSettings,
) -> anyhow::Result<Arc<dyn EventPublisher>> {
    let log = folio_events::RedisStreamLog::connect(&settings.url)
        .await
        .context("failed to connect to redis event stream")?
        .with_max_len(settings.max_len);
    Ok(Arc::new(log))
}

#[cfg(not(feature = "redis"))]
async fn connect_redis_events(
    _settings: &EventSettings,
) -> anyhow::Result<Arc<dyn EventPublisher>> {
    anyhow::bail!("event backend \"redis\" requires building with the `redis` feature")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_backends_connect_without_network() {
        let settings = Settings::default();
        let backends = Backends::connect(&settings).await.unwrap();

        assert!(backends.pool.is_none());
        let registry = build_registry(&settings, &backends).unwrap();
        assert!(registry.get_module("books").is_some());
    }

    #[tokio::test]
    async fn memory_event_log_is_capped_by_settings() {
        let mut settings = Settings::default();
        settings.events.max_len = 2;

        let log = memory_events(&settings.events);
        for n in 0..5u8 {
            log.publish(&settings.events.channel, &[n]).await.unwrap();
        }

        assert_eq!(log.max_len(), 2);
        assert_eq!(
            log.entries(&settings.events.channel).await,
            vec![vec![3], vec![4]]
        );
    }

    #[tokio::test]
    async fn migrate_requires_postgres() {
        let err = migrate(&Settings::default()).await.unwrap_err();
        assert!(err.to_string().contains("postgres"));
    }

    #[cfg(not(feature = "redis"))]
    #[tokio::test]
    async fn redis_backend_needs_feature() {
        let mut settings = Settings::default();
        settings.cache.backend = RemoteBackend::Redis;

        let err = Backends::connect(&settings).await.err().unwrap();
        assert!(err.to_string().contains("redis"));
    }
}
