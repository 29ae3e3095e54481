//! Postgres pool factory and the module migration runner.

use anyhow::Context;
use sqlx::postgres::{PgPool, PgPoolOptions};

use folio_kernel::settings::DatabaseSettings;
use folio_kernel::Migration;

/// Bookkeeping table recording which module migrations have run.
const MIGRATIONS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS folio_migrations (
        module     TEXT        NOT NULL,
        id         TEXT        NOT NULL,
        applied_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        PRIMARY KEY (module, id)
    )
"#;

/// Open a connection pool using the configured limits.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<PgPool> {
    tracing::info!(
        target: "folio-db",
        max_connections = settings.max_connections,
        "connecting to postgres"
    );

    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(settings.acquire_timeout())
        .connect(&settings.url)
        .await
        .context("failed to connect to postgres")
}

pub async fn health_check(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .context("database health check failed")?;
    Ok(())
}

/// Apply every migration not yet recorded, each in its own transaction.
///
/// `migrations` is expected in the order produced by
/// `ModuleRegistry::collect_migrations`. Returns how many were applied.
pub async fn run_migrations(
    pool: &PgPool,
    migrations: &[(String, Migration)],
) -> anyhow::Result<usize> {
    sqlx::raw_sql(MIGRATIONS_TABLE)
        .execute(pool)
        .await
        .context("failed to create migrations table")?;

    let mut applied = 0;
    for (module, migration) in migrations {
        let mut tx = pool.begin().await.context("failed to open transaction")?;

        let already: Option<(String,)> =
            sqlx::query_as("SELECT id FROM folio_migrations WHERE module = $1 AND id = $2")
                .bind(module)
                .bind(migration.id)
                .fetch_optional(&mut *tx)
                .await
                .context("failed to read migration history")?;
        if already.is_some() {
            continue;
        }

        tracing::info!(target: "folio-db", module = %module, migration = migration.id, "applying migration");

        sqlx::raw_sql(migration.up)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("migration {}/{} failed", module, migration.id))?;
        sqlx::query("INSERT INTO folio_migrations (module, id) VALUES ($1, $2)")
            .bind(module)
            .bind(migration.id)
            .execute(&mut *tx)
            .await
            .context("failed to record migration")?;

        tx.commit().await.context("failed to commit migration")?;
        applied += 1;
    }

    Ok(applied)
}
