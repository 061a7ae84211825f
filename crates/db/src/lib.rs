//! SQLite pool factory and migration runner.

use std::str::FromStr;

use anyhow::Context;
use innkeep_kernel::{settings::DatabaseSettings, Migration};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

const MIGRATIONS_TABLE: &str = "_innkeep_migrations";

/// Open a connection pool for the configured database.
///
/// Foreign keys are switched on for every connection; the cascade from rooms
/// to bookings depends on it. In-memory databases are private to a single
/// connection, so their pool is pinned to exactly one connection that is
/// never recycled.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&settings.url)
        .with_context(|| format!("invalid database url '{}'", settings.url))?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool_options = if settings.is_in_memory() {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(settings.max_connections.max(1))
    };

    let pool = pool_options
        .connect_with(options)
        .await
        .with_context(|| format!("failed to connect to '{}'", settings.url))?;

    tracing::info!(
        target: "innkeep-db",
        url = %settings.url,
        in_memory = settings.is_in_memory(),
        "database pool ready"
    );

    Ok(pool)
}

/// Apply every migration that has not been recorded yet.
///
/// Each migration runs in its own transaction together with its bookkeeping
/// row, so a failing script leaves no partial schema behind. Returns the
/// number of migrations applied by this call.
pub async fn migrate(
    pool: &SqlitePool,
    migrations: &[(String, Migration)],
) -> anyhow::Result<usize> {
    ensure_migrations_table(pool).await?;

    let mut applied = 0;
    for (module, migration) in migrations {
        let already: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM {MIGRATIONS_TABLE} WHERE module = ?1 AND id = ?2"
        ))
        .bind(module)
        .bind(migration.id)
        .fetch_one(pool)
        .await
        .context("failed to read migration history")?;

        if already > 0 {
            tracing::debug!(target: "innkeep-db", module = %module, id = migration.id, "migration already applied");
            continue;
        }

        let mut tx = pool.begin().await.context("failed to open migration transaction")?;

        sqlx::raw_sql(migration.up)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("migration {}/{} failed", module, migration.id))?;

        sqlx::query(&format!(
            "INSERT INTO {MIGRATIONS_TABLE} (module, id, applied_at) VALUES (?1, ?2, ?3)"
        ))
        .bind(module)
        .bind(migration.id)
        .bind(chrono::Utc::now().timestamp_micros())
        .execute(&mut *tx)
        .await
        .context("failed to record migration")?;

        tx.commit()
            .await
            .with_context(|| format!("failed to commit migration {}/{}", module, migration.id))?;

        tracing::info!(target: "innkeep-db", module = %module, id = migration.id, "migration applied");
        applied += 1;
    }

    Ok(applied)
}

/// List the migrations recorded as applied, as `(module, id)` pairs in application order.
pub async fn applied_migrations(pool: &SqlitePool) -> anyhow::Result<Vec<(String, String)>> {
    ensure_migrations_table(pool).await?;

    let rows: Vec<(String, String)> = sqlx::query_as(&format!(
        "SELECT module, id FROM {MIGRATIONS_TABLE} ORDER BY applied_at, rowid"
    ))
    .fetch_all(pool)
    .await
    .context("failed to read migration history")?;

    Ok(rows)
}

async fn ensure_migrations_table(pool: &SqlitePool) -> anyhow::Result<()> {
    sqlx::query(&format!(
        "CREATE TABLE IF NOT EXISTS {MIGRATIONS_TABLE} (
            module     TEXT NOT NULL,
            id         TEXT NOT NULL,
            applied_at INTEGER NOT NULL,
            PRIMARY KEY (module, id)
        )"
    ))
    .execute(pool)
    .await
    .context("failed to create migrations table")?;

    Ok(())
}
