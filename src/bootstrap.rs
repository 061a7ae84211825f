//! Wiring of settings, storage, modules and the HTTP server.

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use innkeep_kernel::{settings::Settings, InitCtx, ModuleRegistry};

use crate::{
    modules,
    store::{AppState, SqliteStore},
};

/// A configured application: an open database and the registered modules.
pub struct Application {
    settings: Settings,
    store: Arc<SqliteStore>,
    registry: ModuleRegistry,
}

impl Application {
    /// Open the configured database and register every module against it.
    pub async fn connect(settings: Settings) -> anyhow::Result<Self> {
        let pool = innkeep_db::connect(&settings.database)
            .await
            .context("failed to open the database")?;
        let store = Arc::new(SqliteStore::new(pool));
        let state = AppState::new(store.clone(), settings.pagination);

        let mut registry = ModuleRegistry::new();
        modules::register_all(&mut registry, &state);
        tracing::info!(modules = registry.module_count(), "modules registered");

        Ok(Self {
            settings,
            store,
            registry,
        })
    }

    /// Apply pending module migrations. Returns how many ran.
    pub async fn migrate(&self) -> anyhow::Result<usize> {
        let migrations = self.registry.collect_migrations();
        innkeep_db::migrate(self.store.pool(), &migrations)
            .await
            .context("failed to apply migrations")
    }

    /// Every known migration as `(module, id, applied)`, in run order.
    pub async fn migration_status(&self) -> anyhow::Result<Vec<(String, String, bool)>> {
        let applied = innkeep_db::applied_migrations(self.store.pool()).await?;
        Ok(self
            .registry
            .collect_migrations()
            .into_iter()
            .map(|(module, migration)| {
                let done = applied
                    .iter()
                    .any(|(m, id)| *m == module && id == migration.id);
                (module, migration.id.to_string(), done)
            })
            .collect())
    }

    /// The full HTTP router, middleware included.
    pub fn router(&self) -> Router {
        innkeep_http::build_router(&self.registry, &self.settings)
    }

    /// Migrate, run the module lifecycle, and serve HTTP until shutdown.
    pub async fn serve(self) -> anyhow::Result<()> {
        let applied = self.migrate().await?;
        tracing::info!(applied, "database schema up to date");

        let ctx = InitCtx {
            settings: &self.settings,
        };
        self.registry.init_modules(&ctx).await?;
        self.registry.start_modules(&ctx).await?;

        let served = innkeep_http::start_server(&self.registry, &self.settings).await;

        self.registry.stop_modules().await?;
        self.store.pool().close().await;
        served
    }
}
