//! innkeep application library
//!
//! Rooms, bookings of those rooms, and the rule that keeps two bookings of
//! one room from overlapping.

pub mod bootstrap;
pub mod modules;
pub mod store;
pub mod utils;

pub use bootstrap::Application;
pub use store::{AppState, SqliteStore, StoreError};

#[cfg(test)]
pub(crate) mod testing {
    use innkeep_kernel::{settings::DatabaseSettings, ModuleRegistry};

    use crate::store::SqliteStore;

    /// Fresh private database with every module's schema applied.
    pub async fn memory_store() -> SqliteStore {
        let settings = DatabaseSettings {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        };
        let pool = innkeep_db::connect(&settings).await.unwrap();
        let store = std::sync::Arc::new(SqliteStore::new(pool.clone()));

        let mut registry = ModuleRegistry::new();
        crate::modules::register_all(
            &mut registry,
            &crate::store::AppState::new(store, Default::default()),
        );
        innkeep_db::migrate(&pool, &registry.collect_migrations())
            .await
            .unwrap();

        SqliteStore::new(pool)
    }
}
