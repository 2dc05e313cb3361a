use std::sync::Arc;

use actix_web::web::Data;
use anyhow::Context;

use crate::config::{Config, StoreBackend};
use crate::db::init_db;
use crate::scheduler::HolidayScheduler;
use crate::store::memory::MemoryStore;
use crate::store::mysql::{MySqlEmployeeDirectory, MySqlLeaveStore};
use crate::store::{EmployeeDirectory, LeaveStore};

/// Shared handles registered as actix app data.
#[derive(Clone)]
pub struct AppState {
    pub scheduler: Data<HolidayScheduler>,
    pub directory: Data<dyn EmployeeDirectory>,
}

impl AppState {
    pub fn new(leaves: Arc<dyn LeaveStore>, directory: Arc<dyn EmployeeDirectory>) -> Self {
        let scheduler = HolidayScheduler::new(leaves, directory.clone());
        Self {
            scheduler: Data::new(scheduler),
            directory: Data::from(directory),
        }
    }

    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::new(store.clone(), store)
    }

    /// Opens whichever backend the config selects.
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        match config.store_backend {
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory store, data is lost on shutdown");
                Ok(Self::in_memory())
            }
            StoreBackend::MySql => {
                let url = config
                    .database_url
                    .as_deref()
                    .context("DATABASE_URL must be set")?;
                let pool = init_db(url, config.db_max_connections)
                    .await
                    .context("Failed to connect to database")?;

                Ok(Self::new(
                    Arc::new(MySqlLeaveStore::new(pool.clone())),
                    Arc::new(MySqlEmployeeDirectory::new(pool, config.directory_cache_ttl)),
                ))
            }
        }
    }
}
