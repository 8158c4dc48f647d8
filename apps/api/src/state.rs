use sqlx::SqlitePool;

use crate::analytics::AnalyticsEngine;
use crate::maintenance::MaintenanceService;
use crate::store::{BootstrapAdmin, RecordStore};

/// Shared application state injected into all route handlers via Axum extractors.
/// Each service holds a clone of the same pool.
#[derive(Clone)]
pub struct AppState {
    pub records: RecordStore,
    pub analytics: AnalyticsEngine,
    pub maintenance: MaintenanceService,
}

impl AppState {
    pub fn new(pool: SqlitePool, bootstrap: BootstrapAdmin) -> Self {
        Self {
            records: RecordStore::new(pool.clone()),
            analytics: AnalyticsEngine::new(pool.clone()),
            maintenance: MaintenanceService::new(pool, bootstrap),
        }
    }
}
