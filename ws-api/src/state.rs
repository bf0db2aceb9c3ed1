use sqlx::SqlitePool;
use std::sync::Arc;
use ws_orchestrator::{
    EnrichmentConfig, Provisioner, SqliteTargetStore, SqliteWorkspaceStore, WorkspaceService,
};

#[derive(Clone)]
pub struct AppState {
    pub service: WorkspaceService,
    pub pool: SqlitePool,
}

impl AppState {
    pub fn new(
        pool: SqlitePool,
        provisioner: Arc<dyn Provisioner>,
        enrichment: EnrichmentConfig,
    ) -> Self {
        let service = WorkspaceService::new(
            Arc::new(SqliteWorkspaceStore::new(pool.clone())),
            Arc::new(SqliteTargetStore::new(pool.clone())),
            provisioner,
        )
        .with_config(enrichment);

        Self { service, pool }
    }
}
