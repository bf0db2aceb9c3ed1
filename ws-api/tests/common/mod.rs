//! Common test utilities and helpers for ws-api tests

#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use sqlx::SqlitePool;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use ws_api::AppState;
use ws_orchestrator::{
    EnrichmentConfig, Provisioner, ProvisionerError, SqliteTargetStore, SqliteWorkspaceStore,
    Target, TargetStore, Workspace, WorkspaceInfo, WorkspaceStore,
};

pub use ws_orchestrator::test_utils::create_test_db;

#[derive(Debug, Clone, Copy)]
pub enum Behaviour {
    Respond,
    Fail,
    Hang,
}

pub struct StubProvisioner {
    behaviour: Behaviour,
    calls: AtomicUsize,
}

impl StubProvisioner {
    pub fn new(behaviour: Behaviour) -> Arc<Self> {
        Arc::new(Self {
            behaviour,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Provisioner for StubProvisioner {
    async fn get_workspace_info(
        &self,
        _cancel: CancellationToken,
        workspace: &Workspace,
        _target: &Target,
    ) -> Result<WorkspaceInfo, ProvisionerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match self.behaviour {
            Behaviour::Respond => Ok(WorkspaceInfo {
                name: workspace.name.clone(),
                created: true,
                is_running: true,
                provider_metadata: None,
            }),
            Behaviour::Fail => Err(ProvisionerError::Status {
                status: 500,
                body: "provider crashed".to_string(),
            }),
            Behaviour::Hang => std::future::pending().await,
        }
    }
}

/// Create a test app with the given database pool
pub fn create_test_app(
    pool: SqlitePool,
    provisioner: Arc<StubProvisioner>,
    info_timeout: Duration,
) -> Router {
    let state = AppState::new(pool, provisioner, EnrichmentConfig { info_timeout });
    ws_api::create_app(state)
}

/// Fixture: target `t-1` ("local") and workspace `ws-1` ("api") on it
pub async fn seed(pool: &SqlitePool) {
    SqliteTargetStore::new(pool.clone())
        .save(&Target {
            id: "t-1".to_string(),
            name: "local".to_string(),
            provider_name: "docker-provider".to_string(),
            provider_version: None,
            options: serde_json::json!({}),
            is_default: true,
        })
        .await
        .expect("Failed to seed target");

    SqliteWorkspaceStore::new(pool.clone())
        .save(&Workspace {
            id: "ws-1".to_string(),
            name: "api".to_string(),
            target_id: "t-1".to_string(),
            image: "rust:1.84".to_string(),
            user: "developer".to_string(),
            repository_url: None,
            created_at: chrono::DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        })
        .await
        .expect("Failed to seed workspace");
}

/// Helper to extract JSON body from axum response
pub async fn extract_json_body<T>(response: axum::response::Response) -> T
where
    T: serde::de::DeserializeOwned,
{
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");

    serde_json::from_slice(&body).expect("Failed to deserialize JSON")
}
