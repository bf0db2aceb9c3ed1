//! Shared fixtures for ws-orchestrator integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use ws_orchestrator::{
    EnrichmentConfig, InMemoryTargetStore, InMemoryWorkspaceStore, Provisioner, ProvisionerError,
    Target, Workspace, WorkspaceInfo, WorkspaceService,
};

/// Helper to create an in-memory test database with migrations
pub async fn create_test_db() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    ws_orchestrator::db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

pub fn workspace(id: &str, name: &str, target_id: &str) -> Workspace {
    Workspace {
        id: id.to_string(),
        name: name.to_string(),
        target_id: target_id.to_string(),
        image: "mcr.microsoft.com/devcontainers/base:ubuntu".to_string(),
        user: "developer".to_string(),
        repository_url: Some(format!("https://github.com/example/{name}")),
        created_at: DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap(),
    }
}

pub fn target(id: &str, name: &str) -> Target {
    Target {
        id: id.to_string(),
        name: name.to_string(),
        provider_name: "docker-provider".to_string(),
        provider_version: Some("0.12.1".to_string()),
        options: serde_json::json!({ "sock_path": "/var/run/docker.sock" }),
        is_default: false,
    }
}

pub fn info_for(workspace: &Workspace) -> WorkspaceInfo {
    WorkspaceInfo {
        name: workspace.name.clone(),
        created: true,
        is_running: true,
        provider_metadata: Some(format!("container:{}", workspace.id)),
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Behaviour {
    /// Answer with live info after the delay.
    Respond(Duration),
    /// Report a provider error after the delay.
    Fail(Duration),
    /// Never answer, even when cancelled.
    Hang,
}

/// Provisioner double that records how often it was asked.
pub struct ScriptedProvisioner {
    behaviour: Behaviour,
    calls: AtomicUsize,
}

impl ScriptedProvisioner {
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
impl Provisioner for ScriptedProvisioner {
    async fn get_workspace_info(
        &self,
        _cancel: CancellationToken,
        workspace: &Workspace,
        target: &Target,
    ) -> Result<WorkspaceInfo, ProvisionerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match self.behaviour {
            Behaviour::Respond(delay) => {
                tokio::time::sleep(delay).await;
                Ok(info_for(workspace))
            }
            Behaviour::Fail(delay) => {
                tokio::time::sleep(delay).await;
                Err(ProvisionerError::Provider {
                    provider: target.provider_name.clone(),
                    message: "daemon unreachable".to_string(),
                })
            }
            Behaviour::Hang => std::future::pending().await,
        }
    }
}

/// Service over in-memory stores holding workspace `ws-1` ("api") on target `local`.
pub fn service_with(provisioner: Arc<ScriptedProvisioner>, info_timeout: Duration) -> WorkspaceService {
    let workspaces = InMemoryWorkspaceStore::with_workspaces([
        workspace("ws-1", "api", "local"),
        workspace("ws-orphan", "orphan", "gone"),
    ]);
    let targets = InMemoryTargetStore::with_targets([target("local", "local-docker")]);

    WorkspaceService::new(Arc::new(workspaces), Arc::new(targets), provisioner)
        .with_config(EnrichmentConfig { info_timeout })
}
