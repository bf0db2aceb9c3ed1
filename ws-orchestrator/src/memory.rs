//! In-process stores for embedding and tests.

use crate::error::{OrchestratorError, Result};
use crate::target::{Target, TargetFilter, TargetStore};
use crate::workspace::{Workspace, WorkspaceStore};
use async_trait::async_trait;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct InMemoryWorkspaceStore {
    workspaces: RwLock<Vec<Workspace>>,
}

impl InMemoryWorkspaceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_workspaces(workspaces: impl IntoIterator<Item = Workspace>) -> Self {
        Self {
            workspaces: RwLock::new(workspaces.into_iter().collect()),
        }
    }
}

#[async_trait]
impl WorkspaceStore for InMemoryWorkspaceStore {
    async fn find(&self, id_or_name: &str) -> Result<Workspace> {
        let workspaces = self.workspaces.read().await;

        workspaces
            .iter()
            .find(|w| w.id == id_or_name)
            .or_else(|| workspaces.iter().find(|w| w.name == id_or_name))
            .cloned()
            .ok_or_else(|| OrchestratorError::NotFound(id_or_name.to_string()))
    }

    async fn list(&self) -> Result<Vec<Workspace>> {
        Ok(self.workspaces.read().await.clone())
    }

    async fn save(&self, workspace: &Workspace) -> Result<()> {
        let mut workspaces = self.workspaces.write().await;

        match workspaces.iter_mut().find(|w| w.id == workspace.id) {
            Some(existing) => *existing = workspace.clone(),
            None => workspaces.push(workspace.clone()),
        }

        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut workspaces = self.workspaces.write().await;
        let before = workspaces.len();
        workspaces.retain(|w| w.id != id);

        if workspaces.len() == before {
            return Err(OrchestratorError::NotFound(id.to_string()));
        }

        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryTargetStore {
    targets: RwLock<Vec<Target>>,
}

impl InMemoryTargetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_targets(targets: impl IntoIterator<Item = Target>) -> Self {
        Self {
            targets: RwLock::new(targets.into_iter().collect()),
        }
    }
}

#[async_trait]
impl TargetStore for InMemoryTargetStore {
    async fn list(&self, filter: &TargetFilter) -> Result<Vec<Target>> {
        Ok(self
            .targets
            .read()
            .await
            .iter()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect())
    }

    async fn save(&self, target: &Target) -> Result<()> {
        let mut targets = self.targets.write().await;

        if target.is_default {
            for other in targets.iter_mut() {
                other.is_default = false;
            }
        }

        match targets.iter_mut().find(|t| t.id == target.id) {
            Some(existing) => *existing = target.clone(),
            None => targets.push(target.clone()),
        }

        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut targets = self.targets.write().await;
        let before = targets.len();
        targets.retain(|t| t.id != id);

        if targets.len() == before {
            return Err(OrchestratorError::TargetNotFound(id.to_string()));
        }

        Ok(())
    }
}
