use crate::enrichment::{fetch_with_deadline, EnrichmentOutcome, WaitEnd, DEFAULT_INFO_TIMEOUT};
use crate::error::{OrchestratorError, Result};
use crate::provisioner::{Provisioner, WorkspaceInfo};
use crate::target::{Target, TargetFilter, TargetStore};
use crate::workspace::{CreateWorkspaceRequest, Workspace, WorkspaceStore};
use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, instrument, warn};
use uuid::Uuid;

pub const DEFAULT_IMAGE: &str = "mcr.microsoft.com/devcontainers/base:ubuntu";
pub const DEFAULT_USER: &str = "developer";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrichmentConfig {
    /// How long a verbose lookup waits for the provisioner.
    pub info_timeout: Duration,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            info_timeout: DEFAULT_INFO_TIMEOUT,
        }
    }
}

/// A workspace plus, for verbose lookups, whatever live info arrived in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceDetails {
    #[serde(flatten)]
    pub workspace: Workspace,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<WorkspaceInfo>,
}

impl From<Workspace> for WorkspaceDetails {
    fn from(workspace: Workspace) -> Self {
        Self {
            workspace,
            info: None,
        }
    }
}

#[derive(Clone)]
pub struct WorkspaceService {
    workspaces: Arc<dyn WorkspaceStore>,
    targets: Arc<dyn TargetStore>,
    provisioner: Arc<dyn Provisioner>,
    config: EnrichmentConfig,
}

impl WorkspaceService {
    pub fn new(
        workspaces: Arc<dyn WorkspaceStore>,
        targets: Arc<dyn TargetStore>,
        provisioner: Arc<dyn Provisioner>,
    ) -> Self {
        Self {
            workspaces,
            targets,
            provisioner,
            config: EnrichmentConfig::default(),
        }
    }

    pub fn with_config(mut self, config: EnrichmentConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &EnrichmentConfig {
        &self.config
    }

    pub fn targets(&self) -> &dyn TargetStore {
        self.targets.as_ref()
    }

    /// Resolve a workspace and, when `verbose`, attach live info from the
    /// provisioner.
    ///
    /// A missing workspace or target fails the call, as does an error reported
    /// by the provisioner. A provisioner that is too slow, or a caller that
    /// cancels first, only costs the `info` field.
    #[instrument(skip(self, cancel), fields(timeout_ms = self.config.info_timeout.as_millis() as u64))]
    pub async fn get_workspace(
        &self,
        id_or_name: &str,
        verbose: bool,
        cancel: &CancellationToken,
    ) -> Result<WorkspaceDetails> {
        let workspace = self.workspaces.find(id_or_name).await.map_err(|err| {
            if !err.is_not_found() {
                debug!(error = %err, "workspace lookup failed");
            }
            OrchestratorError::NotFound(id_or_name.to_string())
        })?;

        if !verbose {
            return Ok(workspace.into());
        }

        let target = self
            .targets
            .find(&TargetFilter::id_or_name(&workspace.target_id))
            .await?;

        let info = self.fetch_info(&workspace, target, cancel).await?;

        Ok(WorkspaceDetails { workspace, info })
    }

    /// List all workspaces. Verbose listings enrich every workspace
    /// concurrently, each under its own deadline; a workspace whose info
    /// cannot be fetched is listed without it.
    #[instrument(skip(self, cancel))]
    pub async fn list_workspaces(
        &self,
        verbose: bool,
        cancel: &CancellationToken,
    ) -> Result<Vec<WorkspaceDetails>> {
        let workspaces = self.workspaces.list().await?;

        if !verbose {
            return Ok(workspaces.into_iter().map(WorkspaceDetails::from).collect());
        }

        let lookups = workspaces.into_iter().map(|workspace| async move {
            let info = match self.lookup_info(&workspace, cancel).await {
                Ok(info) => info,
                Err(err) => {
                    warn!(workspace = %workspace.name, error = %err, "listing workspace without info");
                    None
                }
            };
            WorkspaceDetails { workspace, info }
        });

        Ok(join_all(lookups).await)
    }

    #[instrument(skip(self, req), fields(name = %req.name))]
    pub async fn create_workspace(&self, req: CreateWorkspaceRequest) -> Result<Workspace> {
        validate_name(&req.name)?;

        match self.workspaces.find(&req.name).await {
            Ok(_) => {
                return Err(OrchestratorError::InvalidInput(format!(
                    "workspace {} already exists",
                    req.name
                )))
            }
            Err(err) if err.is_not_found() => {}
            Err(err) => return Err(err),
        }

        let filter = match &req.target {
            Some(target) => TargetFilter::id_or_name(target),
            None => TargetFilter::default_target(),
        };
        let target = self.targets.find(&filter).await?;

        let workspace = Workspace {
            id: Uuid::new_v4().to_string(),
            name: req.name,
            target_id: target.id,
            image: req.image.unwrap_or_else(|| DEFAULT_IMAGE.to_string()),
            user: req.user.unwrap_or_else(|| DEFAULT_USER.to_string()),
            repository_url: req.repository_url,
            created_at: now_seconds(),
        };

        self.workspaces.save(&workspace).await?;

        Ok(workspace)
    }

    #[instrument(skip(self))]
    pub async fn delete_workspace(&self, id_or_name: &str) -> Result<()> {
        let workspace = self.workspaces.find(id_or_name).await?;
        self.workspaces.delete(&workspace.id).await
    }

    async fn lookup_info(
        &self,
        workspace: &Workspace,
        cancel: &CancellationToken,
    ) -> Result<Option<WorkspaceInfo>> {
        let target = self
            .targets
            .find(&TargetFilter::id_or_name(&workspace.target_id))
            .await?;

        self.fetch_info(workspace, target, cancel).await
    }

    async fn fetch_info(
        &self,
        workspace: &Workspace,
        target: Target,
        cancel: &CancellationToken,
    ) -> Result<Option<WorkspaceInfo>> {
        let provisioner = Arc::clone(&self.provisioner);
        let remote_workspace = workspace.clone();

        let outcome = fetch_with_deadline(cancel, self.config.info_timeout, move |token| async move {
            provisioner
                .get_workspace_info(token, &remote_workspace, &target)
                .await
        })
        .await;

        match outcome {
            EnrichmentOutcome::Success(info) => Ok(Some(info)),
            EnrichmentOutcome::OperationalFailure(err) => {
                error!(workspace = %workspace.name, error = %err, "failed to get workspace info");
                Err(err.into())
            }
            EnrichmentOutcome::TimedOut(WaitEnd::DeadlineExceeded) => {
                warn!(workspace = %workspace.name, "timeout getting workspace info");
                Ok(None)
            }
            EnrichmentOutcome::TimedOut(WaitEnd::Cancelled) => {
                warn!(workspace = %workspace.name, "cancelled getting workspace info");
                Ok(None)
            }
            EnrichmentOutcome::TimedOut(WaitEnd::WorkerLost) => {
                error!(workspace = %workspace.name, "workspace info worker exited without a result");
                Ok(None)
            }
        }
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(OrchestratorError::InvalidInput(
            "workspace name must not be empty".to_string(),
        ));
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(OrchestratorError::InvalidInput(format!(
            "invalid workspace name {name:?}: only letters, digits, '-' and '_' are allowed"
        )));
    }

    Ok(())
}

// Stores keep second precision; keep returned records comparable with fetched ones.
fn now_seconds() -> DateTime<Utc> {
    DateTime::from_timestamp(Utc::now().timestamp(), 0).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_simple_names() {
        assert!(validate_name("api-server_2").is_ok());
    }

    #[test]
    fn rejects_empty_and_odd_names() {
        assert!(matches!(
            validate_name(""),
            Err(OrchestratorError::InvalidInput(_))
        ));
        assert!(matches!(
            validate_name("my workspace"),
            Err(OrchestratorError::InvalidInput(_))
        ));
        assert!(matches!(
            validate_name("../etc"),
            Err(OrchestratorError::InvalidInput(_))
        ));
    }

    #[test]
    fn details_serialize_flat_and_omit_missing_info() {
        let details = WorkspaceDetails::from(Workspace {
            id: "ws-1".to_string(),
            name: "api".to_string(),
            target_id: "local".to_string(),
            image: DEFAULT_IMAGE.to_string(),
            user: DEFAULT_USER.to_string(),
            repository_url: None,
            created_at: now_seconds(),
        });

        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["id"], "ws-1");
        assert!(json.get("info").is_none());
    }
}
