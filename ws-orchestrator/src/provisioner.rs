use crate::target::Target;
use crate::workspace::Workspace;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

/// Live status of a workspace as reported by its provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceInfo {
    pub name: String,
    pub created: bool,
    pub is_running: bool,
    /// Opaque provider payload (container ids, VM state, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_metadata: Option<String>,
}

#[derive(Error, Debug)]
pub enum ProvisionerError {
    #[error("Invalid provisioner URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Provisioner request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Provisioner returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Provider {provider} failed: {message}")]
    Provider { provider: String, message: String },

    #[error("Provisioner request cancelled")]
    Cancelled,
}

/// The remote backend that knows the live state of provisioned workspaces.
///
/// `cancel` fires once the caller has stopped waiting for the answer.
/// Implementations should return promptly when it does; callers never
/// depend on it.
#[async_trait]
pub trait Provisioner: Send + Sync {
    async fn get_workspace_info(
        &self,
        cancel: CancellationToken,
        workspace: &Workspace,
        target: &Target,
    ) -> Result<WorkspaceInfo, ProvisionerError>;
}

#[derive(Serialize)]
struct InfoRequest<'a> {
    workspace: &'a Workspace,
    target: &'a Target,
}

/// Provisioner reached over HTTP: `POST {base}/workspace-info`.
#[derive(Clone, Debug)]
pub struct HttpProvisioner {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpProvisioner {
    pub fn new(base_url: &str) -> Result<Self, ProvisionerError> {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Result<Self, ProvisionerError> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Self {
            client,
            endpoint: base.join("workspace-info")?,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl Provisioner for HttpProvisioner {
    async fn get_workspace_info(
        &self,
        cancel: CancellationToken,
        workspace: &Workspace,
        target: &Target,
    ) -> Result<WorkspaceInfo, ProvisionerError> {
        debug!(
            endpoint = %self.endpoint,
            workspace = %workspace.name,
            target = %target.name,
            "requesting workspace info"
        );

        let request = self
            .client
            .post(self.endpoint.clone())
            .json(&InfoRequest { workspace, target })
            .send();

        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(ProvisionerError::Cancelled),
            response = request => response?,
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProvisionerError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<WorkspaceInfo>().await?)
    }
}
