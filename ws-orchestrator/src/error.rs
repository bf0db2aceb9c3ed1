use crate::provisioner::ProvisionerError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, OrchestratorError>;

#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Workspace not found: {0}")]
    NotFound(String),

    #[error("Target not found: {0}")]
    TargetNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Provisioner error: {0}")]
    Provisioner(#[from] ProvisionerError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl OrchestratorError {
    /// True for missing workspaces or targets.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            OrchestratorError::NotFound(_) | OrchestratorError::TargetNotFound(_)
        )
    }
}
