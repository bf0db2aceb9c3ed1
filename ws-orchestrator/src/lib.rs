//! Workspace service business logic
//!
//! Workspaces and targets live in a local store; live workspace status comes
//! from a remote provisioner. Verbose lookups combine the two, waiting on the
//! provisioner only up to a deadline (see [`enrichment`]). Consumed by the
//! ws-api HTTP service.

pub mod db;
pub mod enrichment;
pub mod error;
pub mod memory;
pub mod provisioner;
pub mod service;
pub mod target;
pub mod workspace;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use enrichment::{fetch_with_deadline, EnrichmentOutcome, WaitEnd, DEFAULT_INFO_TIMEOUT};
pub use error::{OrchestratorError, Result};
pub use memory::{InMemoryTargetStore, InMemoryWorkspaceStore};
pub use provisioner::{HttpProvisioner, Provisioner, ProvisionerError, WorkspaceInfo};
pub use service::{EnrichmentConfig, WorkspaceDetails, WorkspaceService};
pub use target::{SqliteTargetStore, Target, TargetFilter, TargetStore};
pub use workspace::{CreateWorkspaceRequest, SqliteWorkspaceStore, Workspace, WorkspaceStore};
