use crate::error::{OrchestratorError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
    pub id: String,
    pub name: String,
    /// Id or name of the target this workspace is provisioned on.
    pub target_id: String,
    pub image: String,
    pub user: String,
    pub repository_url: Option<String>,

    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWorkspaceRequest {
    pub name: String,
    /// Target id or name; the default target is used when omitted.
    pub target: Option<String>,
    pub image: Option<String>,
    pub user: Option<String>,
    pub repository_url: Option<String>,
}

/// Lookup and persistence of workspaces.
///
/// Implementations must be safe to share between concurrent requests.
#[async_trait]
pub trait WorkspaceStore: Send + Sync {
    /// Resolve a workspace by id, falling back to its name.
    async fn find(&self, id_or_name: &str) -> Result<Workspace>;

    async fn list(&self) -> Result<Vec<Workspace>>;

    async fn save(&self, workspace: &Workspace) -> Result<()>;

    async fn delete(&self, id: &str) -> Result<()>;
}

#[derive(Clone)]
pub struct SqliteWorkspaceStore {
    pool: SqlitePool,
}

impl SqliteWorkspaceStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a reference to the database pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl WorkspaceStore for SqliteWorkspaceStore {
    async fn find(&self, id_or_name: &str) -> Result<Workspace> {
        let row = sqlx::query_as::<_, WorkspaceRow>(
            "SELECT * FROM workspaces WHERE id = ? OR name = ? ORDER BY (id = ?) DESC LIMIT 1",
        )
        .bind(id_or_name)
        .bind(id_or_name)
        .bind(id_or_name)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| OrchestratorError::NotFound(id_or_name.to_string()))?;

        Ok(row.into())
    }

    async fn list(&self) -> Result<Vec<Workspace>> {
        let rows = sqlx::query_as::<_, WorkspaceRow>(
            "SELECT * FROM workspaces ORDER BY created_at DESC, name ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Workspace::from).collect())
    }

    async fn save(&self, workspace: &Workspace) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO workspaces (id, name, target_id, image, user, repository_url, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                target_id = excluded.target_id,
                image = excluded.image,
                user = excluded.user,
                repository_url = excluded.repository_url
            "#,
        )
        .bind(&workspace.id)
        .bind(&workspace.name)
        .bind(&workspace.target_id)
        .bind(&workspace.image)
        .bind(&workspace.user)
        .bind(&workspace.repository_url)
        .bind(workspace.created_at.timestamp())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM workspaces WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(OrchestratorError::NotFound(id.to_string()));
        }

        Ok(())
    }
}

// Internal row type for sqlx
#[derive(sqlx::FromRow)]
struct WorkspaceRow {
    id: String,
    name: String,
    target_id: String,
    image: String,
    user: String,
    repository_url: Option<String>,
    created_at: i64,
}

impl From<WorkspaceRow> for Workspace {
    fn from(row: WorkspaceRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            target_id: row.target_id,
            image: row.image,
            user: row.user,
            repository_url: row.repository_url,
            created_at: DateTime::from_timestamp(row.created_at, 0).unwrap_or_default(),
        }
    }
}
