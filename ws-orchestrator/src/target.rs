use crate::error::{OrchestratorError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::fmt;

/// A provisioning target: the provider and options a workspace runs on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub id: String,
    pub name: String,
    pub provider_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_version: Option<String>,
    /// Provider-specific options, passed through to the provisioner untouched.
    #[serde(default = "empty_options")]
    pub options: serde_json::Value,
    #[serde(default)]
    pub is_default: bool,
}

fn empty_options() -> serde_json::Value {
    serde_json::Value::Object(Default::default())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetFilter {
    pub id_or_name: Option<String>,
    pub default: Option<bool>,
}

impl TargetFilter {
    pub fn id_or_name(value: impl Into<String>) -> Self {
        Self {
            id_or_name: Some(value.into()),
            default: None,
        }
    }

    pub fn default_target() -> Self {
        Self {
            id_or_name: None,
            default: Some(true),
        }
    }

    pub fn matches(&self, target: &Target) -> bool {
        let by_key = self
            .id_or_name
            .as_ref()
            .is_none_or(|key| target.id == *key || target.name == *key);
        let by_default = self.default.is_none_or(|d| target.is_default == d);

        by_key && by_default
    }
}

impl fmt::Display for TargetFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.id_or_name, self.default) {
            (Some(key), _) => write!(f, "{key}"),
            (None, Some(true)) => write!(f, "<default>"),
            _ => write!(f, "<any>"),
        }
    }
}

/// Lookup and persistence of targets.
///
/// Implementations must be safe to share between concurrent requests.
#[async_trait]
pub trait TargetStore: Send + Sync {
    async fn list(&self, filter: &TargetFilter) -> Result<Vec<Target>>;

    /// First target matching `filter`, or `TargetNotFound`.
    async fn find(&self, filter: &TargetFilter) -> Result<Target> {
        self.list(filter)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| OrchestratorError::TargetNotFound(filter.to_string()))
    }

    /// Insert or replace. Saving a default target clears the flag on all others.
    async fn save(&self, target: &Target) -> Result<()>;

    async fn delete(&self, id: &str) -> Result<()>;
}

#[derive(Clone)]
pub struct SqliteTargetStore {
    pool: SqlitePool,
}

impl SqliteTargetStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TargetStore for SqliteTargetStore {
    async fn list(&self, filter: &TargetFilter) -> Result<Vec<Target>> {
        let mut query = "SELECT * FROM targets WHERE 1=1".to_string();

        if filter.id_or_name.is_some() {
            query.push_str(" AND (id = ? OR name = ?)");
        }
        if filter.default.is_some() {
            query.push_str(" AND is_default = ?");
        }

        query.push_str(" ORDER BY name ASC");

        let mut q = sqlx::query_as::<_, TargetRow>(&query);

        if let Some(key) = &filter.id_or_name {
            q = q.bind(key).bind(key);
        }
        if let Some(is_default) = filter.default {
            q = q.bind(is_default);
        }

        let rows = q.fetch_all(&self.pool).await?;

        rows.into_iter().map(Target::try_from).collect()
    }

    async fn save(&self, target: &Target) -> Result<()> {
        let options = serde_json::to_string(&target.options)?;
        let mut tx = self.pool.begin().await?;

        if target.is_default {
            sqlx::query("UPDATE targets SET is_default = 0 WHERE id != ?")
                .bind(&target.id)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query(
            r#"
            INSERT INTO targets (id, name, provider_name, provider_version, options, is_default)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                provider_name = excluded.provider_name,
                provider_version = excluded.provider_version,
                options = excluded.options,
                is_default = excluded.is_default
            "#,
        )
        .bind(&target.id)
        .bind(&target.name)
        .bind(&target.provider_name)
        .bind(&target.provider_version)
        .bind(options)
        .bind(target.is_default)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM targets WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(OrchestratorError::TargetNotFound(id.to_string()));
        }

        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct TargetRow {
    id: String,
    name: String,
    provider_name: String,
    provider_version: Option<String>,
    options: String,
    is_default: bool,
}

impl TryFrom<TargetRow> for Target {
    type Error = OrchestratorError;

    fn try_from(row: TargetRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            name: row.name,
            provider_name: row.provider_name,
            provider_version: row.provider_version,
            options: serde_json::from_str(&row.options)?,
            is_default: row.is_default,
        })
    }
}
