use crate::{error::ApiResult, state::AppState};
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;
use ws_orchestrator::{OrchestratorError, Target, TargetFilter};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/targets", get(list_targets).post(create_target))
        .route("/api/v1/targets/{id}", get(get_target))
}

#[derive(Debug, Deserialize)]
pub struct CreateTargetRequest {
    pub name: String,
    pub provider_name: String,
    #[serde(default)]
    pub provider_version: Option<String>,
    #[serde(default)]
    pub options: Option<serde_json::Value>,
    #[serde(default)]
    pub is_default: bool,
}

async fn list_targets(State(state): State<AppState>) -> ApiResult<Json<Vec<Target>>> {
    let targets = state.service.targets().list(&TargetFilter::default()).await?;

    Ok(Json(targets))
}

async fn create_target(
    State(state): State<AppState>,
    Json(req): Json<CreateTargetRequest>,
) -> ApiResult<Json<Target>> {
    if req.name.trim().is_empty() {
        return Err(OrchestratorError::InvalidInput("target name must not be empty".into()).into());
    }

    let store = state.service.targets();
    match store.find(&TargetFilter::id_or_name(&req.name)).await {
        Ok(_) => {
            return Err(OrchestratorError::InvalidInput(format!(
                "target {} already exists",
                req.name
            ))
            .into())
        }
        Err(err) if err.is_not_found() => {}
        Err(err) => return Err(err.into()),
    }

    let target = Target {
        id: Uuid::new_v4().to_string(),
        name: req.name,
        provider_name: req.provider_name,
        provider_version: req.provider_version,
        options: req
            .options
            .unwrap_or_else(|| serde_json::Value::Object(Default::default())),
        is_default: req.is_default,
    };
    store.save(&target).await?;

    Ok(Json(target))
}

async fn get_target(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Target>> {
    let target = state
        .service
        .targets()
        .find(&TargetFilter::id_or_name(id))
        .await?;

    Ok(Json(target))
}
