use super::{request_token, VerboseQuery};
use crate::{error::ApiResult, state::AppState};
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use ws_orchestrator::{CreateWorkspaceRequest, Workspace, WorkspaceDetails};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/workspaces",
            get(list_workspaces).post(create_workspace),
        )
        .route(
            "/api/v1/workspaces/{id}",
            get(get_workspace).delete(delete_workspace),
        )
}

async fn list_workspaces(
    State(state): State<AppState>,
    Query(query): Query<VerboseQuery>,
) -> ApiResult<Json<Vec<WorkspaceDetails>>> {
    let (cancel, _guard) = request_token();
    let workspaces = state
        .service
        .list_workspaces(query.verbose, &cancel)
        .await?;

    Ok(Json(workspaces))
}

async fn create_workspace(
    State(state): State<AppState>,
    Json(req): Json<CreateWorkspaceRequest>,
) -> ApiResult<Json<Workspace>> {
    let workspace = state.service.create_workspace(req).await?;

    Ok(Json(workspace))
}

async fn get_workspace(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<VerboseQuery>,
) -> ApiResult<Json<WorkspaceDetails>> {
    let (cancel, _guard) = request_token();
    let workspace = state
        .service
        .get_workspace(&id, query.verbose, &cancel)
        .await?;

    Ok(Json(workspace))
}

async fn delete_workspace(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    state.service.delete_workspace(&id).await?;

    Ok(Json(serde_json::json!({ "message": "Workspace deleted" })))
}
