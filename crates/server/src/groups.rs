//! Group endpoints. Renaming and deleting are owner-only.

use api_types::group::{GroupName, GroupView, GroupsResponse};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{Group, User};
use uuid::Uuid;

use crate::{JsonBody, ServerError, server::ServerState};

fn group_view(group: Group) -> GroupView {
    GroupView {
        id: group.id,
        name: group.name,
        owner_id: group.owner_id,
        created_at: group.created_at,
        updated_at: group.updated_at,
    }
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<GroupsResponse>, ServerError> {
    let groups = state
        .engine
        .groups_for_user(user.id)
        .await?
        .into_iter()
        .map(group_view)
        .collect();
    Ok(Json(GroupsResponse { groups }))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    JsonBody(payload): JsonBody<GroupName>,
) -> Result<(StatusCode, Json<GroupView>), ServerError> {
    let group = state.engine.create_group(&payload.name, user.id).await?;
    Ok((StatusCode::CREATED, Json(group_view(group))))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<GroupView>, ServerError> {
    let group = state.engine.group(group_id, user.id).await?;
    Ok(Json(group_view(group)))
}

pub async fn rename(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
    JsonBody(payload): JsonBody<GroupName>,
) -> Result<Json<GroupView>, ServerError> {
    let group = state
        .engine
        .rename_group(group_id, &payload.name, user.id)
        .await?;
    Ok(Json(group_view(group)))
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_group(group_id, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
