//! Membership management endpoints (owner-only writes).

use api_types::membership::{MemberAdd, MemberView, MembersResponse};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{Member, User};
use uuid::Uuid;

use crate::{JsonBody, ServerError, server::ServerState};

fn member_view(member: Member) -> MemberView {
    MemberView {
        user_id: member.user_id,
        username: member.username,
        joined_at: member.joined_at,
    }
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<MembersResponse>, ServerError> {
    let members = state
        .engine
        .members(group_id, user.id)
        .await?
        .into_iter()
        .map(member_view)
        .collect();
    Ok(Json(MembersResponse { members }))
}

pub async fn add(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
    JsonBody(payload): JsonBody<MemberAdd>,
) -> Result<(StatusCode, Json<MemberView>), ServerError> {
    let member = state
        .engine
        .add_member(group_id, &payload.username, user.id)
        .await?;
    Ok((StatusCode::CREATED, Json(member_view(member))))
}

pub async fn remove(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path((group_id, member_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .remove_member(group_id, member_id, user.id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
