//! Signup and credential endpoints.

use api_types::user::{PasswordChange, UserNew, UserView};
use axum::{Extension, Json, extract::State, http::StatusCode};
use engine::User;

use crate::{JsonBody, ServerError, server::ServerState};

fn user_view(user: User) -> UserView {
    UserView {
        id: user.id,
        username: user.username,
    }
}

/// Public: creates an account.
pub async fn signup(
    State(state): State<ServerState>,
    JsonBody(payload): JsonBody<UserNew>,
) -> Result<(StatusCode, Json<UserView>), ServerError> {
    let user = state
        .engine
        .create_user(&payload.username, &payload.password)
        .await?;
    Ok((StatusCode::CREATED, Json(user_view(user))))
}

pub async fn change_password(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    JsonBody(payload): JsonBody<PasswordChange>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .change_password(user.id, &payload.password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
