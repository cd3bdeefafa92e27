//! Balance endpoints. Positive amounts mean the caller owes the other member.

use api_types::balance::{BalanceView, BalancesResponse};
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use engine::{MoneyCents, User};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn balance_view(other_user_id: Uuid, amount: MoneyCents) -> BalanceView {
    BalanceView {
        other_user_id,
        amount_minor: amount.cents(),
        amount: amount.to_string(),
    }
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<BalancesResponse>, ServerError> {
    let balances = state
        .engine
        .group_balances(group_id, user.id)
        .await?
        .into_iter()
        .map(|b| balance_view(b.other_user_id, b.amount))
        .collect();
    Ok(Json(BalancesResponse { balances }))
}

pub async fn pairwise(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path((group_id, other_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<BalanceView>, ServerError> {
    let amount = state
        .engine
        .pairwise_balance(group_id, user.id, other_id, user.id)
        .await?;
    Ok(Json(balance_view(other_id, amount)))
}
