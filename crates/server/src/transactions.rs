//! Expense, payment and transaction endpoints.

use api_types::transaction::{
    DebtView, ExpenseNew, ExpenseUpdate, PaymentNew, PaymentUpdate, TransactionDetailView,
    TransactionListResponse, TransactionView,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{
    CreateExpenseCmd, CreatePaymentCmd, Debt, EditExpenseCmd, EditPaymentCmd, Transaction,
    TransactionDetail, User,
};
use uuid::Uuid;

use crate::{JsonBody, ServerError, parse_amount, server::ServerState};

fn debt_view(debt: Debt) -> DebtView {
    DebtView {
        owed_by: debt.owed_by,
        owed_to: debt.owed_to,
        amount_minor: debt.amount.cents(),
        amount: debt.amount.to_string(),
    }
}

fn transaction_view(tx: Transaction) -> TransactionView {
    let detail = match tx.detail {
        TransactionDetail::Expense(expense) => TransactionDetailView::Expense {
            description: expense.description,
            paid_by: expense.paid_by,
            amount_minor: expense.amount.cents(),
            amount: expense.amount.to_string(),
            debts: expense.debts.into_iter().map(debt_view).collect(),
        },
        TransactionDetail::Payment(payment) => TransactionDetailView::Payment {
            paid_by: payment.paid_by,
            paid_to: payment.paid_to,
            amount_minor: payment.amount.cents(),
            amount: payment.amount.to_string(),
        },
    };
    TransactionView {
        id: tx.id,
        group_id: tx.group_id,
        created_by: tx.created_by,
        created_at: tx.created_at,
        updated_at: tx.updated_at,
        detail,
    }
}

async fn user_id_by_name(state: &ServerState, username: &str) -> Result<Uuid, ServerError> {
    Ok(state.engine.user_by_username(username).await?.id)
}

async fn optional_user_id(
    state: &ServerState,
    username: Option<&str>,
) -> Result<Option<Uuid>, ServerError> {
    match username {
        Some(name) => Ok(Some(user_id_by_name(state, name).await?)),
        None => Ok(None),
    }
}

pub async fn expense_new(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
    JsonBody(payload): JsonBody<ExpenseNew>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    let amount = parse_amount(&payload.amount)?;
    let mut cmd = CreateExpenseCmd::new(group_id, user.id, payload.description, amount);
    if let Some(payer) = optional_user_id(&state, payload.paid_by.as_deref()).await? {
        cmd = cmd.paid_by(payer);
    }

    let tx = state.engine.create_expense(cmd).await?;
    Ok((StatusCode::CREATED, Json(transaction_view(tx))))
}

pub async fn expense_update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path((group_id, transaction_id)): Path<(Uuid, Uuid)>,
    JsonBody(payload): JsonBody<ExpenseUpdate>,
) -> Result<Json<TransactionView>, ServerError> {
    let mut cmd = EditExpenseCmd::new(group_id, transaction_id, user.id);
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }
    if let Some(amount) = payload.amount.as_deref() {
        cmd = cmd.amount(parse_amount(amount)?);
    }
    if let Some(payer) = optional_user_id(&state, payload.paid_by.as_deref()).await? {
        cmd = cmd.paid_by(payer);
    }

    let tx = state.engine.edit_expense(cmd).await?;
    Ok(Json(transaction_view(tx)))
}

pub async fn payment_new(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
    JsonBody(payload): JsonBody<PaymentNew>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    let amount = parse_amount(&payload.amount)?;
    let paid_to = user_id_by_name(&state, &payload.paid_to).await?;
    let mut cmd = CreatePaymentCmd::new(group_id, user.id, paid_to, amount);
    if let Some(payer) = optional_user_id(&state, payload.paid_by.as_deref()).await? {
        cmd = cmd.paid_by(payer);
    }

    let tx = state.engine.create_payment(cmd).await?;
    Ok((StatusCode::CREATED, Json(transaction_view(tx))))
}

pub async fn payment_update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path((group_id, transaction_id)): Path<(Uuid, Uuid)>,
    JsonBody(payload): JsonBody<PaymentUpdate>,
) -> Result<Json<TransactionView>, ServerError> {
    let mut cmd = EditPaymentCmd::new(group_id, transaction_id, user.id);
    if let Some(amount) = payload.amount.as_deref() {
        cmd = cmd.amount(parse_amount(amount)?);
    }
    if let Some(payer) = optional_user_id(&state, payload.paid_by.as_deref()).await? {
        cmd = cmd.paid_by(payer);
    }
    if let Some(payee) = optional_user_id(&state, payload.paid_to.as_deref()).await? {
        cmd = cmd.paid_to(payee);
    }

    let tx = state.engine.edit_payment(cmd).await?;
    Ok(Json(transaction_view(tx)))
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<TransactionListResponse>, ServerError> {
    let transactions = state
        .engine
        .group_transactions(group_id, user.id)
        .await?
        .into_iter()
        .map(transaction_view)
        .collect();
    Ok(Json(TransactionListResponse { transactions }))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path((group_id, transaction_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<TransactionView>, ServerError> {
    let tx = state
        .engine
        .transaction(group_id, transaction_id, user.id)
        .await?;
    Ok(Json(transaction_view(tx)))
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path((group_id, transaction_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_transaction(group_id, transaction_id, user.id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
