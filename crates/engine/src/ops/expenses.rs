use chrono::Utc;
use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    CreateExpenseCmd, Debt, EditExpenseCmd, EngineError, Expense, MoneyCents, ResultEngine,
    Transaction, TransactionDetail, TransactionKind, debts, expenses, split_evenly, transactions,
    util::{ensure_expense_amount, normalize_required_text, parse_uuid},
};

use super::{Engine, with_tx};

impl Engine {
    /// Records an expense and fans it out into debts owed to the payer.
    ///
    /// The envelope, the expense and every debt are written in one scoped
    /// transaction.
    pub async fn create_expense(&self, cmd: CreateExpenseCmd) -> ResultEngine<Transaction> {
        let payer = cmd.payer();
        let CreateExpenseCmd {
            group_id,
            caller,
            description,
            amount,
            ..
        } = cmd;
        with_tx!(self, |db_tx| {
            self.require_member(&db_tx, group_id, caller).await?;
            let description = normalize_required_text(&description, "description")?;
            ensure_expense_amount(amount)?;
            self.require_payer(&db_tx, group_id, payer, "payer").await?;

            let now = Utc::now();
            let transaction_id = Uuid::new_v4();
            let envelope = transactions::new_envelope(
                transaction_id,
                group_id,
                caller,
                TransactionKind::Expense,
                now,
            )
            .insert(&db_tx)
            .await?;

            let mut expense = Expense {
                id: Uuid::new_v4(),
                description,
                amount,
                paid_by: payer,
                debts: Vec::new(),
            };
            expense.to_active(transaction_id).insert(&db_tx).await?;
            expense.debts = self
                .recompute_debts(&db_tx, group_id, expense.id, amount, payer)
                .await?;

            Transaction::from_parts(envelope, TransactionDetail::Expense(expense))
        })
    }

    /// Edits an expense and regenerates its debts (creator-only).
    ///
    /// Unset fields keep their stored value. Debts are always recomputed
    /// against the *current* membership, so members who left since the
    /// expense was recorded drop out of the split. If the retained payer has
    /// left the group, a new payer must be supplied.
    pub async fn edit_expense(&self, cmd: EditExpenseCmd) -> ResultEngine<Transaction> {
        let EditExpenseCmd {
            group_id,
            transaction_id,
            caller,
            description,
            amount,
            paid_by,
        } = cmd;
        with_tx!(self, |db_tx| {
            let envelope = self
                .require_editable_transaction(&db_tx, group_id, transaction_id, caller)
                .await?;
            if TransactionKind::try_from(envelope.kind.as_str())? != TransactionKind::Expense {
                return Err(EngineError::InvalidInput(
                    "transaction is not an expense".to_string(),
                ));
            }

            let description = description
                .as_deref()
                .map(|d| normalize_required_text(d, "description"))
                .transpose()?;
            if let Some(amount) = amount {
                ensure_expense_amount(amount)?;
            }
            if let Some(payer) = paid_by {
                self.require_payer(&db_tx, group_id, payer, "payer").await?;
            }

            let model = expenses::Entity::find()
                .filter(expenses::Column::TransactionId.eq(envelope.id.clone()))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("expense not exists".to_string()))?;
            let expense_id = parse_uuid(&model.id, "expense")?;
            let amount = amount.unwrap_or(MoneyCents::new(model.amount_minor));
            let payer = match paid_by {
                Some(payer) => payer,
                None => parse_uuid(&model.paid_by, "payer")?,
            };

            let mut active: expenses::ActiveModel = model.into();
            if let Some(description) = description {
                active.description = ActiveValue::Set(description);
            }
            active.amount_minor = ActiveValue::Set(amount.cents());
            active.paid_by = ActiveValue::Set(payer.to_string());
            let model = active.update(&db_tx).await?;

            let mut envelope: transactions::ActiveModel = envelope.into();
            envelope.updated_at = ActiveValue::Set(Utc::now());
            let envelope = envelope.update(&db_tx).await?;

            let debts = self
                .recompute_debts(&db_tx, group_id, expense_id, amount, payer)
                .await?;
            let expense = Expense::from_model(model, debts)?;
            Transaction::from_parts(envelope, TransactionDetail::Expense(expense))
        })
    }

    /// Replaces every debt of an expense with a fresh split over the current
    /// membership.
    ///
    /// Runs on the caller's scoped transaction: a failure at any step leaves
    /// the previous debt set in place once the transaction is dropped.
    pub(super) async fn recompute_debts(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
        expense_id: Uuid,
        amount: MoneyCents,
        payer: Uuid,
    ) -> ResultEngine<Vec<Debt>> {
        let removed = debts::Entity::delete_many()
            .filter(debts::Column::ExpenseId.eq(expense_id.to_string()))
            .exec(db)
            .await?
            .rows_affected;

        let members = self.member_ids(db, group_id).await?;
        let debts: Vec<Debt> = split_evenly(amount, payer, &members)?
            .into_iter()
            .map(|share| Debt::from_share(expense_id, share))
            .collect();

        if !debts.is_empty() {
            debts::Entity::insert_many(debts.iter().map(debts::ActiveModel::from))
                .exec(db)
                .await?;
        }

        tracing::debug!(
            %group_id,
            %expense_id,
            removed,
            inserted = debts.len(),
            members = members.len(),
            "debts recomputed"
        );
        Ok(debts)
    }
}
