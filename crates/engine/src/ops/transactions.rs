use std::collections::HashMap;

use sea_orm::{DatabaseTransaction, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Debt, EngineError, Expense, Payment, ResultEngine, Transaction, TransactionDetail,
    TransactionKind, debts, expenses, payments, transactions,
};

use super::{Engine, with_tx};

impl Engine {
    /// Returns one transaction of the group with its detail.
    pub async fn transaction(
        &self,
        group_id: Uuid,
        transaction_id: Uuid,
        caller: Uuid,
    ) -> ResultEngine<Transaction> {
        with_tx!(self, |db_tx| {
            self.require_member(&db_tx, group_id, caller).await?;
            let model = self
                .require_transaction_in_group(&db_tx, group_id, transaction_id)
                .await?;
            let mut loaded = self.load_transactions(&db_tx, vec![model]).await?;
            loaded
                .pop()
                .ok_or_else(|| EngineError::KeyNotFound("transaction not exists".to_string()))
        })
    }

    /// Every transaction of the group, newest first.
    pub async fn group_transactions(
        &self,
        group_id: Uuid,
        caller: Uuid,
    ) -> ResultEngine<Vec<Transaction>> {
        with_tx!(self, |db_tx| {
            self.require_member(&db_tx, group_id, caller).await?;
            let models = transactions::Entity::find()
                .filter(transactions::Column::GroupId.eq(group_id.to_string()))
                .order_by_desc(transactions::Column::CreatedAt)
                .order_by_desc(transactions::Column::Id)
                .all(&db_tx)
                .await?;
            self.load_transactions(&db_tx, models).await
        })
    }

    /// Deletes a transaction together with its expense or payment and every
    /// derived debt (creator-only).
    pub async fn delete_transaction(
        &self,
        group_id: Uuid,
        transaction_id: Uuid,
        caller: Uuid,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = self
                .require_editable_transaction(&db_tx, group_id, transaction_id, caller)
                .await?;
            self.delete_transactions_cascade(&db_tx, &[model.id])
                .await?;
            tracing::debug!(%group_id, %transaction_id, "transaction deleted");
            Ok(())
        })
    }

    /// Removes the given envelopes and everything hanging off them, leaves
    /// first. Foreign-key cascades are not relied upon.
    pub(super) async fn delete_transactions_cascade(
        &self,
        db: &DatabaseTransaction,
        transaction_ids: &[String],
    ) -> ResultEngine<()> {
        if transaction_ids.is_empty() {
            return Ok(());
        }

        let expense_ids: Vec<String> = expenses::Entity::find()
            .select_only()
            .column(expenses::Column::Id)
            .filter(expenses::Column::TransactionId.is_in(transaction_ids.iter().cloned()))
            .into_tuple()
            .all(db)
            .await?;

        if !expense_ids.is_empty() {
            debts::Entity::delete_many()
                .filter(debts::Column::ExpenseId.is_in(expense_ids.iter().cloned()))
                .exec(db)
                .await?;
            expenses::Entity::delete_many()
                .filter(expenses::Column::Id.is_in(expense_ids))
                .exec(db)
                .await?;
        }
        payments::Entity::delete_many()
            .filter(payments::Column::TransactionId.is_in(transaction_ids.iter().cloned()))
            .exec(db)
            .await?;
        transactions::Entity::delete_many()
            .filter(transactions::Column::Id.is_in(transaction_ids.iter().cloned()))
            .exec(db)
            .await?;
        Ok(())
    }

    /// Attaches expense/payment details (and expense debts) to envelopes,
    /// preserving the input order.
    pub(super) async fn load_transactions(
        &self,
        db: &DatabaseTransaction,
        models: Vec<transactions::Model>,
    ) -> ResultEngine<Vec<Transaction>> {
        if models.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<String> = models.iter().map(|m| m.id.clone()).collect();

        let expense_models = expenses::Entity::find()
            .filter(expenses::Column::TransactionId.is_in(ids.iter().cloned()))
            .all(db)
            .await?;
        let payment_models = payments::Entity::find()
            .filter(payments::Column::TransactionId.is_in(ids))
            .all(db)
            .await?;

        let mut debts_by_expense: HashMap<String, Vec<Debt>> = HashMap::new();
        if !expense_models.is_empty() {
            let debt_models = debts::Entity::find()
                .filter(debts::Column::ExpenseId.is_in(expense_models.iter().map(|e| e.id.clone())))
                .order_by_asc(debts::Column::OwedBy)
                .all(db)
                .await?;
            for model in debt_models {
                debts_by_expense
                    .entry(model.expense_id.clone())
                    .or_default()
                    .push(Debt::try_from(model)?);
            }
        }

        let mut expenses_by_tx: HashMap<String, expenses::Model> = expense_models
            .into_iter()
            .map(|m| (m.transaction_id.clone(), m))
            .collect();
        let mut payments_by_tx: HashMap<String, payments::Model> = payment_models
            .into_iter()
            .map(|m| (m.transaction_id.clone(), m))
            .collect();

        let mut out = Vec::with_capacity(models.len());
        for model in models {
            let missing = || {
                EngineError::KeyNotFound(format!("detail of transaction {} not exists", model.id))
            };
            let detail = match TransactionKind::try_from(model.kind.as_str())? {
                TransactionKind::Expense => {
                    let expense = expenses_by_tx.remove(&model.id).ok_or_else(missing)?;
                    let debts = debts_by_expense.remove(&expense.id).unwrap_or_default();
                    TransactionDetail::Expense(Expense::from_model(expense, debts)?)
                }
                TransactionKind::Payment => {
                    let payment = payments_by_tx.remove(&model.id).ok_or_else(missing)?;
                    TransactionDetail::Payment(Payment::try_from(payment)?)
                }
            };
            out.push(Transaction::from_parts(model, detail)?);
        }
        Ok(out)
    }
}
