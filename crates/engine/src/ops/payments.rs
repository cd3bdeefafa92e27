use chrono::Utc;
use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    CreatePaymentCmd, EditPaymentCmd, EngineError, MoneyCents, Payment, ResultEngine, Transaction,
    TransactionDetail, TransactionKind, payments, transactions,
    util::{ensure_payment_amount, parse_uuid},
};

use super::{Engine, with_tx};

fn ensure_distinct_parties(paid_by: Uuid, paid_to: Uuid) -> ResultEngine<()> {
    if paid_by == paid_to {
        return Err(EngineError::InvalidPayer(
            "payer and payee must differ".to_string(),
        ));
    }
    Ok(())
}

impl Engine {
    async fn require_payment_parties(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
        paid_by: Uuid,
        paid_to: Uuid,
    ) -> ResultEngine<()> {
        ensure_distinct_parties(paid_by, paid_to)?;
        self.require_payer(db, group_id, paid_by, "payer").await?;
        self.require_payer(db, group_id, paid_to, "payee").await
    }

    /// Records money handed from one member to another. Payments never touch
    /// debts; they offset them in the balance.
    pub async fn create_payment(&self, cmd: CreatePaymentCmd) -> ResultEngine<Transaction> {
        let paid_by = cmd.payer();
        let CreatePaymentCmd {
            group_id,
            caller,
            paid_to,
            amount,
            ..
        } = cmd;
        with_tx!(self, |db_tx| {
            self.require_member(&db_tx, group_id, caller).await?;
            ensure_payment_amount(amount)?;
            self.require_payment_parties(&db_tx, group_id, paid_by, paid_to)
                .await?;

            let transaction_id = Uuid::new_v4();
            let envelope = transactions::new_envelope(
                transaction_id,
                group_id,
                caller,
                TransactionKind::Payment,
                Utc::now(),
            )
            .insert(&db_tx)
            .await?;

            let payment = Payment {
                id: Uuid::new_v4(),
                paid_by,
                paid_to,
                amount,
            };
            payment.to_active(transaction_id).insert(&db_tx).await?;

            tracing::debug!(%group_id, %transaction_id, amount = amount.cents(), "payment recorded");
            Transaction::from_parts(envelope, TransactionDetail::Payment(payment))
        })
    }

    /// Edits a payment (creator-only). Unset fields keep their stored value;
    /// the resulting payment is validated as a whole.
    pub async fn edit_payment(&self, cmd: EditPaymentCmd) -> ResultEngine<Transaction> {
        let EditPaymentCmd {
            group_id,
            transaction_id,
            caller,
            paid_by,
            paid_to,
            amount,
        } = cmd;
        with_tx!(self, |db_tx| {
            let envelope = self
                .require_editable_transaction(&db_tx, group_id, transaction_id, caller)
                .await?;
            if TransactionKind::try_from(envelope.kind.as_str())? != TransactionKind::Payment {
                return Err(EngineError::InvalidInput(
                    "transaction is not a payment".to_string(),
                ));
            }

            let model = payments::Entity::find()
                .filter(payments::Column::TransactionId.eq(envelope.id.clone()))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("payment not exists".to_string()))?;

            let amount = amount.unwrap_or(MoneyCents::new(model.amount_minor));
            ensure_payment_amount(amount)?;
            let paid_by = match paid_by {
                Some(id) => id,
                None => parse_uuid(&model.paid_by, "payer")?,
            };
            let paid_to = match paid_to {
                Some(id) => id,
                None => parse_uuid(&model.paid_to, "payee")?,
            };
            self.require_payment_parties(&db_tx, group_id, paid_by, paid_to)
                .await?;

            let mut active: payments::ActiveModel = model.into();
            active.paid_by = ActiveValue::Set(paid_by.to_string());
            active.paid_to = ActiveValue::Set(paid_to.to_string());
            active.amount_minor = ActiveValue::Set(amount.cents());
            let model = active.update(&db_tx).await?;

            let mut envelope: transactions::ActiveModel = envelope.into();
            envelope.updated_at = ActiveValue::Set(Utc::now());
            let envelope = envelope.update(&db_tx).await?;

            Transaction::from_parts(envelope, TransactionDetail::Payment(Payment::try_from(model)?))
        })
    }
}
