use std::collections::HashMap;

use sea_orm::{
    Condition, DatabaseTransaction, JoinType, QueryFilter, QuerySelect, TransactionTrait,
    prelude::*, sea_query::Expr,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine, debts, expenses, payments, transactions, util::parse_uuid};

use super::{Engine, with_tx};

/// Net position of one member against another.
///
/// A positive `amount` means the member owes `other_user_id`; negative means
/// `other_user_id` owes the member.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub other_user_id: Uuid,
    pub amount: MoneyCents,
}

/// Sums flows between `user` and each counterparty into `user`'s net
/// position. Rows not involving `user` are ignored.
///
/// A debt `user -> other` and a payment `other -> user` both increase what
/// `user` owes; the opposite directions decrease it.
fn net_against(
    user: Uuid,
    debt_rows: Vec<(String, String, Option<i64>)>,
    payment_rows: Vec<(String, String, Option<i64>)>,
) -> ResultEngine<HashMap<Uuid, MoneyCents>> {
    let mut net: HashMap<Uuid, MoneyCents> = HashMap::new();

    let mut apply = |from: &str, to: &str, total: Option<i64>, owing: bool| -> ResultEngine<()> {
        let from = parse_uuid(from, "user")?;
        let to = parse_uuid(to, "user")?;
        let total = MoneyCents::new(total.unwrap_or(0));
        let (other, user_is_source) = if from == user {
            (to, true)
        } else if to == user {
            (from, false)
        } else {
            return Ok(());
        };
        if other == user {
            return Ok(());
        }
        // For debts the source owes; for payments the source has paid.
        let position = net.entry(other).or_default();
        let next = if user_is_source == owing {
            position.checked_add(total)
        } else {
            position.checked_sub(total)
        };
        *position = next.ok_or_else(|| {
            EngineError::InvalidAmount("balance exceeds the representable range".to_string())
        })?;
        Ok(())
    };

    for (owed_by, owed_to, total) in debt_rows {
        apply(&owed_by, &owed_to, total, true)?;
    }
    for (paid_by, paid_to, total) in payment_rows {
        apply(&paid_by, &paid_to, total, false)?;
    }
    Ok(net)
}

impl Engine {
    /// Net position of `user` against every counterparty in the group.
    async fn net_positions(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
        user: Uuid,
    ) -> ResultEngine<HashMap<Uuid, MoneyCents>> {
        let user_key = user.to_string();

        let debt_rows: Vec<(String, String, Option<i64>)> = debts::Entity::find()
            .select_only()
            .column(debts::Column::OwedBy)
            .column(debts::Column::OwedTo)
            .column_as(
                Expr::col((debts::Entity, debts::Column::AmountMinor)).sum(),
                "total",
            )
            .join(JoinType::InnerJoin, debts::Relation::Expenses.def())
            .join(JoinType::InnerJoin, expenses::Relation::Transactions.def())
            .filter(transactions::Column::GroupId.eq(group_id.to_string()))
            .filter(
                Condition::any()
                    .add(debts::Column::OwedBy.eq(user_key.as_str()))
                    .add(debts::Column::OwedTo.eq(user_key.as_str())),
            )
            .group_by(debts::Column::OwedBy)
            .group_by(debts::Column::OwedTo)
            .into_tuple()
            .all(db)
            .await?;

        let payment_rows: Vec<(String, String, Option<i64>)> = payments::Entity::find()
            .select_only()
            .column(payments::Column::PaidBy)
            .column(payments::Column::PaidTo)
            .column_as(
                Expr::col((payments::Entity, payments::Column::AmountMinor)).sum(),
                "total",
            )
            .join(JoinType::InnerJoin, payments::Relation::Transactions.def())
            .filter(transactions::Column::GroupId.eq(group_id.to_string()))
            .filter(
                Condition::any()
                    .add(payments::Column::PaidBy.eq(user_key.as_str()))
                    .add(payments::Column::PaidTo.eq(user_key.as_str())),
            )
            .group_by(payments::Column::PaidBy)
            .group_by(payments::Column::PaidTo)
            .into_tuple()
            .all(db)
            .await?;

        net_against(user, debt_rows, payment_rows)
    }

    /// Nets every debt and payment between `a` and `b` in the group.
    ///
    /// Positive means `a` owes `b`. A pair with no history nets to zero.
    pub async fn pairwise_balance(
        &self,
        group_id: Uuid,
        a: Uuid,
        b: Uuid,
        caller: Uuid,
    ) -> ResultEngine<MoneyCents> {
        with_tx!(self, |db_tx| {
            self.require_member(&db_tx, group_id, caller).await?;
            self.require_user(&db_tx, a).await?;
            self.require_user(&db_tx, b).await?;
            let net = self.net_positions(&db_tx, group_id, a).await?;
            Ok(net.get(&b).copied().unwrap_or_default())
        })
    }

    /// The caller's balance against every other current member, in
    /// membership order.
    pub async fn group_balances(&self, group_id: Uuid, caller: Uuid) -> ResultEngine<Vec<Balance>> {
        with_tx!(self, |db_tx| {
            self.require_member(&db_tx, group_id, caller).await?;
            let members = self.member_ids(&db_tx, group_id).await?;
            let net = self.net_positions(&db_tx, group_id, caller).await?;
            Ok(members
                .into_iter()
                .filter(|member| *member != caller)
                .map(|member| Balance {
                    other_user_id: member,
                    amount: net.get(&member).copied().unwrap_or_default(),
                })
                .collect())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(from: Uuid, to: Uuid, cents: i64) -> (String, String, Option<i64>) {
        (from.to_string(), to.to_string(), Some(cents))
    }

    #[test]
    fn debts_and_payments_cancel() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        // B owes A 10.00 and has paid A 10.00.
        let net = net_against(b, vec![row(b, a, 10_00)], vec![row(b, a, 10_00)]).unwrap();
        assert_eq!(net.get(&a).copied(), Some(MoneyCents::ZERO));
    }

    #[test]
    fn netting_is_antisymmetric() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let debts = vec![row(a, b, 7_00), row(b, a, 2_50), row(c, a, 1_00)];
        let payments = vec![row(a, b, 1_00), row(b, a, 30)];

        let from_a = net_against(a, debts.clone(), payments.clone()).unwrap();
        let from_b = net_against(b, debts, payments).unwrap();

        assert_eq!(from_a[&b], MoneyCents::new(7_00 - 2_50 - 1_00 + 30));
        assert_eq!(from_a[&b], -from_b[&a]);
        assert_eq!(from_a[&c], MoneyCents::new(-1_00));
        assert!(!from_b.contains_key(&c));
    }

    #[test]
    fn overflowing_position_is_an_error() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        // A owes B the maximum through a debt, and B also paid A: the two
        // flows push the position past `i64::MAX`.
        let err = net_against(a, vec![row(a, b, i64::MAX)], vec![row(b, a, 1)]).unwrap_err();
        assert!(matches!(err, EngineError::InvalidAmount(_)));

        let err = net_against(a, vec![row(b, a, i64::MAX), row(b, a, 2)], vec![]).unwrap_err();
        assert!(matches!(err, EngineError::InvalidAmount(_)));
    }

    #[test]
    fn missing_sum_counts_as_zero() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let net = net_against(a, vec![(a.to_string(), b.to_string(), None)], vec![]).unwrap();
        assert_eq!(net[&b], MoneyCents::ZERO);
    }
}
