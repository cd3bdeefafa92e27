//! Debts derived from an expense.
//!
//! A debt reads "`owed_by` owes `owed_to` `amount` because of expense
//! `expense_id`". The payer of an expense never owes themselves, so
//! `owed_by != owed_to` always holds.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{DebtShare, EngineError, MoneyCents, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Debt {
    pub id: Uuid,
    pub expense_id: Uuid,
    pub owed_by: Uuid,
    pub owed_to: Uuid,
    pub amount: MoneyCents,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "debts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub expense_id: String,
    pub owed_by: String,
    pub owed_to: String,
    pub amount_minor: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::expenses::Entity",
        from = "Column::ExpenseId",
        to = "super::expenses::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Expenses,
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Debt {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "debt")?,
            expense_id: parse_uuid(&model.expense_id, "expense")?,
            owed_by: parse_uuid(&model.owed_by, "debtor")?,
            owed_to: parse_uuid(&model.owed_to, "creditor")?,
            amount: MoneyCents::new(model.amount_minor),
        })
    }
}

impl Debt {
    pub(crate) fn from_share(expense_id: Uuid, share: DebtShare) -> Self {
        Self {
            id: Uuid::new_v4(),
            expense_id,
            owed_by: share.owed_by,
            owed_to: share.owed_to,
            amount: share.amount,
        }
    }
}

impl From<&Debt> for ActiveModel {
    fn from(debt: &Debt) -> Self {
        Self {
            id: ActiveValue::Set(debt.id.to_string()),
            expense_id: ActiveValue::Set(debt.expense_id.to_string()),
            owed_by: ActiveValue::Set(debt.owed_by.to_string()),
            owed_to: ActiveValue::Set(debt.owed_to.to_string()),
            amount_minor: ActiveValue::Set(debt.amount.cents()),
        }
    }
}
