//! Expenses.
//!
//! An expense records that one member paid an amount on behalf of the group.
//! Its debts are derived data: they are recomputed from the amount, the payer
//! and the current membership every time the expense is created or edited.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, debts::Debt, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub description: String,
    pub amount: MoneyCents,
    pub paid_by: Uuid,
    pub debts: Vec<Debt>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub transaction_id: String,
    pub description: String,
    pub amount_minor: i64,
    pub paid_by: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::transactions::Entity",
        from = "Column::TransactionId",
        to = "super::transactions::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Transactions,
    #[sea_orm(has_many = "super::debts::Entity")]
    Debts,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl Related<super::debts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Debts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Expense {
    pub(crate) fn from_model(model: Model, debts: Vec<Debt>) -> Result<Self, EngineError> {
        Ok(Self {
            id: parse_uuid(&model.id, "expense")?,
            description: model.description,
            amount: MoneyCents::new(model.amount_minor),
            paid_by: parse_uuid(&model.paid_by, "payer")?,
            debts,
        })
    }

    pub(crate) fn to_active(&self, transaction_id: Uuid) -> ActiveModel {
        ActiveModel {
            id: ActiveValue::Set(self.id.to_string()),
            transaction_id: ActiveValue::Set(transaction_id.to_string()),
            description: ActiveValue::Set(self.description.clone()),
            amount_minor: ActiveValue::Set(self.amount.cents()),
            paid_by: ActiveValue::Set(self.paid_by.to_string()),
        }
    }
}
