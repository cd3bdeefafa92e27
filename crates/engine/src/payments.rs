//! Payments: money handed directly from one member to another.
//!
//! A payment never produces debts; it offsets them in the balance.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub paid_by: Uuid,
    pub paid_to: Uuid,
    pub amount: MoneyCents,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub transaction_id: String,
    pub paid_by: String,
    pub paid_to: String,
    pub amount_minor: i64,
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
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Payment {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "payment")?,
            paid_by: parse_uuid(&model.paid_by, "payer")?,
            paid_to: parse_uuid(&model.paid_to, "payee")?,
            amount: MoneyCents::new(model.amount_minor),
        })
    }
}

impl Payment {
    pub(crate) fn to_active(&self, transaction_id: Uuid) -> ActiveModel {
        ActiveModel {
            id: ActiveValue::Set(self.id.to_string()),
            transaction_id: ActiveValue::Set(transaction_id.to_string()),
            paid_by: ActiveValue::Set(self.paid_by.to_string()),
            paid_to: ActiveValue::Set(self.paid_to.to_string()),
            amount_minor: ActiveValue::Set(self.amount.cents()),
        }
    }
}
