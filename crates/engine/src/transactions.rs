//! Transaction envelope.
//!
//! Every ledger event (an [`Expense`] or a [`Payment`]) lives inside exactly
//! one envelope that carries the shared metadata: owning group, creator and
//! timestamps. The envelope is the unit of authorization: only its creator may
//! edit or delete it.
//!
//! The creator is nullable so history survives when the creating account goes
//! away; such transactions can no longer be edited by anyone.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    expenses::Expense,
    payments::Payment,
    util::{parse_optional_uuid, parse_uuid},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Expense,
    Payment,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Expense => "expense",
            Self::Payment => "payment",
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "expense" => Ok(Self::Expense),
            "payment" => Ok(Self::Payment),
            other => Err(EngineError::InvalidInput(format!(
                "invalid transaction kind: {other}"
            ))),
        }
    }
}

/// Kind-specific payload of a transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum TransactionDetail {
    Expense(Expense),
    Payment(Payment),
}

impl TransactionDetail {
    pub fn kind(&self) -> TransactionKind {
        match self {
            Self::Expense(_) => TransactionKind::Expense,
            Self::Payment(_) => TransactionKind::Payment,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub group_id: Uuid,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub detail: TransactionDetail,
}

impl Transaction {
    pub fn kind(&self) -> TransactionKind {
        self.detail.kind()
    }

    /// Only the creator may edit or delete a transaction.
    pub fn is_editable_by(&self, user_id: Uuid) -> bool {
        creator_matches(self.created_by, user_id)
    }

    pub fn expense(&self) -> Option<&Expense> {
        match &self.detail {
            TransactionDetail::Expense(expense) => Some(expense),
            TransactionDetail::Payment(_) => None,
        }
    }

    pub fn payment(&self) -> Option<&Payment> {
        match &self.detail {
            TransactionDetail::Payment(payment) => Some(payment),
            TransactionDetail::Expense(_) => None,
        }
    }

    /// Assembles a transaction from its stored envelope and its loaded detail.
    pub(crate) fn from_parts(model: Model, detail: TransactionDetail) -> ResultEngine<Self> {
        let kind = TransactionKind::try_from(model.kind.as_str())?;
        if kind != detail.kind() {
            return Err(EngineError::InvalidInput(format!(
                "transaction {} is stored as {} but carries a {} detail",
                model.id,
                kind.as_str(),
                detail.kind().as_str()
            )));
        }
        Ok(Self {
            id: parse_uuid(&model.id, "transaction")?,
            group_id: parse_uuid(&model.group_id, "group")?,
            created_by: parse_optional_uuid(model.created_by.as_deref(), "creator")?,
            created_at: model.created_at,
            updated_at: model.updated_at,
            detail,
        })
    }
}

/// Envelopes without a creator are editable by nobody.
fn creator_matches(created_by: Option<Uuid>, user_id: Uuid) -> bool {
    created_by == Some(user_id)
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub group_id: String,
    pub created_by: Option<String>,
    pub kind: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::groups::Entity",
        from = "Column::GroupId",
        to = "super::groups::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Groups,
    #[sea_orm(has_one = "super::expenses::Entity")]
    Expenses,
    #[sea_orm(has_one = "super::payments::Entity")]
    Payments,
}

impl Related<super::groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Groups.def()
    }
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl Related<super::payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Same rule as [`Transaction::is_editable_by`], on the stored row.
    pub(crate) fn is_editable_by(&self, user_id: Uuid) -> ResultEngine<bool> {
        let created_by = parse_optional_uuid(self.created_by.as_deref(), "creator")?;
        Ok(creator_matches(created_by, user_id))
    }
}

/// New envelope row stamped with `now` for both timestamps.
pub(crate) fn new_envelope(
    id: Uuid,
    group_id: Uuid,
    created_by: Uuid,
    kind: TransactionKind,
    now: DateTime<Utc>,
) -> ActiveModel {
    ActiveModel {
        id: ActiveValue::Set(id.to_string()),
        group_id: ActiveValue::Set(group_id.to_string()),
        created_by: ActiveValue::Set(Some(created_by.to_string())),
        kind: ActiveValue::Set(kind.as_str().to_string()),
        created_at: ActiveValue::Set(now),
        updated_at: ActiveValue::Set(now),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MoneyCents;

    fn payment_tx(created_by: Option<Uuid>) -> Transaction {
        let now = Utc::now();
        Transaction {
            id: Uuid::new_v4(),
            group_id: Uuid::new_v4(),
            created_by,
            created_at: now,
            updated_at: now,
            detail: TransactionDetail::Payment(Payment {
                id: Uuid::new_v4(),
                paid_by: Uuid::new_v4(),
                paid_to: Uuid::new_v4(),
                amount: MoneyCents::new(5_00),
            }),
        }
    }

    #[test]
    fn only_creator_can_edit() {
        let creator = Uuid::new_v4();
        let tx = payment_tx(Some(creator));
        assert!(tx.is_editable_by(creator));
        assert!(!tx.is_editable_by(Uuid::new_v4()));

        let orphan = payment_tx(None);
        assert!(!orphan.is_editable_by(creator));
    }

    #[test]
    fn stored_row_uses_the_same_creator_rule() {
        let creator = Uuid::new_v4();
        let now = Utc::now();
        let mut row = Model {
            id: Uuid::new_v4().to_string(),
            group_id: Uuid::new_v4().to_string(),
            created_by: Some(creator.to_string()),
            kind: TransactionKind::Expense.as_str().to_string(),
            created_at: now,
            updated_at: now,
        };
        assert!(row.is_editable_by(creator).unwrap());
        assert!(!row.is_editable_by(Uuid::new_v4()).unwrap());

        row.created_by = None;
        assert!(!row.is_editable_by(creator).unwrap());

        row.created_by = Some("not-a-uuid".to_string());
        assert!(row.is_editable_by(creator).is_err());
    }

    #[test]
    fn detail_accessors_follow_kind() {
        let tx = payment_tx(None);
        assert_eq!(tx.kind(), TransactionKind::Payment);
        assert!(tx.payment().is_some());
        assert!(tx.expense().is_none());
    }

    #[test]
    fn kind_round_trips_through_storage_string() {
        for kind in [TransactionKind::Expense, TransactionKind::Payment] {
            assert_eq!(TransactionKind::try_from(kind.as_str()).unwrap(), kind);
        }
        assert!(TransactionKind::try_from("refund").is_err());
    }
}
