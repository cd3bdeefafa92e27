use chrono::Utc;
use sea_orm::{ActiveValue, JoinType, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{Group, ResultEngine, groups, memberships, transactions, util::normalize_required_text};

use super::{Engine, with_tx};

impl Engine {
    /// Creates a group owned by `owner`, who becomes its first member in the
    /// same scoped transaction.
    pub async fn create_group(&self, name: &str, owner: Uuid) -> ResultEngine<Group> {
        let name = normalize_required_text(name, "group name")?;
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, owner).await?;

            let now = Utc::now();
            let group_id = Uuid::new_v4();
            let model = groups::ActiveModel {
                id: ActiveValue::Set(group_id.to_string()),
                name: ActiveValue::Set(name),
                owner_id: ActiveValue::Set(owner.to_string()),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await?;

            memberships::ActiveModel {
                group_id: ActiveValue::Set(group_id.to_string()),
                user_id: ActiveValue::Set(owner.to_string()),
                joined_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await?;

            tracing::debug!(%group_id, %owner, "group created");
            Group::try_from(model)
        })
    }

    /// Renames a group (owner-only).
    pub async fn rename_group(&self, group_id: Uuid, name: &str, caller: Uuid) -> ResultEngine<Group> {
        let name = normalize_required_text(name, "group name")?;
        with_tx!(self, |db_tx| {
            let model = self.require_owner(&db_tx, group_id, caller).await?;
            let mut active: groups::ActiveModel = model.into();
            active.name = ActiveValue::Set(name);
            active.updated_at = ActiveValue::Set(Utc::now());
            let model = active.update(&db_tx).await?;
            Group::try_from(model)
        })
    }

    /// Deletes a group with its whole ledger and membership (owner-only).
    pub async fn delete_group(&self, group_id: Uuid, caller: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_owner(&db_tx, group_id, caller).await?;

            let transaction_ids: Vec<String> = transactions::Entity::find()
                .select_only()
                .column(transactions::Column::Id)
                .filter(transactions::Column::GroupId.eq(group_id.to_string()))
                .into_tuple()
                .all(&db_tx)
                .await?;
            self.delete_transactions_cascade(&db_tx, &transaction_ids)
                .await?;

            memberships::Entity::delete_many()
                .filter(memberships::Column::GroupId.eq(group_id.to_string()))
                .exec(&db_tx)
                .await?;
            groups::Entity::delete_by_id(group_id.to_string())
                .exec(&db_tx)
                .await?;

            tracing::debug!(%group_id, transactions = transaction_ids.len(), "group deleted");
            Ok(())
        })
    }

    /// Returns a group the caller belongs to.
    pub async fn group(&self, group_id: Uuid, caller: Uuid) -> ResultEngine<Group> {
        with_tx!(self, |db_tx| {
            let model = self.require_member(&db_tx, group_id, caller).await?;
            Group::try_from(model)
        })
    }

    /// Every group the caller belongs to, by name.
    pub async fn groups_for_user(&self, caller: Uuid) -> ResultEngine<Vec<Group>> {
        with_tx!(self, |db_tx| {
            let models = groups::Entity::find()
                .join(JoinType::InnerJoin, groups::Relation::Memberships.def())
                .filter(memberships::Column::UserId.eq(caller.to_string()))
                .order_by_asc(groups::Column::Name)
                .order_by_asc(groups::Column::Id)
                .all(&db_tx)
                .await?;
            models
                .into_iter()
                .map(Group::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }
}
