//! Lookups shared by every operation, in authorization order: group, caller
//! membership, transaction within the group, creator.

use sea_orm::{DatabaseTransaction, QueryFilter, QueryOrder, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, groups, memberships, transactions, users, util::parse_uuid};

use super::Engine;

impl Engine {
    pub(super) async fn require_user(
        &self,
        db: &DatabaseTransaction,
        user_id: Uuid,
    ) -> ResultEngine<users::Model> {
        users::Entity::find_by_id(user_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
    }

    pub(super) async fn require_group(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
    ) -> ResultEngine<groups::Model> {
        groups::Entity::find_by_id(group_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("group not exists".to_string()))
    }

    pub(super) async fn is_member(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<bool> {
        Ok(
            memberships::Entity::find_by_id((group_id.to_string(), user_id.to_string()))
                .one(db)
                .await?
                .is_some(),
        )
    }

    /// Group must exist and the caller must currently belong to it.
    pub(super) async fn require_member(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
        caller: Uuid,
    ) -> ResultEngine<groups::Model> {
        let group = self.require_group(db, group_id).await?;
        if !self.is_member(db, group_id, caller).await? {
            return Err(EngineError::Forbidden(
                "caller is not a group member".to_string(),
            ));
        }
        Ok(group)
    }

    pub(super) async fn require_owner(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
        caller: Uuid,
    ) -> ResultEngine<groups::Model> {
        let group = self.require_member(db, group_id, caller).await?;
        if group.owner_id != caller.to_string() {
            return Err(EngineError::Forbidden(
                "only the group owner can do this".to_string(),
            ));
        }
        Ok(group)
    }

    /// A payer (or payee) must be a current member of the group.
    pub(super) async fn require_payer(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
        user_id: Uuid,
        role: &str,
    ) -> ResultEngine<()> {
        if !self.is_member(db, group_id, user_id).await? {
            return Err(EngineError::InvalidPayer(format!(
                "{role} is not a group member"
            )));
        }
        Ok(())
    }

    /// Current member ids in membership order (join time, then user id).
    pub(super) async fn member_ids(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
    ) -> ResultEngine<Vec<Uuid>> {
        memberships::Entity::find()
            .filter(memberships::Column::GroupId.eq(group_id.to_string()))
            .order_by_asc(memberships::Column::JoinedAt)
            .order_by_asc(memberships::Column::UserId)
            .all(db)
            .await?
            .iter()
            .map(|m| parse_uuid(&m.user_id, "member"))
            .collect()
    }

    /// A transaction from another group is reported as missing.
    pub(super) async fn require_transaction_in_group(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
        transaction_id: Uuid,
    ) -> ResultEngine<transactions::Model> {
        transactions::Entity::find_by_id(transaction_id.to_string())
            .filter(transactions::Column::GroupId.eq(group_id.to_string()))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("transaction not exists".to_string()))
    }

    /// Resolves a transaction the caller is allowed to mutate.
    pub(super) async fn require_editable_transaction(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
        transaction_id: Uuid,
        caller: Uuid,
    ) -> ResultEngine<transactions::Model> {
        self.require_member(db, group_id, caller).await?;
        let model = self
            .require_transaction_in_group(db, group_id, transaction_id)
            .await?;
        if !model.is_editable_by(caller)? {
            return Err(EngineError::Forbidden(
                "only the creator can modify a transaction".to_string(),
            ));
        }
        Ok(model)
    }
}
