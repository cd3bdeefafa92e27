use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, Member, ResultEngine, memberships, users,
    util::{normalize_required_text, parse_uuid},
};

use super::{Engine, with_tx};

impl Engine {
    /// Adds a user to a group by username (owner-only).
    pub async fn add_member(
        &self,
        group_id: Uuid,
        username: &str,
        caller: Uuid,
    ) -> ResultEngine<Member> {
        let username = normalize_required_text(username, "username")?;
        with_tx!(self, |db_tx| {
            self.require_owner(&db_tx, group_id, caller).await?;

            let user = users::Entity::find()
                .filter(users::Column::Username.eq(username.as_str()))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;
            let user_id = parse_uuid(&user.id, "user")?;

            if self.is_member(&db_tx, group_id, user_id).await? {
                return Err(EngineError::ExistingKey(format!(
                    "{username} in group"
                )));
            }

            let joined_at = Utc::now();
            memberships::ActiveModel {
                group_id: ActiveValue::Set(group_id.to_string()),
                user_id: ActiveValue::Set(user.id.clone()),
                joined_at: ActiveValue::Set(joined_at),
            }
            .insert(&db_tx)
            .await
            .map_err(|err| EngineError::conflict_or_db(err, &username))?;

            tracing::debug!(%group_id, %user_id, "member added");
            Ok(Member {
                user_id,
                username: user.username,
                joined_at,
            })
        })
    }

    /// Removes a member (owner-only).
    ///
    /// Debts and payments that involve the member stay in the ledger; only
    /// future splits and recomputes stop including them.
    pub async fn remove_member(
        &self,
        group_id: Uuid,
        user_id: Uuid,
        caller: Uuid,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let group = self.require_owner(&db_tx, group_id, caller).await?;
            if group.owner_id == user_id.to_string() {
                return Err(EngineError::InvalidInput(
                    "cannot remove the group owner".to_string(),
                ));
            }

            let result = memberships::Entity::delete_by_id((group_id.to_string(), user_id.to_string()))
                .exec(&db_tx)
                .await?;
            if result.rows_affected == 0 {
                return Err(EngineError::KeyNotFound("member not exists".to_string()));
            }

            tracing::debug!(%group_id, %user_id, "member removed");
            Ok(())
        })
    }

    /// Current members in membership order.
    pub async fn members(&self, group_id: Uuid, caller: Uuid) -> ResultEngine<Vec<Member>> {
        with_tx!(self, |db_tx| {
            self.require_member(&db_tx, group_id, caller).await?;

            let rows = memberships::Entity::find()
                .find_also_related(users::Entity)
                .filter(memberships::Column::GroupId.eq(group_id.to_string()))
                .order_by_asc(memberships::Column::JoinedAt)
                .order_by_asc(memberships::Column::UserId)
                .all(&db_tx)
                .await?;

            let mut out = Vec::with_capacity(rows.len());
            for (membership, user) in rows {
                let user = user
                    .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;
                out.push(Member {
                    user_id: parse_uuid(&membership.user_id, "member")?,
                    username: user.username,
                    joined_at: membership.joined_at,
                });
            }
            Ok(out)
        })
    }
}
