use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, User,
    users::{self, hash_password, verify_password},
    util::normalize_required_text,
};

use super::{Engine, with_tx};

fn ensure_password(password: &str) -> ResultEngine<()> {
    if password.is_empty() {
        return Err(EngineError::InvalidInput(
            "password must not be empty".to_string(),
        ));
    }
    Ok(())
}

impl Engine {
    /// Registers a new user. Usernames are unique after trimming and NFC
    /// normalization.
    pub async fn create_user(&self, username: &str, password: &str) -> ResultEngine<User> {
        let username = normalize_required_text(username, "username")?;
        ensure_password(password)?;
        let password_hash = hash_password(password)?;
        with_tx!(self, |db_tx| {
            let taken = users::Entity::find()
                .filter(users::Column::Username.eq(username.as_str()))
                .one(&db_tx)
                .await?
                .is_some();
            if taken {
                return Err(EngineError::ExistingKey(username));
            }

            let now = Utc::now();
            let model = users::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4().to_string()),
                username: ActiveValue::Set(username.clone()),
                password_hash: ActiveValue::Set(password_hash),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await
            .map_err(|err| EngineError::conflict_or_db(err, &username))?;
            User::try_from(model)
        })
    }

    /// Checks credentials. Unknown users and wrong passwords are
    /// indistinguishable to the caller.
    pub async fn authenticate(&self, username: &str, password: &str) -> ResultEngine<User> {
        let Ok(username) = normalize_required_text(username, "username") else {
            return Err(EngineError::Forbidden("invalid credentials".to_string()));
        };
        with_tx!(self, |db_tx| {
            let model = users::Entity::find()
                .filter(users::Column::Username.eq(username.as_str()))
                .one(&db_tx)
                .await?;
            match model {
                Some(model) if verify_password(password, &model.password_hash) => {
                    User::try_from(model)
                }
                _ => Err(EngineError::Forbidden("invalid credentials".to_string())),
            }
        })
    }

    pub async fn change_password(&self, user_id: Uuid, new_password: &str) -> ResultEngine<()> {
        ensure_password(new_password)?;
        let password_hash = hash_password(new_password)?;
        with_tx!(self, |db_tx| {
            let model = self.require_user(&db_tx, user_id).await?;
            let mut active: users::ActiveModel = model.into();
            active.password_hash = ActiveValue::Set(password_hash);
            active.updated_at = ActiveValue::Set(Utc::now());
            active.update(&db_tx).await?;
            Ok(())
        })
    }

    pub async fn user(&self, user_id: Uuid) -> ResultEngine<User> {
        with_tx!(self, |db_tx| {
            let model = self.require_user(&db_tx, user_id).await?;
            User::try_from(model)
        })
    }

    pub async fn user_by_username(&self, username: &str) -> ResultEngine<User> {
        let username = normalize_required_text(username, "username")?;
        with_tx!(self, |db_tx| {
            let model = users::Entity::find()
                .filter(users::Column::Username.eq(username.as_str()))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;
            User::try_from(model)
        })
    }
}
