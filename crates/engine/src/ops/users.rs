use api_types::user::Role;
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{ActiveValue, QueryFilter, TransactionTrait, prelude::*};

use crate::{EngineError, ResultEngine, User, users};

use super::{Engine, with_tx};

const MIN_PASSWORD_LEN: usize = 8;

fn hash_password(password: &str) -> ResultEngine<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| EngineError::InvalidInput(format!("cannot hash password: {err}")))
}

fn password_matches(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(err) => {
            tracing::warn!("stored password hash is malformed: {err}");
            false
        }
    }
}

impl Engine {
    /// Register a user. The password is stored as an argon2 hash.
    pub async fn register_user(
        &self,
        username: &str,
        password: &str,
        role: Role,
    ) -> ResultEngine<User> {
        let username = username.trim();
        if username.is_empty() {
            return Err(EngineError::InvalidInput(
                "username must not be empty".to_string(),
            ));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(EngineError::InvalidInput(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        let password_hash = hash_password(password)?;

        with_tx!(self, |db_tx| {
            let exists = users::Entity::find()
                .filter(users::Column::Username.eq(username))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(username.to_string()));
            }

            let model = users::ActiveModel {
                id: ActiveValue::NotSet,
                username: ActiveValue::Set(username.to_string()),
                password_hash: ActiveValue::Set(password_hash),
                role: ActiveValue::Set(role.as_str().to_string()),
            }
            .insert(&db_tx)
            .await?;
            tracing::info!(user_id = model.id, role = role.as_str(), "user registered");
            User::try_from(model)
        })
    }

    /// Check a username/password pair. Unknown users and wrong passwords are
    /// indistinguishable to the caller.
    pub async fn verify_credentials(&self, username: &str, password: &str) -> ResultEngine<User> {
        let model = users::Entity::find()
            .filter(users::Column::Username.eq(username.trim()))
            .one(&self.database)
            .await?;
        match model {
            Some(model) if password_matches(password, &model.password_hash) => {
                User::try_from(model)
            }
            _ => Err(EngineError::Unauthorized(
                "invalid username or password".to_string(),
            )),
        }
    }

    pub async fn user(&self, user_id: i32) -> ResultEngine<User> {
        users::Entity::find_by_id(user_id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("user {user_id}")))
            .and_then(User::try_from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_verifies_only_the_original_password() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(password_matches("correct horse", &hash));
        assert!(!password_matches("battery staple", &hash));
    }

    #[test]
    fn malformed_hash_never_matches() {
        assert!(!password_matches("anything", "not-a-phc-string"));
    }
}
