use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use chrono::Utc;
use sea_orm::{ActiveValue, DbErr, QueryFilter, SqlErr, prelude::*};
use uuid::Uuid;

use crate::{AuthUser, EngineError, ResultEngine, users, util::looks_like_email};

use super::Engine;

const MIN_PASSWORD_CHARS: usize = 8;

/// Sign-up form as submitted.
#[derive(Clone, Debug, Default)]
pub struct RegisterUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

fn hash_password(password: &str) -> ResultEngine<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| EngineError::Failed {
            action: "create account",
            source: DbErr::Custom(err.to_string()),
        })
}

fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

impl Engine {
    /// Creates an account. Emails are stored lower-cased and must be unique;
    /// the database constraint decides, so concurrent sign-ups cannot race.
    pub async fn register_user(&self, input: RegisterUser) -> ResultEngine<AuthUser> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(EngineError::validation("Name is required."));
        }
        let email = input.email.trim().to_lowercase();
        if email.is_empty() {
            return Err(EngineError::validation("Email is required."));
        }
        if !looks_like_email(&email) {
            return Err(EngineError::validation("Invalid email format."));
        }
        if input.password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(EngineError::validation(
                "Password must be at least 8 characters.",
            ));
        }
        if input.password != input.confirm_password {
            return Err(EngineError::validation("Passwords do not match."));
        }

        let user = users::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            name: ActiveValue::Set(name.to_string()),
            email: ActiveValue::Set(email),
            password: ActiveValue::Set(hash_password(&input.password)?),
            created_at: ActiveValue::Set(Utc::now()),
        };
        match user.insert(&self.database).await {
            Ok(model) => Ok(model.into()),
            Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => Err(
                EngineError::Conflict("An account with this email already exists.".to_string()),
            ),
            Err(err) => Err(EngineError::from(err).failed("create account")),
        }
    }

    /// Returns the user when `password` matches the stored hash.
    pub async fn authenticate(&self, email: &str, password: &str) -> ResultEngine<Option<AuthUser>> {
        let email = email.trim().to_lowercase();
        let Some(user) = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.database)
            .await?
        else {
            return Ok(None);
        };
        if !verify_password(password, &user.password) {
            return Ok(None);
        }
        Ok(Some(user.into()))
    }
}
