//! User accounts and cookie sessions.
//!
//! [`Accounts`] wraps the database connection and exposes the handful of
//! operations the web layer needs: look a user up, log them in (which
//! always cycles the session key), resolve a session key back to its user
//! and log out.

use chrono::{Duration, Utc};
use sea_orm::{ActiveValue, DatabaseConnection, QueryFilter, TransactionTrait, prelude::*};

pub use error::AccountsError;
pub use users::create_user;

pub mod password;
pub mod seed;
pub mod sessions;
pub mod users;

mod error;

type ResultAccounts<T> = Result<T, AccountsError>;

/// Two weeks, same as a browser "remember me" cookie.
pub const DEFAULT_SESSION_TTL_SECS: i64 = 60 * 60 * 24 * 14;

#[derive(Debug, Clone)]
pub struct Accounts {
    database: DatabaseConnection,
    session_ttl: Duration,
}

impl Accounts {
    /// Return a builder for `Accounts`. Help to build the struct.
    pub fn builder() -> AccountsBuilder {
        AccountsBuilder::default()
    }

    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    pub async fn create_user(
        &self,
        username: &str,
        email: &str,
        raw_password: &str,
    ) -> ResultAccounts<users::Model> {
        users::create_user(&self.database, username, email, raw_password).await
    }

    pub async fn user_by_username(&self, username: &str) -> ResultAccounts<users::Model> {
        users::by_username(&self.database, username).await
    }

    /// Check credentials. Unknown users, wrong passwords and inactive users
    /// all give `None`.
    pub async fn authenticate(
        &self,
        username: &str,
        raw_password: &str,
    ) -> ResultAccounts<Option<users::Model>> {
        let user = match users::by_username(&self.database, username).await {
            Ok(user) => user,
            Err(AccountsError::KeyNotFound(_)) => return Ok(None),
            Err(err) => return Err(err),
        };

        if !user.is_active {
            return Ok(None);
        }

        Ok(password::verify_password(raw_password, &user.password)?.then_some(user))
    }

    /// Open a new session for `user`.
    ///
    /// The session named by `previous_key` is dropped first so a key handed
    /// out before login can never carry an authenticated user. Also stamps
    /// `last_login`.
    pub async fn login(
        &self,
        user: &users::Model,
        previous_key: Option<&str>,
    ) -> ResultAccounts<sessions::Model> {
        if !user.is_active {
            return Err(AccountsError::Forbidden(format!(
                "user \"{}\" is inactive",
                user.username
            )));
        }

        let now = Utc::now();
        let db_tx = self.database.begin().await?;

        if let Some(key) = previous_key {
            sessions::Entity::delete_by_id(key.to_string())
                .exec(&db_tx)
                .await?;
        }

        let session = sessions::ActiveModel {
            session_key: ActiveValue::Set(sessions::new_session_key()),
            user_id: ActiveValue::Set(user.id),
            expire_date: ActiveValue::Set(now + self.session_ttl),
        }
        .insert(&db_tx)
        .await?;

        let mut active: users::ActiveModel = user.clone().into();
        active.last_login = ActiveValue::Set(Some(now));
        active.update(&db_tx).await?;

        db_tx.commit().await?;

        tracing::info!("user \"{}\" logged in", user.username);
        Ok(session)
    }

    /// The active user owning a non-expired session.
    pub async fn session_user(&self, key: &str) -> ResultAccounts<Option<users::Model>> {
        let found = sessions::Entity::find_by_id(key.to_string())
            .filter(sessions::Column::ExpireDate.gt(Utc::now()))
            .find_also_related(users::Entity)
            .one(&self.database)
            .await?;

        Ok(found
            .and_then(|(_, user)| user)
            .filter(|user| user.is_active))
    }

    /// Drop the session. Unknown keys are fine.
    pub async fn logout(&self, key: &str) -> ResultAccounts<()> {
        let res = sessions::Entity::delete_by_id(key.to_string())
            .exec(&self.database)
            .await?;
        if res.rows_affected > 0 {
            tracing::debug!("session closed");
        }
        Ok(())
    }

    /// Delete every expired session, returns how many went away.
    pub async fn clear_expired(&self) -> ResultAccounts<u64> {
        let res = sessions::Entity::delete_many()
            .filter(sessions::Column::ExpireDate.lte(Utc::now()))
            .exec(&self.database)
            .await?;
        Ok(res.rows_affected)
    }
}

#[derive(Debug)]
pub struct AccountsBuilder {
    database: DatabaseConnection,
    session_ttl: Duration,
}

impl Default for AccountsBuilder {
    fn default() -> Self {
        Self {
            database: DatabaseConnection::default(),
            session_ttl: Duration::seconds(DEFAULT_SESSION_TTL_SECS),
        }
    }
}

impl AccountsBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> AccountsBuilder {
        self.database = db;
        self
    }

    /// How long a session stays valid after login.
    pub fn session_ttl(mut self, ttl: Duration) -> AccountsBuilder {
        self.session_ttl = ttl;
        self
    }

    /// Construct `Accounts`
    pub fn build(self) -> ResultAccounts<Accounts> {
        if self.session_ttl <= Duration::zero() {
            return Err(AccountsError::InvalidInput(
                "session ttl must be positive".to_string(),
            ));
        }

        Ok(Accounts {
            database: self.database,
            session_ttl: self.session_ttl,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults_to_two_weeks() {
        let accounts = Accounts::builder().build().unwrap();
        assert_eq!(accounts.session_ttl(), Duration::days(14));
    }

    #[test]
    fn builder_rejects_non_positive_ttl() {
        let err = Accounts::builder()
            .session_ttl(Duration::zero())
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            AccountsError::InvalidInput("session ttl must be positive".to_string())
        );
    }
}
