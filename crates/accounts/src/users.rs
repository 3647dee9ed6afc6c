//! Users table.
//!
//! Usernames are unique, the database enforces it with a unique index.

use chrono::Utc;
use sea_orm::{ActiveValue, SqlErr, entity::prelude::*};

use crate::{AccountsError, ResultAccounts, password};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    pub email: String,
    pub password: String,
    pub is_active: bool,
    pub date_joined: DateTimeUtc,
    pub last_login: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::sessions::Entity")]
    Sessions,
}

impl Related<super::sessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sessions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Insert a new active user, hashing `raw_password` before it is stored.
///
/// Generic over the connection so migrations can seed through it.
pub async fn create_user<C>(
    db: &C,
    username: &str,
    email: &str,
    raw_password: &str,
) -> ResultAccounts<Model>
where
    C: ConnectionTrait,
{
    if username.trim().is_empty() {
        return Err(AccountsError::InvalidInput(
            "username must not be empty".to_string(),
        ));
    }

    let user = ActiveModel {
        id: ActiveValue::NotSet,
        username: ActiveValue::Set(username.to_string()),
        email: ActiveValue::Set(email.to_string()),
        password: ActiveValue::Set(password::hash_password(raw_password)?),
        is_active: ActiveValue::Set(true),
        date_joined: ActiveValue::Set(Utc::now()),
        last_login: ActiveValue::Set(None),
    };

    user.insert(db).await.map_err(|err| match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AccountsError::ExistingKey(username.to_string())
        }
        _ => AccountsError::Database(err),
    })
}

/// Find a user by username, missing users are [`AccountsError::KeyNotFound`].
pub async fn by_username<C>(db: &C, username: &str) -> ResultAccounts<Model>
where
    C: ConnectionTrait,
{
    Entity::find()
        .filter(Column::Username.eq(username))
        .one(db)
        .await?
        .ok_or_else(|| AccountsError::KeyNotFound(username.to_string()))
}
