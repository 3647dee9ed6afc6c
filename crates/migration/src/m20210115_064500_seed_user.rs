//! Seeds the demo account the `/authenticated/` view logs in.
//!
//! Must run after the users table exists.

use accounts::{seed, users};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        accounts::create_user(db, seed::USERNAME, seed::EMAIL, seed::PASSWORD)
            .await
            .map_err(|err| DbErr::Migration(format!("failed to seed user: {err}")))?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        users::Entity::delete_many()
            .filter(users::Column::Username.eq(seed::USERNAME))
            .exec(db)
            .await?;

        Ok(())
    }
}
