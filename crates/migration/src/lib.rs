pub use sea_orm_migration::prelude::*;

mod m20210115_000001_create_users;
mod m20210115_000002_create_sessions;
mod m20210115_064500_seed_user;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20210115_000001_create_users::Migration),
            Box::new(m20210115_000002_create_sessions::Migration),
            Box::new(m20210115_064500_seed_user::Migration),
        ]
    }
}
