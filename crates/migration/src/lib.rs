pub use sea_orm_migration::prelude::*;

mod m20260801_120000_add_member_table;
mod m20260801_120500_add_passport_table;
mod m20260801_121000_add_login_session_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260801_120000_add_member_table::Migration),
            Box::new(m20260801_120500_add_passport_table::Migration),
            Box::new(m20260801_121000_add_login_session_table::Migration),
        ]
    }
}
