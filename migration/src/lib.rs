pub use sea_orm_migration::prelude::*;

mod m20260610_000001_create_users_table;
mod m20260610_000002_create_gigs_table;
mod m20260610_000003_create_gig_tags_table;
mod m20260610_000004_create_proposals_table;
mod m20260611_000001_create_contracts_table;
mod m20260611_000002_create_ratings_table;
mod m20260618_000001_create_messages_table;
mod m20260618_000002_create_notifications_table;
mod m20260702_000001_create_services_tables;
mod m20260715_000001_add_list_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260610_000001_create_users_table::Migration),
            Box::new(m20260610_000002_create_gigs_table::Migration),
            Box::new(m20260610_000003_create_gig_tags_table::Migration),
            Box::new(m20260610_000004_create_proposals_table::Migration),
            Box::new(m20260611_000001_create_contracts_table::Migration),
            Box::new(m20260611_000002_create_ratings_table::Migration),
            Box::new(m20260618_000001_create_messages_table::Migration),
            Box::new(m20260618_000002_create_notifications_table::Migration),
            Box::new(m20260702_000001_create_services_tables::Migration),
            Box::new(m20260715_000001_add_list_indexes::Migration),
        ]
    }
}
