pub use sea_orm_migration::prelude::*;

mod m20241101_000001_create_facilities;

pub use m20241101_000001_create_facilities::HOSPITALS as SEEDED_HOSPITALS;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20241101_000001_create_facilities::Migration)]
    }
}
