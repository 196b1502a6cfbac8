pub use sea_orm_migration::prelude::*;

mod m20260301_000001_create_rater_table;
mod m20260301_000002_create_category_table;
mod m20260301_000003_create_game_table;
mod m20260301_000004_create_game_category_table;
mod m20260301_000005_create_review_table;
mod m20260301_000006_create_rating_table;
mod m20260301_000007_create_picture_table;
mod m20260301_000008_seed_categories;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_rater_table::Migration),
            Box::new(m20260301_000002_create_category_table::Migration),
            Box::new(m20260301_000003_create_game_table::Migration),
            Box::new(m20260301_000004_create_game_category_table::Migration),
            Box::new(m20260301_000005_create_review_table::Migration),
            Box::new(m20260301_000006_create_rating_table::Migration),
            Box::new(m20260301_000007_create_picture_table::Migration),
            Box::new(m20260301_000008_seed_categories::Migration),
        ]
    }
}
