use sea_orm_migration::prelude::*;

/// Seeds the category catalog. The API exposes no category-create
/// operation, so the catalog ships with the schema.
#[derive(DeriveMigrationName)]
pub struct Migration;

const LABELS: &[&str] = &[
    "Strategy",
    "Family",
    "Party",
    "Card Game",
    "Cooperative",
    "Dice",
    "Deck Building",
    "Abstract",
    "War Game",
    "Trivia",
];

#[derive(DeriveIden)]
enum Category {
    Table,
    Label,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut insert = Query::insert()
            .into_table(Category::Table)
            .columns([Category::Label])
            .to_owned();

        for label in LABELS {
            insert.values_panic([(*label).into()]);
        }

        manager.exec_stmt(insert).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .exec_stmt(Query::delete().from_table(Category::Table).to_owned())
            .await
    }
}
