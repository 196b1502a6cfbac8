use sea_orm_migration::prelude::*;

/// Creates the `game_category` join table linking games to categories.
///
/// The composite primary key enforces that a (game, category) pair can
/// only be linked once.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum GameCategory {
    Table,
    GameId,
    CategoryId,
}

#[derive(DeriveIden)]
enum Game {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Category {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(GameCategory::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(GameCategory::GameId).integer().not_null())
                    .col(
                        ColumnDef::new(GameCategory::CategoryId)
                            .integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(GameCategory::GameId)
                            .col(GameCategory::CategoryId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_game_category_game_id")
                            .from(GameCategory::Table, GameCategory::GameId)
                            .to(Game::Table, Game::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_game_category_category_id")
                            .from(GameCategory::Table, GameCategory::CategoryId)
                            .to(Category::Table, Category::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Add index on category_id for reverse lookup
        manager
            .create_index(
                Index::create()
                    .name("idx_game_category_category_id")
                    .table(GameCategory::Table)
                    .col(GameCategory::CategoryId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GameCategory::Table).to_owned())
            .await
    }
}
