use sea_orm_migration::prelude::*;

/// Creates the `game` table for board games submitted by raters.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Game {
    Table,
    Id,
    RaterId,
    Title,
    Description,
    YearReleased,
    NumberOfPlayers,
    EstimatedTime,
    AgeRecommendation,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Rater {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Game::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Game::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Game::RaterId).integer().not_null())
                    .col(ColumnDef::new(Game::Title).string_len(50).not_null())
                    .col(
                        ColumnDef::new(Game::Description)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Game::YearReleased).integer().not_null())
                    .col(ColumnDef::new(Game::NumberOfPlayers).integer().not_null())
                    .col(ColumnDef::new(Game::EstimatedTime).time().not_null())
                    .col(
                        ColumnDef::new(Game::AgeRecommendation)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Game::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Game::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_game_rater_id")
                            .from(Game::Table, Game::RaterId)
                            .to(Rater::Table, Rater::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Game::Table).to_owned())
            .await
    }
}
