use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "game")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub rater_id: i32,
    pub title: String,
    pub description: String,
    pub year_released: i32,
    pub number_of_players: i32,
    pub estimated_time: Time,
    pub age_recommendation: i32,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::rater::Entity",
        from = "Column::RaterId",
        to = "super::rater::Column::Id"
    )]
    Rater,
    #[sea_orm(has_many = "super::review::Entity")]
    Reviews,
    #[sea_orm(has_many = "super::rating::Entity")]
    Ratings,
    #[sea_orm(has_many = "super::picture::Entity")]
    Pictures,
    #[sea_orm(has_many = "super::game_category::Entity")]
    GameCategories,
}

impl Related<super::rater::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rater.def()
    }
}

impl Related<super::review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reviews.def()
    }
}

impl Related<super::rating::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ratings.def()
    }
}

impl Related<super::picture::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pictures.def()
    }
}

impl Related<super::game_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GameCategories.def()
    }
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        super::game_category::Relation::Category.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::game_category::Relation::Game.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
