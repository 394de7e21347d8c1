use super::tag;
use sea_orm::entity::prelude::*;

/// A recruiting team created by its leader.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "teams")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub leader_id: i32,
    pub title: String,
    pub description: String,
    pub end_date: Date,
    /// URL of the cover image.
    pub image: Option<String>,
    pub max_personnel: i32,
    #[sea_orm(default_value = "1")]
    pub current_personnel: i32,
    /// Private group-chat link. Only the leader and approved applicants see it.
    pub chat_url: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::LeaderId",
        to = "super::user::Column::Id"
    )]
    Leader,
    #[sea_orm(has_many = "super::team_tag::Entity")]
    TeamTag,
    #[sea_orm(has_many = "super::team_like::Entity")]
    TeamLike,
    #[sea_orm(has_many = "super::comment::Entity")]
    Comment,
    #[sea_orm(has_many = "super::application::Entity")]
    Application,
}

impl Related<tag::Entity> for Entity {
    fn to() -> RelationDef {
        super::team_tag::Relation::Tag.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::team_tag::Relation::Team.def().rev())
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Leader.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comment.def()
    }
}

impl Related<super::application::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Application.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
