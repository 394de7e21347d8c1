use sea_orm::entity::prelude::*;

/// A name-only label attached to teams. The name doubles as the identifier.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "tags")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::team_tag::Entity")]
    TeamTag,
}

impl Related<super::team::Entity> for Entity {
    fn to() -> RelationDef {
        super::team_tag::Relation::Team.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::team_tag::Relation::Tag.def().rev())
    }
}

impl Related<super::team_tag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TeamTag.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
