use sea_orm::entity::prelude::*;

/// A person using the service. Owned by the auth layer: rows are created by
/// registration or by the first GitHub sign-in and edited only by their owner.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    /// Argon2 PHC string. `None` for accounts that only sign in through GitHub.
    pub password: Option<String>,
    pub nickname: Option<String>,
    pub email: Option<String>,
    pub introduction: Option<String>,
    /// URL of the profile image.
    pub image: Option<String>,
    #[sea_orm(default_value = "false")]
    pub is_github_authenticated: bool,
    #[sea_orm(unique)]
    pub github_id: Option<i64>,
    #[sea_orm(default_value = "true")]
    pub is_active: bool,
    pub date_joined: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Teams this user leads.
    #[sea_orm(has_many = "super::team::Entity")]
    Team,
    #[sea_orm(has_many = "super::comment::Entity")]
    Comment,
    #[sea_orm(has_many = "super::application::Entity")]
    Application,
    #[sea_orm(has_many = "super::team_like::Entity")]
    TeamLike,
}

impl Related<super::application::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Application.def()
    }
}

impl Related<super::team::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Team.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// True while the user has filled in neither an email nor a nickname.
    /// Clients route such users to the profile-completion flow.
    pub fn needs_profile_setup(&self) -> bool {
        is_blank(&self.email) && is_blank(&self.nickname)
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(nickname: Option<&str>, email: Option<&str>) -> Model {
        Model {
            id: 1,
            username: "alice".to_string(),
            password: None,
            nickname: nickname.map(str::to_string),
            email: email.map(str::to_string),
            introduction: None,
            image: None,
            is_github_authenticated: false,
            github_id: None,
            is_active: true,
            date_joined: Utc::now(),
        }
    }

    #[test]
    fn test_needs_profile_setup_when_both_missing() {
        assert!(user(None, None).needs_profile_setup());
        assert!(user(Some(""), Some("")).needs_profile_setup());
        assert!(user(None, Some("")).needs_profile_setup());
    }

    #[test]
    fn test_profile_complete_with_either_field() {
        assert!(!user(Some("Al"), None).needs_profile_setup());
        assert!(!user(None, Some("alice@example.com")).needs_profile_setup());
    }
}
