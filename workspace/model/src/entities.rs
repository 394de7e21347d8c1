//! Root of the SeaORM entity modules for teams, their members and the
//! conversation around them.

pub mod application;
pub mod comment;
pub mod tag;
pub mod team;
pub mod team_like;
pub mod team_tag;
pub mod user;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::application::Entity as Application;
    pub use super::comment::Entity as Comment;
    pub use super::tag::Entity as Tag;
    pub use super::team::Entity as Team;
    pub use super::team_like::Entity as TeamLike;
    pub use super::team_tag::Entity as TeamTag;
    pub use super::user::Entity as User;
}
