pub mod comments;
pub mod health;
pub mod tags;
pub mod teams;
pub mod token;
pub mod users;
