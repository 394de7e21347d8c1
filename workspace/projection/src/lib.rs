//! Read views of teams, comments and users as seen by a particular viewer.
//!
//! Every computed field here is a pure function of the persisted rows and the
//! [`Viewer`](common::Viewer); nothing is cached between requests.

pub mod application;
pub mod comments;
pub mod error;
pub mod team;
pub mod users;

pub use error::{ProjectionError, Result};
pub use team::TeamProjector;
pub use users::{teammate_view, user_view};
