//! Common transport-layer types: the identity a request is made under and the
//! JSON views the API renders. The projection layer builds these views and
//! the HTTP handlers return them unchanged.

mod comments;
mod teams;
mod users;
mod viewer;

pub use comments::{ChildCommentView, CommentView};
pub use teams::{TeamApplicationStatusView, TeamDetailView, TeamListView};
pub use users::{TeammateView, UserView};
pub use viewer::Viewer;
