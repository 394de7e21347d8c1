use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::TeammateView;

/// A reply, rendered without its own replies.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ChildCommentView {
    pub id: i32,
    /// Parent comment ID
    pub parent: Option<i32>,
    /// Team ID
    pub team: i32,
    pub author: TeammateView,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A top-level comment together with its direct replies.
///
/// Replies are rendered as [`ChildCommentView`], so the tree stops one level
/// below the parent.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct CommentView {
    pub id: i32,
    pub parent: Option<i32>,
    pub team: i32,
    pub author: TeammateView,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Number of direct replies
    pub child_comments_count: u64,
    pub child_comments: Vec<ChildCommentView>,
}
