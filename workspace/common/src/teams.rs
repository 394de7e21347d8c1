use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{CommentView, TeammateView};

/// Team as rendered in lists; the base for every other team view.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct TeamListView {
    pub id: i32,
    /// Tag names
    pub tags: Vec<String>,
    pub likes: Vec<TeammateView>,
    pub like_count: u64,
    pub leader: TeammateView,
    pub title: String,
    pub end_date: NaiveDate,
    pub description: String,
    /// Cover image URL
    pub image: Option<String>,
    pub max_personnel: i32,
    pub current_personnel: i32,
    /// Number of comments at any depth
    pub comments_count: u64,
    /// Top-level comments with their direct replies
    pub parent_comments: Vec<CommentView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Team as rendered on its own page, with the viewer's relation to it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct TeamDetailView {
    #[serde(flatten)]
    pub team: TeamListView,
    pub is_applied: bool,
    /// Status label of the viewer's application, empty when there is none
    pub application_status: String,
    /// Chat link, empty unless the viewer leads the team or was approved
    pub chat_url: String,
}

/// Team as rendered in the viewer's list of applications.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct TeamApplicationStatusView {
    #[serde(flatten)]
    pub team: TeamListView,
    /// Status label of the viewer's application, or the "not applied" label
    pub application_status: String,
}
