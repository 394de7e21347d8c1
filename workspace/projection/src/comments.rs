//! Two-level comment trees.

use std::collections::HashMap;

use common::{ChildCommentView, CommentView, TeammateView};
use model::entities::comment;

use crate::error::{ProjectionError, Result};

fn author(authors: &HashMap<i32, TeammateView>, author_id: i32) -> Result<TeammateView> {
    authors
        .get(&author_id)
        .cloned()
        .ok_or(ProjectionError::MissingUser(author_id))
}

pub fn child_comment_view(
    comment: &comment::Model,
    authors: &HashMap<i32, TeammateView>,
) -> Result<ChildCommentView> {
    Ok(ChildCommentView {
        id: comment.id,
        parent: comment.parent_id,
        team: comment.team_id,
        author: author(authors, comment.author_id)?,
        body: comment.body.clone(),
        created_at: comment.created_at,
        updated_at: comment.updated_at,
    })
}

/// Render `parent` with its direct replies taken from `comments`.
///
/// Replies to replies are neither counted nor rendered.
pub fn comment_view(
    parent: &comment::Model,
    comments: &[comment::Model],
    authors: &HashMap<i32, TeammateView>,
) -> Result<CommentView> {
    let child_comments = comments
        .iter()
        .filter(|c| c.parent_id == Some(parent.id))
        .map(|c| child_comment_view(c, authors))
        .collect::<Result<Vec<_>>>()?;

    Ok(CommentView {
        id: parent.id,
        parent: parent.parent_id,
        team: parent.team_id,
        author: author(authors, parent.author_id)?,
        body: parent.body.clone(),
        created_at: parent.created_at,
        updated_at: parent.updated_at,
        child_comments_count: child_comments.len() as u64,
        child_comments,
    })
}

/// Top-level comments of one team, oldest first, each with its replies.
pub fn parent_comment_views(
    comments: &[comment::Model],
    authors: &HashMap<i32, TeammateView>,
) -> Result<Vec<CommentView>> {
    let mut parents: Vec<&comment::Model> = comments.iter().filter(|c| !c.is_reply()).collect();
    parents.sort_by_key(|c| (c.created_at, c.id));

    parents
        .into_iter()
        .map(|parent| comment_view(parent, comments, authors))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn comment(id: i32, parent_id: Option<i32>, minutes: i64) -> comment::Model {
        let at = Utc::now() + Duration::minutes(minutes);
        comment::Model {
            id,
            team_id: 1,
            author_id: 7,
            parent_id,
            body: format!("comment {id}"),
            created_at: at,
            updated_at: at,
        }
    }

    fn authors() -> HashMap<i32, TeammateView> {
        HashMap::from([(
            7,
            TeammateView {
                id: 7,
                username: "writer".to_string(),
                nickname: None,
                image: None,
            },
        )])
    }

    #[test]
    fn test_replies_one_level_deep() {
        // 1 has replies 2 and 3; 4 replies to 2.
        let comments = vec![
            comment(1, None, 0),
            comment(2, Some(1), 1),
            comment(3, Some(1), 2),
            comment(4, Some(2), 3),
        ];

        let views = parent_comment_views(&comments, &authors()).unwrap();

        assert_eq!(views.len(), 1);
        let parent = &views[0];
        assert_eq!(parent.child_comments_count, 2);
        let child_ids: Vec<i32> = parent.child_comments.iter().map(|c| c.id).collect();
        assert_eq!(child_ids, vec![2, 3]);
        assert!(parent.child_comments.iter().all(|c| c.parent == Some(1)));
    }

    #[test]
    fn test_parents_ordered_by_creation() {
        let comments = vec![comment(5, None, 10), comment(6, None, -10), comment(7, Some(5), 11)];

        let views = parent_comment_views(&comments, &authors()).unwrap();

        let ids: Vec<i32> = views.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![6, 5]);
        assert_eq!(views[0].child_comments_count, 0);
        assert_eq!(views[1].child_comments_count, 1);
    }

    #[test]
    fn test_unknown_author_is_an_error() {
        let mut orphan = comment(1, None, 0);
        orphan.author_id = 99;

        let result = parent_comment_views(&[orphan], &authors());
        assert!(matches!(result, Err(ProjectionError::MissingUser(99))));
    }
}
