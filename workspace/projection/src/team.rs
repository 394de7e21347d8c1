use std::collections::{BTreeSet, HashMap};

use common::{TeamApplicationStatusView, TeamDetailView, TeamListView, TeammateView, Viewer};
use model::entities::{application, comment, team, team_like, team_tag, user};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use tracing::{debug, instrument, trace};

use crate::application::{application_status, application_status_or_default, chat_url, is_applied};
use crate::comments::parent_comment_views;
use crate::error::{ProjectionError, Result};
use crate::users::teammate_view;

/// Builds team views from the database for one request.
#[derive(Debug, Clone, Copy)]
pub struct TeamProjector<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> TeamProjector<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Loads tags, likes, comments and teammates of all `teams` with one
    /// query per relation.
    async fn relations(&self, teams: &[team::Model]) -> Result<TeamRelations> {
        let mut relations = TeamRelations::default();
        if teams.is_empty() {
            return Ok(relations);
        }
        let team_ids: Vec<i32> = teams.iter().map(|t| t.id).collect();

        let tags = team_tag::Entity::find()
            .filter(team_tag::Column::TeamId.is_in(team_ids.iter().copied()))
            .order_by_asc(team_tag::Column::TagName)
            .all(self.db)
            .await?;
        for tag in tags {
            relations.tags.entry(tag.team_id).or_default().push(tag.tag_name);
        }

        let likes = team_like::Entity::find()
            .filter(team_like::Column::TeamId.is_in(team_ids.iter().copied()))
            .order_by_asc(team_like::Column::UserId)
            .all(self.db)
            .await?;
        for like in likes {
            relations.likes.entry(like.team_id).or_default().push(like.user_id);
        }

        let comments = comment::Entity::find()
            .filter(comment::Column::TeamId.is_in(team_ids.iter().copied()))
            .order_by_asc(comment::Column::CreatedAt)
            .order_by_asc(comment::Column::Id)
            .all(self.db)
            .await?;
        for comment in comments {
            relations.comments.entry(comment.team_id).or_default().push(comment);
        }

        let mut user_ids: BTreeSet<i32> = teams.iter().map(|t| t.leader_id).collect();
        user_ids.extend(relations.likes.values().flatten().copied());
        user_ids.extend(relations.comments.values().flatten().map(|c| c.author_id));
        let users = user::Entity::find()
            .filter(user::Column::Id.is_in(user_ids))
            .all(self.db)
            .await?;
        relations.teammates = users.iter().map(|u| (u.id, teammate_view(u))).collect();

        trace!("Loaded relations of {} teams", teams.len());
        Ok(relations)
    }

    /// The viewer's application to `team_id`, if any. Anonymous viewers have none.
    pub async fn viewer_application(
        &self,
        team_id: i32,
        viewer: &Viewer,
    ) -> Result<Option<application::Model>> {
        let Some(user_id) = viewer.user_id() else {
            return Ok(None);
        };
        Ok(application::Entity::find()
            .filter(application::Column::TeamId.eq(team_id))
            .filter(application::Column::ApplicantId.eq(user_id))
            .one(self.db)
            .await?)
    }

    #[instrument(skip(self, team), fields(team_id = team.id))]
    pub async fn list_view(&self, team: &team::Model) -> Result<TeamListView> {
        let relations = self.relations(std::slice::from_ref(team)).await?;
        relations.list_view(team)
    }

    pub async fn list_views(&self, teams: &[team::Model]) -> Result<Vec<TeamListView>> {
        let relations = self.relations(teams).await?;
        let views = teams
            .iter()
            .map(|team| relations.list_view(team))
            .collect::<Result<Vec<_>>>()?;
        debug!("Projected {} teams", views.len());
        Ok(views)
    }

    /// Team page as seen by `viewer`.
    #[instrument(skip(self, team), fields(team_id = team.id))]
    pub async fn detail_view(&self, team: &team::Model, viewer: &Viewer) -> Result<TeamDetailView> {
        let application = self.viewer_application(team.id, viewer).await?;
        let application = application.as_ref();

        Ok(TeamDetailView {
            team: self.list_view(team).await?,
            is_applied: is_applied(viewer, application),
            application_status: application_status(viewer, application),
            chat_url: chat_url(viewer, team, application),
        })
    }

    /// Applied-teams list entries for `teams`, in the given order.
    #[instrument(skip(self, teams), fields(teams = teams.len()))]
    pub async fn application_status_views(
        &self,
        teams: &[team::Model],
        viewer: &Viewer,
    ) -> Result<Vec<TeamApplicationStatusView>> {
        let applications: HashMap<i32, application::Model> = match viewer.user_id() {
            Some(user_id) if !teams.is_empty() => application::Entity::find()
                .filter(application::Column::ApplicantId.eq(user_id))
                .filter(application::Column::TeamId.is_in(teams.iter().map(|t| t.id)))
                .all(self.db)
                .await?
                .into_iter()
                .map(|a| (a.team_id, a))
                .collect(),
            _ => HashMap::new(),
        };

        let relations = self.relations(teams).await?;
        teams
            .iter()
            .map(|team| -> Result<TeamApplicationStatusView> {
                Ok(TeamApplicationStatusView {
                    team: relations.list_view(team)?,
                    application_status: application_status_or_default(applications.get(&team.id)),
                })
            })
            .collect()
    }
}

/// Relations of a set of teams, keyed by team id.
#[derive(Debug, Default)]
struct TeamRelations {
    tags: HashMap<i32, Vec<String>>,
    likes: HashMap<i32, Vec<i32>>,
    comments: HashMap<i32, Vec<comment::Model>>,
    teammates: HashMap<i32, TeammateView>,
}

impl TeamRelations {
    fn teammate(&self, user_id: i32) -> Result<TeammateView> {
        self.teammates
            .get(&user_id)
            .cloned()
            .ok_or(ProjectionError::MissingUser(user_id))
    }

    fn list_view(&self, team: &team::Model) -> Result<TeamListView> {
        let tags = self.tags.get(&team.id).cloned().unwrap_or_default();
        let likes = self
            .likes
            .get(&team.id)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .map(|id| self.teammate(*id))
            .collect::<Result<Vec<_>>>()?;
        let comments = self.comments.get(&team.id).map(Vec::as_slice).unwrap_or_default();

        Ok(TeamListView {
            id: team.id,
            tags,
            like_count: likes.len() as u64,
            likes,
            leader: self.teammate(team.leader_id)?,
            title: team.title.clone(),
            end_date: team.end_date,
            description: team.description.clone(),
            image: team.image.clone(),
            max_personnel: team.max_personnel,
            current_personnel: team.current_personnel,
            comments_count: comments.len() as u64,
            parent_comments: parent_comment_views(comments, &self.teammates)?,
            created_at: team.created_at,
            updated_at: team.updated_at,
        })
    }
}
