//! Per-viewer application fields of a team.
//!
//! A missing application is never an error here: it is simply "not applied".

use common::Viewer;
use model::entities::{
    application::{self, ApplicationStatus, STATUS_DEFAULT_DISPLAY},
    team,
};

/// `application_status` of the team detail view when there is nothing to show.
pub const DETAIL_STATUS_NONE: &str = "";

/// Whether the viewer has applied to the team.
pub fn is_applied(viewer: &Viewer, application: Option<&application::Model>) -> bool {
    !viewer.is_anonymous() && application.is_some()
}

/// Status label for the team detail view, empty when there is none.
pub fn application_status(viewer: &Viewer, application: Option<&application::Model>) -> String {
    match application {
        Some(application) if !viewer.is_anonymous() => application.status.display().to_string(),
        _ => DETAIL_STATUS_NONE.to_string(),
    }
}

/// Status label for the applied-teams list, "Not applied" when there is none.
pub fn application_status_or_default(application: Option<&application::Model>) -> String {
    application
        .map(|a| a.status.display())
        .unwrap_or(STATUS_DEFAULT_DISPLAY)
        .to_string()
}

/// Chat link, visible to the leader and to approved applicants only.
pub fn chat_url(
    viewer: &Viewer,
    team: &team::Model,
    application: Option<&application::Model>,
) -> String {
    if viewer.is_anonymous() {
        return String::new();
    }
    if viewer.is(team.leader_id) {
        return team.chat_url.clone();
    }
    match application {
        Some(a) if a.status == ApplicationStatus::Approved => team.chat_url.clone(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    const LEADER: i32 = 1;
    const APPLICANT: i32 = 2;

    fn team() -> team::Model {
        team::Model {
            id: 10,
            leader_id: LEADER,
            title: "Rust study".to_string(),
            description: "Weekly".to_string(),
            end_date: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            image: None,
            max_personnel: 4,
            current_personnel: 1,
            chat_url: "https://chat.example.com/rust".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn application(status: ApplicationStatus) -> application::Model {
        application::Model {
            id: 1,
            team_id: 10,
            applicant_id: APPLICANT,
            status,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_anonymous_viewer_sees_nothing() {
        let team = team();
        let approved = application(ApplicationStatus::Approved);

        for app in [None, Some(&approved)] {
            assert!(!is_applied(&Viewer::Anonymous, app));
            assert_eq!(application_status(&Viewer::Anonymous, app), "");
            assert_eq!(chat_url(&Viewer::Anonymous, &team, app), "");
        }
    }

    #[test]
    fn test_leader_always_sees_chat_url() {
        let team = team();
        assert_eq!(
            chat_url(&Viewer::User(LEADER), &team, None),
            "https://chat.example.com/rust"
        );
    }

    #[test]
    fn test_only_approved_applicant_sees_chat_url() {
        let team = team();
        let viewer = Viewer::User(APPLICANT);

        assert_eq!(
            chat_url(&viewer, &team, Some(&application(ApplicationStatus::Approved))),
            "https://chat.example.com/rust"
        );
        assert_eq!(chat_url(&viewer, &team, Some(&application(ApplicationStatus::Pending))), "");
        assert_eq!(chat_url(&viewer, &team, Some(&application(ApplicationStatus::Rejected))), "");
        assert_eq!(chat_url(&viewer, &team, None), "");
    }

    #[test]
    fn test_detail_status_fields() {
        let viewer = Viewer::User(APPLICANT);
        let pending = application(ApplicationStatus::Pending);

        assert!(is_applied(&viewer, Some(&pending)));
        assert_eq!(application_status(&viewer, Some(&pending)), "Pending");
        assert!(!is_applied(&viewer, None));
        assert_eq!(application_status(&viewer, None), DETAIL_STATUS_NONE);
    }

    #[test]
    fn test_list_status_defaults_to_not_applied() {
        assert_eq!(application_status_or_default(None), "Not applied");
        assert_eq!(
            application_status_or_default(Some(&application(ApplicationStatus::Rejected))),
            "Rejected"
        );
    }
}
