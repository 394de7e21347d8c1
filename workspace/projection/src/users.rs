use common::{TeammateView, UserView};
use model::entities::user;

pub fn user_view(user: &user::Model) -> UserView {
    UserView {
        id: user.id,
        username: user.username.clone(),
        nickname: user.nickname.clone(),
        email: user.email.clone(),
        introduction: user.introduction.clone(),
        image: user.image.clone(),
        is_github_authenticated: user.is_github_authenticated,
    }
}

pub fn teammate_view(user: &user::Model) -> TeammateView {
    TeammateView {
        id: user.id,
        username: user.username.clone(),
        nickname: user.nickname.clone(),
        image: user.image.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_user_view_never_carries_password() {
        let user = user::Model {
            id: 4,
            username: "alice".to_string(),
            password: Some("$argon2id$v=19$...".to_string()),
            nickname: Some("Al".to_string()),
            email: Some("alice@example.com".to_string()),
            introduction: None,
            image: Some("https://img.example.com/a.png".to_string()),
            is_github_authenticated: false,
            github_id: None,
            is_active: true,
            date_joined: Utc::now(),
        };

        let view = user_view(&user);
        assert_eq!(view.username, "alice");
        assert_eq!(view.email.as_deref(), Some("alice@example.com"));

        let teammate = teammate_view(&user);
        assert_eq!(teammate.id, 4);
        assert_eq!(teammate.nickname.as_deref(), Some("Al"));
        assert_eq!(teammate.image, view.image);
    }
}
