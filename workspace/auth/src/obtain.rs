use model::entities::user;
use sea_orm::DatabaseConnection;
use tracing::{info, instrument, warn};

use crate::backend::{Authenticator, Credentials};
use crate::error::{AuthError, Result};
use crate::token::TokenSigner;

/// Outcome of a successful sign-in.
#[derive(Debug, Clone, PartialEq)]
pub struct ObtainedToken {
    pub access: String,
    pub user_id: i32,
    pub username: String,
    /// The account has not filled in its profile yet
    pub is_new: bool,
}

impl ObtainedToken {
    fn for_user(user: &user::Model, access: String) -> Self {
        Self {
            access,
            user_id: user.id,
            username: user.username.clone(),
            is_new: user.needs_profile_setup(),
        }
    }
}

/// Resolve credentials to an active user and issue an access token for them.
///
/// The access token is derived from a freshly issued refresh token.
#[instrument(skip_all)]
pub async fn obtain_access_token(
    authenticator: &Authenticator,
    signer: &TokenSigner,
    db: &DatabaseConnection,
    credentials: &Credentials,
) -> Result<ObtainedToken> {
    let user = match authenticator.authenticate(db, credentials).await? {
        Some(user) if user.is_active => user,
        Some(user) => {
            warn!("Inactive user {} tried to sign in", user.id);
            return Err(AuthError::AuthenticationFailed);
        }
        None => return Err(AuthError::AuthenticationFailed),
    };

    let refresh = signer.refresh_for_user(user.id)?;
    let access = refresh.access_token()?;

    info!("Issued access token for user {}", user.id);
    Ok(ObtainedToken::for_user(&user, access))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::tests::{setup_db, FakeProvider};
    use crate::backend::{ModelBackend, SocialBackend};
    use crate::users::{create_user, NewUser};
    use chrono::Duration;

    fn signer() -> TokenSigner {
        TokenSigner::new(b"obtain_test_secret", Duration::minutes(5), Duration::days(1))
    }

    fn authenticator() -> Authenticator {
        Authenticator::new()
            .with_backend(ModelBackend)
            .with_backend(SocialBackend::new(FakeProvider))
    }

    #[tokio::test]
    async fn test_obtain_token_for_password_user() {
        let db = setup_db().await;
        let signer = signer();
        let mut new_user = NewUser::with_password("alice", "s3cret");
        new_user.email = Some("alice@example.com".to_string());
        let alice = create_user(&db, new_user).await.unwrap();

        let credentials = Credentials {
            username: Some("alice".to_string()),
            password: Some("s3cret".to_string()),
            code: None,
        };
        let obtained = obtain_access_token(&authenticator(), &signer, &db, &credentials)
            .await
            .unwrap();

        assert_eq!(obtained.user_id, alice.id);
        assert_eq!(obtained.username, "alice");
        assert!(!obtained.is_new);
        assert_eq!(signer.verify_access(&obtained.access).unwrap().user_id, alice.id);
    }

    #[tokio::test]
    async fn test_obtain_token_new_social_user() {
        let db = setup_db().await;
        let credentials = Credentials {
            code: Some("good-code".to_string()),
            ..Default::default()
        };

        let obtained = obtain_access_token(&authenticator(), &signer(), &db, &credentials)
            .await
            .unwrap();

        assert_eq!(obtained.username, "octocat");
        assert!(obtained.is_new);
    }

    #[tokio::test]
    async fn test_obtain_token_bad_credentials() {
        let db = setup_db().await;
        create_user(&db, NewUser::with_password("alice", "s3cret")).await.unwrap();

        let credentials = Credentials {
            username: Some("alice".to_string()),
            password: Some("wrong".to_string()),
            code: None,
        };
        let result = obtain_access_token(&authenticator(), &signer(), &db, &credentials).await;

        assert!(matches!(result, Err(AuthError::AuthenticationFailed)));
    }
}
