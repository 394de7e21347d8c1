//! Pluggable authentication backends.
//!
//! An [`Authenticator`] holds an ordered list of backends and asks each one in
//! turn to resolve the submitted [`Credentials`]; the first user found wins.

use std::sync::Arc;

use async_trait::async_trait;
use model::entities::user;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use tracing::{debug, instrument, trace};

use crate::error::Result;
use crate::github::SocialIdentityProvider;
use crate::password::{hash_password, verify_password};
use crate::users::{create_user, unique_username, NewUser};

/// Everything a client may submit to sign in. Any subset may be present.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
    /// One-time authorization code from a social provider
    pub code: Option<String>,
}

/// Resolves credentials of one kind to a user.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    fn name(&self) -> &'static str;

    /// `Ok(None)` when these credentials are not for this backend or do not match.
    async fn authenticate(
        &self,
        db: &DatabaseConnection,
        credentials: &Credentials,
    ) -> Result<Option<user::Model>>;
}

/// Username and password checked against the stored hash.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelBackend;

#[async_trait]
impl AuthBackend for ModelBackend {
    fn name(&self) -> &'static str {
        "model"
    }

    async fn authenticate(
        &self,
        db: &DatabaseConnection,
        credentials: &Credentials,
    ) -> Result<Option<user::Model>> {
        let (Some(username), Some(password)) = (&credentials.username, &credentials.password) else {
            return Ok(None);
        };

        let Some(user) = user::Entity::find()
            .filter(user::Column::Username.eq(username.as_str()))
            .one(db)
            .await?
        else {
            // Hash anyway so unknown usernames cost as much as wrong passwords.
            let _ = hash_password(password);
            return Ok(None);
        };

        let Some(stored) = user.password.as_deref() else {
            debug!("User {} has no usable password", user.username);
            return Ok(None);
        };

        if verify_password(password, stored)? && user.is_active {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }
}

/// Social sign-in: resolves `code` through a provider and maps the external
/// identity to a local account, creating the account on first sign-in.
#[derive(Clone)]
pub struct SocialBackend {
    provider: Arc<dyn SocialIdentityProvider>,
}

impl SocialBackend {
    pub fn new(provider: impl SocialIdentityProvider + 'static) -> Self {
        Self {
            provider: Arc::new(provider),
        }
    }
}

#[async_trait]
impl AuthBackend for SocialBackend {
    fn name(&self) -> &'static str {
        "social"
    }

    async fn authenticate(
        &self,
        db: &DatabaseConnection,
        credentials: &Credentials,
    ) -> Result<Option<user::Model>> {
        let Some(code) = credentials.code.as_deref() else {
            return Ok(None);
        };

        let Some(identity) = self.provider.resolve_code(code).await? else {
            return Ok(None);
        };

        if let Some(existing) = user::Entity::find()
            .filter(user::Column::GithubId.eq(identity.provider_id))
            .one(db)
            .await?
        {
            return Ok(Some(existing));
        }

        let username = unique_username(db, &identity.login).await?;
        let created = create_user(
            db,
            NewUser {
                username,
                image: identity.avatar_url,
                is_github_authenticated: true,
                github_id: Some(identity.provider_id),
                ..Default::default()
            },
        )
        .await?;

        Ok(Some(created))
    }
}

/// Ordered chain of backends.
#[derive(Clone, Default)]
pub struct Authenticator {
    backends: Vec<Arc<dyn AuthBackend>>,
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.backends.iter().map(|b| b.name()))
            .finish()
    }
}

impl Authenticator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_backend(mut self, backend: impl AuthBackend + 'static) -> Self {
        self.backends.push(Arc::new(backend));
        self
    }

    /// Ask every backend in order; the first resolved user wins.
    #[instrument(skip_all, fields(backends = self.backends.len()))]
    pub async fn authenticate(
        &self,
        db: &DatabaseConnection,
        credentials: &Credentials,
    ) -> Result<Option<user::Model>> {
        for backend in &self.backends {
            trace!("Trying {} backend", backend.name());
            if let Some(user) = backend.authenticate(db, credentials).await? {
                debug!("{} backend resolved user {}", backend.name(), user.id);
                return Ok(Some(user));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::github::SocialIdentity;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{ActiveModelTrait, Database, Set};

    pub(crate) async fn setup_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.expect("Migrations failed.");
        db
    }

    /// Accepts exactly one code and maps it to a fixed identity.
    pub(crate) struct FakeProvider;

    #[async_trait]
    impl SocialIdentityProvider for FakeProvider {
        async fn resolve_code(&self, code: &str) -> Result<Option<SocialIdentity>> {
            Ok((code == "good-code").then(|| SocialIdentity {
                provider_id: 583231,
                login: "octocat".to_string(),
                avatar_url: Some("https://avatars.example.com/octocat".to_string()),
            }))
        }
    }

    fn password_credentials(username: &str, password: &str) -> Credentials {
        Credentials {
            username: Some(username.to_string()),
            password: Some(password.to_string()),
            code: None,
        }
    }

    #[tokio::test]
    async fn test_model_backend_matches_password() {
        let db = setup_db().await;
        let alice = create_user(&db, NewUser::with_password("alice", "s3cret")).await.unwrap();

        let found = ModelBackend
            .authenticate(&db, &password_credentials("alice", "s3cret"))
            .await
            .unwrap();
        assert_eq!(found.map(|u| u.id), Some(alice.id));

        let wrong = ModelBackend
            .authenticate(&db, &password_credentials("alice", "nope"))
            .await
            .unwrap();
        assert!(wrong.is_none());

        let unknown = ModelBackend
            .authenticate(&db, &password_credentials("bob", "s3cret"))
            .await
            .unwrap();
        assert!(unknown.is_none());
    }

    #[tokio::test]
    async fn test_model_backend_skips_inactive_user() {
        let db = setup_db().await;
        let alice = create_user(&db, NewUser::with_password("alice", "s3cret")).await.unwrap();

        let mut active: user::ActiveModel = alice.into();
        active.is_active = Set(false);
        active.update(&db).await.unwrap();

        let found = ModelBackend
            .authenticate(&db, &password_credentials("alice", "s3cret"))
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_social_backend_creates_then_reuses_account() {
        let db = setup_db().await;
        create_user(&db, NewUser::with_password("octocat", "taken")).await.unwrap();
        let backend = SocialBackend::new(FakeProvider);
        let credentials = Credentials {
            code: Some("good-code".to_string()),
            ..Default::default()
        };

        let first = backend.authenticate(&db, &credentials).await.unwrap().unwrap();
        assert_eq!(first.username, "octocat1");
        assert!(first.is_github_authenticated);
        assert_eq!(first.github_id, Some(583231));
        assert!(first.password.is_none());
        assert!(first.needs_profile_setup());

        let second = backend.authenticate(&db, &credentials).await.unwrap().unwrap();
        assert_eq!(second.id, first.id);
    }

    #[tokio::test]
    async fn test_social_backend_rejected_code() {
        let db = setup_db().await;
        let backend = SocialBackend::new(FakeProvider);
        let credentials = Credentials {
            code: Some("bad-code".to_string()),
            ..Default::default()
        };

        assert!(backend.authenticate(&db, &credentials).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_authenticator_tries_backends_in_order() {
        let db = setup_db().await;
        let alice = create_user(&db, NewUser::with_password("alice", "s3cret")).await.unwrap();
        let authenticator = Authenticator::new()
            .with_backend(ModelBackend)
            .with_backend(SocialBackend::new(FakeProvider));

        let by_password = authenticator
            .authenticate(&db, &password_credentials("alice", "s3cret"))
            .await
            .unwrap();
        assert_eq!(by_password.map(|u| u.id), Some(alice.id));

        let by_code = authenticator
            .authenticate(
                &db,
                &Credentials {
                    code: Some("good-code".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(by_code.map(|u| u.username), Some("octocat".to_string()));

        let nothing = authenticator.authenticate(&db, &Credentials::default()).await.unwrap();
        assert!(nothing.is_none());
        assert_eq!(format!("{authenticator:?}"), r#"["model", "social"]"#);
    }
}
