//! Managed user creation. Every account, password or social, is created here
//! so that passwords are always stored hashed.

use chrono::Utc;
use model::entities::user;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set, SqlErr,
};
use tracing::{debug, info, instrument};

use crate::error::{AuthError, Result};
use crate::password::hash_password;

/// Fields of a user about to be created.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub username: String,
    /// Plain-text password; hashed before it is stored.
    pub password: Option<String>,
    pub nickname: Option<String>,
    pub email: Option<String>,
    pub introduction: Option<String>,
    pub image: Option<String>,
    pub is_github_authenticated: bool,
    pub github_id: Option<i64>,
}

impl NewUser {
    pub fn with_password(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: Some(password.into()),
            ..Default::default()
        }
    }
}

pub async fn username_exists(db: &DatabaseConnection, username: &str) -> Result<bool> {
    Ok(user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await?
        .is_some())
}

/// Insert a new user, hashing the password when one is given.
#[instrument(skip(db, new_user), fields(username = %new_user.username))]
pub async fn create_user(db: &DatabaseConnection, new_user: NewUser) -> Result<user::Model> {
    if username_exists(db, &new_user.username).await? {
        debug!("Username {} is taken", new_user.username);
        return Err(AuthError::UsernameTaken(new_user.username));
    }

    insert_user(db, new_user).await
}

/// Insert without the up-front username check. A concurrent insert of the same
/// username still surfaces as [`AuthError::UsernameTaken`] via the unique index.
async fn insert_user(db: &DatabaseConnection, new_user: NewUser) -> Result<user::Model> {
    let password = new_user
        .password
        .as_deref()
        .map(hash_password)
        .transpose()?;

    let username = new_user.username.clone();
    let created = user::ActiveModel {
        username: Set(new_user.username),
        password: Set(password),
        nickname: Set(new_user.nickname),
        email: Set(new_user.email),
        introduction: Set(new_user.introduction),
        image: Set(new_user.image),
        is_github_authenticated: Set(new_user.is_github_authenticated),
        github_id: Set(new_user.github_id),
        is_active: Set(true),
        date_joined: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(|err| username_conflict(err, username))?;

    info!("Created user {} with ID {}", created.username, created.id);
    Ok(created)
}

fn username_conflict(err: DbErr, username: String) -> AuthError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) if detail.contains("username") => {
            debug!("Username {} was taken concurrently", username);
            AuthError::UsernameTaken(username)
        }
        _ => err.into(),
    }
}

/// First free username of the form `base`, `base1`, `base2`, ...
pub async fn unique_username(db: &DatabaseConnection, base: &str) -> Result<String> {
    let mut candidate = base.to_string();
    let mut suffix = 0;
    while username_exists(db, &candidate).await? {
        suffix += 1;
        candidate = format!("{base}{suffix}");
    }
    Ok(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::password::verify_password;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    async fn setup_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.expect("Migrations failed.");
        db
    }

    #[tokio::test]
    async fn test_create_user_hashes_password() {
        let db = setup_db().await;

        let user = create_user(&db, NewUser::with_password("alice", "s3cret")).await.unwrap();

        let stored = user.password.expect("password should be stored");
        assert_ne!(stored, "s3cret");
        assert!(verify_password("s3cret", &stored).unwrap());
        assert!(user.is_active);
        assert!(!user.is_github_authenticated);
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let db = setup_db().await;

        create_user(&db, NewUser::with_password("alice", "one")).await.unwrap();
        let result = create_user(&db, NewUser::with_password("alice", "two")).await;

        assert!(matches!(result, Err(AuthError::UsernameTaken(name)) if name == "alice"));
    }

    #[tokio::test]
    async fn test_unique_index_conflict_is_username_taken() {
        let db = setup_db().await;

        insert_user(&db, NewUser::with_password("alice", "one")).await.unwrap();
        let result = insert_user(&db, NewUser::with_password("alice", "two")).await;

        assert!(matches!(result, Err(AuthError::UsernameTaken(name)) if name == "alice"));
    }

    #[tokio::test]
    async fn test_unique_username_appends_suffix() {
        let db = setup_db().await;

        assert_eq!(unique_username(&db, "octocat").await.unwrap(), "octocat");
        create_user(&db, NewUser::with_password("octocat", "x")).await.unwrap();
        create_user(&db, NewUser::with_password("octocat1", "x")).await.unwrap();
        assert_eq!(unique_username(&db, "octocat").await.unwrap(), "octocat2");
    }
}
