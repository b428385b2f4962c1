//! User Repository

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::{User, UserCreate};
use crate::utils::time::now_rfc3339;

#[derive(Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

impl UserRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find user by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<User>> {
        let thing = parse_record_id(id)?;
        let user: Option<User> = self.base.db().select(thing).await?;
        Ok(user)
    }

    /// Find user by email
    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let email_owned = email.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM user WHERE email = $email LIMIT 1")
            .bind(("email", email_owned))
            .await?;
        let users: Vec<User> = result.take(0)?;
        Ok(users.into_iter().next())
    }

    /// Register a new user. The email carries a unique index, but the
    /// duplicate check here produces the friendlier error.
    pub async fn create(&self, data: UserCreate) -> RepoResult<User> {
        if self.find_by_email(&data.email).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Email '{}' is already registered",
                data.email
            )));
        }

        let password = User::hash_password(&data.password)
            .map_err(|e| RepoError::Database(format!("Failed to hash password: {}", e)))?;
        let now = now_rfc3339();

        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE user SET
                    name = $name,
                    email = $email,
                    password = $password,
                    created_at = $now,
                    updated_at = $now
                RETURN AFTER"#,
            )
            .bind(("name", data.name))
            .bind(("email", data.email))
            .bind(("password", password))
            .bind(("now", now))
            .await?;

        let created: Option<User> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create user".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    async fn repo() -> UserRepository {
        let service = DbService::new_in_memory().await.unwrap();
        UserRepository::new(service.db)
    }

    fn ana() -> UserCreate {
        UserCreate {
            name: "Ana".into(),
            email: "ana@example.com".into(),
            password: "long-enough-secret".into(),
        }
    }

    #[tokio::test]
    async fn create_and_find_by_email() {
        let repo = repo().await;
        let created = repo.create(ana()).await.unwrap();
        assert!(created.id.is_some());

        let found = repo.find_by_email("ana@example.com").await.unwrap();
        assert_eq!(found.unwrap().name, "Ana");
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let repo = repo().await;
        repo.create(ana()).await.unwrap();

        let err = repo.create(ana()).await.unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }

    #[tokio::test]
    async fn stored_password_is_hashed() {
        let repo = repo().await;
        let created = repo.create(ana()).await.unwrap();
        assert_ne!(created.password, "long-enough-secret");
        assert!(created.verify_password("long-enough-secret").unwrap());
    }
}
