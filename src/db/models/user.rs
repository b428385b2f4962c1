//! User Model

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;

/// User ID type
pub type UserId = RecordId;

/// User model matching the SurrealDB `user` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<UserId>,
    pub name: String,
    pub email: String,
    /// Argon2 hash, never serialized out
    #[serde(skip_serializing)]
    pub password: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Registration payload
#[derive(Debug, Clone, Deserialize)]
pub struct UserCreate {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Public view of a user (no password hash)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPublic {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl From<&User> for UserPublic {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.as_ref().map(|t| t.to_string()).unwrap_or_default(),
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

impl User {
    /// Verify password using argon2
    pub fn verify_password(&self, password: &str) -> Result<bool, argon2::password_hash::Error> {
        use argon2::{
            Argon2,
            password_hash::{PasswordHash, PasswordVerifier},
        };

        let parsed_hash = PasswordHash::new(&self.password)?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash password using argon2
    pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
        use argon2::{
            Argon2,
            password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
        };

        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let password_hash = argon2.hash_password(password.as_bytes(), &salt)?;
        Ok(password_hash.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_round_trip() {
        let hash = User::hash_password("correct horse battery").unwrap();
        let user = User {
            id: None,
            name: "Ana".into(),
            email: "ana@example.com".into(),
            password: hash,
            created_at: String::new(),
            updated_at: String::new(),
        };
        assert!(user.verify_password("correct horse battery").unwrap());
        assert!(!user.verify_password("wrong").unwrap());
    }

    #[test]
    fn password_is_never_serialized() {
        let user = User {
            id: None,
            name: "Ana".into(),
            email: "ana@example.com".into(),
            password: "$argon2id$secret".into(),
            created_at: String::new(),
            updated_at: String::new(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(!json.contains("password"));
    }
}
