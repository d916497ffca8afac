use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::accounts::password::hash_password;

/// Account record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 hash, not exposed in JSON
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub tagline: Option<String>,
    pub is_admin: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Account {
    /// Replace the stored hash with a hash of `plain`. The change is only
    /// in memory until the record is saved.
    pub fn set_password(&mut self, plain: &str) -> anyhow::Result<()> {
        self.password_hash = hash_password(plain)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_account() -> Account {
        Account {
            id: Uuid::new_v4(),
            email: "a@x.com".into(),
            username: "alice".into(),
            password_hash: "argon2-hash-placeholder".into(),
            first_name: Some("Alice".into()),
            last_name: Some("Liddell".into()),
            tagline: None,
            is_admin: false,
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let account = sample_account();
        let json = serde_json::to_string(&account).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("argon2-hash-placeholder"));
    }

    #[test]
    fn set_password_stores_a_hash_not_the_plaintext() {
        let mut account = sample_account();
        account.set_password("hunter2hunter2").unwrap();
        assert_ne!(account.password_hash, "hunter2hunter2");
        assert!(account.password_hash.starts_with("$argon2"));
    }

}
