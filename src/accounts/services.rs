use lazy_static::lazy_static;
use regex::Regex;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::accounts::dto::{NewAccount, UpdateAccountRequest};
use crate::accounts::password::hash_password;
use crate::accounts::repo;
use crate::accounts::repo_types::Account;
use crate::error::ApiError;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Create a regular account. The password is hashed before it ever reaches
/// the database; `is_admin` starts false.
pub async fn create_account(db: &PgPool, fields: NewAccount) -> Result<Account, ApiError> {
    let email = fields.email.trim().to_lowercase();

    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(ApiError::Validation("invalid email address".into()));
    }
    if fields.password.len() < 8 {
        warn!("password too short");
        return Err(ApiError::Validation("password too short".into()));
    }

    // Uniqueness prechecks give precise messages; the unique indexes still
    // catch the race, surfacing as a Conflict from the insert.
    if repo::find_by_email(db, &email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(ApiError::Conflict("email already registered".into()));
    }
    if repo::find_by_username(db, &fields.username).await?.is_some() {
        warn!(username = %fields.username, "username already taken");
        return Err(ApiError::Conflict("username already taken".into()));
    }

    let hash = hash_password(&fields.password)?;
    let account = repo::insert(db, &email, &fields.username, &hash).await?;

    info!(account_id = %account.id, username = %account.username, "account created");
    Ok(account)
}

/// Create an account and flip the admin flag on it.
pub async fn create_superuser(
    db: &PgPool,
    email: &str,
    username: &str,
    password: &str,
) -> Result<Account, ApiError> {
    let account = create_account(
        db,
        NewAccount {
            email: email.to_string(),
            username: username.to_string(),
            password: password.to_string(),
        },
    )
    .await?;
    let account = repo::promote_to_admin(db, account.id).await?;
    info!(account_id = %account.id, username = %account.username, "superuser created");
    Ok(account)
}

/// Apply a partial update and persist it. Returns the saved account and
/// whether the password changed (callers re-issue session tokens on true).
pub async fn apply_update(
    db: &PgPool,
    mut account: Account,
    update: UpdateAccountRequest,
) -> Result<(Account, bool), ApiError> {
    let password_changed = update.merge_into(&mut account)?;
    let saved = repo::save(db, &account).await?;
    if password_changed {
        info!(account_id = %saved.id, "password updated");
    }
    Ok((saved, password_changed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_regex_accepts_plausible_addresses() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("first.last+tag@sub.example.org"));
    }

    #[test]
    fn email_regex_rejects_junk() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a b@x.com"));
        assert!(!is_valid_email("a@x"));
    }
}
