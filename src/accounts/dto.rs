use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::accounts::repo_types::Account;
use crate::error::ApiError;

/// Wire representation of an account. Password material is write-only and
/// never appears here; `created_at`/`updated_at` are read-only for clients.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub tagline: Option<String>,
}

impl From<Account> for AccountResponse {
    fn from(a: Account) -> Self {
        Self {
            id: a.id,
            email: a.email,
            username: a.username,
            created_at: a.created_at,
            updated_at: a.updated_at,
            first_name: a.first_name,
            last_name: a.last_name,
            tagline: a.tagline,
        }
    }
}

/// Registration body. Fields are `Option` so a missing key surfaces as our
/// own validation error instead of a serde rejection.
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    // Accepted for symmetry with the update body; creation does not
    // re-check it.
    #[allow(dead_code)]
    pub confirm_password: Option<String>,
}

/// Creation fields after shape validation.
#[derive(Debug)]
pub struct NewAccount {
    pub email: String,
    pub username: String,
    pub password: String,
}

impl CreateAccountRequest {
    pub fn validate(self) -> Result<NewAccount, ApiError> {
        let email = self
            .email
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ApiError::Validation("email is required".into()))?
            .to_string();
        let username = self
            .username
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ApiError::Validation("username is required".into()))?
            .to_string();
        let password = self
            .password
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ApiError::Validation("password is required".into()))?;
        Ok(NewAccount {
            email,
            username,
            password,
        })
    }
}

/// Update body: the explicit allow-list of client-updatable fields.
#[derive(Debug, Deserialize, Default)]
pub struct UpdateAccountRequest {
    pub username: Option<String>,
    pub tagline: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

impl UpdateAccountRequest {
    /// Apply the update to `account` in memory. Username and tagline are
    /// taken when present, otherwise the current values are retained. The
    /// password changes only when both `password` and `confirm_password`
    /// are present and equal (confirmation re-check); a mismatched pair
    /// leaves the password untouched rather than failing the request.
    ///
    /// Returns whether the password was changed.
    pub fn merge_into(self, account: &mut Account) -> Result<bool, ApiError> {
        if let Some(username) = self.username {
            let username = username.trim().to_string();
            if username.is_empty() {
                return Err(ApiError::Validation("username must not be empty".into()));
            }
            account.username = username;
        }
        if let Some(tagline) = self.tagline {
            account.tagline = Some(tagline);
        }

        match (self.password, self.confirm_password) {
            (Some(password), Some(confirm)) if password == confirm => {
                if password.len() < 8 {
                    return Err(ApiError::Validation("password too short".into()));
                }
                account.set_password(&password)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

/// Update response: the fresh representation, plus a re-issued token pair
/// when the password changed so the acting session stays authenticated.
#[derive(Debug, Serialize)]
pub struct UpdatedAccountResponse {
    #[serde(flatten)]
    pub account: AccountResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}
