use sqlx::PgPool;
use uuid::Uuid;

use crate::accounts::repo_types::Account;

/// Find an account by username.
pub async fn find_by_username(db: &PgPool, username: &str) -> Result<Option<Account>, sqlx::Error> {
    sqlx::query_as::<_, Account>(
        r#"
        SELECT id, email, username, password_hash, first_name, last_name, tagline,
               is_admin, created_at, updated_at
        FROM accounts
        WHERE username = $1
        "#,
    )
    .bind(username)
    .fetch_optional(db)
    .await
}

/// Find an account by (normalized) email.
pub async fn find_by_email(db: &PgPool, email: &str) -> Result<Option<Account>, sqlx::Error> {
    sqlx::query_as::<_, Account>(
        r#"
        SELECT id, email, username, password_hash, first_name, last_name, tagline,
               is_admin, created_at, updated_at
        FROM accounts
        WHERE email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(db)
    .await
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<Account>, sqlx::Error> {
    sqlx::query_as::<_, Account>(
        r#"
        SELECT id, email, username, password_hash, first_name, last_name, tagline,
               is_admin, created_at, updated_at
        FROM accounts
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn list(db: &PgPool, limit: i64, offset: i64) -> Result<Vec<Account>, sqlx::Error> {
    sqlx::query_as::<_, Account>(
        r#"
        SELECT id, email, username, password_hash, first_name, last_name, tagline,
               is_admin, created_at, updated_at
        FROM accounts
        ORDER BY created_at, id
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await
}

/// Insert a new account with an already-hashed password.
pub async fn insert(
    db: &PgPool,
    email: &str,
    username: &str,
    password_hash: &str,
) -> Result<Account, sqlx::Error> {
    sqlx::query_as::<_, Account>(
        r#"
        INSERT INTO accounts (email, username, password_hash)
        VALUES ($1, $2, $3)
        RETURNING id, email, username, password_hash, first_name, last_name, tagline,
                  is_admin, created_at, updated_at
        "#,
    )
    .bind(email)
    .bind(username)
    .bind(password_hash)
    .fetch_one(db)
    .await
}

/// Persist the mutable fields of an account. `updated_at` advances on every
/// save; `created_at` and `email` are immutable here.
pub async fn save(db: &PgPool, account: &Account) -> Result<Account, sqlx::Error> {
    sqlx::query_as::<_, Account>(
        r#"
        UPDATE accounts
        SET username = $2, tagline = $3, password_hash = $4, updated_at = now()
        WHERE id = $1
        RETURNING id, email, username, password_hash, first_name, last_name, tagline,
                  is_admin, created_at, updated_at
        "#,
    )
    .bind(account.id)
    .bind(&account.username)
    .bind(&account.tagline)
    .bind(&account.password_hash)
    .fetch_one(db)
    .await
}

pub async fn promote_to_admin(db: &PgPool, id: Uuid) -> Result<Account, sqlx::Error> {
    sqlx::query_as::<_, Account>(
        r#"
        UPDATE accounts
        SET is_admin = true, updated_at = now()
        WHERE id = $1
        RETURNING id, email, username, password_hash, first_name, last_name, tagline,
                  is_admin, created_at, updated_at
        "#,
    )
    .bind(id)
    .fetch_one(db)
    .await
}

pub async fn delete(db: &PgPool, id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}
